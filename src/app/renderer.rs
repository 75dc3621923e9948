use std::{
    fmt,
    io::{Stdout, Write},
    sync::mpsc::Receiver,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::maze::{Coord, Direction, Grid, GridEvent, Link, take_step};

/// One square of the rendered picture. A `w x h` maze is drawn as
/// `(2w + 1) x (2h + 1)` tiles: cells sit on odd coordinates, the links between
/// them on mixed ones, and wall corners on even ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    /// Entrance or exit in the outer wall
    Opening,
    Passage,
    /// Cell no passage leads to yet
    Unreached,
    Current,
    Closed,
    Visited,
    /// Carved cell tinted by its set id
    Set(usize),
}

impl Tile {
    /// The width of each tile when rendered, in character widths.
    pub const TILE_WIDTH: u16 = 2;

    const SET_COLORS: [Color; 6] = [
        Color::DarkCyan,
        Color::DarkMagenta,
        Color::DarkYellow,
        Color::DarkGreen,
        Color::DarkBlue,
        Color::DarkRed,
    ];
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            Tile::Wall => "██".with(Color::White),
            Tile::Opening => "  ".on(Color::Green),
            Tile::Passage => "  ".with(Color::Reset),
            Tile::Unreached => "░░".with(Color::DarkGrey),
            Tile::Current => "  ".on(Color::Yellow),
            Tile::Closed => "··".with(Color::DarkRed),
            Tile::Visited => "  ".on(Color::Blue),
            Tile::Set(id) => "  ".on(Tile::SET_COLORS[id % Tile::SET_COLORS.len()]),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Tile::TILE_WIDTH as usize,
                "Each tile must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}

/// Size of the tile picture for a grid.
pub fn picture_size(grid: &Grid) -> (u16, u16) {
    let tiles = |n: i32| u16::try_from(2 * n + 1).unwrap_or(u16::MAX);
    (tiles(grid.width()), tiles(grid.height()))
}

fn cell_tile(grid: &Grid, coord: Coord) -> Tile {
    let cell = &grid[coord];
    if cell.current() {
        Tile::Current
    } else if cell.closed() {
        Tile::Closed
    } else if cell.visited() {
        Tile::Visited
    } else if let Some(id) = cell.set() {
        Tile::Set(id)
    } else if cell.is_unreached() {
        Tile::Unreached
    } else {
        Tile::Passage
    }
}

/// Shading of an open link: it takes the look of its cells when they agree.
fn link_tile(grid: &Grid, from: Coord, direction: Direction) -> Tile {
    let to = take_step(direction, from.0, from.1);
    match (cell_tile(grid, from), cell_tile(grid, to)) {
        (a, b) if a == b => a,
        (Tile::Current, Tile::Visited | Tile::Closed) | (Tile::Visited | Tile::Closed, Tile::Current) => {
            Tile::Visited
        }
        _ => Tile::Passage,
    }
}

/// The tile drawn at picture coordinate `(tx, ty)`.
pub fn tile_at(grid: &Grid, (tx, ty): (i32, i32)) -> Tile {
    let (x, y) = ((tx - 1).div_euclid(2), (ty - 1).div_euclid(2));
    match (tx % 2 == 1, ty % 2 == 1) {
        (true, true) => cell_tile(grid, (x, y)),
        // Vertical link between (x, y) and the cell to its right or left
        (false, true) => {
            let (cell, direction) = if x < 0 {
                ((0, y), Direction::Left)
            } else {
                ((x, y), Direction::Right)
            };
            side_tile(grid, cell, direction)
        }
        (true, false) => {
            let (cell, direction) = if y < 0 {
                ((x, 0), Direction::Top)
            } else {
                ((x, y), Direction::Bottom)
            };
            side_tile(grid, cell, direction)
        }
        (false, false) => Tile::Wall,
    }
}

fn side_tile(grid: &Grid, cell: Coord, direction: Direction) -> Tile {
    match grid[cell].neighbor(direction) {
        Link::Wall => Tile::Wall,
        Link::Opening => Tile::Opening,
        Link::Open => link_tile(grid, cell, direction),
    }
}

/// Picture coordinates a cell or one of its sides is drawn at.
fn cell_position((x, y): Coord) -> (i32, i32) {
    (2 * x + 1, 2 * y + 1)
}

fn side_position(coord: Coord, direction: Direction) -> (i32, i32) {
    let (tx, ty) = cell_position(coord);
    match direction {
        Direction::Top => (tx, ty - 1),
        Direction::Right => (tx + 1, ty),
        Direction::Bottom => (tx, ty + 1),
        Direction::Left => (tx - 1, ty),
    }
}

/// Terminal renderer redrawing only the tiles named by grid events.
pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    /// Picture size in tiles
    picture: (u16, u16),
}

impl Renderer {
    pub fn new(grid: &Grid) -> Self {
        Self {
            stdout: std::io::stdout(),
            picture: picture_size(grid),
        }
    }

    /// Check if the terminal is large enough for the picture plus a status line.
    pub fn fits_terminal(&self) -> std::io::Result<bool> {
        let (term_width, term_height) = terminal::size()?;
        let (width, height) = self.picture;
        Ok(term_width >= width.saturating_mul(Tile::TILE_WIDTH) && term_height > height)
    }

    fn queue_tile(&mut self, grid: &Grid, (tx, ty): (i32, i32)) -> std::io::Result<()> {
        let (Ok(column), Ok(row)) = (u16::try_from(tx), u16::try_from(ty)) else {
            return Ok(());
        };
        if column >= self.picture.0 || row >= self.picture.1 {
            return Ok(());
        }
        queue!(
            self.stdout,
            cursor::MoveTo(column * Tile::TILE_WIDTH, row),
            style::Print(tile_at(grid, (tx, ty)))
        )
    }

    fn queue_cell(&mut self, grid: &Grid, coord: Coord) -> std::io::Result<()> {
        self.queue_tile(grid, cell_position(coord))?;
        for direction in Direction::ALL {
            self.queue_tile(grid, side_position(coord, direction))?;
        }
        Ok(())
    }

    /// Draw the whole picture from scratch.
    pub fn draw_all(&mut self, grid: &Grid) -> std::io::Result<()> {
        self.stdout.queue(terminal::Clear(ClearType::All))?;
        let (width, height) = self.picture;
        for ty in 0..height as i32 {
            for tx in 0..width as i32 {
                self.queue_tile(grid, (tx, ty))?;
            }
        }
        self.stdout.flush()
    }

    /// Redraw everything the pending events touched. Returns the number of events consumed.
    pub fn drain_events(&mut self, grid: &Grid, events: &Receiver<GridEvent>) -> std::io::Result<usize> {
        let mut count = 0;
        for event in events.try_iter() {
            match event {
                GridEvent::Carved { from, to, .. } => {
                    self.queue_cell(grid, from)?;
                    self.queue_cell(grid, to)?;
                }
                GridEvent::Updated { coord } => self.queue_cell(grid, coord)?,
            }
            count += 1;
        }
        self.stdout.flush()?;
        Ok(count)
    }

    /// Print a message on the line below the picture.
    pub fn status(&mut self, message: &str, color: Color) -> std::io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(0, self.picture.1),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(message.with(color).attribute(Attribute::Bold))
        )?;
        self.stdout.flush()
    }
}
