use std::{ops::Range, sync::mpsc::Sender};

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{
    cell::{Cell, Link},
    direction::{Coord, Direction, shuffled_directions, take_step},
};
use crate::error::MazeError;

/// Change notifications sent to an attached listener, typically a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// A passage was carved between two adjacent cells.
    Carved {
        from: Coord,
        to: Coord,
        direction: Direction,
    },
    /// Transient state (visited, current, closed, set) of a cell changed.
    Updated { coord: Coord },
}

/// Rectangular maze grid. Cells are stored row-major in a flat slice and refer to
/// each other only through per-direction [`Link`] flags.
///
/// The grid owns the random source shared by every machine built on top of it, so a
/// seed fully determines a run.
pub struct Grid {
    cells: Box<[Cell]>,
    width: i32,
    height: i32,
    start: Coord,
    end: Coord,
    start_side: Direction,
    end_side: Direction,
    /// Cells currently highlighted, in highlight order.
    current: Vec<Coord>,
    rng: StdRng,
    sender: Option<Sender<GridEvent>>,
}

impl Grid {
    /// Creates a grid of unlinked cells and places the entrance on `start_side`
    /// and the exit on `end_side`, at random positions along those sides.
    pub fn new(
        width: i32,
        height: i32,
        start_side: Direction,
        end_side: Direction,
        seed: u64,
    ) -> Result<Self, MazeError> {
        Self::with_rng(
            width,
            height,
            start_side,
            end_side,
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn with_rng(
        width: i32,
        height: i32,
        start_side: Direction,
        end_side: Direction,
        rng: StdRng,
    ) -> Result<Self, MazeError> {
        if width < 1 || height < 1 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        let cells = vec![Cell::default(); width as usize * height as usize].into_boxed_slice();
        let mut grid = Grid {
            cells,
            width,
            height,
            start: (0, 0),
            end: (0, 0),
            start_side,
            end_side,
            current: Vec::new(),
            rng,
            sender: None,
        };
        grid.start = grid.open_goal(start_side);
        grid.end = grid.open_goal(end_side);
        tracing::debug!(
            "[grid] created {}x{} grid, start {:?} on {}, end {:?} on {}",
            width,
            height,
            grid.start,
            start_side,
            grid.end,
            end_side
        );
        Ok(grid)
    }

    /// Attach (or detach with `None`) a listener for [`GridEvent`]s.
    pub fn set_listener(&mut self, sender: Option<Sender<GridEvent>>) {
        self.sender = sender;
    }

    fn open_goal(&mut self, side: Direction) -> Coord {
        let coord = if side.is_horizontal_side() {
            let y = self.rng.random_range(0..self.height);
            let x = if side == Direction::Left { 0 } else { self.width - 1 };
            (x, y)
        } else {
            let x = self.rng.random_range(0..self.width);
            let y = if side == Direction::Top { 0 } else { self.height - 1 };
            (x, y)
        };
        let idx = self.ravel_index(coord);
        self.cells[idx].neighbors[side.index()] = Link::Opening;
        coord
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn end(&self) -> Coord {
        self.end
    }

    pub fn start_side(&self) -> Direction {
        self.start_side
    }

    pub fn end_side(&self) -> Direction {
        self.end_side
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn ravel_index(&self, coord: Coord) -> usize {
        coord.1 as usize * self.width as usize + coord.0 as usize
    }

    fn checked_index(&self, coord: Coord) -> Result<usize, MazeError> {
        if self.out_of_bounds(coord.0, coord.1) {
            return Err(MazeError::OutOfBoundsAccess {
                x: coord.0,
                y: coord.1,
            });
        }
        Ok(self.ravel_index(coord))
    }

    pub fn out_of_bounds(&self, x: i32, y: i32) -> bool {
        x < 0 || x >= self.width || y < 0 || y >= self.height
    }

    pub fn cell(&self, coord: Coord) -> Result<&Cell, MazeError> {
        let idx = self.checked_index(coord)?;
        Ok(&self.cells[idx])
    }

    fn cell_mut(&mut self, coord: Coord) -> Result<&mut Cell, MazeError> {
        let idx = self.checked_index(coord)?;
        Ok(&mut self.cells[idx])
    }

    pub fn is_start_or_end(&self, coord: Coord) -> bool {
        coord == self.start || coord == self.end
    }

    /// True while no passage has been carved into the cell.
    pub fn pos_is_unreached(&self, coord: Coord) -> Result<bool, MazeError> {
        Ok(self.cell(coord)?.is_unreached())
    }

    pub fn is_visited(&self, coord: Coord) -> Result<bool, MazeError> {
        Ok(self.cell(coord)?.visited())
    }

    /// True when there is no passage from `coord` towards `direction`.
    /// The entrance and exit markers count as passages.
    pub fn is_wall(&self, coord: Coord, direction: Direction) -> Result<bool, MazeError> {
        Ok(self.cell(coord)?.neighbor(direction) == Link::Wall)
    }

    /// Carves a passage from `from` to its neighbor in `direction`, linking both sides.
    /// Returns the coordinate of the neighbor.
    pub fn add_neighbor(&mut self, from: Coord, direction: Direction) -> Result<Coord, MazeError> {
        let to = take_step(direction, from.0, from.1);
        let from_idx = self.checked_index(from)?;
        let to_idx = self.checked_index(to)?;
        self.cells[from_idx].neighbors[direction.index()] = Link::Open;
        self.cells[to_idx].neighbors[direction.opposite().index()] = Link::Open;
        tracing::trace!("[grid] carved {:?} -> {:?}", from, to);
        self.notify(GridEvent::Carved {
            from,
            to,
            direction,
        });
        Ok(to)
    }

    /// Highlights `coord`. Unless `append` is set, previously highlighted cells are cleared first.
    pub fn set_current(&mut self, coord: Coord, append: bool) -> Result<(), MazeError> {
        self.checked_index(coord)?;
        if !append {
            self.clear_current();
        }
        self.current.push(coord);
        self.cell_mut(coord)?.mark_current(true);
        self.notify(GridEvent::Updated { coord });
        Ok(())
    }

    pub fn clear_current(&mut self) {
        for coord in std::mem::take(&mut self.current) {
            let idx = self.ravel_index(coord);
            self.cells[idx].mark_current(false);
            self.notify(GridEvent::Updated { coord });
        }
    }

    pub fn current_cells(&self) -> &[Coord] {
        &self.current
    }

    pub(crate) fn set_visited(&mut self, coord: Coord, value: bool) -> Result<(), MazeError> {
        self.cell_mut(coord)?.visited = value;
        self.notify(GridEvent::Updated { coord });
        Ok(())
    }

    pub(crate) fn set_closed(&mut self, coord: Coord, value: bool) -> Result<(), MazeError> {
        self.cell_mut(coord)?.closed = value;
        self.notify(GridEvent::Updated { coord });
        Ok(())
    }

    pub(crate) fn set_set(&mut self, coord: Coord, set: Option<usize>) -> Result<(), MazeError> {
        self.cell_mut(coord)?.set = set;
        self.notify(GridEvent::Updated { coord });
        Ok(())
    }

    /// Resets visited/current/closed/set on every cell. Passages are kept.
    pub fn clear_state(&mut self) {
        self.current.clear();
        for idx in 0..self.cells.len() {
            self.cells[idx].clear_state();
            let coord = (idx as i32 % self.width, idx as i32 / self.width);
            self.notify(GridEvent::Updated { coord });
        }
    }

    /// Every cell with its coordinate, row by row.
    pub fn all_cells(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| ((idx as i32 % width, idx as i32 / width), cell))
    }

    /// Every carved passage exactly once, reported from its left or upper cell.
    pub fn passages(&self) -> impl Iterator<Item = (Coord, Direction)> {
        self.all_cells().flat_map(|(coord, cell)| {
            [Direction::Right, Direction::Bottom]
                .into_iter()
                .filter(move |&direction| cell.neighbor(direction).is_open())
                .map(move |direction| (coord, direction))
        })
    }

    /// Grid cells strictly between two coordinates that differ by at most one
    /// cell gap along each axis. Empty for adjacent or identical coordinates.
    pub fn cells_between(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> CellsBetween {
        CellsBetween::new((x0, y0), (x1, y1))
    }

    /// Shuffled directions drawn from the grid's random source.
    pub fn shuffled_directions(&mut self) -> [Direction; 4] {
        shuffled_directions(&mut self.rng)
    }

    /// Succeeds with probability `chance_percent / 100`.
    pub(crate) fn roll(&mut self, chance_percent: u8) -> bool {
        self.rng.random_range(0..100u8) < chance_percent
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    fn notify(&self, event: GridEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}

impl std::ops::Index<Coord> for Grid {
    type Output = Cell;

    /// # Panics
    /// If `coord` is outside the grid.
    fn index(&self, coord: Coord) -> &Self::Output {
        if self.out_of_bounds(coord.0, coord.1) {
            panic!("Coordinate {:?} is outside the grid", coord);
        }
        &self.cells[self.ravel_index(coord)]
    }
}

/// Lazy, side-effect free iterator returned by [`Grid::cells_between`]. Clone it to restart.
#[derive(Debug, Clone)]
pub struct CellsBetween {
    xs: Range<i32>,
    ys: Range<i32>,
    x: i32,
    y: i32,
}

impl CellsBetween {
    fn new(a: Coord, b: Coord) -> Self {
        fn strictly_between(p: i32, q: i32) -> Range<i32> {
            if p == q {
                p..p + 1
            } else {
                p.min(q) + 1..p.max(q)
            }
        }
        let (xs, ys) = if a == b {
            (a.0..a.0, a.1..a.1)
        } else {
            (strictly_between(a.0, b.0), strictly_between(a.1, b.1))
        };
        CellsBetween {
            x: xs.start,
            y: ys.start,
            xs,
            ys,
        }
    }
}

impl Iterator for CellsBetween {
    type Item = Coord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ys.is_empty() || !self.xs.contains(&self.x) {
            return None;
        }
        let item = (self.x, self.y);
        self.y += 1;
        if self.y >= self.ys.end {
            self.y = self.ys.start;
            self.x += 1;
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: i32, height: i32) -> Grid {
        Grid::new(width, height, Direction::Top, Direction::Bottom, 3).unwrap()
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            Grid::new(0, 4, Direction::Top, Direction::Bottom, 0).err(),
            Some(MazeError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
        assert!(Grid::new(3, -1, Direction::Top, Direction::Bottom, 0).is_err());
    }

    #[test]
    fn test_openings_on_configured_sides() {
        for seed in 0..20 {
            let grid = Grid::new(6, 4, Direction::Left, Direction::Right, seed).unwrap();
            let (sx, _) = grid.start();
            let (ex, _) = grid.end();
            assert_eq!(sx, 0);
            assert_eq!(ex, 5);
            assert_eq!(grid[grid.start()].neighbor(Direction::Left), Link::Opening);
            assert_eq!(grid[grid.end()].neighbor(Direction::Right), Link::Opening);
            // Markers do not make a cell reachable
            assert!(grid.pos_is_unreached(grid.start()).unwrap());
        }
    }

    #[test]
    fn test_add_neighbor_is_symmetric() {
        let mut grid = grid(3, 3);
        let to = grid.add_neighbor((1, 1), Direction::Right).unwrap();
        assert_eq!(to, (2, 1));
        assert!(!grid.is_wall((1, 1), Direction::Right).unwrap());
        assert!(!grid.is_wall((2, 1), Direction::Left).unwrap());
        assert!(!grid.pos_is_unreached((2, 1)).unwrap());
        assert_eq!(grid.passages().collect::<Vec<_>>(), vec![((1, 1), Direction::Right)]);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut grid = grid(3, 3);
        assert!(grid.out_of_bounds(-1, 0));
        assert!(grid.out_of_bounds(0, 3));
        assert!(!grid.out_of_bounds(2, 2));
        assert_eq!(
            grid.add_neighbor((2, 0), Direction::Right),
            Err(MazeError::OutOfBoundsAccess { x: 3, y: 0 })
        );
        assert_eq!(
            grid.is_wall((5, 5), Direction::Top),
            Err(MazeError::OutOfBoundsAccess { x: 5, y: 5 })
        );
    }

    #[test]
    fn test_set_current_replaces_or_appends() {
        let mut grid = grid(3, 3);
        grid.set_current((0, 0), false).unwrap();
        grid.set_current((1, 0), false).unwrap();
        assert!(!grid[(0, 0)].current());
        assert_eq!(grid.current_cells(), &[(1, 0)]);
        grid.set_current((2, 0), true).unwrap();
        assert_eq!(grid.current_cells(), &[(1, 0), (2, 0)]);
        grid.clear_current();
        assert!(grid.current_cells().is_empty());
        assert!(!grid[(1, 0)].current());
    }

    #[test]
    fn test_clear_state_keeps_passages() {
        let mut grid = grid(2, 2);
        grid.add_neighbor((0, 0), Direction::Bottom).unwrap();
        grid.set_visited((0, 0), true).unwrap();
        grid.set_set((0, 1), Some(0)).unwrap();
        grid.clear_state();
        assert!(grid.all_cells().all(|(_, cell)| !cell.visited() && cell.set().is_none()));
        assert_eq!(grid.passages().count(), 1);
    }

    #[test]
    fn test_cells_between() {
        let grid = grid(5, 5);
        assert_eq!(grid.cells_between(0, 0, 2, 0).collect::<Vec<_>>(), vec![(1, 0)]);
        assert_eq!(grid.cells_between(2, 2, 2, 0).collect::<Vec<_>>(), vec![(2, 1)]);
        assert_eq!(grid.cells_between(0, 0, 2, 2).collect::<Vec<_>>(), vec![(1, 1)]);
        assert_eq!(grid.cells_between(0, 0, 1, 0).count(), 0);
        assert_eq!(grid.cells_between(3, 3, 3, 3).count(), 0);

        let between = grid.cells_between(4, 1, 2, 1);
        let first: Vec<_> = between.clone().collect();
        let second: Vec<_> = between.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_events_are_sent() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut grid = grid(2, 1);
        grid.set_listener(Some(tx));
        grid.add_neighbor((0, 0), Direction::Right).unwrap();
        grid.set_visited((1, 0), true).unwrap();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                GridEvent::Carved {
                    from: (0, 0),
                    to: (1, 0),
                    direction: Direction::Right
                },
                GridEvent::Updated { coord: (1, 0) },
            ]
        );
    }
}
