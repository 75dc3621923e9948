use std::collections::VecDeque;

use super::{Carve, carve_path, connect_end, create_walk};
use crate::{
    error::MazeError,
    maze::{Coord, Direction, Grid, take_step},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Random walk until the walker is boxed in
    Kill,
    /// Row scan for an unvisited cell next to a visited one
    Hunt,
    Finalize,
    Done,
}

pub(super) struct HuntAndKill {
    /// Directions still to try from the walker's cell
    stack: VecDeque<(Direction, Coord)>,
    /// Rows that may still hold unvisited cells, top to bottom
    unfinished_rows: VecDeque<i32>,
    /// Unvisited columns of the scanned row not yet tried in this pass
    unfinished_columns: VecDeque<i32>,
    /// Index into `unfinished_rows` of the row being scanned
    row_cursor: usize,
    break_wall_chance: u8,
    phase: Phase,
}

impl HuntAndKill {
    pub(super) fn new(break_wall_chance: u8) -> Self {
        Self {
            stack: VecDeque::new(),
            unfinished_rows: VecDeque::new(),
            unfinished_columns: VecDeque::new(),
            row_cursor: 0,
            break_wall_chance,
            phase: Phase::Kill,
        }
    }

    fn walk_from(&mut self, grid: &mut Grid, coord: Coord, skip: Direction) {
        self.stack = grid
            .shuffled_directions()
            .into_iter()
            .filter(|&direction| direction != skip)
            .map(|direction| (direction, coord))
            .collect();
    }

    fn unvisited_columns(grid: &Grid, y: i32) -> VecDeque<i32> {
        (0..grid.width()).filter(|&x| !grid[(x, y)].visited()).collect()
    }

    fn kill(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        while let Some((direction, from)) = self.stack.pop_front() {
            grid.set_visited(from, true)?;
            if let Some(to) = create_walk(grid, from, direction, self.break_wall_chance)? {
                self.walk_from(grid, to, direction.opposite());
                return Ok(());
            }
        }
        self.start_hunt(grid);
        Ok(())
    }

    /// Drops finished rows and restarts the scan from the topmost unfinished one.
    fn start_hunt(&mut self, grid: &Grid) {
        self.unfinished_rows
            .retain(|&y| (0..grid.width()).any(|x| !grid[(x, y)].visited()));
        self.row_cursor = 0;
        match self.unfinished_rows.front() {
            Some(&y) => {
                self.unfinished_columns = Self::unvisited_columns(grid, y);
                tracing::trace!("[hunt_and_kill] hunting from row {}", y);
                self.phase = Phase::Hunt;
            }
            None => self.phase = Phase::Finalize,
        }
    }

    fn hunt(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        let Some(&y) = self.unfinished_rows.get(self.row_cursor) else {
            self.phase = Phase::Finalize;
            return Ok(());
        };

        let Some(x) = self.unfinished_columns.pop_front() else {
            // Row exhausted for this pass, move on to the next unfinished one
            if (0..grid.width()).all(|x| grid[(x, y)].visited()) {
                self.unfinished_rows.remove(self.row_cursor);
            } else {
                self.row_cursor += 1;
            }
            if self.row_cursor >= self.unfinished_rows.len() {
                self.row_cursor = 0;
            }
            match self.unfinished_rows.get(self.row_cursor) {
                Some(&next) => self.unfinished_columns = Self::unvisited_columns(grid, next),
                None => self.phase = Phase::Finalize,
            }
            return Ok(());
        };

        grid.set_current((x, y), false)?;
        for direction in grid.shuffled_directions() {
            let (tx, ty) = take_step(direction, x, y);
            if !grid.out_of_bounds(tx, ty) && grid[(tx, ty)].visited() {
                carve_path(grid, (x, y), direction)?;
                self.walk_from(grid, (x, y), direction);
                self.phase = Phase::Kill;
                return Ok(());
            }
        }
        Ok(())
    }
}

impl Carve for HuntAndKill {
    fn first_step(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        let start = grid.start();
        let start_side = grid.start_side();
        self.walk_from(grid, start, start_side);
        self.unfinished_rows = (0..grid.height()).collect();
        self.phase = Phase::Kill;
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        match self.phase {
            Phase::Kill => self.kill(grid),
            Phase::Hunt => self.hunt(grid),
            Phase::Finalize => {
                connect_end(grid)?;
                grid.clear_current();
                self.phase = Phase::Done;
                Ok(())
            }
            Phase::Done => Ok(()),
        }
    }

    fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
}
