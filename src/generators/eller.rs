use std::collections::BTreeSet;

use rand::seq::IndexedRandom;

use super::Carve;
use crate::{
    error::MazeError,
    maze::{Coord, Direction, Grid, SetRegistry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Give every cell of the row a set
    InitRow,
    /// Randomly merge horizontal neighbors
    Join,
    /// Randomly carve down to the next row
    Bridge,
    /// Carve down once for every set the bridge pass missed
    Reachable,
    /// Merge every remaining set on the last row
    Finalize,
    Done,
}

/// Eller's algorithm, one column per step.
pub(super) struct Eller {
    sets: SetRegistry,
    /// Sets of the current row without a passage to the row below yet
    bridge_sets: BTreeSet<usize>,
    row: i32,
    column: i32,
    break_wall_chance: u8,
    phase: Phase,
}

impl Eller {
    pub(super) fn new(break_wall_chance: u8) -> Self {
        Self {
            sets: SetRegistry::new(),
            bridge_sets: BTreeSet::new(),
            row: 0,
            column: 0,
            break_wall_chance,
            phase: Phase::InitRow,
        }
    }

    fn set_of(grid: &Grid, coord: Coord) -> Result<Option<usize>, MazeError> {
        Ok(grid.cell(coord)?.set())
    }

    /// Runs the current phase. Returns whether it did any work, `false` means it
    /// only moved on to the next phase.
    fn advance(&mut self, grid: &mut Grid) -> Result<bool, MazeError> {
        let (row, column) = (self.row, self.column);
        match self.phase {
            Phase::InitRow => {
                if column >= grid.width() {
                    self.column = 0;
                    self.phase = Phase::Join;
                    return Ok(false);
                }
                if Self::set_of(grid, (column, row))?.is_none() {
                    self.sets.create(grid, (column, row))?;
                }
                grid.set_current((column, row), false)?;
                self.column += 1;
                Ok(true)
            }
            Phase::Join => {
                if column + 1 >= grid.width() {
                    self.column = 0;
                    if row + 1 >= grid.height() {
                        self.phase = Phase::Finalize;
                    } else {
                        self.bridge_sets = (0..grid.width())
                            .filter_map(|x| grid[(x, row)].set())
                            .collect();
                        self.phase = Phase::Bridge;
                    }
                    return Ok(false);
                }
                grid.set_current((column, row), false)?;
                let current = Self::set_of(grid, (column, row))?;
                let adjacent = Self::set_of(grid, (column + 1, row))?;
                if current != adjacent && grid.roll(self.break_wall_chance) {
                    self.sets
                        .combine(grid, (column, row), (column + 1, row), Direction::Right)?;
                }
                self.column += 1;
                Ok(true)
            }
            Phase::Bridge => {
                if column >= grid.width() {
                    self.phase = Phase::Reachable;
                    return Ok(false);
                }
                grid.set_current((column, row), false)?;
                if grid.roll(self.break_wall_chance) {
                    let combined =
                        self.sets
                            .combine(grid, (column, row), (column, row + 1), Direction::Bottom)?;
                    self.bridge_sets.remove(&combined.set());
                }
                self.column += 1;
                Ok(true)
            }
            Phase::Reachable => {
                let Some(set) = self.bridge_sets.pop_first() else {
                    tracing::trace!("[eller] row {} bridged", row);
                    self.row += 1;
                    self.column = 0;
                    self.phase = Phase::InitRow;
                    return Ok(false);
                };
                let candidates: Vec<Coord> = self
                    .sets
                    .members(set)
                    .iter()
                    .copied()
                    .filter(|&(_, y)| y == row)
                    .collect();
                let Some(&(x, _)) = candidates.choose(grid.rng()) else {
                    panic!("Set {} has no cell on row {}", set, row);
                };
                grid.set_current((x, row), false)?;
                self.sets
                    .combine(grid, (x, row), (x, row + 1), Direction::Bottom)?;
                Ok(true)
            }
            Phase::Finalize => {
                if column + 1 >= grid.width() {
                    grid.clear_current();
                    self.phase = Phase::Done;
                    tracing::debug!("[eller] finished with {} set slots", self.sets.len());
                    return Ok(true);
                }
                grid.set_current((column, row), false)?;
                let current = Self::set_of(grid, (column, row))?;
                let adjacent = Self::set_of(grid, (column + 1, row))?;
                if current != adjacent {
                    self.sets
                        .combine(grid, (column, row), (column + 1, row), Direction::Right)?;
                }
                self.column += 1;
                Ok(true)
            }
            Phase::Done => Ok(true),
        }
    }
}

impl Carve for Eller {
    fn first_step(&mut self, _grid: &mut Grid) -> Result<(), MazeError> {
        self.row = 0;
        self.column = 0;
        self.phase = Phase::InitRow;
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        while !self.advance(grid)? {}
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
}
