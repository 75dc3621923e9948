use rand::seq::SliceRandom;

use super::Carve;
use crate::{
    error::MazeError,
    maze::{Coord, Direction, Grid, SetRegistry, take_step},
};

/// Randomized Kruskal's algorithm over a shuffled bag of walls.
///
/// Only walls to the right of and below each cell go into the bag, so every wall
/// appears exactly once.
pub(super) struct Kruskal {
    bag: Vec<(Direction, Coord)>,
    sets: SetRegistry,
    break_wall_chance: u8,
    /// Carve same-set walls with `break_wall_chance` probability
    densify: bool,
    done: bool,
}

impl Kruskal {
    pub(super) fn new(break_wall_chance: u8, densify: bool) -> Self {
        Self {
            bag: Vec::new(),
            sets: SetRegistry::new(),
            break_wall_chance,
            densify,
            done: false,
        }
    }

    fn finish(&mut self, grid: &mut Grid) {
        grid.clear_current();
        self.done = true;
        tracing::debug!(
            "[kruskal] bag empty, {} set slots used",
            self.sets.len()
        );
    }
}

impl Carve for Kruskal {
    fn first_step(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        let (width, height) = (grid.width(), grid.height());
        self.bag = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                [
                    (x + 1 < width).then_some((Direction::Right, (x, y))),
                    (y + 1 < height).then_some((Direction::Bottom, (x, y))),
                ]
            })
            .flatten()
            .collect();
        self.bag.shuffle(grid.rng());
        tracing::debug!("[kruskal] bag filled with {} walls", self.bag.len());
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        let Some((direction, a)) = self.bag.pop() else {
            self.finish(grid);
            return Ok(());
        };
        let b = take_step(direction, a.0, a.1);
        grid.set_current(a, false)?;

        let same_set = match (grid.cell(a)?.set(), grid.cell(b)?.set()) {
            (Some(set_a), Some(set_b)) => set_a == set_b,
            _ => false,
        };
        if !same_set {
            self.sets.combine(grid, a, b, direction)?;
        } else if self.densify && grid.roll(self.break_wall_chance) {
            tracing::trace!("[kruskal] densifying wall {:?} -> {:?}", a, b);
            grid.add_neighbor(a, direction)?;
        }

        if self.bag.is_empty() {
            self.finish(grid);
        }
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_holds_every_wall_once() {
        let mut grid = Grid::new(4, 3, Direction::Top, Direction::Bottom, 1).unwrap();
        let mut generator = Kruskal::new(0, false);
        generator.first_step(&mut grid).unwrap();
        let mut bag = generator.bag.clone();
        bag.sort();
        bag.dedup();
        assert_eq!(bag.len(), 3 * 3 + 4 * 2);
        assert!(bag.iter().all(|(direction, _)| matches!(
            direction,
            Direction::Right | Direction::Bottom
        )));
    }

    #[test]
    fn test_same_set_walls_are_dropped_by_default() {
        let mut grid = Grid::new(5, 5, Direction::Top, Direction::Bottom, 6).unwrap();
        let mut generator = Kruskal::new(100, false);
        generator.first_step(&mut grid).unwrap();
        while !generator.is_done() {
            generator.step(&mut grid).unwrap();
        }
        assert_eq!(grid.passages().count(), 24);
        assert_eq!(generator.sets.non_empty_count(), 1);
    }

    #[test]
    fn test_single_cell_finishes_on_first_step() {
        let mut grid = Grid::new(1, 1, Direction::Top, Direction::Bottom, 0).unwrap();
        let mut generator = Kruskal::new(0, false);
        generator.first_step(&mut grid).unwrap();
        assert!(!generator.is_done());
        generator.step(&mut grid).unwrap();
        assert!(generator.is_done());
        assert_eq!(grid.passages().count(), 0);
    }
}
