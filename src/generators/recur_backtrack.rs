use super::{Carve, connect_end, create_walk};
use crate::{
    error::MazeError,
    maze::{Coord, Direction, Grid},
};

/// Depth-first carving from the entrance with an explicit stack of
/// `(direction, cell)` candidates, directions shuffled as they are pushed.
pub(super) struct RecurBacktrack {
    stack: Vec<(Direction, Coord)>,
    break_wall_chance: u8,
    done: bool,
}

impl RecurBacktrack {
    pub(super) fn new(break_wall_chance: u8) -> Self {
        Self {
            stack: Vec::new(),
            break_wall_chance,
            done: false,
        }
    }
}

impl Carve for RecurBacktrack {
    fn first_step(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        let start = grid.start();
        let start_side = grid.start_side();
        self.stack = grid
            .shuffled_directions()
            .into_iter()
            .filter(|&direction| direction != start_side)
            .map(|direction| (direction, start))
            .collect();
        grid.set_current(start, false)
    }

    fn step(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        while let Some((direction, from)) = self.stack.pop() {
            if let Some(to) = create_walk(grid, from, direction, self.break_wall_chance)? {
                // The way back is already open, no need to try it
                let back = direction.opposite();
                let candidates = grid.shuffled_directions();
                self.stack.extend(
                    candidates
                        .into_iter()
                        .filter(|&next| next != back)
                        .map(|next| (next, to)),
                );
                return Ok(());
            }
        }
        connect_end(grid)?;
        grid.clear_current();
        self.done = true;
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
    fn test_each_step_carves_one_new_cell() {
        let mut grid = Grid::new(4, 3, Direction::Top, Direction::Bottom, 13).unwrap();
        let mut generator = RecurBacktrack::new(0);
        generator.first_step(&mut grid).unwrap();
        for carved in 1..grid.cell_count() {
            generator.step(&mut grid).unwrap();
            assert_eq!(grid.passages().count(), carved);
            assert!(!generator.is_done());
        }
        // The last step only drains the stack
        generator.step(&mut grid).unwrap();
        assert!(generator.is_done());
        assert_eq!(grid.passages().count(), grid.cell_count() - 1);
    }

    #[test]
    fn test_walk_starts_at_entrance() {
        let mut grid = Grid::new(5, 5, Direction::Left, Direction::Right, 4).unwrap();
        let start = grid.start();
        let mut generator = RecurBacktrack::new(0);
        generator.first_step(&mut grid).unwrap();
        assert_eq!(grid.current_cells(), &[start]);
        generator.step(&mut grid).unwrap();
        assert!(!grid.pos_is_unreached(start).unwrap());
        assert!(grid[start].visited());
    }
}
