use super::{Search, pop_route, seed_route, visit};
use crate::{
    error::MazeError,
    maze::{Coord, Direction, Grid, take_step},
};

/// Keep-left wall follower. Decides every move from the walls around the walker
/// and the direction it arrived from; it never consults visitation, so cycles
/// in the maze can keep it walking forever.
#[derive(Default)]
pub(super) struct WallFollower {
    /// Walked path with loops erased; ends at the walker
    route: Vec<Coord>,
    previous: Coord,
    position: Coord,
}

impl WallFollower {
    fn move_to(&mut self, grid: &mut Grid, next: Coord) -> Result<(), MazeError> {
        self.previous = self.position;
        self.position = next;
        visit(grid, next)?;
        // Walking back over the path erases the loop
        match self.route.iter().position(|&coord| coord == next) {
            Some(idx) => self.route.truncate(idx + 1),
            None => self.route.push(next),
        }
        Ok(())
    }
}

impl Search for WallFollower {
    fn set_up(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        self.route = seed_route(grid);
        self.previous = self.route[0];
        self.position = grid.start();
        Ok(())
    }

    fn reached_end(&mut self, grid: &mut Grid) -> bool {
        self.route.last() == Some(&grid.end())
    }

    fn advance(&mut self, grid: &mut Grid) -> Result<bool, MazeError> {
        let heading = Direction::between(self.previous, self.position)
            .unwrap_or(grid.start_side().opposite());
        let cell = grid.cell(self.position)?;
        let choice = [
            heading.turn_left(),
            heading,
            heading.turn_right(),
            heading.opposite(),
        ]
        .into_iter()
        .find(|&direction| cell.neighbor(direction).is_open());

        match choice {
            Some(direction) => {
                let (x, y) = self.position;
                self.move_to(grid, take_step(direction, x, y))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn next_route_cell(&mut self, grid: &Grid) -> Option<Coord> {
        pop_route(&mut self.route, grid)
    }
}
