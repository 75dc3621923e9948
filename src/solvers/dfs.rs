use super::{Search, pop_route, seed_route, visit};
use crate::{
    error::MazeError,
    maze::{Coord, Direction, Grid, take_step},
};

/// Depth-first backtracking. The route is both the current path and, through
/// membership, the set of cells it must not step on again. Cells popped off a
/// dead end are marked closed.
#[derive(Default)]
pub(super) struct DepthFirst {
    route: Vec<Coord>,
}

impl DepthFirst {
    fn can_enter(&self, grid: &Grid, from: Coord, direction: Direction) -> Result<bool, MazeError> {
        if !grid.cell(from)?.neighbor(direction).is_open() {
            return Ok(false);
        }
        let next = take_step(direction, from.0, from.1);
        Ok(!grid.is_visited(next)? && !self.route.contains(&next))
    }
}

impl Search for DepthFirst {
    fn set_up(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        self.route = seed_route(grid);
        Ok(())
    }

    fn reached_end(&mut self, grid: &mut Grid) -> bool {
        self.route.last() == Some(&grid.end())
    }

    fn advance(&mut self, grid: &mut Grid) -> Result<bool, MazeError> {
        // Only the seed cell outside the entrance is left: everything was explored
        let [.., previous, tail] = self.route[..] else {
            return Ok(false);
        };
        let forward = Direction::between(previous, tail).unwrap_or(grid.start_side().opposite());

        let order = std::iter::once(forward)
            .chain(Direction::ALL.into_iter().filter(|&direction| direction != forward));
        for direction in order {
            if self.can_enter(grid, tail, direction)? {
                let next = take_step(direction, tail.0, tail.1);
                visit(grid, next)?;
                self.route.push(next);
                return Ok(true);
            }
        }

        // Dead end, back up one cell
        self.route.pop();
        grid.set_closed(tail, true)?;
        grid.set_visited(tail, true)?;
        if !grid.out_of_bounds(previous.0, previous.1) {
            grid.set_current(previous, false)?;
        }
        Ok(true)
    }

    fn next_route_cell(&mut self, grid: &Grid) -> Option<Coord> {
        pop_route(&mut self.route, grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_ends_are_closed() {
        // Start at the top of the middle column, exit at the bottom of it,
        // with a dead-end spur to the left of the start.
        let mut seed = 0;
        let mut grid = loop {
            let grid = Grid::new(3, 3, Direction::Top, Direction::Bottom, seed).unwrap();
            if grid.start() == (1, 0) && grid.end() == (1, 2) {
                break grid;
            }
            seed += 1;
        };
        grid.add_neighbor((1, 0), Direction::Left).unwrap();
        grid.add_neighbor((0, 0), Direction::Bottom).unwrap();
        grid.add_neighbor((1, 0), Direction::Right).unwrap();
        grid.add_neighbor((2, 0), Direction::Bottom).unwrap();
        grid.add_neighbor((2, 1), Direction::Left).unwrap();
        grid.add_neighbor((1, 1), Direction::Bottom).unwrap();

        let mut dfs = DepthFirst::default();
        dfs.set_up(&mut grid).unwrap();
        while !dfs.reached_end(&mut grid) {
            assert!(dfs.advance(&mut grid).unwrap());
        }
        // Forward (down) is walled, Top..Left order tries right before left
        assert_eq!(dfs.route[1..], [(1, 0), (2, 0), (2, 1), (1, 1), (1, 2)]);
        assert!(!grid[(0, 0)].closed());

        let mut route = Vec::new();
        while let Some(coord) = dfs.next_route_cell(&grid) {
            route.push(coord);
        }
        assert_eq!(route, vec![(1, 2), (1, 1), (2, 1), (2, 0), (1, 0)]);
    }

    #[test]
    fn test_backs_out_of_spur() {
        let mut seed = 0;
        let mut grid = loop {
            let grid = Grid::new(2, 2, Direction::Left, Direction::Right, seed).unwrap();
            if grid.start() == (0, 0) && grid.end() == (1, 1) {
                break grid;
            }
            seed += 1;
        };
        // (0,0) -> (1,0) is a spur; the exit is reached through (0,1)
        grid.add_neighbor((0, 0), Direction::Right).unwrap();
        grid.add_neighbor((0, 0), Direction::Bottom).unwrap();
        grid.add_neighbor((0, 1), Direction::Right).unwrap();

        let mut dfs = DepthFirst::default();
        dfs.set_up(&mut grid).unwrap();
        while !dfs.reached_end(&mut grid) {
            assert!(dfs.advance(&mut grid).unwrap());
        }
        assert!(grid[(1, 0)].closed());
        assert_eq!(dfs.route[1..], [(0, 0), (0, 1), (1, 1)]);
    }
}
