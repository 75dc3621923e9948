pub mod cell;
pub mod direction;
pub mod grid;
pub mod sets;

pub use cell::{Cell, Link};
pub use direction::{Coord, Direction, shuffled_directions, take_step};
pub use grid::{CellsBetween, Grid, GridEvent};
pub use sets::{Combined, SetRegistry};

/// Get the in-bounds orthogonal neighbors of a cell, in [`Direction::ALL`] order,
/// together with the direction leading to each.
pub fn get_neighbors(coord: Coord, grid: &Grid) -> impl Iterator<Item = (Direction, Coord)> + '_ {
    Direction::ALL
        .into_iter()
        .map(move |direction| (direction, take_step(direction, coord.0, coord.1)))
        .filter(move |&(_, (x, y))| !grid.out_of_bounds(x, y))
}
