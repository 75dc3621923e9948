use std::collections::BTreeMap;

use rand::Rng;

use super::{Search, visit};
use crate::{
    error::MazeError,
    maze::{Coord, Direction, Grid, take_step},
};

struct SearchNode {
    coord: Coord,
    parent: Option<usize>,
}

/// Greedy best-first search: always expands a frontier node closest to the exit,
/// breaking ties at random. Nodes live in an arena and point at their parent, so
/// the route is read back by walking parents from the exit.
#[derive(Default)]
pub(super) struct GreedyBestFirst {
    nodes: Vec<SearchNode>,
    /// Node indices bucketed by squared distance to the exit
    frontier: BTreeMap<u64, Vec<usize>>,
    /// Node picked by the last exit check, expanded by the next move
    selected: Option<(u64, usize)>,
    /// Walks towards the root once the exit is found
    cursor: Option<usize>,
}

fn priority(coord: Coord, end: Coord) -> u64 {
    let dx = (coord.0 - end.0).unsigned_abs() as u64;
    let dy = (coord.1 - end.1).unsigned_abs() as u64;
    dx * dx + dy * dy
}

impl GreedyBestFirst {
    fn push(&mut self, grid: &Grid, coord: Coord, parent: Option<usize>) {
        let idx = self.nodes.len();
        self.nodes.push(SearchNode { coord, parent });
        self.frontier
            .entry(priority(coord, grid.end()))
            .or_default()
            .push(idx);
    }

    /// Uniform pick among the nodes with the lowest priority.
    fn select(&mut self, grid: &mut Grid) -> Option<(u64, usize)> {
        let (&key, bucket) = self.frontier.first_key_value()?;
        let slot = grid.rng().random_range(0..bucket.len());
        Some((key, slot))
    }

    fn take(&mut self, (key, slot): (u64, usize)) -> usize {
        let bucket = self
            .frontier
            .get_mut(&key)
            .unwrap_or_else(|| panic!("Frontier bucket {} is missing", key));
        let idx = bucket.swap_remove(slot);
        if bucket.is_empty() {
            self.frontier.remove(&key);
        }
        idx
    }
}

impl Search for GreedyBestFirst {
    fn set_up(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        self.nodes.clear();
        self.frontier.clear();
        self.selected = None;
        self.cursor = None;
        self.push(grid, grid.start(), None);
        Ok(())
    }

    fn reached_end(&mut self, grid: &mut Grid) -> bool {
        if self.selected.is_none() {
            self.selected = self.select(grid);
        }
        let Some((key, slot)) = self.selected else {
            return false;
        };
        let idx = self.frontier[&key][slot];
        if self.nodes[idx].coord == grid.end() {
            self.cursor = Some(idx);
            return true;
        }
        false
    }

    fn advance(&mut self, grid: &mut Grid) -> Result<bool, MazeError> {
        let Some(selected) = self.selected.take().or_else(|| self.select(grid)) else {
            return Ok(false);
        };
        let idx = self.take(selected);
        let coord = self.nodes[idx].coord;
        // Reached earlier through another parent
        if grid.is_visited(coord)? {
            return Ok(true);
        }
        visit(grid, coord)?;

        let cell = grid.cell(coord)?;
        let next: Vec<Coord> = Direction::ALL
            .into_iter()
            .filter(|&direction| cell.neighbor(direction).is_open())
            .map(|direction| take_step(direction, coord.0, coord.1))
            .collect();
        for neighbor in next {
            if !grid.is_visited(neighbor)? {
                self.push(grid, neighbor, Some(idx));
            }
        }
        Ok(true)
    }

    fn next_route_cell(&mut self, _grid: &Grid) -> Option<Coord> {
        let idx = self.cursor?;
        let node = &self.nodes[idx];
        self.cursor = node.parent;
        Some(node.coord)
    }
}
