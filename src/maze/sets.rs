use super::{
    Grid,
    direction::{Coord, Direction, take_step},
};
use crate::error::MazeError;

/// What [`SetRegistry::combine`] did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combined {
    /// Neither cell had a set, a new one was created for both.
    Created(usize),
    /// One cell joined the other's set.
    Absorbed(usize),
    /// Two sets were merged; `loser` is now empty.
    Merged { survivor: usize, loser: usize },
    /// Both cells were already in the same set.
    Unchanged(usize),
}

impl Combined {
    /// Id of the set both cells belong to afterwards.
    pub fn set(self) -> usize {
        match self {
            Combined::Created(id) | Combined::Absorbed(id) | Combined::Unchanged(id) => id,
            Combined::Merged { survivor, .. } => survivor,
        }
    }
}

/// Growable list of disjoint cell groups. The cell -> group back-reference lives on
/// the cell itself ([`Cell::set`](crate::maze::Cell::set)).
///
/// Groups emptied by a merge keep their slot, so ids never shift.
#[derive(Default, Debug, Clone)]
pub struct SetRegistry {
    sets: Vec<Vec<Coord>>,
}

impl SetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots, including emptied ones.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// # Panics
    /// If `id` was never handed out by this registry.
    pub fn members(&self, id: usize) -> &[Coord] {
        match self.sets.get(id) {
            Some(set) => set,
            None => panic!("Set {} is not registered", id),
        }
    }

    fn members_mut(&mut self, id: usize) -> &mut Vec<Coord> {
        match self.sets.get_mut(id) {
            Some(set) => set,
            None => panic!("Set {} is not registered", id),
        }
    }

    /// Number of groups that still hold cells.
    pub fn non_empty_count(&self) -> usize {
        self.sets.iter().filter(|set| !set.is_empty()).count()
    }

    /// Puts `coord` into a fresh singleton group and returns its id.
    pub fn create(&mut self, grid: &mut Grid, coord: Coord) -> Result<usize, MazeError> {
        let id = self.sets.len();
        grid.set_set(coord, Some(id))?;
        self.sets.push(vec![coord]);
        Ok(id)
    }

    /// Joins the groups of `a` and `b` and carves the passage from `a` towards `direction`.
    /// The passage is carved exactly once, even when both cells already share a group.
    ///
    /// # Panics
    /// If a cell refers to a set id this registry does not know.
    pub fn combine(
        &mut self,
        grid: &mut Grid,
        a: Coord,
        b: Coord,
        direction: Direction,
    ) -> Result<Combined, MazeError> {
        debug_assert_eq!(take_step(direction, a.0, a.1), b);
        let combined = match (grid.cell(a)?.set(), grid.cell(b)?.set()) {
            (None, None) => {
                let id = self.sets.len();
                self.sets.push(vec![a, b]);
                grid.set_set(a, Some(id))?;
                grid.set_set(b, Some(id))?;
                Combined::Created(id)
            }
            (None, Some(id)) => {
                self.members_mut(id).push(a);
                grid.set_set(a, Some(id))?;
                Combined::Absorbed(id)
            }
            (Some(id), None) => {
                self.members_mut(id).push(b);
                grid.set_set(b, Some(id))?;
                Combined::Absorbed(id)
            }
            (Some(id_a), Some(id_b)) if id_a == id_b => Combined::Unchanged(id_a),
            (Some(id_a), Some(id_b)) => {
                let survivor = id_a.min(id_b);
                let loser = id_a.max(id_b);
                let moved = std::mem::take(self.members_mut(loser));
                for &coord in &moved {
                    grid.set_set(coord, Some(survivor))?;
                }
                self.members_mut(survivor).extend(moved);
                Combined::Merged { survivor, loser }
            }
        };
        grid.add_neighbor(a, direction)?;
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(4, 1, Direction::Left, Direction::Right, 1).unwrap()
    }

    #[test]
    fn test_both_unset_creates_group() {
        let mut grid = grid();
        let mut sets = SetRegistry::new();
        let combined = sets.combine(&mut grid, (0, 0), (1, 0), Direction::Right).unwrap();
        assert_eq!(combined, Combined::Created(0));
        assert_eq!(grid[(0, 0)].set(), Some(0));
        assert_eq!(grid[(1, 0)].set(), Some(0));
        assert!(!grid.is_wall((0, 0), Direction::Right).unwrap());
    }

    #[test]
    fn test_unset_cell_is_absorbed() {
        let mut grid = grid();
        let mut sets = SetRegistry::new();
        let id = sets.create(&mut grid, (2, 0)).unwrap();
        let combined = sets.combine(&mut grid, (2, 0), (3, 0), Direction::Right).unwrap();
        assert_eq!(combined, Combined::Absorbed(id));
        assert_eq!(sets.members(id), &[(2, 0), (3, 0)]);
    }

    #[test]
    fn test_larger_id_merges_into_smaller() {
        let mut grid = grid();
        let mut sets = SetRegistry::new();
        sets.combine(&mut grid, (0, 0), (1, 0), Direction::Right).unwrap();
        sets.combine(&mut grid, (2, 0), (3, 0), Direction::Right).unwrap();
        let combined = sets.combine(&mut grid, (2, 0), (1, 0), Direction::Left).unwrap();
        assert_eq!(
            combined,
            Combined::Merged {
                survivor: 0,
                loser: 1
            }
        );
        assert!(sets.members(1).is_empty());
        assert_eq!(sets.members(0).len(), 4);
        assert!(grid.all_cells().all(|(_, cell)| cell.set() == Some(0)));
        assert_eq!(sets.len(), 2);
        assert_eq!(sets.non_empty_count(), 1);
    }

    #[test]
    fn test_same_set_still_carves() {
        let mut grid = Grid::new(2, 2, Direction::Top, Direction::Bottom, 1).unwrap();
        let mut sets = SetRegistry::new();
        sets.combine(&mut grid, (0, 0), (1, 0), Direction::Right).unwrap();
        sets.combine(&mut grid, (1, 0), (1, 1), Direction::Bottom).unwrap();
        sets.combine(&mut grid, (0, 0), (0, 1), Direction::Bottom).unwrap();
        let combined = sets.combine(&mut grid, (0, 1), (1, 1), Direction::Right).unwrap();
        assert_eq!(combined, Combined::Unchanged(0));
        assert_eq!(grid.passages().count(), 4);
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn test_unknown_set_fails_fast() {
        let mut grid = grid();
        let mut sets = SetRegistry::new();
        grid.set_set((0, 0), Some(7)).unwrap();
        let _ = sets.combine(&mut grid, (0, 0), (1, 0), Direction::Right);
    }
}
