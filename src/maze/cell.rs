use crate::maze::Direction;

/// State of one side of a cell.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// No passage on this side.
    #[default]
    Wall,
    /// Passage to the adjacent cell in this direction.
    Open,
    /// One-sided marker for the maze entrance or exit on the grid boundary.
    Opening,
}

impl Link {
    pub fn is_open(self) -> bool {
        self == Link::Open
    }
}

/// A single maze cell: adjacency plus the transient state algorithms use for display.
///
/// Cells are only mutated through [`Grid`](crate::maze::Grid), which keeps links
/// symmetric and reports changes to an attached event listener.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub(super) neighbors: [Link; 4],
    pub(super) visited: bool,
    pub(super) current: bool,
    /// Number of times the cell was highlighted again while already highlighted.
    pub(super) current_count: u32,
    pub(super) closed: bool,
    pub(super) set: Option<usize>,
}

impl Cell {
    pub fn neighbors(&self) -> &[Link; 4] {
        &self.neighbors
    }

    pub fn neighbor(&self, direction: Direction) -> Link {
        self.neighbors[direction.index()]
    }

    pub fn visited(&self) -> bool {
        self.visited
    }

    pub fn current(&self) -> bool {
        self.current
    }

    pub fn current_count(&self) -> u32 {
        self.current_count
    }

    /// Dead end found by the depth-first solver.
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Set registry index, `None` while the cell belongs to no set.
    pub fn set(&self) -> Option<usize> {
        self.set
    }

    /// True when no passage leads into the cell. Opening markers do not count.
    pub fn is_unreached(&self) -> bool {
        !self.neighbors.iter().any(|link| link.is_open())
    }

    pub(super) fn mark_current(&mut self, value: bool) {
        if value && self.current {
            self.current_count += 1;
        } else {
            self.current_count = 0;
        }
        self.current = value;
    }

    pub(super) fn clear_state(&mut self) {
        self.visited = false;
        self.current = false;
        self.current_count = 0;
        self.closed = false;
        self.set = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_does_not_reach() {
        let mut cell = Cell::default();
        assert!(cell.is_unreached());
        cell.neighbors[Direction::Top.index()] = Link::Opening;
        assert!(cell.is_unreached());
        cell.neighbors[Direction::Left.index()] = Link::Open;
        assert!(!cell.is_unreached());
    }

    #[test]
    fn test_repeated_highlight_counts() {
        let mut cell = Cell::default();
        cell.mark_current(true);
        cell.mark_current(true);
        cell.mark_current(true);
        assert_eq!(cell.current_count(), 2);
        cell.mark_current(false);
        assert!(!cell.current());
        assert_eq!(cell.current_count(), 0);
    }

    #[test]
    fn test_clear_state_keeps_links() {
        let mut cell = Cell::default();
        cell.neighbors[Direction::Right.index()] = Link::Open;
        cell.visited = true;
        cell.closed = true;
        cell.set = Some(3);
        cell.clear_state();
        assert_eq!(cell.set(), None);
        assert!(!cell.visited() && !cell.closed());
        assert_eq!(cell.neighbor(Direction::Right), Link::Open);
    }
}
