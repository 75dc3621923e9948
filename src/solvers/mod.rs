mod dfs;
mod greedy;
mod wall_follower;

use dfs::DepthFirst;
use greedy::GreedyBestFirst;
use wall_follower::WallFollower;

use crate::{
    error::MazeError,
    maze::{Coord, Grid, take_step},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    WallFollower,
    DepthFirst,
    GreedyBestFirst,
}

impl SolverKind {
    pub const ALL: [SolverKind; 3] = [
        SolverKind::WallFollower,
        SolverKind::DepthFirst,
        SolverKind::GreedyBestFirst,
    ];
}

impl std::fmt::Display for SolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverKind::WallFollower => write!(f, "Wall Follower (keep left)"),
            SolverKind::DepthFirst => write!(f, "Depth-First Search (DFS)"),
            SolverKind::GreedyBestFirst => write!(f, "Greedy Best-First Search"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    pub kind: SolverKind,
    /// Stop after every unit of work instead of draining the machine on each `step`.
    pub watch: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: SolverKind::GreedyBestFirst,
            watch: true,
        }
    }
}

/// A search strategy driven one move at a time.
trait Search {
    /// Prepares the search after every cell's transient state was reset.
    fn set_up(&mut self, grid: &mut Grid) -> Result<(), MazeError>;
    /// Checked before every move; true once the frontier stands on the exit.
    fn reached_end(&mut self, grid: &mut Grid) -> bool;
    /// One search move. `Ok(false)` when there is nowhere left to go.
    fn advance(&mut self, grid: &mut Grid) -> Result<bool, MazeError>;
    /// Next cell of the found route, walking back from the exit.
    fn next_route_cell(&mut self, grid: &Grid) -> Option<Coord>;
}

enum Strategy {
    WallFollower(WallFollower),
    DepthFirst(DepthFirst),
    GreedyBestFirst(GreedyBestFirst),
}

impl Strategy {
    fn new(kind: SolverKind) -> Self {
        match kind {
            SolverKind::WallFollower => Strategy::WallFollower(WallFollower::default()),
            SolverKind::DepthFirst => Strategy::DepthFirst(DepthFirst::default()),
            SolverKind::GreedyBestFirst => Strategy::GreedyBestFirst(GreedyBestFirst::default()),
        }
    }

    fn search(&mut self) -> &mut dyn Search {
        match self {
            Strategy::WallFollower(strategy) => strategy,
            Strategy::DepthFirst(strategy) => strategy,
            Strategy::GreedyBestFirst(strategy) => strategy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// `set_up` not called yet
    Pending,
    Search,
    /// Exit found, highlighting the route one cell per step
    Emit,
    Done,
}

/// A resumable maze solver over a finished maze.
pub struct Solver<'g> {
    grid: &'g mut Grid,
    kind: SolverKind,
    strategy: Strategy,
    watch: bool,
    phase: Phase,
    /// Cells emitted so far, exit first
    route: Vec<Coord>,
    solved: bool,
    search_steps: usize,
}

impl<'g> Solver<'g> {
    pub fn new(kind: SolverKind, grid: &'g mut Grid, watch: bool) -> Self {
        Self::from_config(grid, &SolverConfig { kind, watch })
    }

    pub fn from_config(grid: &'g mut Grid, config: &SolverConfig) -> Self {
        Solver {
            grid,
            kind: config.kind,
            strategy: Strategy::new(config.kind),
            watch: config.watch,
            phase: Phase::Pending,
            route: Vec::new(),
            solved: false,
            search_steps: 0,
        }
    }

    pub fn kind(&self) -> SolverKind {
        self.kind
    }

    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    /// Route cells emitted so far, starting at the exit.
    pub fn route(&self) -> &[Coord] {
        &self.route
    }

    /// Whether the search reached the exit.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Search moves made before the exit was found (or the search gave up).
    pub fn search_steps(&self) -> usize {
        self.search_steps
    }

    /// Clears all transient cell state and seeds the search at the entrance.
    pub fn set_up(&mut self) -> Result<(), MazeError> {
        self.grid.clear_state();
        self.route.clear();
        self.solved = false;
        self.search_steps = 0;
        self.strategy.search().set_up(self.grid)?;
        self.phase = Phase::Search;
        tracing::debug!("[solver] {} set up at {:?}", self.kind, self.grid.start());
        Ok(())
    }

    /// Performs one unit of work, or runs to completion when not watching.
    /// Runs [`Solver::set_up`] first if the caller has not.
    pub fn step(&mut self) -> Result<(), MazeError> {
        if !self.not_done() {
            return Err(MazeError::AlreadyComplete);
        }
        if self.phase == Phase::Pending {
            self.set_up()?;
        }
        self.single_step()?;
        while !self.watch && self.not_done() {
            self.single_step()?;
        }
        Ok(())
    }

    pub fn not_done(&self) -> bool {
        self.phase != Phase::Done
    }

    /// Drives the machine to completion regardless of `watch`.
    pub fn run(&mut self) -> Result<(), MazeError> {
        if self.phase == Phase::Pending {
            self.set_up()?;
        }
        while self.not_done() {
            self.single_step()?;
        }
        Ok(())
    }

    fn check_finished(&mut self) {
        if self.phase == Phase::Search && self.strategy.search().reached_end(self.grid) {
            tracing::info!(
                "[solver] {} reached the exit after {} moves",
                self.kind,
                self.search_steps
            );
            self.grid.clear_current();
            self.solved = true;
            self.phase = Phase::Emit;
        }
    }

    fn single_step(&mut self) -> Result<(), MazeError> {
        self.check_finished();
        match self.phase {
            Phase::Search => {
                self.search_steps += 1;
                if !self.strategy.search().advance(self.grid)? {
                    tracing::warn!(
                        "[solver] {} ran out of moves, the exit is unreachable",
                        self.kind
                    );
                    self.grid.clear_current();
                    self.phase = Phase::Done;
                }
            }
            Phase::Emit => match self.strategy.search().next_route_cell(self.grid) {
                Some(coord) => {
                    self.grid.set_current(coord, true)?;
                    self.route.push(coord);
                }
                None => {
                    tracing::debug!("[solver] route of {} cells emitted", self.route.len());
                    self.phase = Phase::Done;
                }
            },
            Phase::Pending | Phase::Done => {}
        }
        Ok(())
    }
}

/// The search starts from the cell just outside the entrance, so the first move
/// heads into the maze.
fn seed_route(grid: &Grid) -> Vec<Coord> {
    let (x, y) = grid.start();
    vec![take_step(grid.start_side(), x, y), (x, y)]
}

/// Marks a cell as stepped on and moves the highlight to it.
fn visit(grid: &mut Grid, coord: Coord) -> Result<(), MazeError> {
    grid.set_visited(coord, true)?;
    grid.set_current(coord, false)
}

/// Pops the route tail, skipping the out-of-grid seed cell.
fn pop_route(route: &mut Vec<Coord>, grid: &Grid) -> Option<Coord> {
    while let Some((x, y)) = route.pop() {
        if !grid.out_of_bounds(x, y) {
            return Some((x, y));
        }
    }
    None
}
