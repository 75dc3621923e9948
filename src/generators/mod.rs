mod eller;
mod hunt_and_kill;
mod kruskal;
mod recur_backtrack;

use eller::Eller;
use hunt_and_kill::HuntAndKill;
use kruskal::Kruskal;
use recur_backtrack::RecurBacktrack;

use crate::{
    error::MazeError,
    maze::{Coord, Direction, Grid, get_neighbors, take_step},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    RecurBacktrack,
    HuntAndKill,
    Kruskal,
    Eller,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 4] = [
        GeneratorKind::RecurBacktrack,
        GeneratorKind::HuntAndKill,
        GeneratorKind::Kruskal,
        GeneratorKind::Eller,
    ];
}

impl std::fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorKind::RecurBacktrack => write!(f, "Recursive Backtracking"),
            GeneratorKind::HuntAndKill => write!(f, "Hunt and Kill"),
            GeneratorKind::Kruskal => write!(f, "Kruskal's Algorithm"),
            GeneratorKind::Eller => write!(f, "Eller's Algorithm"),
        }
    }
}

/// Construction parameters for a [`Generator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub kind: GeneratorKind,
    /// Percentage in `0..=100` for carving walls that connectivity does not need.
    pub break_wall_chance: u8,
    /// Stop after every unit of work instead of draining the machine on each `step`.
    pub watch: bool,
    /// Let Kruskal's algorithm still carve an edge whose cells already share a set,
    /// with `break_wall_chance` probability.
    pub densify: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kind: GeneratorKind::RecurBacktrack,
            break_wall_chance: 0,
            watch: true,
            densify: false,
        }
    }
}

/// One maze construction algorithm driven one unit of work at a time.
trait Carve {
    fn first_step(&mut self, grid: &mut Grid) -> Result<(), MazeError>;
    fn step(&mut self, grid: &mut Grid) -> Result<(), MazeError>;
    fn is_done(&self) -> bool;
}

enum Algorithm {
    RecurBacktrack(RecurBacktrack),
    HuntAndKill(HuntAndKill),
    Kruskal(Kruskal),
    Eller(Eller),
}

impl Algorithm {
    fn new(config: &GeneratorConfig) -> Self {
        let chance = config.break_wall_chance;
        match config.kind {
            GeneratorKind::RecurBacktrack => Algorithm::RecurBacktrack(RecurBacktrack::new(chance)),
            GeneratorKind::HuntAndKill => Algorithm::HuntAndKill(HuntAndKill::new(chance)),
            GeneratorKind::Kruskal => Algorithm::Kruskal(Kruskal::new(chance, config.densify)),
            GeneratorKind::Eller => Algorithm::Eller(Eller::new(chance)),
        }
    }

    fn carver(&mut self) -> &mut dyn Carve {
        match self {
            Algorithm::RecurBacktrack(algorithm) => algorithm,
            Algorithm::HuntAndKill(algorithm) => algorithm,
            Algorithm::Kruskal(algorithm) => algorithm,
            Algorithm::Eller(algorithm) => algorithm,
        }
    }

    fn is_done(&self) -> bool {
        match self {
            Algorithm::RecurBacktrack(algorithm) => algorithm.is_done(),
            Algorithm::HuntAndKill(algorithm) => algorithm.is_done(),
            Algorithm::Kruskal(algorithm) => algorithm.is_done(),
            Algorithm::Eller(algorithm) => algorithm.is_done(),
        }
    }
}

/// A resumable maze generator. It holds the grid for its whole lifetime; read the
/// grid between steps through [`Generator::grid`].
pub struct Generator<'g> {
    grid: &'g mut Grid,
    kind: GeneratorKind,
    algorithm: Algorithm,
    watch: bool,
    started: bool,
    steps: usize,
}

impl<'g> Generator<'g> {
    pub fn new(
        kind: GeneratorKind,
        grid: &'g mut Grid,
        break_wall_chance: u8,
        watch: bool,
    ) -> Result<Self, MazeError> {
        let config = GeneratorConfig {
            kind,
            break_wall_chance,
            watch,
            ..GeneratorConfig::default()
        };
        Self::from_config(grid, &config)
    }

    pub fn from_config(grid: &'g mut Grid, config: &GeneratorConfig) -> Result<Self, MazeError> {
        if config.break_wall_chance > 100 {
            return Err(MazeError::InvalidBreakWallChance(config.break_wall_chance));
        }
        Ok(Generator {
            grid,
            kind: config.kind,
            algorithm: Algorithm::new(config),
            watch: config.watch,
            started: false,
            steps: 0,
        })
    }

    pub fn kind(&self) -> GeneratorKind {
        self.kind
    }

    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    /// Units of work performed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Prepares the algorithm's internal state. Calling it again is a no-op.
    pub fn first_step(&mut self) -> Result<(), MazeError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        tracing::debug!("[generator] {} first step", self.kind);
        self.algorithm.carver().first_step(self.grid)
    }

    /// Performs one unit of work, or runs to completion when not watching.
    /// Runs [`Generator::first_step`] first if the caller has not.
    pub fn step(&mut self) -> Result<(), MazeError> {
        if !self.not_done() {
            return Err(MazeError::AlreadyComplete);
        }
        self.first_step()?;
        self.single_step()?;
        while !self.watch && self.not_done() {
            self.single_step()?;
        }
        Ok(())
    }

    fn single_step(&mut self) -> Result<(), MazeError> {
        if self.algorithm.is_done() {
            return Ok(());
        }
        self.algorithm.carver().step(self.grid)?;
        self.steps += 1;
        if self.algorithm.is_done() {
            tracing::info!("[generator] {} finished after {} steps", self.kind, self.steps);
        }
        Ok(())
    }

    pub fn not_done(&self) -> bool {
        !self.algorithm.is_done()
    }

    /// Drives the machine to completion regardless of `watch`.
    pub fn run(&mut self) -> Result<(), MazeError> {
        self.first_step()?;
        while self.not_done() {
            self.single_step()?;
        }
        Ok(())
    }
}

/// Carves from `from` towards `direction`, moves the highlight onto the new cell
/// and marks `from` visited. Returns the new cell.
fn carve_path(grid: &mut Grid, from: Coord, direction: Direction) -> Result<Coord, MazeError> {
    grid.clear_current();
    let to = take_step(direction, from.0, from.1);
    grid.set_current(to, false)?;
    grid.add_neighbor(from, direction)?;
    grid.set_visited(from, true)?;
    Ok(to)
}

/// Tries to extend a walk from `from` towards `direction`.
///
/// Carves into an unreached cell and returns it. An already reached cell gets a
/// passage only with `break_wall_chance` probability and never continues the walk.
fn create_walk(
    grid: &mut Grid,
    from: Coord,
    direction: Direction,
    break_wall_chance: u8,
) -> Result<Option<Coord>, MazeError> {
    let (x, y) = take_step(direction, from.0, from.1);
    if grid.out_of_bounds(x, y) {
        return Ok(None);
    }
    if grid.pos_is_unreached((x, y))? {
        return carve_path(grid, from, direction).map(Some);
    }
    if break_wall_chance > 0 && grid.is_wall(from, direction)? && grid.roll(break_wall_chance) {
        carve_path(grid, from, direction)?;
    }
    Ok(None)
}

/// Links the exit to the first in-bounds neighbor if nothing reached it.
fn connect_end(grid: &mut Grid) -> Result<(), MazeError> {
    let end = grid.end();
    if !grid.pos_is_unreached(end)? {
        return Ok(());
    }
    let first = get_neighbors(end, grid).next();
    if let Some((direction, _)) = first {
        tracing::debug!("[generator] forcing a passage from the exit {:?} to the {}", end, direction);
        carve_path(grid, end, direction)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::maze::GridEvent;

    pub(crate) const SIZES: [(i32, i32); 7] = [(1, 1), (1, 5), (5, 1), (2, 2), (5, 5), (8, 3), (7, 9)];
    pub(crate) const SIDES: [(Direction, Direction); 3] = [
        (Direction::Top, Direction::Bottom),
        (Direction::Left, Direction::Right),
        (Direction::Right, Direction::Top),
    ];

    pub(crate) fn generate(
        kind: GeneratorKind,
        width: i32,
        height: i32,
        sides: (Direction, Direction),
        seed: u64,
        break_wall_chance: u8,
    ) -> Grid {
        let mut grid = Grid::new(width, height, sides.0, sides.1, seed).unwrap();
        let mut generator = Generator::new(kind, &mut grid, break_wall_chance, false).unwrap();
        generator.first_step().unwrap();
        generator.step().unwrap();
        assert!(!generator.not_done());
        grid
    }

    fn reachable_from_start(grid: &Grid) -> usize {
        let mut seen = vec![grid.start()];
        let mut queue = VecDeque::from([grid.start()]);
        while let Some(coord) = queue.pop_front() {
            for direction in Direction::ALL {
                if grid[coord].neighbor(direction).is_open() {
                    let next = take_step(direction, coord.0, coord.1);
                    if !seen.contains(&next) {
                        seen.push(next);
                        queue.push_back(next);
                    }
                }
            }
        }
        seen.len()
    }

    /// Connected with exactly `n - 1` passages, hence acyclic.
    pub(crate) fn is_spanning_tree(grid: &Grid) -> bool {
        grid.passages().count() == grid.cell_count() - 1
            && reachable_from_start(grid) == grid.cell_count()
    }

    fn breakable_edges(width: i32, height: i32) -> usize {
        ((width - 1) * height + width * (height - 1)) as usize
    }

    #[test]
    fn test_zero_chance_builds_spanning_trees() {
        for kind in GeneratorKind::ALL {
            for (width, height) in SIZES {
                for sides in SIDES {
                    for seed in 0..4 {
                        let grid = generate(kind, width, height, sides, seed, 0);
                        assert!(
                            is_spanning_tree(&grid),
                            "{} on {}x{} seed {} is not a spanning tree",
                            kind,
                            width,
                            height,
                            seed
                        );
                        if grid.cell_count() > 1 {
                            assert!(!grid.pos_is_unreached(grid.end()).unwrap());
                        }
                        assert!(grid.current_cells().is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn test_nonzero_chance_keeps_end_connected() {
        for kind in GeneratorKind::ALL {
            for seed in 0..4 {
                let grid = generate(kind, 6, 6, SIDES[1], seed, 35);
                assert_eq!(reachable_from_start(&grid), grid.cell_count());
                assert!(!grid.pos_is_unreached(grid.end()).unwrap());
            }
        }
    }

    #[test]
    fn test_full_chance_backtracking_opens_every_wall() {
        for (width, height) in SIZES {
            let grid = generate(GeneratorKind::RecurBacktrack, width, height, SIDES[0], 9, 100);
            assert_eq!(grid.passages().count(), breakable_edges(width, height));
        }
    }

    #[test]
    fn test_full_chance_densified_kruskal_opens_every_wall() {
        let mut grid = Grid::new(6, 4, Direction::Top, Direction::Bottom, 2).unwrap();
        let config = GeneratorConfig {
            kind: GeneratorKind::Kruskal,
            break_wall_chance: 100,
            watch: false,
            densify: true,
        };
        Generator::from_config(&mut grid, &config).unwrap().run().unwrap();
        assert_eq!(grid.passages().count(), breakable_edges(6, 4));
    }

    #[test]
    fn test_full_chance_eller_opens_first_row_and_every_column() {
        for (width, height) in [(5, 5), (8, 3), (2, 6)] {
            let grid = generate(GeneratorKind::Eller, width, height, SIDES[0], 4, 100);
            for ((x, y), cell) in grid.all_cells() {
                if x + 1 < width {
                    assert_eq!(cell.neighbor(Direction::Right).is_open(), y == 0);
                }
                if y + 1 < height {
                    assert!(cell.neighbor(Direction::Bottom).is_open());
                }
            }
            let expected = (width - 1) + width * (height - 1);
            assert_eq!(grid.passages().count(), expected as usize);
        }
    }

    #[test]
    fn test_full_chance_hunt_and_kill_leaves_no_dead_ends() {
        for (width, height) in [(5, 5), (8, 3), (2, 6)] {
            for seed in 0..4 {
                let grid = generate(GeneratorKind::HuntAndKill, width, height, SIDES[1], seed, 100);
                assert!(grid.passages().count() > grid.cell_count() - 1);
                for (coord, cell) in grid.all_cells() {
                    if coord == grid.start() {
                        continue;
                    }
                    let degree = cell.neighbors().iter().filter(|link| link.is_open()).count();
                    assert!(degree >= 2, "{:?} is a dead end on {}x{}", coord, width, height);
                }
            }
        }
    }

    #[test]
    fn test_single_cell_needs_a_step_after_first_step() {
        for kind in GeneratorKind::ALL {
            let mut grid = Grid::new(1, 1, Direction::Top, Direction::Bottom, 3).unwrap();
            let mut generator = Generator::new(kind, &mut grid, 0, true).unwrap();
            generator.first_step().unwrap();
            assert!(generator.not_done(), "{} finished before stepping", kind);
            while generator.not_done() {
                generator.step().unwrap();
            }
            assert!(generator.steps() >= 1);
            assert_eq!(generator.step(), Err(MazeError::AlreadyComplete));
            assert_eq!(grid.passages().count(), 0);
        }
    }

    #[test]
    fn test_same_seed_carves_same_sequence() {
        fn carves(kind: GeneratorKind, seed: u64) -> Vec<GridEvent> {
            let (tx, rx) = std::sync::mpsc::channel();
            let mut grid = Grid::new(9, 7, Direction::Top, Direction::Left, seed).unwrap();
            grid.set_listener(Some(tx));
            Generator::new(kind, &mut grid, 20, true).unwrap().run().unwrap();
            rx.try_iter()
                .filter(|event| matches!(event, GridEvent::Carved { .. }))
                .collect()
        }
        for kind in GeneratorKind::ALL {
            assert_eq!(carves(kind, 11), carves(kind, 11));
            assert_ne!(carves(kind, 11), carves(kind, 12));
        }
    }

    #[test]
    fn test_two_by_two_kruskal() {
        let grid = generate(GeneratorKind::Kruskal, 2, 2, SIDES[0], 5, 0);
        assert_eq!(grid.passages().count(), 3);
        let set = grid[(0, 0)].set();
        assert!(set.is_some());
        assert!(grid.all_cells().all(|(_, cell)| cell.set() == set));
    }

    #[test]
    fn test_single_column_is_a_line() {
        for kind in GeneratorKind::ALL {
            let grid = generate(kind, 1, 5, SIDES[0], 21, 0);
            assert_eq!(grid.start(), (0, 0));
            assert_eq!(grid.end(), (0, 4));
            let passages: Vec<_> = grid.passages().collect();
            assert_eq!(
                passages,
                (0..4).map(|y| ((0, y), Direction::Bottom)).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_watch_steps_one_unit_at_a_time() {
        let mut grid = Grid::new(4, 4, Direction::Top, Direction::Bottom, 8).unwrap();
        let mut generator = Generator::new(GeneratorKind::Kruskal, &mut grid, 0, true).unwrap();
        generator.first_step().unwrap();
        generator.step().unwrap();
        assert_eq!(generator.steps(), 1);
        assert!(generator.not_done());
        while generator.not_done() {
            generator.step().unwrap();
        }
        // 24 shuffled edges, one per step
        assert_eq!(generator.steps(), 24);
        assert_eq!(generator.step(), Err(MazeError::AlreadyComplete));
    }

    #[test]
    fn test_invalid_break_wall_chance() {
        let mut grid = Grid::new(2, 2, Direction::Top, Direction::Bottom, 0).unwrap();
        assert!(matches!(
            Generator::new(GeneratorKind::Eller, &mut grid, 101, true),
            Err(MazeError::InvalidBreakWallChance(101))
        ));
    }
}
