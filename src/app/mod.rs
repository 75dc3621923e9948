mod renderer;

pub use renderer::{Renderer, Tile, picture_size, tile_at};

use std::{
    io::{Stdout, Write},
    sync::mpsc::{self, Receiver},
    time::{Duration, Instant},
};

use crossterm::{
    cursor,
    event::{self, KeyCode},
    queue,
    style::Color,
    terminal::{self, ClearType},
};
use rand::Rng;

use crate::{
    error::MazeError,
    generators::{Generator, GeneratorConfig, GeneratorKind},
    maze::{Direction, Grid, GridEvent},
    solvers::{Solver, SolverConfig, SolverKind},
};

#[derive(Debug)]
enum UserAction {
    /// Keep going
    Continue,
    /// Stop the run and leave
    Cancel,
}

/// One solver's result on the generated maze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub solver: SolverKind,
    pub search_steps: usize,
    /// Route from the exit back to the entrance, empty if the exit was not reached
    pub route_len: usize,
    pub solved: bool,
}

impl Solution {
    fn from_solver(solver: &Solver<'_>) -> Self {
        Self {
            solver: solver.kind(),
            search_steps: solver.search_steps(),
            route_len: solver.route().len(),
            solved: solver.is_solved(),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub seed: u64,
    pub generator_steps: usize,
    /// One entry per solver run on the maze, in run order
    pub solutions: Vec<Solution>,
    /// Grid events emitted during the run
    pub events: usize,
    pub elapsed: Duration,
}

impl Outcome {
    /// Whether every solver reached the exit.
    pub fn solved(&self) -> bool {
        !self.solutions.is_empty() && self.solutions.iter().all(|solution| solution.solved)
    }
}

/// A maze machine the controller can drive one step at a time.
trait Stepper {
    fn step(&mut self) -> Result<(), MazeError>;
    fn not_done(&self) -> bool;
    fn grid(&self) -> &Grid;
}

impl Stepper for Generator<'_> {
    fn step(&mut self) -> Result<(), MazeError> {
        Generator::step(self)
    }

    fn not_done(&self) -> bool {
        Generator::not_done(self)
    }

    fn grid(&self) -> &Grid {
        Generator::grid(self)
    }
}

impl Stepper for Solver<'_> {
    fn step(&mut self) -> Result<(), MazeError> {
        Solver::step(self)
    }

    fn not_done(&self) -> bool {
        Solver::not_done(self)
    }

    fn grid(&self) -> &Grid {
        Solver::grid(self)
    }
}

/// Controller configuration: which maze to build and how to animate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub width: i32,
    pub height: i32,
    pub start_side: Direction,
    pub end_side: Direction,
    /// Fixed seed for a reproducible run, drawn from entropy when `None`
    pub seed: Option<u64>,
    pub generator: GeneratorKind,
    pub solver: SolverKind,
    pub break_wall_chance: u8,
    /// Kruskal only: keep carving same-set edges at `break_wall_chance`
    pub densify: bool,
    /// Solve the one generated maze with every solver in turn instead of only `solver`
    pub all_solvers: bool,
    /// Pause between visualized steps
    pub step_delay: Duration,
    pub watch: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            width: 20,
            height: 10,
            start_side: Direction::Top,
            end_side: Direction::Bottom,
            seed: None,
            generator: GeneratorKind::RecurBacktrack,
            solver: SolverKind::GreedyBestFirst,
            break_wall_chance: 0,
            densify: false,
            all_solvers: false,
            step_delay: Duration::from_millis(10),
            watch: true,
        }
    }
}

impl App {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            kind: self.generator,
            break_wall_chance: self.break_wall_chance,
            watch: self.watch,
            densify: self.densify,
        }
    }

    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            kind: self.solver,
            watch: self.watch,
        }
    }

    /// Solver configurations to run on the generated maze, in order.
    pub fn solver_configs(&self) -> Vec<SolverConfig> {
        if !self.all_solvers {
            return vec![self.solver_config()];
        }
        SolverKind::ALL
            .into_iter()
            .map(|kind| SolverConfig {
                kind,
                watch: self.watch,
            })
            .collect()
    }

    /// Builds the grid for this run, returning it with the seed it was built from.
    pub fn build_grid(&self) -> Result<(Grid, u64), MazeError> {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let grid = Grid::new(self.width, self.height, self.start_side, self.end_side, seed)?;
        tracing::info!(
            "[app] {}x{} grid, seed {}, {} then {}",
            self.width,
            self.height,
            seed,
            self.generator,
            self.solver
        );
        Ok((grid, seed))
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Generate and solve one maze in the terminal, drawing every step.
    /// Returns `None` if the user cancelled with Esc.
    pub fn run(&self) -> std::io::Result<Option<Outcome>> {
        let mut stdout = std::io::stdout();
        App::setup_terminal(&mut stdout)?;
        let result = self.animate();
        App::restore_terminal(&mut stdout)?;
        let outcome = result?;
        match &outcome {
            Some(outcome) => tracing::info!("[app] finished: {:?}", outcome),
            None => tracing::info!("[app] cancelled by user"),
        }
        Ok(outcome)
    }

    fn animate(&self) -> std::io::Result<Option<Outcome>> {
        let started = Instant::now();
        let (mut grid, seed) = self.build_grid()?;
        let (tx, rx) = mpsc::channel();
        grid.set_listener(Some(tx));

        let mut renderer = Renderer::new(&grid);
        if !renderer.fits_terminal()? {
            let (width, height) = picture_size(&grid);
            renderer.status(
                &format!(
                    "Terminal is too small for a {}x{} picture. Press Esc to exit...",
                    width * Tile::TILE_WIDTH,
                    height
                ),
                Color::Yellow,
            )?;
            App::wait_for_esc()?;
            return Ok(None);
        }
        renderer.draw_all(&grid)?;
        let mut events = 0;

        let generator_steps = {
            let mut generator = Generator::from_config(&mut grid, &self.generator_config())?;
            generator.first_step()?;
            events += renderer.drain_events(generator.grid(), &rx)?;
            if !self.drive(&mut generator, &mut renderer, &rx, &mut events)? {
                return Ok(None);
            }
            generator.steps()
        };

        let configs = self.solver_configs();
        let mut solutions = Vec::with_capacity(configs.len());
        for (idx, config) in configs.iter().enumerate() {
            let mut solver = Solver::from_config(&mut grid, config);
            // Resets the previous solver's marks, the passages stay
            solver.set_up()?;
            events += renderer.drain_events(solver.grid(), &rx)?;
            if !self.drive(&mut solver, &mut renderer, &rx, &mut events)? {
                return Ok(None);
            }
            let solution = Solution::from_solver(&solver);
            let summary = if solution.solved {
                format!("{}: path found, {} cells.", solution.solver, solution.route_len)
            } else {
                format!("{}: no path found.", solution.solver)
            };
            let color = if solution.solved { Color::Green } else { Color::Red };
            solutions.push(solution);
            if idx + 1 < configs.len() {
                renderer.status(&format!("{} Press Enter for the next solver...", summary), color)?;
                if let UserAction::Cancel = App::wait_for_enter()? {
                    return Ok(None);
                }
            } else {
                renderer.status(&format!("{} Press Esc to exit...", summary), color)?;
            }
        }

        let outcome = Outcome {
            seed,
            generator_steps,
            solutions,
            events,
            elapsed: started.elapsed(),
        };
        App::wait_for_esc()?;
        Ok(Some(outcome))
    }

    /// Steps a machine to completion, redrawing after every step.
    /// Returns false if the user cancelled.
    fn drive(
        &self,
        machine: &mut dyn Stepper,
        renderer: &mut Renderer,
        events_rx: &Receiver<GridEvent>,
        events: &mut usize,
    ) -> std::io::Result<bool> {
        while machine.not_done() {
            machine.step()?;
            *events += renderer.drain_events(machine.grid(), events_rx)?;
            let delay = if self.watch {
                self.step_delay
            } else {
                Duration::ZERO
            };
            if let UserAction::Cancel = App::poll_user(delay)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Wait up to `timeout` for a key press. Enter pauses until pressed again.
    fn poll_user(timeout: Duration) -> std::io::Result<UserAction> {
        if !event::poll(timeout)? {
            return Ok(UserAction::Continue);
        }
        match event::read()? {
            event::Event::Key(key) if key.kind == event::KeyEventKind::Press => match key.code {
                KeyCode::Esc => Ok(UserAction::Cancel),
                KeyCode::Enter => {
                    tracing::debug!("[app] paused");
                    loop {
                        if let event::Event::Key(key) = event::read()? {
                            if key.kind != event::KeyEventKind::Press {
                                continue;
                            }
                            match key.code {
                                KeyCode::Esc => return Ok(UserAction::Cancel),
                                KeyCode::Enter => return Ok(UserAction::Continue),
                                _ => {}
                            }
                        }
                    }
                }
                _ => Ok(UserAction::Continue),
            },
            _ => Ok(UserAction::Continue),
        }
    }

    /// Block until Enter (continue) or Esc (cancel) is pressed.
    fn wait_for_enter() -> std::io::Result<UserAction> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if kind != event::KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Enter => return Ok(UserAction::Continue),
                    KeyCode::Esc => return Ok(UserAction::Cancel),
                    _ => {}
                }
            }
        }
    }

    /// Wait for the user to press the Esc key
    /// This function blocks until Esc is pressed
    fn wait_for_esc() -> std::io::Result<()> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if code == KeyCode::Esc && kind == event::KeyEventKind::Press {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Profiling mode: generate and solve without a terminal, counting grid events
    /// instead of drawing them.
    pub fn run_headless(&self) -> Result<Outcome, MazeError> {
        let started = Instant::now();
        let (mut grid, seed) = self.build_grid()?;
        let (tx, rx) = mpsc::channel();
        grid.set_listener(Some(tx));

        let generator_steps = {
            let mut generator = Generator::from_config(&mut grid, &self.generator_config())?;
            generator.run()?;
            generator.steps()
        };
        let mut solutions = Vec::new();
        for config in self.solver_configs() {
            let mut solver = Solver::from_config(&mut grid, &config);
            solver.run()?;
            solutions.push(Solution::from_solver(&solver));
        }

        let outcome = Outcome {
            seed,
            generator_steps,
            solutions,
            events: rx.try_iter().count(),
            elapsed: started.elapsed(),
        };
        tracing::debug!("[app] headless run: {:?}", outcome);
        Ok(outcome)
    }
}
