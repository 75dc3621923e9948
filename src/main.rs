use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use stepmaze::{app::App, generators::GeneratorKind, maze::Direction, solvers::SolverKind};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl From<Side> for Direction {
    fn from(side: Side) -> Self {
        match side {
            Side::Top => Direction::Top,
            Side::Right => Direction::Right,
            Side::Bottom => Direction::Bottom,
            Side::Left => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GeneratorArg {
    Backtrack,
    HuntAndKill,
    Kruskal,
    Eller,
}

impl From<GeneratorArg> for GeneratorKind {
    fn from(arg: GeneratorArg) -> Self {
        match arg {
            GeneratorArg::Backtrack => GeneratorKind::RecurBacktrack,
            GeneratorArg::HuntAndKill => GeneratorKind::HuntAndKill,
            GeneratorArg::Kruskal => GeneratorKind::Kruskal,
            GeneratorArg::Eller => GeneratorKind::Eller,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SolverArg {
    WallFollower,
    Dfs,
    Greedy,
}

impl From<SolverArg> for SolverKind {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::WallFollower => SolverKind::WallFollower,
            SolverArg::Dfs => SolverKind::DepthFirst,
            SolverArg::Greedy => SolverKind::GreedyBestFirst,
        }
    }
}

#[derive(Parser)]
#[command(name = "stepmaze")]
#[command(author, version, about = "Watch mazes being carved and solved one step at a time")]
/// Command-line arguments for the terminal visualizer
struct Cli {
    /// Maze width in cells
    #[arg(short = 'W', long, default_value_t = 20)]
    width: i32,

    /// Maze height in cells
    #[arg(short = 'H', long, default_value_t = 10)]
    height: i32,

    /// Side of the grid holding the entrance
    #[arg(long, value_enum, default_value_t = Side::Top)]
    start_side: Side,

    /// Side of the grid holding the exit
    #[arg(long, value_enum, default_value_t = Side::Bottom)]
    end_side: Side,

    /// Random seed for a reproducible maze
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = GeneratorArg::Backtrack)]
    generator: GeneratorArg,

    #[arg(short = 'S', long, value_enum, default_value_t = SolverArg::Greedy)]
    solver: SolverArg,

    /// Percent chance of knocking down extra walls, which adds loops
    #[arg(short = 'c', long, default_value_t = 0)]
    break_wall_chance: u8,

    /// Kruskal keeps carving walls inside a set at the break wall chance
    #[arg(long)]
    densify: bool,

    /// Milliseconds to wait between drawn steps
    #[arg(short, long, default_value_t = 10)]
    delay: u64,

    /// Run each machine to completion in one go instead of animating
    #[arg(long)]
    no_watch: bool,

    /// Solve the generated maze with every solver, one after another
    #[arg(short, long)]
    all_solvers: bool,

    /// Directory for the log file
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
}

impl From<&Cli> for App {
    fn from(cli: &Cli) -> Self {
        App {
            width: cli.width,
            height: cli.height,
            start_side: cli.start_side.into(),
            end_side: cli.end_side.into(),
            seed: cli.seed,
            generator: cli.generator.into(),
            solver: cli.solver.into(),
            break_wall_chance: cli.break_wall_chance,
            densify: cli.densify,
            all_solvers: cli.all_solvers,
            step_delay: Duration::from_millis(cli.delay),
            watch: !cli.no_watch,
        }
    }
}

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Logs go to a file, the terminal belongs to the renderer
    let file_appender = tracing_appender::rolling::never(&cli.log_dir, "stepmaze.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let app = App::from(&cli);
    let Some(outcome) = app.run()? else {
        println!("Cancelled");
        return Ok(());
    };
    println!("Seed {}", outcome.seed);
    for solution in &outcome.solutions {
        if solution.solved {
            println!(
                "  {}: route of {} cells after {} search moves",
                solution.solver, solution.route_len, solution.search_steps
            );
        } else {
            println!("  {}: no route found", solution.solver);
        }
    }
    Ok(())
}
