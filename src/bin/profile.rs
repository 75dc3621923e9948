use std::time::Duration;

use stepmaze::{app::App, generators::GeneratorKind, solvers::SolverKind};

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(10);
    let size = args.next().and_then(|s| s.parse::<i32>().ok()).unwrap_or(100);

    for generator in GeneratorKind::ALL {
        for solver in SolverKind::ALL {
            let mut total = Duration::ZERO;
            let mut solved = 0;
            for seed in 0..num_iters as u64 {
                let app = App {
                    width: size,
                    height: size,
                    seed: Some(seed),
                    generator,
                    solver,
                    watch: false,
                    ..App::default()
                };
                let outcome = app.run_headless()?;
                total += outcome.elapsed;
                solved += usize::from(outcome.solved());
            }
            tracing::info!(
                "[profile] {} + {}: {} runs on {}x{}, {} solved, {:?} per run",
                generator,
                solver,
                num_iters,
                size,
                size,
                solved,
                total / num_iters.max(1) as u32
            );
        }
    }
    Ok(())
}
