mod config;
mod db;
mod errors;
mod models;
mod report;
mod runner;
mod state;

use crate::runner::ScenarioRunner;

fn main() {
    // Structured logging on stderr; stdout carries only the rendered table
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("quadratic_american starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cfg.input.validate() {
        tracing::error!("input error: {e}");
        std::process::exit(1);
    }

    tracing::info!(
        strike = cfg.input.strike,
        carry = cfg.input.carry_cost,
        scenarios = cfg.input.scenarios.len(),
        spots = cfg.input.spots.len(),
        parallel = cfg.parallel,
        "pricing batch"
    );

    let runner = ScenarioRunner::new(cfg.solver);
    let output = if cfg.parallel {
        runner.run_parallel(&cfg.input)
    } else {
        runner.run(&cfg.input)
    };

    for failure in &output.failures {
        tracing::warn!(
            scenario = failure.index,
            error = %failure.error,
            "scenario produced no rows"
        );
    }

    let rendered = match report::render(cfg.output_format, &output) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("report error: {e}");
            std::process::exit(1);
        }
    };

    match &cfg.output_path {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &rendered) {
                tracing::error!("write error for {}: {e}", path.display());
                std::process::exit(1);
            }
            tracing::info!("table written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    // Optional run history
    if let Some(dir) = &cfg.data_dir {
        let persisted = db::init_db(dir)
            .and_then(|mut conn| db::persist_run(&mut conn, &cfg.input, runner.settings(), &output));
        if let Err(e) = persisted {
            tracing::error!("database error: {e}");
            std::process::exit(1);
        }
    }

    if !output.is_complete() {
        tracing::warn!(
            failed = output.failures.len(),
            "batch finished with failed scenarios"
        );
    }
}
