//! Trackmiles simulator - flies arrival traffic and logs distance-to-go.
//!
//! Usage:
//!   cargo run -p trackmiles-sim -- --scenario scenarios/schiphol.json --speedup 20
//!   cargo run -p trackmiles-sim -- --random 8 --seed 42

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackmiles_sim::config::Config;
use trackmiles_sim::loops::report_loop::run_report_loop;
use trackmiles_sim::loops::tick_loop::{run_tick_loop, RunLimits};
use trackmiles_sim::scenario::{random_scenario, schiphol_demo, Scenario};
use trackmiles_sim::state::AppState;
use trackmiles_sim::Simulation;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fly arrival traffic and report trackmiles")]
struct Args {
    /// Scenario JSON file (defaults to the built-in Schiphol demo)
    #[arg(long, conflicts_with = "random")]
    scenario: Option<PathBuf>,

    /// Generate this many random arrivals instead of a scenario
    #[arg(long)]
    random: Option<usize>,

    /// Seed for random traffic
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many simulated seconds
    #[arg(long)]
    duration_secs: Option<f64>,

    /// Simulated seconds per wall-clock second
    #[arg(long, default_value_t = 1.0)]
    speedup: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("trackmiles_sim=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    let engine_config = config.load_engine_config()?;

    let scenario = match (&args.scenario, args.random) {
        (Some(path), _) => Scenario::load(path)?,
        (None, Some(count)) => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            random_scenario(count, &mut rng)
        }
        (None, None) => schiphol_demo(),
    };

    tracing::info!(
        "Starting trackmiles simulation with {} aircraft",
        scenario.aircraft.len()
    );

    let sim = Simulation::from_scenario(&scenario, engine_config)?;
    let state = Arc::new(AppState::new());
    let (shutdown_tx, _) = broadcast::channel(1);

    let reporter = tokio::spawn(run_report_loop(
        state.clone(),
        config.report_secs,
        shutdown_tx.subscribe(),
    ));

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(());
        }
    });

    let limits = RunLimits {
        duration_s: args.duration_secs,
        speedup: args.speedup,
        stop_when_empty: true,
    };
    let sim = run_tick_loop(state.clone(), sim, config, limits, shutdown_tx.subscribe()).await;

    let _ = shutdown_tx.send(());
    reporter.await?;

    for report in state.get_all_reports() {
        tracing::info!("Final {}: {:.1} nm ({})", report.callsign, report.dtg_nm, report.mode);
    }
    tracing::info!("Simulation ended at t={:.1}s", sim.time_s());

    Ok(())
}
