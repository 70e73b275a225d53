//! Fixed-cadence simulation loop.
//!
//! Owns the simulation (and with it the trackmiles engine) so all tracker
//! state is touched by this task only. Every tick advances traffic by one
//! fixed step, recomputes trackmiles and publishes the results.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::Config;
use crate::simulation::Simulation;
use crate::state::AppState;

/// When to stop ticking, besides shutdown.
#[derive(Debug, Clone, Copy)]
pub struct RunLimits {
    /// Stop after this much simulated time
    pub duration_s: Option<f64>,
    /// Simulated seconds per wall-clock second
    pub speedup: f64,
    /// Stop once every aircraft has left
    pub stop_when_empty: bool,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            duration_s: None,
            speedup: 1.0,
            stop_when_empty: true,
        }
    }
}

/// Run the simulation until a limit is reached or shutdown is signalled.
///
/// Returns the simulation in its final state.
pub async fn run_tick_loop(
    state: Arc<AppState>,
    mut sim: Simulation,
    config: Config,
    limits: RunLimits,
    mut shutdown: broadcast::Receiver<()>,
) -> Simulation {
    let period = config.tick_period();
    let dt = period.as_secs_f64();
    // Speedup shortens the wall-clock period, never the simulated step
    let wall_period = period.div_f64(limits.speedup.max(0.01));

    let mut ticker = interval(wall_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        "Tick loop started: {} ms step, {}x speed",
        config.tick_ms,
        limits.speedup
    );

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Tick loop shutting down at t={:.1}s", sim.time_s());
                break;
            }
            _ = ticker.tick() => {
                sim.tick(dt);
                state.publish(sim.reports());

                if limits.duration_s.is_some_and(|limit| sim.time_s() >= limit) {
                    tracing::info!("Simulated {:.1}s, stopping", sim.time_s());
                    break;
                }
                if limits.stop_when_empty && sim.is_empty() {
                    tracing::info!("All aircraft landed at t={:.1}s", sim.time_s());
                    break;
                }
            }
        }
    }

    sim
}
