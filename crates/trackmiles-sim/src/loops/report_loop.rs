//! Periodic DTG report in the log.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::interval;

use crate::state::AppState;

/// Log every published DTG each `period_secs` until shutdown.
pub async fn run_report_loop(
    state: Arc<AppState>,
    period_secs: u64,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(Duration::from_secs(period_secs.max(1)));

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Report loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let reports = state.get_all_reports();
                if reports.is_empty() {
                    continue;
                }

                tracing::info!("Trackmiles after {} tick(s):", state.tick_count());
                for report in reports {
                    let tbar = report
                        .tbar_nm
                        .map(|d| format!(", T-bar {:.1} nm", d))
                        .unwrap_or_default();
                    tracing::info!(
                        "  {:<8} {:>6.1} nm [{}{}]{}",
                        report.callsign,
                        report.dtg_nm,
                        report.mode,
                        if report.lnav_engaged { "" } else { ", heading" },
                        tbar
                    );
                }
            }
        }
    }
}
