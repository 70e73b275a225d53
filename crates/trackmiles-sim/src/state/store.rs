//! In-memory store of published DTG values using DashMap.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use trackmiles_core::TrackMode;

/// Published distance-to-go of one aircraft after a completed tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DtgReport {
    pub callsign: String,
    pub dtg_nm: f64,
    pub mode: TrackMode,
    #[serde(default)]
    pub tbar_nm: Option<f64>,
    pub lnav_engaged: bool,
    pub sim_time_s: f64,
    pub updated_at: DateTime<Utc>,
}

/// Application state - written by the tick loop only, read by anyone.
pub struct AppState {
    reports: DashMap<String, DtgReport>,
    ticks: AtomicU64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            reports: DashMap::new(),
            ticks: AtomicU64::new(0),
        }
    }

    /// Replace the published set with the results of the tick just completed.
    ///
    /// Entries are swapped one at a time, so a concurrent reader may briefly
    /// see reports from two consecutive ticks side by side. Each report carries
    /// its own `sim_time_s`.
    pub fn publish(&self, reports: Vec<DtgReport>) {
        let current: std::collections::HashSet<String> =
            reports.iter().map(|r| r.callsign.clone()).collect();
        self.reports.retain(|callsign, _| current.contains(callsign));
        for report in reports {
            self.reports.insert(report.callsign.clone(), report);
        }
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get_report(&self, callsign: &str) -> Option<DtgReport> {
        self.reports.get(callsign).map(|r| r.value().clone())
    }

    /// All published reports, closest to touchdown first.
    pub fn get_all_reports(&self) -> Vec<DtgReport> {
        let mut reports: Vec<DtgReport> = self.reports.iter().map(|r| r.value().clone()).collect();
        reports.sort_by(|a, b| a.dtg_nm.total_cmp(&b.dtg_nm));
        reports
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}
