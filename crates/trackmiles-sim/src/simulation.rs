//! Traffic plus trackmiles engine, advanced one fixed tick at a time.

use chrono::Utc;
use trackmiles_core::{TrackmilesConfig, TrackmilesEngine, TrafficSource};

use crate::error::SimError;
use crate::scenario::{Action, Scenario, ScenarioCommand};
use crate::state::DtgReport;
use crate::traffic::{Aircraft, Traffic};

pub struct Simulation {
    traffic: Traffic,
    engine: TrackmilesEngine,
    /// Pending commands, latest first so the next due one pops off the end
    pending: Vec<ScenarioCommand>,
    time_s: f64,
}

impl Simulation {
    pub fn new(config: TrackmilesConfig) -> Self {
        Self {
            traffic: Traffic::new(config.bank_angle_rad),
            engine: TrackmilesEngine::new(config),
            pending: Vec::new(),
            time_s: 0.0,
        }
    }

    pub fn from_scenario(scenario: &Scenario, config: TrackmilesConfig) -> Result<Self, SimError> {
        config.validate()?;
        scenario.validate()?;

        let mut sim = Self::new(config);
        for spec in &scenario.aircraft {
            sim.spawn(spec.to_aircraft());
        }
        for command in &scenario.commands {
            sim.schedule(command.clone());
        }
        Ok(sim)
    }

    /// Add an aircraft to the traffic and allocate its tracker.
    pub fn spawn(&mut self, aircraft: Aircraft) -> usize {
        let index = self.traffic.create(aircraft);
        self.engine.on_aircraft_created(1);
        index
    }

    pub fn schedule(&mut self, command: ScenarioCommand) {
        self.pending.push(command);
        self.pending.sort_by(|a, b| b.at_s.total_cmp(&a.at_s));
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    pub fn traffic(&self) -> &Traffic {
        &self.traffic
    }

    pub fn engine(&self) -> &TrackmilesEngine {
        &self.engine
    }

    pub fn is_empty(&self) -> bool {
        self.traffic.is_empty()
    }

    /// Advance the simulation by `dt` seconds and recompute trackmiles.
    pub fn tick(&mut self, dt: f64) {
        self.time_s += dt;
        self.apply_due_commands();
        self.traffic.step(dt);

        let finished = self.traffic.finished();
        if !finished.is_empty() {
            for &index in &finished {
                if let Some(aircraft) = self.traffic.get(index) {
                    tracing::info!(
                        "{} reached the end of its route after {:.1} nm",
                        aircraft.callsign,
                        aircraft.distance_flown_m / trackmiles_core::aero::NM
                    );
                }
            }
            self.traffic.remove(&finished);
            self.engine.on_aircraft_removed(&finished);
        }

        self.engine.update(&self.traffic);
    }

    fn apply_due_commands(&mut self) {
        while self.pending.last().is_some_and(|c| c.at_s <= self.time_s) {
            let Some(command) = self.pending.pop() else {
                break;
            };
            let Some(index) = self.traffic.index_of(&command.callsign) else {
                tracing::warn!(
                    "Skipping {:?} for {}: aircraft no longer in traffic",
                    command.action,
                    command.callsign
                );
                continue;
            };

            let applied = match &command.action {
                Action::Heading { heading_deg } => self.traffic.set_heading(index, *heading_deg),
                Action::Lnav => self.traffic.engage_lnav(index),
                Action::Direct { waypoint } => self.traffic.direct_to(index, waypoint),
            };

            if applied {
                tracing::info!("{} at {:.1}s: {:?}", command.callsign, self.time_s, command.action);
            } else {
                tracing::warn!("{} rejected {:?}", command.callsign, command.action);
            }
        }
    }

    /// Results of the last tick, one per aircraft.
    pub fn reports(&self) -> Vec<DtgReport> {
        let now = Utc::now();
        self.traffic
            .iter()
            .enumerate()
            .filter_map(|(index, aircraft)| {
                let result = self.engine.result(index)?;
                Some(DtgReport {
                    callsign: aircraft.callsign.clone(),
                    dtg_nm: result.dtg_nm,
                    mode: result.mode,
                    tbar_nm: result.tbar_nm,
                    lnav_engaged: aircraft.lnav_engaged,
                    sim_time_s: self.time_s,
                    updated_at: now,
                })
            })
            .collect()
    }
}
