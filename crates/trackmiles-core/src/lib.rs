//! Trackmiles - distance-to-go estimation for simulated arrival traffic.
//!
//! Computes, every simulation tick, how far each aircraft still has to fly
//! along its route, including the arcs flown around flyby waypoints.

pub mod aero;
pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod geo;
pub mod models;
pub mod tbar;
pub mod tracker;
pub mod turn;

pub use config::TrackmilesConfig;
pub use distance::{
    next_leg_distance, next_leg_distance_straight, remaining_route_distance,
    remaining_route_distance_straight,
};
pub use engine::{TrackmilesEngine, TrackmilesResult};
pub use error::ConfigError;
pub use models::{ActiveWaypoint, AircraftKinematics, Route, TrafficSource, Waypoint};
pub use tbar::{TbarPoint, TbarTable};
pub use tracker::{is_aligned, Snapshot, TrackInputs, TrackMode, TurnReference};
pub use turn::{calc_turn, Turn};
