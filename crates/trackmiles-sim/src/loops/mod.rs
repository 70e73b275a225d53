//! Background loops driving the simulation and reporting its output.

pub mod report_loop;
pub mod tick_loop;
