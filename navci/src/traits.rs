mod articulation;
mod base_command;
mod range_sensor;

pub use articulation::*;
pub use base_command::*;
pub use range_sensor::*;
