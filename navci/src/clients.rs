mod dummy_articulation;
mod dummy_range_sensor;

pub use dummy_articulation::*;
pub use dummy_range_sensor::*;
