mod config;
mod error;
mod observation;
mod pedestrian;
mod projection;
mod reward;
mod task;
mod termination;
pub mod utils;

pub use config::*;
pub use error::*;
pub use observation::*;
pub use pedestrian::*;
pub use projection::*;
pub use reward::*;
pub use task::*;
pub use termination::*;
