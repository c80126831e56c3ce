pub mod differential_drive;
mod frame_transform;
mod goal_projector;
mod utils;

pub use differential_drive::*;
pub use frame_transform::*;
pub use goal_projector::*;
pub use utils::*;
