mod clients;
mod error;
mod traits;
pub mod utils;

pub use clients::*;
pub use error::*;
pub use traits::*;

// re-export
pub use indexmap::IndexMap;
pub use nalgebra::{Quaternion, Vector2, Vector3};
