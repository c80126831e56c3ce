mod scan_preprocessor;
mod temporal_pool;

pub use scan_preprocessor::*;
pub use temporal_pool::*;
