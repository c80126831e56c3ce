use auto_impl::auto_impl;
use indexmap::IndexMap;
use nalgebra::Vector3;

use crate::error::Error;

/// One reading of a rotating range sensor, in the sensor frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawScan {
    /// Hit points (in meters), one per returned beam.
    pub points: Vec<Vector3<f64>>,
    /// Distance (in meters) of each hit point, parallel to `points`.
    pub ranges: Vec<f64>,
}

impl RawScan {
    pub fn new(points: Vec<Vector3<f64>>, ranges: Vec<f64>) -> Self {
        Self { points, ranges }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Source of range sensor readings for every environment instance.
#[auto_impl(Box, Arc)]
pub trait RangeSensor: Send + Sync {
    /// Returns the latest reading of each sensor keyed by its name.
    ///
    /// The iteration order of the map is the instance order.
    fn current_readings(&self) -> Result<IndexMap<String, RawScan>, Error>;
}
