use std::sync::Mutex;

use indexmap::IndexMap;
use nalgebra::Vector3;
use rand::prelude::*;

use crate::{
    error::Error,
    traits::{RangeSensor, RawScan},
};

/// Height of the off-plane returns produced by [`DummyRangeSensor::planar_ring`].
const OFF_PLANE_HEIGHT: f64 = 0.5;

#[derive(Debug, Default)]
pub struct DummyRangeSensor {
    pub readings: Mutex<IndexMap<String, RawScan>>,
}

impl DummyRangeSensor {
    pub fn new(readings: IndexMap<String, RawScan>) -> Self {
        Self {
            readings: Mutex::new(readings),
        }
    }

    /// Sensor whose every instance sees a circular wall of radius `radius`.
    ///
    /// Each reading has `in_plane` returns at `z = 0` followed by
    /// `off_plane` returns above the scan plane. Ranges get uniform noise
    /// in `[-noise, noise]`.
    pub fn planar_ring(
        num_instances: usize,
        in_plane: usize,
        off_plane: usize,
        radius: f64,
        noise: f64,
    ) -> Self {
        let mut rng = thread_rng();
        let readings = (0..num_instances)
            .map(|i| {
                let total = in_plane + off_plane;
                let mut points = Vec::with_capacity(total);
                let mut ranges = Vec::with_capacity(total);
                for k in 0..total {
                    let z = if k < in_plane { 0.0 } else { OFF_PLANE_HEIGHT };
                    let angle = std::f64::consts::TAU * k as f64 / total.max(1) as f64;
                    let range = if noise > 0.0 {
                        radius + rng.gen_range(-noise..=noise)
                    } else {
                        radius
                    };
                    points.push(Vector3::new(range * angle.cos(), range * angle.sin(), z));
                    ranges.push(range);
                }
                (format!("env_{i}/lidar"), RawScan::new(points, ranges))
            })
            .collect();
        Self::new(readings)
    }

    pub fn set_readings(&self, readings: IndexMap<String, RawScan>) {
        *self.readings.lock().unwrap() = readings;
    }
}

impl RangeSensor for DummyRangeSensor {
    fn current_readings(&self) -> Result<IndexMap<String, RawScan>, Error> {
        Ok(self.readings.lock().unwrap().clone())
    }
}
