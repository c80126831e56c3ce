use lidarnav_base::FrameTransform;
use lidarnav_perception::Scan;
use nalgebra::Vector3;
use navci::{utils::check_batch_len, Error, RootState};
use tracing::trace;

/// Maps scan points from the sensor frame into the world frame.
#[derive(Debug, Clone)]
pub struct ScanProjector {
    sensor_to_body: FrameTransform,
    min_points: usize,
}

impl ScanProjector {
    pub fn new(sensor_to_body: FrameTransform, min_points: usize) -> Self {
        Self {
            sensor_to_body,
            min_points,
        }
    }

    pub fn sensor_to_body(&self) -> &FrameTransform {
        &self.sensor_to_body
    }

    /// World-frame points of every scan, `None` for scans with fewer than
    /// `min_points` points.
    pub fn project(
        &self,
        scans: &[Scan],
        root_states: &[RootState],
    ) -> Result<Vec<Option<Vec<Vector3<f64>>>>, Error> {
        check_batch_len(root_states.len(), scans.len())?;
        Ok(scans
            .iter()
            .zip(root_states)
            .enumerate()
            .map(|(instance, (scan, state))| {
                if scan.points.len() < self.min_points {
                    trace!(instance, len = scan.points.len(), "too few points to project");
                    return None;
                }
                let sensor_to_world =
                    FrameTransform::from_root_state(state).compose(&self.sensor_to_body);
                Some(sensor_to_world.transform_points(&scan.points))
            })
            .collect())
    }
}
