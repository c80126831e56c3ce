use auto_impl::auto_impl;
use nalgebra::{Quaternion, Vector3};

use crate::error::Error;

/// World-frame state of the root body of a robot.
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct RootState {
    pub position: Vector3<f64>,
    /// Orientation as (w, x, y, z).
    pub orientation: Quaternion<f64>,
    pub linear_velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
}

impl RootState {
    pub fn from_pose(position: Vector3<f64>, orientation: Quaternion<f64>) -> Self {
        Self {
            position,
            orientation,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl Default for RootState {
    fn default() -> Self {
        Self::from_pose(Vector3::zeros(), Quaternion::identity())
    }
}

/// Joint effort targets of every environment instance, stored row-major
/// (`num_instances` rows of `joint_count` values).
#[derive(Clone, Debug, PartialEq)]
pub struct JointEffortTargets {
    joint_count: usize,
    data: Vec<f64>,
}

impl JointEffortTargets {
    pub fn zeros(num_instances: usize, joint_count: usize) -> Self {
        Self {
            joint_count,
            data: vec![0.0; num_instances * joint_count],
        }
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn num_instances(&self) -> usize {
        if self.joint_count == 0 {
            0
        } else {
            self.data.len() / self.joint_count
        }
    }

    pub fn row(&self, instance: usize) -> &[f64] {
        &self.data[instance * self.joint_count..(instance + 1) * self.joint_count]
    }

    pub fn row_mut(&mut self, instance: usize) -> &mut [f64] {
        &mut self.data[instance * self.joint_count..(instance + 1) * self.joint_count]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.joint_count.max(1))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Articulated robot of every environment instance.
#[auto_impl(Box, Arc)]
pub trait Articulation: Send + Sync {
    fn joint_names(&self) -> Vec<String>;
    fn root_states(&self) -> Result<Vec<RootState>, Error>;
    /// Joint positions per instance, ordered as `joint_names`.
    fn joint_positions(&self) -> Result<Vec<Vec<f64>>, Error>;
    /// Joint velocities per instance, ordered as `joint_names`.
    fn joint_velocities(&self) -> Result<Vec<Vec<f64>>, Error>;
    fn set_joint_effort_targets(&self, targets: &JointEffortTargets) -> Result<(), Error>;
    /// Overwrites the joint state of `instances`; row `k` of `positions` and
    /// `velocities` belongs to `instances[k]`.
    fn write_joint_states(
        &self,
        instances: &[usize],
        positions: &[Vec<f64>],
        velocities: &[Vec<f64>],
    ) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_effort_targets_rows() {
        let mut targets = JointEffortTargets::zeros(3, 7);
        assert_eq!(targets.num_instances(), 3);
        assert_eq!(targets.joint_count(), 7);
        targets.row_mut(1)[2] = 4.0;
        assert_eq!(targets.row(1), &[0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(targets.rows().count(), 3);
        assert!(targets.row(0).iter().all(|v| *v == 0.0));
    }
}
