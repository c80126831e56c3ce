use navci::{
    utils::{check_batch_len, find_joint_index},
    BaseCommand, Error, JointEffortTargets,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::utils::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DifferentialDriveParameters {
    /// Distance (in meters) between the left and right wheels.
    #[serde(default = "default_wheel_separation")]
    pub wheel_separation: f64,
    #[serde(default = "default_velocity_to_joint_gain")]
    pub velocity_to_joint_gain: f64,
    /// Wheel velocity that corresponds to `joint_effort_base`.
    #[serde(default = "default_nominal_velocity")]
    pub nominal_velocity: f64,
    #[serde(default = "default_joint_effort_base")]
    pub joint_effort_base: f64,
}

impl Default for DifferentialDriveParameters {
    fn default() -> Self {
        Self {
            wheel_separation: default_wheel_separation(),
            velocity_to_joint_gain: default_velocity_to_joint_gain(),
            nominal_velocity: default_nominal_velocity(),
            joint_effort_base: default_joint_effort_base(),
        }
    }
}

fn default_wheel_separation() -> f64 {
    0.4132
}

fn default_velocity_to_joint_gain() -> f64 {
    1.25
}

fn default_nominal_velocity() -> f64 {
    0.5
}

fn default_joint_effort_base() -> f64 {
    42.0
}

/// Slots of the wheel joints in the robot's joint vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelJointLayout {
    pub joint_count: usize,
    pub left: usize,
    pub right: usize,
}

impl WheelJointLayout {
    pub fn new(joint_count: usize, left: usize, right: usize) -> Result<Self, Error> {
        for index in [left, right] {
            if index >= joint_count {
                return Err(Error::ShapeMismatch {
                    what: "wheel joint index",
                    expected: joint_count,
                    actual: index,
                });
            }
        }
        if left == right {
            return Err(Error::InvalidConfig {
                name: "wheel joints",
                message: format!("left and right wheels share the joint slot {left}"),
            });
        }
        Ok(Self {
            joint_count,
            left,
            right,
        })
    }

    pub fn from_joint_names(
        joint_names: &[String],
        left_name: &str,
        right_name: &str,
    ) -> Result<Self, Error> {
        Self::new(
            joint_names.len(),
            find_joint_index(joint_names, left_name)?,
            find_joint_index(joint_names, right_name)?,
        )
    }
}

/// Maps base commands onto left/right wheel joint effort targets.
#[derive(Debug, Clone)]
pub struct DifferentialDriveSolver {
    param: DifferentialDriveParameters,
    layout: WheelJointLayout,
}

impl DifferentialDriveSolver {
    pub fn new(param: DifferentialDriveParameters, layout: WheelJointLayout) -> Result<Self, Error> {
        if param.nominal_velocity == 0.0 {
            return Err(Error::InvalidConfig {
                name: "nominal_velocity",
                message: "must not be zero".to_owned(),
            });
        }
        Ok(Self { param, layout })
    }

    pub fn param(&self) -> &DifferentialDriveParameters {
        &self.param
    }

    pub fn layout(&self) -> &WheelJointLayout {
        &self.layout
    }

    /// Output: left_wheel_target, right_wheel_target
    pub fn wheel_targets(&self, command: &BaseCommand) -> [f64; 2] {
        self.transform_velocity_base_to_wheel(command).map(|v| {
            self.param.velocity_to_joint_gain
                * (v / self.param.nominal_velocity)
                * self.param.joint_effort_base
        })
    }

    /// Joint effort targets for every instance. Only the wheel slots are written.
    pub fn solve(&self, commands: &[BaseCommand]) -> JointEffortTargets {
        let mut targets = JointEffortTargets::zeros(commands.len(), self.layout.joint_count);
        for (i, command) in commands.iter().enumerate() {
            let [left, right] = self.wheel_targets(command);
            let row = targets.row_mut(i);
            row[self.layout.left] = left;
            row[self.layout.right] = right;
        }
        trace!(?targets, "solved wheel targets");
        targets
    }

    /// Same as [`Self::solve`], failing unless there is one command per instance.
    pub fn solve_batch(
        &self,
        commands: &[BaseCommand],
        num_instances: usize,
    ) -> Result<JointEffortTargets, Error> {
        check_batch_len(num_instances, commands.len())?;
        Ok(self.solve(commands))
    }
}

impl VelocityTransformer for DifferentialDriveSolver {
    fn transform_velocity_base_to_wheel(&self, command: &BaseCommand) -> [f64; 2] {
        [
            command.linear - command.yaw_rate * self.param.wheel_separation / 2.0,
            command.linear + command.yaw_rate * self.param.wheel_separation / 2.0,
        ]
    }

    fn transform_velocity_wheel_to_base(&self, wheels_vel: &[f64; 2]) -> BaseCommand {
        let left = wheels_vel[0];
        let right = wheels_vel[1];
        BaseCommand {
            linear: 0.5 * (left + right),
            yaw_rate: (right - left) / self.param.wheel_separation,
        }
    }
}
