use navci::{utils::check_batch_len, Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Weights of the per-tick reward terms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RewardTerms {
    #[serde(default = "default_alive")]
    pub alive: f64,
    #[serde(default = "default_terminated")]
    pub terminated: f64,
    /// Weight of the squared left wheel position.
    #[serde(default = "default_wheel_position")]
    pub wheel_position: f64,
    #[serde(default = "default_right_wheel_velocity")]
    pub right_wheel_velocity: f64,
    #[serde(default = "default_left_wheel_velocity")]
    pub left_wheel_velocity: f64,
}

impl Default for RewardTerms {
    fn default() -> Self {
        Self {
            alive: default_alive(),
            terminated: default_terminated(),
            wheel_position: default_wheel_position(),
            right_wheel_velocity: default_right_wheel_velocity(),
            left_wheel_velocity: default_left_wheel_velocity(),
        }
    }
}

fn default_alive() -> f64 {
    1.0
}

fn default_terminated() -> f64 {
    -2.0
}

fn default_wheel_position() -> f64 {
    -1.0
}

fn default_right_wheel_velocity() -> f64 {
    -0.01
}

fn default_left_wheel_velocity() -> f64 {
    -0.005
}

/// Wheel joint readings of one instance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelState {
    pub left_position: f64,
    pub left_velocity: f64,
    pub right_velocity: f64,
}

impl RewardTerms {
    pub fn reward(&self, wheels: &WheelState, terminated: bool) -> f64 {
        let t = if terminated { 1.0 } else { 0.0 };
        self.alive * (1.0 - t)
            + self.terminated * t
            + self.wheel_position * wheels.left_position.powi(2)
            + self.right_wheel_velocity * wheels.right_velocity.abs()
            + self.left_wheel_velocity * wheels.left_velocity.abs()
    }

    pub fn compute(&self, wheels: &[WheelState], terminated: &[bool]) -> Result<Vec<f64>, Error> {
        check_batch_len(wheels.len(), terminated.len())?;
        Ok(wheels
            .iter()
            .zip(terminated)
            .map(|(w, t)| self.reward(w, *t))
            .collect())
    }
}
