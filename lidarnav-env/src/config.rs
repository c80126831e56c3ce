use std::path::Path;

use lidarnav_base::{DifferentialDriveParameters, FrameTransform, GoalProjectorConfig};
use lidarnav_perception::{ScanPreprocessorConfig, TemporalPoolConfig};
use nalgebra::{Quaternion, Vector2, Vector3};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, RewardTerms};

/// Pose of the range sensor in the robot body frame.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SensorOffsetConfig {
    #[serde(default = "default_sensor_position")]
    pub position: [f64; 3],
    /// (w, x, y, z)
    #[serde(default = "default_sensor_orientation")]
    pub orientation: [f64; 4],
}

impl SensorOffsetConfig {
    pub fn transform(&self) -> FrameTransform {
        let [w, x, y, z] = self.orientation;
        FrameTransform::new(
            Quaternion::new(w, x, y, z),
            Vector3::from(self.position),
        )
    }
}

impl Default for SensorOffsetConfig {
    fn default() -> Self {
        Self {
            position: default_sensor_position(),
            orientation: default_sensor_orientation(),
        }
    }
}

fn default_sensor_position() -> [f64; 3] {
    [0.026, 0.0, 0.418]
}

fn default_sensor_orientation() -> [f64; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NavigationTaskConfig {
    // TOML format has a restriction that if a table itself contains tables,
    // all keys with non-table values must be emitted first.
    // Therefore, these fields must be located at the start of the struct.
    /// Number of environment instances stepped in lock-step.
    #[serde(default = "default_num_envs")]
    pub num_envs: usize,
    /// Factor applied to raw policy actions before they reach the drive solver.
    #[serde(default = "default_action_scale")]
    pub action_scale: f64,
    /// Width of the policy observation of one instance.
    #[serde(default = "default_num_observations")]
    pub num_observations: usize,
    #[serde(default = "default_pedestrian_block_width")]
    pub pedestrian_block_width: usize,
    /// Scans with fewer points are not projected to the world frame.
    #[serde(default = "default_min_visualized_points")]
    pub min_visualized_points: usize,
    /// Physics timestep in seconds.
    #[serde(default = "default_sim_dt")]
    pub sim_dt: f64,
    /// Physics steps per control tick.
    #[serde(default = "default_decimation")]
    pub decimation: usize,
    #[serde(default = "default_episode_length_s")]
    pub episode_length_s: f64,
    /// Left wheel joint positions beyond this terminate the episode.
    #[serde(default = "default_max_wheel_position")]
    pub max_wheel_position: f64,
    /// Bounds of the random left wheel angle written on reset, in units of π.
    #[serde(default = "default_initial_wheel_angle_range")]
    pub initial_wheel_angle_range: [f64; 2],
    #[serde(default = "default_joint_names")]
    pub joint_names: Vec<String>,
    #[serde(default = "default_left_wheel_joint")]
    pub left_wheel_joint: String,
    #[serde(default = "default_right_wheel_joint")]
    pub right_wheel_joint: String,
    /// World-frame goals: one shared goal or one goal per instance.
    #[serde(default = "default_goals")]
    pub goals: Vec<[f64; 2]>,

    #[serde(default)]
    pub sensor_offset: SensorOffsetConfig,
    #[serde(default)]
    pub scan: ScanPreprocessorConfig,
    #[serde(default)]
    pub pooling: TemporalPoolConfig,
    #[serde(default)]
    pub goal_projection: GoalProjectorConfig,
    #[serde(default)]
    pub drive: DifferentialDriveParameters,
    #[serde(default)]
    pub rewards: RewardTerms,
}

impl NavigationTaskConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_str(
            &std::fs::read_to_string(&path)
                .map_err(|e| Error::NoFile(path.as_ref().to_owned(), e))?,
            path,
        )
    }

    pub fn from_str<P: AsRef<Path>>(s: &str, path: P) -> Result<Self, Error> {
        let config: Self = toml::from_str(s)
            .map_err(|e| Error::TomlParseFailure(path.as_ref().to_owned(), e))?;
        debug!(?config, "loaded navigation task config");
        Ok(config)
    }

    pub fn goal_points(&self) -> Vec<Vector2<f64>> {
        self.goals.iter().map(|g| Vector2::new(g[0], g[1])).collect()
    }

    /// Control ticks per seconds of episode, rounded up.
    pub fn max_episode_length(&self) -> usize {
        let step_dt = self.sim_dt * self.decimation as f64;
        (self.episode_length_s / step_dt).ceil() as usize
    }
}

impl Default for NavigationTaskConfig {
    fn default() -> Self {
        Self {
            num_envs: default_num_envs(),
            action_scale: default_action_scale(),
            num_observations: default_num_observations(),
            pedestrian_block_width: default_pedestrian_block_width(),
            min_visualized_points: default_min_visualized_points(),
            sim_dt: default_sim_dt(),
            decimation: default_decimation(),
            episode_length_s: default_episode_length_s(),
            max_wheel_position: default_max_wheel_position(),
            initial_wheel_angle_range: default_initial_wheel_angle_range(),
            joint_names: default_joint_names(),
            left_wheel_joint: default_left_wheel_joint(),
            right_wheel_joint: default_right_wheel_joint(),
            goals: default_goals(),
            sensor_offset: Default::default(),
            scan: Default::default(),
            pooling: Default::default(),
            goal_projection: Default::default(),
            drive: Default::default(),
            rewards: Default::default(),
        }
    }
}

fn default_num_envs() -> usize {
    2
}

fn default_action_scale() -> f64 {
    0.5
}

fn default_num_observations() -> usize {
    19202
}

fn default_pedestrian_block_width() -> usize {
    12800
}

fn default_min_visualized_points() -> usize {
    300
}

fn default_sim_dt() -> f64 {
    1.0 / 120.0
}

fn default_decimation() -> usize {
    2
}

fn default_episode_length_s() -> f64 {
    512.0
}

fn default_max_wheel_position() -> f64 {
    40.0
}

fn default_initial_wheel_angle_range() -> [f64; 2] {
    [-0.25, 0.25]
}

fn default_joint_names() -> Vec<String> {
    [
        "joint_caster_base",
        "joint_wheel_left",
        "joint_wheel_right",
        "joint_caster_left",
        "joint_caster_right",
        "joint_swing_left",
        "joint_swing_right",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_left_wheel_joint() -> String {
    "joint_wheel_left".to_owned()
}

fn default_right_wheel_joint() -> String {
    "joint_wheel_right".to_owned()
}

fn default_goals() -> Vec<[f64; 2]> {
    vec![[-5.0, -2.0], [-10.0, -2.0]]
}
