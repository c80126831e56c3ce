use std::f64::consts::{PI, TAU};

use nalgebra::{Quaternion, Vector2};
use navci::{utils::check_batch_len, Error, RootState};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::normalize_symmetric;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GoalProjectorConfig {
    /// Maximum distance (in meters) of the projected goal.
    #[serde(default = "default_lookahead")]
    pub lookahead: f64,
    /// Body-frame goal coordinates in `[goal_min, goal_max]` are mapped onto `[-1, 1]`.
    #[serde(default = "default_goal_min")]
    pub goal_min: f64,
    #[serde(default = "default_goal_max")]
    pub goal_max: f64,
}

impl Default for GoalProjectorConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            goal_min: default_goal_min(),
            goal_max: default_goal_max(),
        }
    }
}

fn default_lookahead() -> f64 {
    2.0
}

fn default_goal_min() -> f64 {
    -2.0
}

fn default_goal_max() -> f64 {
    2.0
}

/// Expresses static world-frame goals in each robot's body frame.
#[derive(Debug, Clone)]
pub struct GoalProjector {
    goals: Vec<Vector2<f64>>,
    num_instances: usize,
    config: GoalProjectorConfig,
}

impl GoalProjector {
    /// `goals` holds either a single goal shared by every instance or
    /// exactly one goal per instance.
    pub fn new(
        goals: Vec<Vector2<f64>>,
        num_instances: usize,
        config: GoalProjectorConfig,
    ) -> Result<Self, Error> {
        if goals.len() != 1 && goals.len() != num_instances {
            return Err(Error::ShapeMismatch {
                what: "goals",
                expected: num_instances,
                actual: goals.len(),
            });
        }
        if config.lookahead <= 0.0 {
            return Err(Error::InvalidConfig {
                name: "lookahead",
                message: format!("must be positive, but got {}", config.lookahead),
            });
        }
        if config.goal_max <= config.goal_min {
            return Err(Error::InvalidConfig {
                name: "goal_max",
                message: format!(
                    "must be larger than goal_min ({} <= {})",
                    config.goal_max, config.goal_min
                ),
            });
        }
        Ok(Self {
            goals,
            num_instances,
            config,
        })
    }

    pub fn goal(&self, instance: usize) -> &Vector2<f64> {
        if self.goals.len() == 1 {
            &self.goals[0]
        } else {
            &self.goals[instance]
        }
    }

    pub fn goals(&self) -> &[Vector2<f64>] {
        &self.goals
    }

    pub fn config(&self) -> &GoalProjectorConfig {
        &self.config
    }

    /// Body-frame goal of every instance, clamped to the lookahead and normalized.
    pub fn project(&self, root_states: &[RootState]) -> Result<Vec<Vector2<f64>>, Error> {
        check_batch_len(self.num_instances, root_states.len())?;
        Ok(root_states
            .iter()
            .enumerate()
            .map(|(i, state)| {
                let relative = self.relative_goal(i, state);
                let clamped = clamp_to_lookahead(&relative, self.config.lookahead);
                clamped.map(|v| normalize_symmetric(v, self.config.goal_min, self.config.goal_max))
            })
            .collect())
    }

    /// Goal of `instance` in the body frame of `state`, before clamping.
    pub fn relative_goal(&self, instance: usize, state: &RootState) -> Vector2<f64> {
        let offset = self.goal(instance) - state.position.xy();
        rotate_2d(&offset, body_frame_angle(&state.orientation))
    }
}

/// Angle that rotates world-frame offsets into the body frame of a robot with
/// the given (w, x, y, z) orientation, wrapped into `[-π, π)`.
///
/// For an orientation that is a pure rotation about z this is the negated yaw.
pub fn body_frame_angle(q: &Quaternion<f64>) -> f64 {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);
    let r11 = 1.0 - 2.0 * (y * y + z * z);
    let r21 = 2.0 * (x * y - w * z);
    wrap_angle(r21.atan2(r11))
}

/// Wraps `angle` into `[-π, π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Counter-clockwise rotation of `v` by `angle`.
pub fn rotate_2d(v: &Vector2<f64>, angle: f64) -> Vector2<f64> {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Scales `v` down to `lookahead` if it is longer, keeping its direction.
pub fn clamp_to_lookahead(v: &Vector2<f64>, lookahead: f64) -> Vector2<f64> {
    let norm = v.norm();
    if norm > lookahead {
        v * (lookahead / norm)
    } else {
        *v
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::FRAC_PI_2;

    use assert_approx_eq::assert_approx_eq;
    use nalgebra::Vector3;

    use super::*;

    fn yaw(angle: f64) -> Quaternion<f64> {
        Quaternion::new((angle / 2.0).cos(), 0.0, 0.0, (angle / 2.0).sin())
    }

    #[test]
    fn test_body_frame_angle() {
        assert_approx_eq!(body_frame_angle(&Quaternion::identity()), 0.0);
        assert_approx_eq!(body_frame_angle(&yaw(FRAC_PI_2)), -FRAC_PI_2);
        assert_approx_eq!(body_frame_angle(&yaw(-0.3)), 0.3);
        let a = body_frame_angle(&yaw(PI));
        assert!((-PI..PI).contains(&a));
    }

    #[test]
    fn test_wrap_angle() {
        assert_approx_eq!(wrap_angle(0.5), 0.5);
        assert_approx_eq!(wrap_angle(PI), -PI);
        assert_approx_eq!(wrap_angle(3.0 * PI / 2.0), -FRAC_PI_2);
        assert_approx_eq!(wrap_angle(-3.0 * PI / 2.0), FRAC_PI_2);
    }

    #[test]
    fn test_clamp_to_lookahead() {
        let far = Vector2::new(-5.0, -2.0);
        let clamped = clamp_to_lookahead(&far, 2.0);
        assert_approx_eq!(clamped.norm(), 2.0);
        assert!(clamped.dot(&far) > 0.0);
        assert_approx_eq!(clamped.y / clamped.x, far.y / far.x);

        let near = Vector2::new(0.5, -1.0);
        assert_eq!(clamp_to_lookahead(&near, 2.0), near);
    }

    #[test]
    fn test_goal_behind_robot_facing_x() {
        let projector =
            GoalProjector::new(vec![Vector2::new(-5.0, -2.0)], 1, Default::default()).unwrap();
        let state = RootState::default();
        let relative = projector.relative_goal(0, &state);
        assert_approx_eq!(relative.x, -5.0);
        assert_approx_eq!(relative.y, -2.0);
        assert_approx_eq!(relative.norm(), 29f64.sqrt());

        let projected = projector.project(&[state]).unwrap();
        let expected = clamp_to_lookahead(&relative, 2.0) / 2.0;
        assert_approx_eq!(projected[0].x, expected.x);
        assert_approx_eq!(projected[0].y, expected.y);
        assert!(projected[0].iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_goal_in_rotated_body_frame() {
        // Robot at (1, 1) facing +y, goal one meter ahead of it.
        let projector =
            GoalProjector::new(vec![Vector2::new(1.0, 2.0)], 1, Default::default()).unwrap();
        let state = RootState::from_pose(Vector3::new(1.0, 1.0, 0.0), yaw(FRAC_PI_2));
        let relative = projector.relative_goal(0, &state);
        assert_approx_eq!(relative.x, 1.0);
        assert_approx_eq!(relative.y, 0.0);
        let projected = projector.project(&[state]).unwrap();
        assert_approx_eq!(projected[0].x, 0.5);
        assert_approx_eq!(projected[0].y, 0.0);
    }

    #[test]
    fn test_goal_broadcast_and_shape() {
        let goals = vec![Vector2::new(-5.0, -2.0), Vector2::new(-10.0, -2.0)];
        assert!(GoalProjector::new(goals.clone(), 2, Default::default()).is_ok());
        assert!(GoalProjector::new(goals[..1].to_vec(), 4, Default::default()).is_ok());
        assert!(matches!(
            GoalProjector::new(goals, 4, Default::default()),
            Err(Error::ShapeMismatch {
                what: "goals",
                expected: 4,
                actual: 2
            })
        ));
        assert!(GoalProjector::new(vec![], 1, Default::default()).is_err());

        let projector =
            GoalProjector::new(vec![Vector2::new(1.0, 0.0)], 3, Default::default()).unwrap();
        assert_eq!(projector.project(&[RootState::default(); 3]).unwrap().len(), 3);
        assert!(matches!(
            projector.project(&[RootState::default(); 2]),
            Err(Error::LengthMismatch { model: 3, input: 2 })
        ));
    }
}
