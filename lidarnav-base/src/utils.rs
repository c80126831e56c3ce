use navci::BaseCommand;

pub trait VelocityTransformer {
    /// Output: left_wheel_velocity, right_wheel_velocity
    fn transform_velocity_base_to_wheel(&self, command: &BaseCommand) -> [f64; 2];
    /// Input: left_wheel_velocity, right_wheel_velocity
    fn transform_velocity_wheel_to_base(&self, wheels_vel: &[f64; 2]) -> BaseCommand;
}

/// Maps `[min, max]` onto `[-1, 1]`.
///
/// Values outside `[min, max]` are not clamped.
///
/// # Example
///
/// ```
/// use assert_approx_eq::assert_approx_eq;
/// use lidarnav_base::normalize_symmetric;
///
/// assert_approx_eq!(normalize_symmetric(15.0, 0.0, 30.0), 0.0);
/// assert_approx_eq!(normalize_symmetric(45.0, 0.0, 30.0), 2.0);
/// ```
pub fn normalize_symmetric(value: f64, min: f64, max: f64) -> f64 {
    2.0 * (value - min) / (max - min) - 1.0
}
