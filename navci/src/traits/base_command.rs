/// Velocity command of a differential-drive base.
#[derive(Clone, Debug, Default, Copy, PartialEq)]
pub struct BaseCommand {
    /// Forward velocity.
    pub linear: f64,
    /// Yaw rate (counter-clockwise positive).
    pub yaw_rate: f64,
}

impl BaseCommand {
    pub fn new(linear: f64, yaw_rate: f64) -> Self {
        Self { linear, yaw_rate }
    }

    /// Builds a command from a raw policy action `[linear, yaw_rate]` scaled by `scale`.
    ///
    /// # Example
    ///
    /// ```
    /// use assert_approx_eq::assert_approx_eq;
    /// use navci::BaseCommand;
    ///
    /// let cmd = BaseCommand::from_action([1.0, -1.0], 0.5);
    /// assert_approx_eq!(cmd.linear, 0.5);
    /// assert_approx_eq!(cmd.yaw_rate, -0.5);
    /// ```
    pub fn from_action(action: [f64; 2], scale: f64) -> Self {
        Self::new(action[0], action[1]) * scale
    }
}

/// Multiply scalar value for command
///
/// # Example
///
/// ```
/// use assert_approx_eq::assert_approx_eq;
/// use navci::BaseCommand;
///
/// let cmd = BaseCommand::new(0.1, 1.0);
/// let twice = cmd * 2.0;
/// assert_approx_eq!(twice.linear, 0.2);
/// assert_approx_eq!(twice.yaw_rate, 2.0);
/// ```
impl std::ops::Mul<f64> for BaseCommand {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            linear: self.linear * rhs,
            yaw_rate: self.yaw_rate * rhs,
        }
    }
}
