//! Goal-seeking control-law boundary.
//!
//! The concrete control law lives outside this crate. The engine only needs
//! a per-tick velocity command plus the remaining distance to the goal, so
//! the boundary is a single-method trait.

/// One control tick's output: the remaining distance to the goal and the
/// chassis velocity command to apply for the next time step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCommand {
    /// Remaining Euclidean distance to the goal position (m).
    ///
    /// The goal-seeking loop uses this value for its termination test, so it
    /// must be the true Euclidean distance for that test to be meaningful.
    pub rho: f64,
    /// Commanded linear velocity (m/s), signed.
    pub v: f64,
    /// Commanded angular velocity (rad/s), signed.
    pub w: f64,
}

/// A goal-seeking control law.
///
/// Takes `&mut self` so stateful laws (gain scheduling, integral terms,
/// scripted test stubs) fit the boundary; the engine itself assumes no side
/// effects beyond the implementation's own state.
pub trait Controller {
    /// Compute the command for one control tick.
    ///
    /// # Arguments
    ///
    /// * `dx`: Goal x minus current x (m).
    /// * `dy`: Goal y minus current y (m).
    /// * `theta`: Current heading (rad).
    /// * `goal_theta`: Goal heading (rad).
    ///
    /// # Returns
    ///
    /// The remaining distance to the goal and the velocity command.
    fn calc_control_command(
        &mut self,
        dx: f64,
        dy: f64,
        theta: f64,
        goal_theta: f64,
    ) -> ControlCommand;
}
