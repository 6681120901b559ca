//! Discrete-time motion model with uncertainty propagation.
//!
//! [`MotionModel`] advances a differential-drive pose one exact-arc step at
//! a time and, when an actuation-noise model is configured, propagates a
//! 3×3 pose covariance alongside it (a prediction-only step of an extended
//! Kalman filter — there is no measurement update). Every successful step
//! appends one `(pose, covariance)` entry to an owned, append-only history.

use core::fmt;

use nalgebra::{Matrix2, Matrix3, Matrix3x2};
use tracing::trace;
use trundle_kinematics::{ChassisSpeeds, DifferentialDrive, Pose};

use crate::collision::CollisionOracle;
use crate::config::ModelConfig;
use crate::error::SimulationError;

/// Symmetric 3×3 covariance over `(x, y, θ)`.
pub type PoseCovariance = Matrix3<f64>;

/// Symmetric 2×2 covariance over the `(v, w)` command.
pub type MotionNoise = Matrix2<f64>;

/// One recorded trajectory sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    /// The pose after the step (or the start pose at index 0).
    pub pose: Pose,
    /// The pose covariance at the same instant.
    pub covariance: PoseCovariance,
}

/// Jacobians of the one-step motion function, evaluated at the previous
/// pose and the applied command. `fx` is the sensitivity to the previous
/// state, `fu` the sensitivity to the `(v, w)` command. The branch (straight
/// vs. arc) must match the one used for the pose integration itself.
pub(crate) fn motion_jacobians(
    theta: f64,
    v: f64,
    w: f64,
    dt: f64,
    omega_epsilon: f64,
) -> (Matrix3<f64>, Matrix3x2<f64>) {
    let (st, ct) = theta.sin_cos();

    if w.abs() <= omega_epsilon {
        // Straight-line branch: θ' = θ, so the command's angular component
        // has no effect within this branch's motion function.
        let fx = Matrix3::new(
            1.0, 0.0, -v * dt * st, //
            0.0, 1.0, v * dt * ct, //
            0.0, 0.0, 1.0,
        );
        let fu = Matrix3x2::new(
            dt * ct, 0.0, //
            dt * st, 0.0, //
            0.0, 0.0,
        );
        (fx, fu)
    } else {
        let r = v / w;
        let (sh, ch) = (theta + w * dt).sin_cos();

        // Partials of the exact-arc position equations:
        //   x' = x + R(sin(θ+ωΔt) − sin θ)
        //   y' = y − R(cos(θ+ωΔt) − cos θ)
        let fx = Matrix3::new(
            1.0, 0.0, r * (ch - ct), //
            0.0, 1.0, r * (sh - st), //
            0.0, 0.0, 1.0,
        );
        let fu = Matrix3x2::new(
            (sh - st) / w, -(v / (w * w)) * (sh - st) + r * dt * ch, //
            -(ch - ct) / w, (v / (w * w)) * (ch - ct) + r * dt * sh, //
            0.0, dt,
        );
        (fx, fu)
    }
}

/// Differential-drive motion model with optional uncertainty tracking and
/// an optional collision guard.
///
/// The model owns its trajectory history exclusively: entry 0 is the start
/// pose with zero covariance, and each successful [`step`](Self::step)
/// appends exactly one entry. A step that fails (collision, invalid time
/// step) leaves the model untouched.
pub struct MotionModel {
    drive: DifferentialDrive,
    motion_noise: Option<MotionNoise>,
    oracle: Option<Box<dyn CollisionOracle>>,
    history: Vec<HistoryEntry>,
    goal_pose: Option<Pose>,
}

impl MotionModel {
    /// Construct a model at `start_pose` with zero initial covariance, no
    /// noise model, and no collision oracle.
    pub fn new(drive: DifferentialDrive, start_pose: Pose) -> Self {
        MotionModel {
            drive,
            motion_noise: None,
            oracle: None,
            history: vec![HistoryEntry { pose: start_pose, covariance: PoseCovariance::zeros() }],
            goal_pose: None,
        }
    }

    /// Construct a model from a validated configuration section.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if the section fails
    /// validation, and `SimulationError::Kinematics` if the geometry is
    /// rejected by the kinematics layer.
    pub fn from_config(config: &ModelConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let drive = DifferentialDrive::new(config.wheel_radius, config.wheel_separation)?
            .with_omega_epsilon(config.omega_epsilon);
        let model = MotionModel::new(drive, config.start_pose);
        match &config.motion_noise {
            Some(noise) => model.with_motion_noise(noise.to_matrix()),
            None => Ok(model),
        }
    }

    /// Enable uncertainty tracking with the given per-step actuation-noise
    /// covariance over `(v, w)`.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if the matrix is not
    /// symmetric positive semi-definite.
    pub fn with_motion_noise(mut self, noise: MotionNoise) -> Result<Self, SimulationError> {
        if noise[(0, 1)] != noise[(1, 0)] {
            return Err(SimulationError::InvalidConfiguration("motion noise must be symmetric"));
        }
        if noise[(0, 0)] < 0.0 || noise[(1, 1)] < 0.0 || noise.determinant() < 0.0 {
            return Err(SimulationError::InvalidConfiguration(
                "motion noise must be positive semi-definite",
            ));
        }
        self.motion_noise = Some(noise);
        Ok(self)
    }

    /// Attach a collision oracle, queried once per step with the candidate
    /// position and the robot's footprint radius (wheel separation / 2).
    pub fn with_collision_oracle(mut self, oracle: Box<dyn CollisionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// The robot geometry.
    pub fn drive(&self) -> &DifferentialDrive {
        &self.drive
    }

    /// Whether uncertainty tracking is enabled.
    pub fn tracks_uncertainty(&self) -> bool {
        self.motion_noise.is_some()
    }

    /// The start pose (history entry 0).
    pub fn start_pose(&self) -> Pose {
        self.history[0].pose
    }

    /// The most recent pose.
    pub fn last_pose(&self) -> Pose {
        self.history[self.history.len() - 1].pose
    }

    /// The most recent pose covariance.
    pub fn last_covariance(&self) -> PoseCovariance {
        self.history[self.history.len() - 1].covariance
    }

    /// Read-only view of the full trajectory history, oldest first.
    ///
    /// Entry 0 is the start pose with zero covariance; each successful step
    /// appends exactly one entry. The internal storage is never exposed
    /// mutably.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The goal currently being driven toward, if any.
    pub fn goal_pose(&self) -> Option<Pose> {
        self.goal_pose
    }

    /// Set or replace the goal pose. Persists until replaced.
    pub fn set_goal_pose(&mut self, goal: Pose) {
        self.goal_pose = Some(goal);
    }

    /// Advance one step under the command `(v, w)` held constant for `dt`
    /// seconds.
    ///
    /// Integration follows the exact constant-twist arc (straight line when
    /// `|w|` is at or below the configured threshold). If a noise model is
    /// configured the covariance is propagated with the branch-matched
    /// linearization `P' = Fx·P·Fxᵀ + Fu·Q·Fuᵀ`; otherwise the prior
    /// covariance is recorded unchanged.
    ///
    /// The update is atomic: pose, covariance, and the history append all
    /// happen, or (on any error) none of them do.
    ///
    /// # Errors
    ///
    /// * `SimulationError::Kinematics` if `dt` is not positive.
    /// * `SimulationError::Collision` if the configured oracle rejects the
    ///   candidate position; the model state is left unmodified.
    pub fn step(
        &mut self,
        v: f64,
        w: f64,
        dt: f64,
    ) -> Result<(Pose, PoseCovariance), SimulationError> {
        let current = self.history[self.history.len() - 1];
        let command = ChassisSpeeds::new(v, w);

        let new_pose = self.drive.update_pose(current.pose, command, dt)?;

        let new_covariance = match &self.motion_noise {
            Some(noise) => {
                let (fx, fu) =
                    motion_jacobians(current.pose.theta, v, w, dt, self.drive.omega_epsilon());
                let p = fx * current.covariance * fx.transpose() + fu * noise * fu.transpose();
                // Symmetrize to keep floating-point drift from breaking PSD.
                (p + p.transpose()) * 0.5
            }
            None => current.covariance,
        };

        if let Some(oracle) = &self.oracle {
            let radius = self.drive.collision_radius();
            if oracle.collision(new_pose.x, new_pose.y, radius) {
                return Err(SimulationError::Collision { x: new_pose.x, y: new_pose.y, radius });
            }
        }

        trace!(
            v,
            w,
            dt,
            x = new_pose.x,
            y = new_pose.y,
            theta = new_pose.theta,
            steps = self.history.len(),
            "motion step committed"
        );
        self.history.push(HistoryEntry { pose: new_pose, covariance: new_covariance });

        Ok((new_pose, new_covariance))
    }
}

impl fmt::Debug for MotionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionModel")
            .field("drive", &self.drive)
            .field("motion_noise", &self.motion_noise)
            .field("has_oracle", &self.oracle.is_some())
            .field("history_len", &self.history.len())
            .field("goal_pose", &self.goal_pose)
            .finish()
    }
}
