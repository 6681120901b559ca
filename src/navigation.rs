//! Goal-seeking control loop.
//!
//! [`GoalSeeker`] wires an external [`Controller`] to a [`MotionModel`] and
//! yields one [`StepOutput`] per control tick, pull-based: each `next()`
//! computes exactly one step and then suspends. Dropping the iterator
//! cancels the run with no further work.

use nalgebra::Matrix3;
use tracing::{debug, info};
use trundle_kinematics::{ChassisSpeeds, Pose};

use crate::config::LoopConfig;
use crate::controller::Controller;
use crate::error::SimulationError;
use crate::model::{MotionModel, PoseCovariance};

/// The 2-D homogeneous transform (rotation by θ, translation by `(x, y)`)
/// of a pose, for consumers that compose or render frames.
pub fn homogeneous_transform(pose: &Pose) -> Matrix3<f64> {
    let (s, c) = pose.theta.sin_cos();
    Matrix3::new(
        c, -s, pose.x, //
        s, c, pose.y, //
        0.0, 0.0, 1.0,
    )
}

/// The result of one control iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    /// Homogeneous transform of the new pose.
    pub transform: Matrix3<f64>,
    /// The new pose.
    pub pose: Pose,
    /// The pose covariance after the step.
    pub covariance: PoseCovariance,
    /// The velocity command that produced the step.
    pub command: ChassisSpeeds,
}

/// Pull-based goal-seeking iterator.
///
/// Per iteration: read the goal offset from the model's last pose, ask the
/// controller for `(ρ, v, w)`, apply the command to the model for one fixed
/// time step, and yield the result. The loop terminates once the ρ reported
/// by the controller falls to or below the configured tolerance — evaluated
/// at the start of the next iteration, so the very first test uses the
/// initial goal offset and a start pose already within tolerance yields
/// zero iterations.
///
/// A step error (e.g. collision) is yielded once and fuses the iterator;
/// no further values are produced.
pub struct GoalSeeker<'a, C: Controller> {
    model: &'a mut MotionModel,
    controller: &'a mut C,
    goal: Pose,
    goal_tolerance: f64,
    time_step: f64,
    rho: f64,
    failed: bool,
}

impl<'a, C: Controller> GoalSeeker<'a, C> {
    /// Start a goal-seeking run.
    ///
    /// Sets the model's goal pose and seeds the termination distance from
    /// the current goal offset. The model is borrowed mutably for the whole
    /// run, so nothing else can step it concurrently.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` if the loop
    /// configuration fails validation.
    pub fn new(
        model: &'a mut MotionModel,
        controller: &'a mut C,
        goal: Pose,
        config: LoopConfig,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let start = model.last_pose();
        let rho = start.distance_to(&goal);
        model.set_goal_pose(goal);
        info!(
            start_x = start.x,
            start_y = start.y,
            goal_x = goal.x,
            goal_y = goal.y,
            rho,
            "goal-seeking run started"
        );

        Ok(GoalSeeker {
            model,
            controller,
            goal,
            goal_tolerance: config.goal_tolerance,
            time_step: config.time_step,
            rho,
            failed: false,
        })
    }

    /// The goal this run is driving toward.
    pub fn goal(&self) -> Pose {
        self.goal
    }

    /// The most recent distance-to-goal used for the termination test.
    pub fn remaining_distance(&self) -> f64 {
        self.rho
    }
}

impl<'a, C: Controller> Iterator for GoalSeeker<'a, C> {
    type Item = Result<StepOutput, SimulationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.rho <= self.goal_tolerance {
            debug!(rho = self.rho, "goal reached, run finished");
            return None;
        }

        let current = self.model.last_pose();
        let command = self.controller.calc_control_command(
            self.goal.x - current.x,
            self.goal.y - current.y,
            current.theta,
            self.goal.theta,
        );
        // Tested at the start of the NEXT iteration, against the pose this
        // step is about to produce.
        self.rho = command.rho;

        match self.model.step(command.v, command.w, self.time_step) {
            Ok((pose, covariance)) => {
                debug!(rho = command.rho, v = command.v, w = command.w, %pose, "control step");
                Some(Ok(StepOutput {
                    transform: homogeneous_transform(&pose),
                    pose,
                    covariance,
                    command: ChassisSpeeds::new(command.v, command.w),
                }))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
