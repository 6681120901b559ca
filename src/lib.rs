#![warn(missing_docs)]

//! Differential-drive robot simulation engine.
//!
//! The engine advances a robot pose under `(v, w)` velocity commands using
//! exact constant-twist kinematics, propagates a 3×3 pose covariance when a
//! motion-noise model is configured (prediction only, no correction step),
//! and drives the robot toward a goal pose through a pull-based control
//! loop fed by an external [`Controller`].
//!
//! # Components
//!
//! - [`model::MotionModel`]: one kinematic step at a time, with an owned
//!   append-only `(pose, covariance)` history and atomic collision-guarded
//!   updates.
//! - [`navigation::GoalSeeker`]: lazy iterator yielding one step result per
//!   control tick until the goal is reached.
//! - [`controller::Controller`] / [`collision::CollisionOracle`]: the two
//!   capability boundaries satisfied by external collaborators.
//! - [`config`]: construction-time configuration, loadable from TOML.
//!
//! Pure kinematics (poses, wheel conversions, arc integration) live in the
//! `trundle-kinematics` crate and are re-exported here.

pub mod collision;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod navigation;

pub use collision::CollisionOracle;
pub use config::{LoopConfig, ModelConfig, NoiseConfig, SimulationConfig, load_config};
pub use controller::{ControlCommand, Controller};
pub use error::SimulationError;
pub use model::{HistoryEntry, MotionModel, MotionNoise, PoseCovariance};
pub use navigation::{GoalSeeker, StepOutput, homogeneous_transform};
pub use trundle_kinematics::{
    ChassisSpeeds, DifferentialDrive, KinematicsError, Pose, WheelSpeeds,
};
