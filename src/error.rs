//! Error types for the simulation engine.

use thiserror::Error;
use trundle_kinematics::KinematicsError;

/// Errors produced by the simulation engine.
///
/// All errors surface to the immediate caller of a step or to the consumer
/// of the goal-seeking iterator; nothing is swallowed or retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A construction-time or per-step parameter is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// The next kinematic step would enter forbidden geometry.
    ///
    /// The step is not committed: pose, covariance, and history are left
    /// exactly as they were before the call.
    #[error("collision at ({x:.3}, {y:.3}) with footprint radius {radius:.3} m")]
    Collision {
        /// World-frame x position of the rejected pose (m).
        x: f64,
        /// World-frame y position of the rejected pose (m).
        y: f64,
        /// Collision footprint radius used for the query (m).
        radius: f64,
    },

    /// An underlying kinematics calculation failed.
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}
