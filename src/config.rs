//! Simulation configuration.
//!
//! All parameters are fixed at construction time. Configuration can be
//! built in code or loaded from a TOML file via [`load_config`].

use config::{Config, ConfigError, File, FileFormat};
use nalgebra::Matrix2;
use serde::Deserialize;
use tracing::{error, info};
use trundle_kinematics::{DEFAULT_OMEGA_EPSILON, Pose};

use crate::error::SimulationError;

fn default_omega_epsilon() -> f64 {
    DEFAULT_OMEGA_EPSILON
}

fn default_goal_tolerance() -> f64 {
    1e-3
}

fn default_time_step() -> f64 {
    1.0
}

/// Per-step actuation noise over the `(v, w)` command, as a symmetric 2×2
/// covariance. `vw_cov` defaults to zero, giving the diagonal form
/// `[[v_var, 0], [0, w_var]]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct NoiseConfig {
    /// Variance of the linear velocity command ((m/s)²).
    pub v_var: f64,
    /// Variance of the angular velocity command ((rad/s)²).
    pub w_var: f64,
    /// Covariance between the two commands (default 0).
    #[serde(default)]
    pub vw_cov: f64,
}

impl NoiseConfig {
    /// The noise as a 2×2 covariance matrix.
    pub fn to_matrix(&self) -> Matrix2<f64> {
        Matrix2::new(self.v_var, self.vw_cov, self.vw_cov, self.w_var)
    }
}

/// Motion-model configuration: robot geometry, start pose, and the optional
/// actuation-noise model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Distance between the two drive wheels (m). Must be positive.
    pub wheel_separation: f64,
    /// Wheel radius (m). Must be positive. Not used by the unicycle
    /// integration itself; validated because it defines the physical robot.
    pub wheel_radius: f64,
    /// Initial pose (defaults to the world origin).
    #[serde(default)]
    pub start_pose: Pose,
    /// Actuation noise. Absent disables uncertainty tracking entirely.
    #[serde(default)]
    pub motion_noise: Option<NoiseConfig>,
    /// Angular-rate threshold (rad/s) below which a step is integrated as a
    /// straight line.
    #[serde(default = "default_omega_epsilon")]
    pub omega_epsilon: f64,
}

impl ModelConfig {
    /// Checks the invariants that cannot be expressed in the type system.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` for non-positive
    /// geometry, a negative branch threshold, or a noise matrix that is not
    /// positive semi-definite.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.wheel_separation <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(
                "wheel separation must be positive",
            ));
        }
        if self.wheel_radius <= 0.0 {
            return Err(SimulationError::InvalidConfiguration("wheel radius must be positive"));
        }
        if self.omega_epsilon < 0.0 {
            return Err(SimulationError::InvalidConfiguration(
                "omega epsilon must be non-negative",
            ));
        }
        if let Some(noise) = &self.motion_noise {
            if noise.v_var < 0.0 || noise.w_var < 0.0 {
                return Err(SimulationError::InvalidConfiguration(
                    "noise variances must be non-negative",
                ));
            }
            if noise.vw_cov * noise.vw_cov > noise.v_var * noise.w_var {
                return Err(SimulationError::InvalidConfiguration(
                    "noise covariance must keep the matrix positive semi-definite",
                ));
            }
        }
        Ok(())
    }
}

/// Goal-seeking loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LoopConfig {
    /// Distance (m) to the goal below which the loop terminates.
    #[serde(default = "default_goal_tolerance")]
    pub goal_tolerance: f64,
    /// Fixed time interval (s) applied per control iteration.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            goal_tolerance: default_goal_tolerance(),
            time_step: default_time_step(),
        }
    }
}

impl LoopConfig {
    /// Checks that the tolerance and time step are positive.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfiguration` otherwise.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.goal_tolerance <= 0.0 {
            return Err(SimulationError::InvalidConfiguration("goal tolerance must be positive"));
        }
        if self.time_step <= 0.0 {
            return Err(SimulationError::InvalidConfiguration("time step must be positive"));
        }
        Ok(())
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Motion-model section.
    pub model: ModelConfig,
    /// Goal-seeking loop section (all fields have defaults).
    #[serde(default)]
    pub control: LoopConfig,
}

impl SimulationConfig {
    /// Validates every section.
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.model.validate()?;
        self.control.validate()
    }
}

/// Loads and deserializes a simulation configuration from a TOML file.
///
/// # Errors
///
/// Returns the underlying `ConfigError` if the file is missing, malformed,
/// or does not match the expected schema. Semantic validation is separate:
/// call [`SimulationConfig::validate`] on the result.
pub fn load_config(path: &str) -> Result<SimulationConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .build();

    match settings.and_then(Config::try_deserialize) {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
