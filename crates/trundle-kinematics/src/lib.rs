#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for 2D differential-drive robot kinematics."]
#![doc = ""]
#![doc = "This crate provides the pose and speed types of a differential-drive robot,"]
#![doc = "forward and inverse wheel kinematics, and exact constant-twist (arc) pose"]
#![doc = "integration with an explicit straight-line fallback for near-zero angular rates."]

use core::f64::consts::PI;
use core::fmt;
use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// Default angular-rate threshold (rad/s) below which motion is integrated
/// as a straight line instead of an arc.
///
/// At this magnitude the arc form `R·(sin(θ+ωΔt) − sin θ)` loses roughly
/// seven significant digits to cancellation, which is still far below any
/// useful simulation tolerance, so the crossover is smooth.
pub const DEFAULT_OMEGA_EPSILON: f64 = 1e-9;

/// A 2‑D pose `(x, y, θ)` in meters and radians (θ measured counter‑clockwise
/// from the x‑axis in the world frame).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position (m).
    pub x: f64,
    /// World‑frame y position (m).
    pub y: f64,
    /// Heading (rad), normalized to `[-PI, PI)`.
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position in meters.
    /// * `y`: World-frame y position in meters.
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`.
    ///
    /// # Arguments
    ///
    /// * `angle`: The angle in radians to normalize.
    ///
    /// # Returns
    ///
    /// The normalized angle in radians.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }

    /// Euclidean distance from this pose's position to another's.
    ///
    /// Heading is ignored; only the `(x, y)` offset contributes.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        libm::hypot(other.x - self.x, other.y - self.y)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, θ: {:.2} rad)", self.x, self.y, self.theta)
    }
}

/// Linear and angular chassis velocities.
/// These represent the overall motion of the robot's chassis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Linear speed of the chassis center (m/s).
    pub v: f64,
    /// Angular speed of the chassis (rad/s).
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct chassis speeds.
    ///
    /// # Arguments
    ///
    /// * `v`: Linear speed of the chassis center (m/s).
    /// * `omega`: Angular speed of the chassis (rad/s).
    pub const fn new(v: f64, omega: f64) -> Self {
        ChassisSpeeds { v, omega }
    }
}

impl fmt::Display for ChassisSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v: {:.2} m/s, ω: {:.2} rad/s)", self.v, self.omega)
    }
}

/// Left and right wheel angular velocities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    /// Left wheel angular velocity (rad/s).
    pub omega_l: f64,
    /// Right wheel angular velocity (rad/s).
    pub omega_r: f64,
}

impl WheelSpeeds {
    /// Construct wheel speeds.
    ///
    /// # Arguments
    ///
    /// * `omega_l`: Left wheel angular velocity (rad/s).
    /// * `omega_r`: Right wheel angular velocity (rad/s).
    pub const fn new(omega_l: f64, omega_r: f64) -> Self {
        WheelSpeeds { omega_l, omega_r }
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ωL: {:.2} rad/s, ωR: {:.2} rad/s)", self.omega_l, self.omega_r)
    }
}

/// Differential‑drive kinematics helper.
///
/// This struct encapsulates the physical parameters of a differential-drive
/// robot (wheel radius and wheel separation) and provides methods for
/// kinematic calculations and pose integration. The wheel geometry is not
/// used by the unicycle-equivalent integration itself; it defines the
/// physical footprint and the wheel-speed conversions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    /// Wheel radius (m).
    wheel_radius: f64,
    /// Distance between the two drive wheels (m).
    wheel_separation: f64,
    /// Angular-rate threshold (rad/s) for the straight-line branch.
    omega_epsilon: f64,
}

impl DifferentialDrive {
    /// Construct a new differential‑drive kinematics helper.
    ///
    /// # Arguments
    ///
    /// * `wheel_radius`: The radius of the robot's wheels in meters.
    /// * `wheel_separation`: The distance between the centers of the two drive wheels in meters.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidWheelRadius)` if `wheel_radius` is not positive.
    /// Returns `Err(KinematicsError::InvalidWheelSeparation)` if `wheel_separation` is not positive.
    pub const fn new(wheel_radius: f64, wheel_separation: f64) -> Result<Self, KinematicsError> {
        if wheel_radius <= 0.0 {
            return Err(KinematicsError::InvalidWheelRadius("must be positive"));
        }
        if wheel_separation <= 0.0 {
            return Err(KinematicsError::InvalidWheelSeparation("must be positive"));
        }
        Ok(DifferentialDrive {
            wheel_radius,
            wheel_separation,
            omega_epsilon: DEFAULT_OMEGA_EPSILON,
        })
    }

    /// Override the angular-rate threshold below which `update_pose`
    /// integrates motion as a straight line.
    ///
    /// The magnitude of the threshold is used; see [`DEFAULT_OMEGA_EPSILON`]
    /// for the default and its rationale.
    pub fn with_omega_epsilon(mut self, omega_epsilon: f64) -> Self {
        self.omega_epsilon = omega_epsilon.abs();
        self
    }

    /// Returns the wheel radius.
    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    /// Returns the wheel separation.
    pub fn wheel_separation(&self) -> f64 {
        self.wheel_separation
    }

    /// Returns the straight-line angular-rate threshold.
    pub fn omega_epsilon(&self) -> f64 {
        self.omega_epsilon
    }

    /// Returns the approximate collision footprint radius: half the wheel
    /// separation.
    pub fn collision_radius(&self) -> f64 {
        self.wheel_separation / 2.0
    }

    /// Calculates the robot's chassis speeds (linear and angular velocity)
    /// from the wheel speeds. This is the forward kinematics problem.
    ///
    /// # Arguments
    ///
    /// * `wheel_speeds`: The measured or commanded angular velocities of the left and right wheels.
    ///
    /// # Returns
    ///
    /// The resulting linear and angular velocities of the robot chassis.
    pub fn forward_kinematics(&self, wheel_speeds: WheelSpeeds) -> ChassisSpeeds {
        let v_l = wheel_speeds.omega_l * self.wheel_radius;
        let v_r = wheel_speeds.omega_r * self.wheel_radius;

        let v = (v_r + v_l) / 2.0;
        let omega = (v_r - v_l) / self.wheel_separation;

        ChassisSpeeds::new(v, omega)
    }

    /// Calculates the required wheel speeds to achieve the given chassis speeds.
    /// This is the inverse kinematics problem.
    ///
    /// # Arguments
    ///
    /// * `chassis_speeds`: The desired linear and angular velocities of the robot chassis.
    ///
    /// # Returns
    ///
    /// The required angular velocities for the left and right wheels.
    pub fn inverse_kinematics(&self, chassis_speeds: ChassisSpeeds) -> WheelSpeeds {
        let v_r = chassis_speeds.v + chassis_speeds.omega * (self.wheel_separation / 2.0);
        let v_l = chassis_speeds.v - chassis_speeds.omega * (self.wheel_separation / 2.0);

        let omega_r = v_r / self.wheel_radius;
        let omega_l = v_l / self.wheel_radius;

        WheelSpeeds::new(omega_l, omega_r)
    }

    /// Updates the robot's pose given its current pose, chassis speeds, and
    /// time delta.
    ///
    /// Integration is exact for constant speeds over `dt`: when `|ω|` exceeds
    /// the configured threshold the robot follows a circular arc of signed
    /// radius `R = v/ω`, otherwise it moves along its current heading. The
    /// exact-arc form avoids the heading-dependent drift a first-order Euler
    /// step accumulates on curved paths. The final heading is normalized to
    /// `[-PI, PI)`.
    ///
    /// # Arguments
    ///
    /// * `current_pose`: The robot's current pose `(x, y, theta)`.
    /// * `chassis_speeds`: The robot's current linear and angular chassis speeds.
    /// * `dt`: The time delta in seconds over which the speeds are applied.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidTimeStep)` if `dt` is not positive.
    ///
    /// # Returns
    ///
    /// The robot's new estimated pose.
    pub fn update_pose(
        &self,
        current_pose: Pose,
        chassis_speeds: ChassisSpeeds,
        dt: f64,
    ) -> Result<Pose, KinematicsError> {
        if dt <= 0.0 {
            return Err(KinematicsError::InvalidTimeStep("must be positive"));
        }

        let ChassisSpeeds { v, omega } = chassis_speeds;
        let theta = current_pose.theta;

        let (delta_x, delta_y, delta_theta) = if omega.abs() <= self.omega_epsilon {
            (v * cos(theta) * dt, v * sin(theta) * dt, 0.0)
        } else {
            let r = v / omega;
            let delta_theta = omega * dt;
            (
                r * (sin(theta + delta_theta) - sin(theta)),
                -r * (cos(theta + delta_theta) - cos(theta)),
                delta_theta,
            )
        };

        Ok(Pose {
            x: current_pose.x + delta_x,
            y: current_pose.y + delta_y,
            theta: Pose::normalize_angle(theta + delta_theta),
        })
    }

    /// Convenience function to update pose directly from wheel speeds and dt.
    ///
    /// This method first calculates chassis speeds using `forward_kinematics`
    /// and then calls `update_pose`.
    ///
    /// # Arguments
    ///
    /// * `current_pose`: The robot's current pose `(x, y, theta)`.
    /// * `wheel_speeds`: The measured or commanded angular velocities of the left and right wheels.
    /// * `dt`: The time delta in seconds over which the speeds are applied.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidTimeStep)` if `dt` is not positive (propagated from `update_pose`).
    ///
    /// # Returns
    ///
    /// The robot's new estimated pose.
    pub fn update_pose_from_wheel_speeds(
        &self,
        current_pose: Pose,
        wheel_speeds: WheelSpeeds,
        dt: f64,
    ) -> Result<Pose, KinematicsError> {
        let chassis_speeds = self.forward_kinematics(wheel_speeds);
        self.update_pose(current_pose, chassis_speeds, dt)
    }
}

impl fmt::Display for DifferentialDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DifferentialDrive (r: {:.2} m, d: {:.2} m)",
            self.wheel_radius, self.wheel_separation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_pose_normalization() {
        assert!((Pose::normalize_angle(0.0) - 0.0).abs() < EPSILON);
        assert!((Pose::normalize_angle(PI) - (-PI)).abs() < EPSILON); // PI should map to -PI for [-PI, PI)
        assert!((Pose::normalize_angle(PI - EPSILON) - (PI - EPSILON)).abs() < EPSILON);
        assert!((Pose::normalize_angle(-PI) - -PI).abs() < EPSILON);
        assert!((Pose::normalize_angle(3.0 * PI) - (-PI)).abs() < EPSILON); // 3*PI maps to PI, then to -PI
        assert!((Pose::normalize_angle(2.5 * PI) - 0.5 * PI).abs() < EPSILON);
        assert!((Pose::normalize_angle(-2.5 * PI) - -0.5 * PI).abs() < EPSILON);
        assert!((Pose::normalize_angle(-3.0 * PI) - -PI).abs() < EPSILON);
    }

    #[test]
    fn test_pose_distance() {
        let a = Pose::new(0.0, 0.0, 0.0);
        let b = Pose::new(3.0, 4.0, 1.0);
        assert!((a.distance_to(&b) - 5.0).abs() < EPSILON);
        assert!((b.distance_to(&a) - 5.0).abs() < EPSILON);
        assert!((a.distance_to(&a) - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_kinematics_constructor() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap();
        assert_eq!(kinematics.wheel_radius, 0.1);
        assert_eq!(kinematics.wheel_separation, 0.5);
        assert_eq!(kinematics.wheel_radius(), 0.1); // Test getter
        assert_eq!(kinematics.wheel_separation(), 0.5); // Test getter
        assert_eq!(kinematics.omega_epsilon(), DEFAULT_OMEGA_EPSILON);
        assert_eq!(kinematics.collision_radius(), 0.25);
    }

    #[test]
    fn test_constructor_invalid_radius() {
        let result = DifferentialDrive::new(0.0, 0.5);
        assert!(matches!(result, Err(KinematicsError::InvalidWheelRadius("must be positive"))));
        let result_negative = DifferentialDrive::new(-0.1, 0.5);
        assert!(matches!(
            result_negative,
            Err(KinematicsError::InvalidWheelRadius("must be positive"))
        ));
    }

    #[test]
    fn test_constructor_invalid_separation() {
        let result = DifferentialDrive::new(0.1, 0.0);
        assert!(matches!(
            result,
            Err(KinematicsError::InvalidWheelSeparation("must be positive"))
        ));
        let result_negative = DifferentialDrive::new(0.1, -0.5);
        assert!(matches!(
            result_negative,
            Err(KinematicsError::InvalidWheelSeparation("must be positive"))
        ));
    }

    #[test]
    fn test_forward_kinematics_straight() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap(); // r=0.1m, d=0.5m
        let wheel_speeds = WheelSpeeds::new(10.0, 10.0); // Both wheels 10 rad/s
        // v_l = 10 * 0.1 = 1 m/s
        // v_r = 10 * 0.1 = 1 m/s
        // v = (1 + 1) / 2 = 1 m/s
        // omega = (1 - 1) / 0.5 = 0 rad/s
        let chassis_speeds = kinematics.forward_kinematics(wheel_speeds);
        assert!((chassis_speeds.v - 1.0).abs() < EPSILON);
        assert!((chassis_speeds.omega - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_forward_kinematics_pivot_turn() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap(); // r=0.1m, d=0.5m
        let wheel_speeds = WheelSpeeds::new(-5.0, 5.0); // Left -5 rad/s, Right 5 rad/s
        // v_l = -5 * 0.1 = -0.5 m/s
        // v_r = 5 * 0.1 = 0.5 m/s
        // v = (0.5 + (-0.5)) / 2 = 0 m/s
        // omega = (0.5 - (-0.5)) / 0.5 = 2 rad/s
        let chassis_speeds = kinematics.forward_kinematics(wheel_speeds);
        assert!((chassis_speeds.v - 0.0).abs() < EPSILON);
        assert!((chassis_speeds.omega - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_inverse_kinematics_round_trip() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap();
        let chassis_speeds = ChassisSpeeds::new(0.75, 1.0);
        // v_r = 0.75 + 1.0 * 0.25 = 1.0 -> omega_r = 10.0 rad/s
        // v_l = 0.75 - 1.0 * 0.25 = 0.5 -> omega_l = 5.0 rad/s
        let wheel_speeds = kinematics.inverse_kinematics(chassis_speeds);
        assert!((wheel_speeds.omega_l - 5.0).abs() < EPSILON);
        assert!((wheel_speeds.omega_r - 10.0).abs() < EPSILON);

        let recovered = kinematics.forward_kinematics(wheel_speeds);
        assert!((recovered.v - chassis_speeds.v).abs() < EPSILON);
        assert!((recovered.omega - chassis_speeds.omega).abs() < EPSILON);
    }

    #[test]
    fn test_update_pose_straight_exactness() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap();
        // Straight-line motion must be exact for arbitrary headings.
        for &theta in &[0.0, PI / 6.0, PI / 2.0, -PI / 2.0, 2.0, -3.0] {
            let current_pose = Pose::new(1.0, -2.0, theta);
            let chassis_speeds = ChassisSpeeds::new(0.7, 0.0);
            let dt = 3.0;

            let new_pose = kinematics.update_pose(current_pose, chassis_speeds, dt).unwrap();
            assert!((new_pose.x - (1.0 + 0.7 * 3.0 * cos(theta))).abs() < EPSILON);
            assert!((new_pose.y - (-2.0 + 0.7 * 3.0 * sin(theta))).abs() < EPSILON);
            assert!((new_pose.theta - Pose::normalize_angle(theta)).abs() < EPSILON);
        }
    }

    #[test]
    fn test_update_pose_quarter_arc() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap();
        let current_pose = Pose::new(0.0, 0.0, 0.0);
        let chassis_speeds = ChassisSpeeds::new(1.0, 1.0); // R = 1
        let dt = PI / 2.0; // quarter turn

        // Expected: x = R*(sin(PI/2) - sin(0)) = 1
        //           y = -R*(cos(PI/2) - cos(0)) = 1
        //           theta = PI/2
        let new_pose = kinematics.update_pose(current_pose, chassis_speeds, dt).unwrap();
        assert!((new_pose.x - 1.0).abs() < EPSILON);
        assert!((new_pose.y - 1.0).abs() < EPSILON);
        assert!((new_pose.theta - PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_update_pose_full_circle_closure() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap();
        let start = Pose::new(0.3, -0.7, 0.4);
        let chassis_speeds = ChassisSpeeds::new(1.0, 0.5);
        let dt = 4.0 * PI; // omega * dt = 2*PI, one full revolution

        let new_pose = kinematics.update_pose(start, chassis_speeds, dt).unwrap();
        assert!((new_pose.x - start.x).abs() < EPSILON);
        assert!((new_pose.y - start.y).abs() < EPSILON);
        assert!((new_pose.theta - start.theta).abs() < EPSILON);
    }

    #[test]
    fn test_update_pose_pivot_turn_no_translation() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap();
        let current_pose = Pose::new(0.0, 0.0, 0.0);
        let chassis_speeds = ChassisSpeeds::new(0.0, PI / 2.0); // 0 m/s, PI/2 rad/s
        let dt = 1.0;

        // R = 0, the robot spins in place
        let new_pose = kinematics.update_pose(current_pose, chassis_speeds, dt).unwrap();
        assert!((new_pose.x - 0.0).abs() < EPSILON);
        assert!((new_pose.y - 0.0).abs() < EPSILON);
        assert!((new_pose.theta - PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_update_pose_branch_continuity() {
        // Poses produced just inside and just outside the straight-line
        // threshold must be close: the epsilon branch may not introduce a
        // discontinuity.
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap().with_omega_epsilon(1e-7);
        let current_pose = Pose::new(0.0, 0.0, 0.8);
        let dt = 1.0;

        let straight = kinematics
            .update_pose(current_pose, ChassisSpeeds::new(1.0, 5e-8), dt)
            .unwrap();
        let curved = kinematics
            .update_pose(current_pose, ChassisSpeeds::new(1.0, 2e-7), dt)
            .unwrap();

        assert!((straight.x - curved.x).abs() < 1e-6);
        assert!((straight.y - curved.y).abs() < 1e-6);
        assert!((straight.theta - curved.theta).abs() < 1e-6);
    }

    #[test]
    fn test_update_pose_invalid_dt() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap();
        let current_pose = Pose::new(0.0, 0.0, 0.0);
        let chassis_speeds = ChassisSpeeds::new(1.0, 0.0);
        let result = kinematics.update_pose(current_pose, chassis_speeds, -0.1);
        assert!(matches!(result, Err(KinematicsError::InvalidTimeStep("must be positive"))));
        let result_zero = kinematics.update_pose(current_pose, chassis_speeds, 0.0);
        assert!(matches!(result_zero, Err(KinematicsError::InvalidTimeStep("must be positive"))));
    }

    #[test]
    fn test_update_pose_from_wheel_speeds_straight() {
        let kinematics = DifferentialDrive::new(0.1, 0.5).unwrap(); // r=0.1m, d=0.5m
        let current_pose = Pose::new(0.0, 0.0, 0.0);
        let wheel_speeds = WheelSpeeds::new(10.0, 10.0); // Both wheels 10 rad/s => v=1m/s, omega=0rad/s
        let dt = 1.0;

        let new_pose =
            kinematics.update_pose_from_wheel_speeds(current_pose, wheel_speeds, dt).unwrap();
        assert!((new_pose.x - 1.0).abs() < EPSILON);
        assert!((new_pose.y - 0.0).abs() < EPSILON);
        assert!((new_pose.theta - 0.0).abs() < EPSILON);
    }
}
