//! Tilt Ball - steer a ball through moving obstacles to the goal
//!
//! Core modules:
//! - `sim`: Motion and collision simulation (force mapping, ball, geometry, loop)
//! - `settings`: Data-driven tuning (serde/JSON)

pub mod settings;
pub mod sim;

pub use settings::{Profile, Settings};

/// Game configuration constants
pub mod consts {
    /// Tilt angles are clamped to this many degrees before normalizing
    pub const MAX_TILT_DEGREES: f64 = 45.0;
    /// Sensitivity on phones/tablets (tilt input)
    pub const HANDHELD_SENSITIVITY: f64 = 1.0;
    /// Sensitivity on fixed screens (laptops with orientation sensors)
    pub const FIXED_SCREEN_SENSITIVITY: f64 = 0.6;
    /// Sensitivity for arrow/WASD keys
    pub const KEYBOARD_SENSITIVITY: f64 = 0.8;
    /// Upper limit for any configured sensitivity
    pub const MAX_SENSITIVITY: f64 = 2.0;

    /// Ball defaults
    pub const BALL_RADIUS: f64 = 12.0;
    pub const BALL_FRICTION: f64 = 0.95;
    pub const BALL_BOUNCE: f64 = 0.6;
    pub const BALL_MAX_SPEED: f64 = 15.0;
    pub const BALL_ACCELERATION: f64 = 0.3;
    /// Velocity components below this magnitude snap to zero
    pub const MIN_VELOCITY: f64 = 0.1;

    /// Fraction of max speed the ball leaves an obstacle with
    pub const OBSTACLE_REBOUND_FACTOR: f64 = 0.8;
    /// Extra gap when pushing the ball clear of an obstacle
    pub const OBSTACLE_PUSH_MARGIN: f64 = 5.0;

    /// Obstacle oscillation ranges (radians/sec, pixels)
    pub const OBSTACLE_MIN_MOVE_SPEED: f64 = 0.5;
    pub const OBSTACLE_MAX_MOVE_SPEED: f64 = 1.5;
    pub const OBSTACLE_MIN_MOVE_RADIUS: f64 = 10.0;
    pub const OBSTACLE_MAX_MOVE_RADIUS: f64 = 30.0;

    /// Countdown per attempt (seconds)
    pub const TIME_LIMIT_SECS: f64 = 30.0;
}
