//! Game tuning and input profile
//!
//! Loaded from JSON so levels and devices can be tuned without a rebuild.
//! Missing fields fall back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::BallParams;

/// Input hardware profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Phone or tablet held in the hands
    #[default]
    Handheld,
    /// Device with orientation sensors but a fixed display
    FixedScreen,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Handheld => "handheld",
            Profile::FixedScreen => "fixed_screen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "handheld" | "mobile" => Some(Profile::Handheld),
            "fixed_screen" | "fixed" | "desktop" => Some(Profile::FixedScreen),
            _ => None,
        }
    }
}

/// Tilt/keyboard sensitivities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensitivity {
    pub handheld: f64,
    pub fixed_screen: f64,
    pub keyboard: f64,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            handheld: HANDHELD_SENSITIVITY,
            fixed_screen: FIXED_SCREEN_SENSITIVITY,
            keyboard: KEYBOARD_SENSITIVITY,
        }
    }
}

impl Sensitivity {
    /// Tilt sensitivity for the given profile
    pub fn tilt(&self, profile: Profile) -> f64 {
        match profile {
            Profile::Handheld => self.handheld,
            Profile::FixedScreen => self.fixed_screen,
        }
    }
}

/// Ranges for the autonomous obstacle sway
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleMotion {
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
}

impl Default for ObstacleMotion {
    fn default() -> Self {
        Self {
            min_speed: OBSTACLE_MIN_MOVE_SPEED,
            max_speed: OBSTACLE_MAX_MOVE_SPEED,
            min_radius: OBSTACLE_MIN_MOVE_RADIUS,
            max_radius: OBSTACLE_MAX_MOVE_RADIUS,
        }
    }
}

/// Complete tuning document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which tilt preset applies on this device
    pub profile: Profile,
    pub sensitivity: Sensitivity,

    // === Ball ===
    pub ball_radius: f64,
    pub ball: BallParams,

    // === Obstacles ===
    pub obstacle_motion: ObstacleMotion,
    /// Seed for obstacle motion parameters
    pub seed: u64,

    // === Round ===
    /// Countdown per attempt (seconds)
    pub time_limit_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: Profile::Handheld,
            sensitivity: Sensitivity::default(),
            ball_radius: BALL_RADIUS,
            ball: BallParams::default(),
            obstacle_motion: ObstacleMotion::default(),
            seed: 0x7117_ba11,
            time_limit_secs: TIME_LIMIT_SECS,
        }
    }
}

impl Settings {
    /// Defaults with the given input profile
    pub fn from_profile(profile: Profile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Tilt sensitivity for the configured profile
    pub fn tilt_sensitivity(&self) -> f64 {
        self.sensitivity.tilt(self.profile)
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, String> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| format!("invalid settings: {e}"))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("cannot encode settings: {e}"))
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.ball_radius.is_finite() || self.ball_radius <= 0.0 {
            return Err("ball_radius must be finite and > 0".to_string());
        }
        self.ball.validate()?;

        let m = &self.obstacle_motion;
        if !m.min_speed.is_finite() || m.min_speed < 0.0 {
            return Err("obstacle_motion.min_speed must be finite and >= 0".to_string());
        }
        if !m.max_speed.is_finite() || m.max_speed < m.min_speed {
            return Err("obstacle_motion.max_speed must be finite and >= min_speed".to_string());
        }
        if !m.min_radius.is_finite() || m.min_radius < 0.0 {
            return Err("obstacle_motion.min_radius must be finite and >= 0".to_string());
        }
        if !m.max_radius.is_finite() || m.max_radius < m.min_radius {
            return Err("obstacle_motion.max_radius must be finite and >= min_radius".to_string());
        }

        if !self.time_limit_secs.is_finite() || self.time_limit_secs <= 0.0 {
            return Err("time_limit_secs must be finite and > 0".to_string());
        }
        Ok(())
    }
}
