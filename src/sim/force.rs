//! Input to force mapping
//!
//! Turns device orientation angles or directional key states into a
//! normalized force vector, each axis in [-1, 1]. The only state kept between
//! frames is the last raw orientation and the calibration offsets.

use glam::DVec2;

use crate::consts::{MAX_SENSITIVITY, MAX_TILT_DEGREES};

/// One of the eight steering keys (arrows and WASD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
}

impl Key {
    /// Parse a key name as reported by the host (`"ArrowUp"`, `"w"`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "w" | "W" => Some(Key::W),
            "a" | "A" => Some(Key::A),
            "s" | "S" => Some(Key::S),
            "d" | "D" => Some(Key::D),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Pressed/released state of the steering keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    pressed: u8,
}

impl KeyState {
    pub fn press(&mut self, key: Key) {
        self.pressed |= key.bit();
    }

    pub fn release(&mut self, key: Key) {
        self.pressed &= !key.bit();
    }

    pub fn release_all(&mut self) {
        self.pressed = 0;
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed & key.bit() != 0
    }

    pub fn up(&self) -> bool {
        self.is_pressed(Key::ArrowUp) || self.is_pressed(Key::W)
    }

    pub fn down(&self) -> bool {
        self.is_pressed(Key::ArrowDown) || self.is_pressed(Key::S)
    }

    pub fn left(&self) -> bool {
        self.is_pressed(Key::ArrowLeft) || self.is_pressed(Key::A)
    }

    pub fn right(&self) -> bool {
        self.is_pressed(Key::ArrowRight) || self.is_pressed(Key::D)
    }
}

/// Raw input snapshot sampled at tick time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    /// Orientation angles in degrees: `beta` front/back, `gamma` left/right
    Tilt { beta: f64, gamma: f64 },
    Keys(KeyState),
}

/// Maps raw input to a normalized force
#[derive(Debug, Clone)]
pub struct ForceSource {
    tilt_sensitivity: f64,
    key_sensitivity: f64,
    /// Last raw (beta, gamma) seen, used by `calibrate`
    raw: DVec2,
    /// Calibration offsets (beta, gamma)
    offset: DVec2,
}

impl ForceSource {
    pub fn new(tilt_sensitivity: f64, key_sensitivity: f64) -> Self {
        Self {
            tilt_sensitivity: clamp_sensitivity(tilt_sensitivity),
            key_sensitivity: clamp_sensitivity(key_sensitivity),
            raw: DVec2::ZERO,
            offset: DVec2::ZERO,
        }
    }

    pub fn tilt_sensitivity(&self) -> f64 {
        self.tilt_sensitivity
    }

    pub fn key_sensitivity(&self) -> f64 {
        self.key_sensitivity
    }

    /// Current calibration offsets as (beta, gamma)
    pub fn calibration(&self) -> (f64, f64) {
        (self.offset.x, self.offset.y)
    }

    /// Treat the most recent orientation as neutral from now on
    pub fn calibrate(&mut self) {
        self.offset = self.raw;
        log::info!(
            "Calibrated tilt: beta={:.1} gamma={:.1}",
            self.offset.x,
            self.offset.y
        );
    }

    pub fn clear_calibration(&mut self) {
        self.offset = DVec2::ZERO;
    }

    pub fn compute_force(&mut self, input: &RawInput) -> DVec2 {
        match *input {
            RawInput::Tilt { beta, gamma } => self.tilt_force(beta, gamma),
            RawInput::Keys(keys) => self.key_force(&keys),
        }
    }

    /// Force from orientation angles (degrees). Caches the raw reading.
    pub fn tilt_force(&mut self, beta: f64, gamma: f64) -> DVec2 {
        let beta = finite_or_zero(beta);
        let gamma = finite_or_zero(gamma);
        self.raw = DVec2::new(beta, gamma);

        let x = normalize_tilt(gamma - self.offset.y);
        let y = normalize_tilt(beta - self.offset.x);
        (DVec2::new(x, y) * self.tilt_sensitivity).clamp(DVec2::NEG_ONE, DVec2::ONE)
    }

    /// Force from key states; opposing keys cancel
    pub fn key_force(&self, keys: &KeyState) -> DVec2 {
        let mut dir = DVec2::ZERO;
        if keys.left() {
            dir.x -= 1.0;
        }
        if keys.right() {
            dir.x += 1.0;
        }
        if keys.up() {
            dir.y -= 1.0;
        }
        if keys.down() {
            dir.y += 1.0;
        }
        (dir * self.key_sensitivity).clamp(DVec2::NEG_ONE, DVec2::ONE)
    }
}

#[inline]
fn normalize_tilt(degrees: f64) -> f64 {
    degrees.clamp(-MAX_TILT_DEGREES, MAX_TILT_DEGREES) / MAX_TILT_DEGREES
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn clamp_sensitivity(s: f64) -> f64 {
    if s.is_finite() {
        s.clamp(0.0, MAX_SENSITIVITY)
    } else {
        0.0
    }
}
