//! One play session: engine, latest input, and the countdown
//!
//! The host owns a `GameSession`, feeds it raw input as it arrives, and calls
//! [`GameSession::frame`] once per display refresh. Input is sampled at frame
//! time, never queued.

use glam::DVec2;

use super::ball::Ball;
use super::engine::{LoopState, PhysicsEngine, SimObserver};
use super::force::{Key, KeyState};
use super::geometry::GeometryProvider;
use crate::settings::Settings;

/// Which input drives the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Tilt,
    Keyboard,
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for `begin`
    Ready,
    Playing,
    Paused,
    Won,
    TimedOut,
}

pub struct GameSession<G: GeometryProvider> {
    engine: PhysicsEngine<G>,
    mode: InputMode,
    keys: KeyState,
    /// Latest (beta, gamma) from the orientation sensor
    orientation: Option<(f64, f64)>,
    phase: SessionPhase,
    time_limit: f64,
    /// Countdown left at the last frame (seconds)
    remaining: f64,
    last_frame: f64,
}

impl<G: GeometryProvider> GameSession<G> {
    /// Build a session whose ball starts at `start`
    pub fn new(geometry: G, start: DVec2, settings: &Settings) -> Result<Self, String> {
        settings.validate()?;
        let mut engine = PhysicsEngine::new(geometry, settings);
        let ball = Ball::new(start, settings.ball_radius, settings.ball, engine.arena())?;
        engine.set_ball(ball);

        Ok(Self {
            engine,
            mode: InputMode::default(),
            keys: KeyState::default(),
            orientation: None,
            phase: SessionPhase::Ready,
            time_limit: settings.time_limit_secs,
            remaining: settings.time_limit_secs,
            last_frame: 0.0,
        })
    }

    pub fn engine(&self) -> &PhysicsEngine<G> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PhysicsEngine<G> {
        &mut self.engine
    }

    pub fn subscribe(&mut self, observer: impl SimObserver + 'static) {
        self.engine.subscribe(observer);
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    pub fn time_remaining(&self) -> f64 {
        self.remaining
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            log::info!("Input mode: {:?}", mode);
            self.mode = mode;
        }
    }

    /// Latest orientation reading (degrees)
    pub fn set_orientation(&mut self, beta: f64, gamma: f64) {
        self.orientation = Some((beta, gamma));
    }

    pub fn key_down(&mut self, key: Key) {
        self.keys.press(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys.release(key);
    }

    /// Key event by host name; ignores keys that do not steer
    pub fn key_event(&mut self, name: &str, pressed: bool) -> bool {
        match Key::from_name(name) {
            Some(key) if pressed => self.key_down(key),
            Some(key) => self.key_up(key),
            None => return false,
        }
        true
    }

    /// Treat the current device orientation as level
    pub fn calibrate(&mut self) {
        if let Some((beta, gamma)) = self.orientation {
            let force = self.engine.force_source_mut();
            force.tilt_force(beta, gamma);
            force.calibrate();
        }
    }

    pub fn begin(&mut self, now: f64) {
        if self.phase != SessionPhase::Ready {
            return;
        }
        self.remaining = self.time_limit;
        self.last_frame = now;
        self.engine.start(now);
        self.phase = SessionPhase::Playing;
    }

    /// Withhold ticks; the countdown freezes too
    pub fn pause(&mut self) {
        if self.phase == SessionPhase::Playing {
            self.engine.stop();
            self.keys.release_all();
            self.phase = SessionPhase::Paused;
        }
    }

    pub fn resume(&mut self, now: f64) {
        if self.phase == SessionPhase::Paused {
            self.last_frame = now;
            self.engine.resume(now);
            self.phase = SessionPhase::Playing;
        }
    }

    /// Fresh attempt: everything back to its start, countdown refilled
    pub fn restart(&mut self, now: f64) {
        self.engine.stop();
        self.engine.reset();
        self.keys.release_all();
        self.phase = SessionPhase::Ready;
        self.begin(now);
    }

    /// Re-read geometry after the host resized the arena
    pub fn resize(&mut self) {
        self.engine.resize();
    }

    /// Sample input, advance the simulation, and update the countdown
    pub fn frame(&mut self, now: f64) -> SessionPhase {
        if self.phase != SessionPhase::Playing {
            return self.phase;
        }

        match self.mode {
            InputMode::Tilt => {
                let (beta, gamma) = self.orientation.unwrap_or((0.0, 0.0));
                self.engine.update_gravity(beta, gamma);
            }
            InputMode::Keyboard => self.engine.update_gravity_from_keys(&self.keys),
        }

        self.engine.tick(now);

        if self.engine.state() == LoopState::Reached {
            self.phase = SessionPhase::Won;
            log::info!("Won with {:.1}s left", self.remaining);
            return self.phase;
        }

        self.remaining = (self.remaining - (now - self.last_frame).max(0.0)).max(0.0);
        self.last_frame = now;
        if self.remaining <= 0.0 {
            self.engine.stop();
            self.phase = SessionPhase::TimedOut;
            log::info!("Time is up");
        }

        self.phase
    }
}
