//! Arena geometry: obstacles, goal and the provider interface
//!
//! Whatever draws the arena (canvas, native view, terminal) implements
//! [`GeometryProvider`] and hands back plain value types in arena-local pixels.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::ObstacleMotion;

/// Arena dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArenaSize {
    pub width: f64,
    pub height: f64,
}

impl ArenaSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Circle in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }
}

/// Source of arena layout, queried on construction and on every resize
pub trait GeometryProvider {
    fn arena_size(&self) -> ArenaSize;
    fn obstacles(&self) -> Vec<Rect>;
    /// `None` when the layout has no goal; goal checks are then skipped
    fn goal(&self) -> Option<Circle>;
}

/// A moving rectangular obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Current top-left corner
    pub origin: DVec2,
    pub size: DVec2,
    /// Top-left corner at rest
    pub original_origin: DVec2,
    /// Phase rate (radians/sec)
    pub move_speed: f64,
    /// +1 or -1
    pub move_direction: f64,
    /// Sway amplitude (pixels)
    pub move_radius: f64,
}

impl Obstacle {
    /// A stationary obstacle
    pub fn fixed(rect: Rect) -> Self {
        let origin = DVec2::new(rect.x, rect.y);
        Self {
            origin,
            size: DVec2::new(rect.w.max(0.0), rect.h.max(0.0)),
            original_origin: origin,
            move_speed: 0.0,
            move_direction: 1.0,
            move_radius: 0.0,
        }
    }

    /// Obstacle with sway parameters drawn from `rng`
    pub fn with_motion(rect: Rect, motion: &ObstacleMotion, rng: &mut Pcg32) -> Self {
        let mut obstacle = Self::fixed(rect);
        obstacle.move_speed = sample(rng, motion.min_speed, motion.max_speed);
        obstacle.move_radius = sample(rng, motion.min_radius, motion.max_radius);
        obstacle.move_direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        obstacle
    }

    pub fn center(&self) -> DVec2 {
        self.origin + self.size / 2.0
    }

    pub fn min(&self) -> DVec2 {
        self.origin
    }

    pub fn max(&self) -> DVec2 {
        self.origin + self.size
    }

    /// Offset from rest at `elapsed` seconds since the loop started.
    /// Zero at `elapsed == 0`.
    pub fn offset_at(&self, elapsed: f64) -> DVec2 {
        let theta = elapsed * self.move_speed;
        DVec2::new(theta.sin() * self.move_direction, (theta * 0.7).sin()) * self.move_radius
    }

    /// Place the obstacle for the given wall-clock phase
    pub fn update_motion(&mut self, elapsed: f64) {
        self.origin = self.original_origin + self.offset_at(elapsed);
    }

    pub fn reset(&mut self) {
        self.origin = self.original_origin;
    }
}

/// Draw from `[min, max)`; a bad or empty range falls back to `min`,
/// itself clamped to a finite, non-negative value
fn sample(rng: &mut Pcg32, min: f64, max: f64) -> f64 {
    let min = if min.is_finite() { min.max(0.0) } else { 0.0 };
    if max.is_finite() && max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// The target circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub center: DVec2,
    pub radius: f64,
}

impl From<Circle> for Goal {
    fn from(c: Circle) -> Self {
        Self {
            center: DVec2::new(c.x, c.y),
            radius: c.radius.max(0.0),
        }
    }
}

/// Build the obstacle list for one layout. Same seed, same sway.
pub fn build_obstacles(rects: &[Rect], motion: &ObstacleMotion, seed: u64) -> Vec<Obstacle> {
    let mut rng = Pcg32::seed_from_u64(seed);
    rects
        .iter()
        .map(|r| Obstacle::with_motion(*r, motion, &mut rng))
        .collect()
}

/// Static level description, typically loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub arena: ArenaSize,
    /// Ball start position
    pub start: (f64, f64),
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    #[serde(default)]
    pub goal: Option<Circle>,
}

impl Layout {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let layout: Layout =
            serde_json::from_str(json).map_err(|e| format!("invalid layout: {e}"))?;
        if !(layout.arena.width > 0.0 && layout.arena.height > 0.0) {
            return Err("arena width and height must be > 0".to_string());
        }
        Ok(layout)
    }

    pub fn start_position(&self) -> DVec2 {
        DVec2::new(self.start.0, self.start.1)
    }

    /// Same layout in a differently sized arena, scaling all geometry
    pub fn scaled_to(&self, arena: ArenaSize) -> Self {
        let sx = arena.width / self.arena.width;
        let sy = arena.height / self.arena.height;
        Self {
            arena,
            start: (self.start.0 * sx, self.start.1 * sy),
            obstacles: self
                .obstacles
                .iter()
                .map(|r| Rect::new(r.x * sx, r.y * sy, r.w * sx, r.h * sy))
                .collect(),
            goal: self
                .goal
                .map(|g| Circle::new(g.x * sx, g.y * sy, g.radius * sx.min(sy))),
        }
    }
}

impl GeometryProvider for Layout {
    fn arena_size(&self) -> ArenaSize {
        self.arena
    }

    fn obstacles(&self) -> Vec<Rect> {
        self.obstacles.clone()
    }

    fn goal(&self) -> Option<Circle> {
        self.goal
    }
}
