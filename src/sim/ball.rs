//! The player ball
//!
//! Per-tick integration is unitless (one step per display refresh):
//! friction, then position += velocity, then boundary clamp, then
//! micro-velocity zeroing.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{ArenaSize, Goal, Obstacle};
use crate::consts::*;

/// Ball tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallParams {
    /// Velocity multiplier per tick, in (0, 1)
    pub friction: f64,
    /// Velocity retained on wall hits, in [0, 1]
    pub bounce: f64,
    pub max_speed: f64,
    /// Velocity gained per unit of force per tick
    pub acceleration: f64,
}

impl Default for BallParams {
    fn default() -> Self {
        Self {
            friction: BALL_FRICTION,
            bounce: BALL_BOUNCE,
            max_speed: BALL_MAX_SPEED,
            acceleration: BALL_ACCELERATION,
        }
    }
}

impl BallParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err("ball.friction must be in (0, 1)".to_string());
        }
        if !(0.0..=1.0).contains(&self.bounce) {
            return Err("ball.bounce must be in [0, 1]".to_string());
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err("ball.max_speed must be finite and > 0".to_string());
        }
        if !self.acceleration.is_finite() || self.acceleration <= 0.0 {
            return Err("ball.acceleration must be finite and > 0".to_string());
        }
        Ok(())
    }
}

/// Allowed range for the ball center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    /// Arena minus the ball radius on every side. Collapses to a single
    /// line/point when the arena is smaller than the ball.
    pub fn for_arena(arena: ArenaSize, radius: f64) -> Self {
        let left = radius;
        let top = radius;
        Self {
            left,
            right: (arena.width - radius).max(left),
            top,
            bottom: (arena.height - radius).max(top),
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

#[derive(Debug, Clone)]
pub struct Ball {
    pub pos: DVec2,
    pub vel: DVec2,
    radius: f64,
    start_pos: DVec2,
    bounds: Bounds,
    params: BallParams,
    /// Set while any edge is violated (edge-triggered wall hits)
    colliding: bool,
}

impl Ball {
    pub fn new(
        start_pos: DVec2,
        radius: f64,
        params: BallParams,
        arena: ArenaSize,
    ) -> Result<Self, String> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err("ball radius must be finite and > 0".to_string());
        }
        if !start_pos.is_finite() {
            return Err("ball start position must be finite".to_string());
        }
        params.validate()?;

        Ok(Self {
            pos: start_pos,
            vel: DVec2::ZERO,
            radius,
            start_pos,
            bounds: Bounds::for_arena(arena, radius),
            params,
            colliding: false,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn params(&self) -> &BallParams {
        &self.params
    }

    pub fn start_pos(&self) -> DVec2 {
        self.start_pos
    }

    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    pub fn is_colliding(&self) -> bool {
        self.colliding
    }

    /// Recompute bounds after an arena resize. Position is left alone; the
    /// next `update` pulls it back inside.
    pub fn set_bounds(&mut self, arena: ArenaSize) {
        self.bounds = Bounds::for_arena(arena, self.radius);
    }

    /// Accelerate by `force`, then cap speed at `max_speed`
    pub fn apply_force(&mut self, force: DVec2) {
        self.vel += force * self.params.acceleration;

        let speed = self.vel.length();
        if speed > self.params.max_speed {
            self.vel = self.vel / speed * self.params.max_speed;
        }
    }

    /// Advance one tick. Returns true when a wall-collision episode starts.
    pub fn update(&mut self) -> bool {
        self.vel *= self.params.friction;
        self.pos += self.vel;

        let hit = self.check_boundaries();

        if self.vel.x.abs() < MIN_VELOCITY {
            self.vel.x = 0.0;
        }
        if self.vel.y.abs() < MIN_VELOCITY {
            self.vel.y = 0.0;
        }

        hit
    }

    fn check_boundaries(&mut self) -> bool {
        let b = self.bounds;
        let bounce = self.params.bounce;
        let mut out = false;

        if self.pos.x < b.left {
            self.pos.x = b.left;
            self.vel.x = -self.vel.x * bounce;
            out = true;
        }
        if self.pos.x > b.right {
            self.pos.x = b.right;
            self.vel.x = -self.vel.x * bounce;
            out = true;
        }
        if self.pos.y < b.top {
            self.pos.y = b.top;
            self.vel.y = -self.vel.y * bounce;
            out = true;
        }
        if self.pos.y > b.bottom {
            self.pos.y = b.bottom;
            self.vel.y = -self.vel.y * bounce;
            out = true;
        }

        let started = out && !self.colliding;
        self.colliding = out;
        started
    }

    /// Circle vs AABB via the closest point on the rectangle
    pub fn check_obstacle_collision(&self, obstacle: &Obstacle) -> bool {
        let closest = self.pos.clamp(obstacle.min(), obstacle.max());
        self.pos.distance_squared(closest) < self.radius * self.radius
    }

    pub fn check_goal_collision(&self, goal: &Goal) -> bool {
        self.pos.distance(goal.center) < self.radius + goal.radius
    }

    /// Knock the ball away from the obstacle center and move it clear.
    /// No-op when the ball center sits exactly on the obstacle center.
    pub fn handle_obstacle_collision(&mut self, obstacle: &Obstacle) {
        let center = obstacle.center();
        let away = self.pos - center;
        let len = away.length();
        if len == 0.0 {
            return;
        }

        let normal = away / len;
        self.vel = normal * self.params.max_speed * OBSTACLE_REBOUND_FACTOR;

        let clearance = self.radius + obstacle.size.max_element() / 2.0 + OBSTACLE_PUSH_MARGIN;
        self.pos = center + normal * clearance;
    }

    pub fn reset(&mut self) {
        self.pos = self.start_pos;
        self.vel = DVec2::ZERO;
        self.colliding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::{Circle, Rect};
    use proptest::prelude::*;

    const ARENA: ArenaSize = ArenaSize {
        width: 400.0,
        height: 600.0,
    };

    fn ball_at(x: f64, y: f64) -> Ball {
        Ball::new(DVec2::new(x, y), 12.0, BallParams::default(), ARENA).unwrap()
    }

    #[test]
    fn test_bounds_from_arena() {
        let ball = ball_at(200.0, 300.0);
        let b = ball.bounds();
        assert_eq!((b.left, b.right, b.top, b.bottom), (12.0, 388.0, 12.0, 588.0));

        // Arena narrower than the ball collapses the range
        let tiny = Bounds::for_arena(ArenaSize::new(10.0, 10.0), 12.0);
        assert_eq!(tiny.left, tiny.right);
        assert_eq!(tiny.top, tiny.bottom);
    }

    #[test]
    fn test_construction_validation() {
        let p = BallParams::default();
        assert!(Ball::new(DVec2::ZERO, 0.0, p, ARENA).is_err());
        assert!(Ball::new(DVec2::ZERO, f64::NAN, p, ARENA).is_err());
        assert!(Ball::new(DVec2::new(f64::INFINITY, 0.0), 5.0, p, ARENA).is_err());

        let bad = BallParams {
            friction: 1.0,
            ..p
        };
        assert!(Ball::new(DVec2::ZERO, 5.0, bad, ARENA).is_err());
        let bad = BallParams { bounce: 1.1, ..p };
        assert!(bad.validate().is_err());
        let bad = BallParams {
            max_speed: 0.0,
            ..p
        };
        assert!(bad.validate().is_err());
        let bad = BallParams {
            acceleration: -0.3,
            ..p
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_force_then_friction() {
        let mut ball = ball_at(200.0, 300.0);
        ball.apply_force(DVec2::new(1.0, 0.0));
        assert!((ball.vel.x - 0.3).abs() < 1e-12);
        assert_eq!(ball.vel.y, 0.0);

        ball.update();
        assert!((ball.vel.x - 0.285).abs() < 1e-12);
        assert!((ball.pos.x - 200.285).abs() < 1e-9);
        assert_eq!(ball.pos.y, 300.0);
    }

    #[test]
    fn test_speed_clamp_preserves_direction() {
        let mut ball = ball_at(200.0, 300.0);
        ball.apply_force(DVec2::new(300.0, -400.0));
        assert!((ball.speed() - BALL_MAX_SPEED).abs() < 1e-9);
        let dir = ball.vel.normalize();
        assert!((dir - DVec2::new(0.6, -0.8)).length() < 1e-9);
    }

    #[test]
    fn test_double_apply_matches_doubled_force() {
        let mut a = ball_at(200.0, 300.0);
        let mut b = ball_at(200.0, 300.0);
        let f = DVec2::new(0.4, -0.7);
        a.apply_force(f);
        a.apply_force(f);
        b.apply_force(f * 2.0);
        assert!((a.vel - b.vel).length() < 1e-12);
    }

    #[test]
    fn test_right_edge_clamp_and_bounce() {
        let mut ball = ball_at(200.0, 300.0);
        let right = ball.bounds().right;
        ball.pos = DVec2::new(right + 5.0, 300.0);
        ball.vel = DVec2::new(2.0, 0.0);

        let started = ball.update();
        assert!(started);
        assert_eq!(ball.pos.x, right);
        let expected = -2.0 * BALL_FRICTION * BALL_BOUNCE;
        assert!((ball.vel.x - expected).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_bounds_at_rest() {
        let mut ball = ball_at(200.0, 300.0);
        let right = ball.bounds().right;
        ball.pos = DVec2::new(right + 5.0, 300.0);
        ball.update();
        assert_eq!(ball.pos.x, right);
        assert_eq!(ball.vel.x, 0.0);
    }

    #[test]
    fn test_wall_hit_is_edge_triggered() {
        let mut ball = ball_at(200.0, 300.0);
        let left = ball.bounds().left;

        // Pressed against the wall for several ticks
        ball.pos.x = left;
        ball.vel = DVec2::new(-5.0, 0.0);
        assert!(ball.update());
        assert!(ball.is_colliding());
        ball.vel = DVec2::new(-5.0, 0.0);
        assert!(!ball.update());
        ball.vel = DVec2::new(-5.0, 0.0);
        assert!(!ball.update());

        // Leave the wall, then hit it again
        ball.vel = DVec2::new(5.0, 0.0);
        assert!(!ball.update());
        assert!(!ball.is_colliding());
        ball.vel = DVec2::new(-20.0, 0.0);
        assert!(ball.update());
    }

    #[test]
    fn test_corner_hit_counts_once() {
        let mut ball = ball_at(200.0, 300.0);
        ball.pos = DVec2::new(0.0, 0.0);
        ball.vel = DVec2::new(-3.0, -3.0);
        assert!(ball.update());
        let b = ball.bounds();
        assert_eq!(ball.pos, DVec2::new(b.left, b.top));
        assert!(ball.vel.x > 0.0 && ball.vel.y > 0.0);
    }

    #[test]
    fn test_micro_velocity_snaps_to_zero() {
        let mut ball = ball_at(200.0, 300.0);
        ball.vel = DVec2::new(0.1, -0.105);
        ball.update();
        // 0.095 and -0.09975 both fall below the threshold
        assert_eq!(ball.vel, DVec2::ZERO);
    }

    #[test]
    fn test_obstacle_collision_detection() {
        let obstacle = Obstacle::fixed(Rect::new(100.0, 100.0, 50.0, 20.0));

        // Centered on the obstacle
        let ball = ball_at(125.0, 110.0);
        assert!(ball.check_obstacle_collision(&obstacle));

        // Just left of the rectangle, overlapping by 1px
        let ball = ball_at(89.0, 110.0);
        assert!(ball.check_obstacle_collision(&obstacle));

        // Exactly touching is not a hit
        let ball = ball_at(88.0, 110.0);
        assert!(!ball.check_obstacle_collision(&obstacle));

        // Near the corner but outside the radius diagonally
        let ball = ball_at(91.0, 91.0);
        assert!(!ball.check_obstacle_collision(&obstacle));
        let ball = ball_at(93.0, 93.0);
        assert!(ball.check_obstacle_collision(&obstacle));
    }

    #[test]
    fn test_centered_obstacle_hit_is_noop() {
        let obstacle = Obstacle::fixed(Rect::new(100.0, 100.0, 40.0, 40.0));
        let mut ball = ball_at(120.0, 120.0);
        ball.vel = DVec2::new(1.5, -2.0);
        assert!(ball.check_obstacle_collision(&obstacle));

        ball.handle_obstacle_collision(&obstacle);
        assert_eq!(ball.pos, DVec2::new(120.0, 120.0));
        assert_eq!(ball.vel, DVec2::new(1.5, -2.0));
    }

    #[test]
    fn test_obstacle_rebound() {
        let obstacle = Obstacle::fixed(Rect::new(100.0, 100.0, 40.0, 20.0));
        let mut ball = ball_at(95.0, 110.0);
        ball.vel = DVec2::new(3.0, 0.0);
        assert!(ball.check_obstacle_collision(&obstacle));

        ball.handle_obstacle_collision(&obstacle);
        let expected_speed = BALL_MAX_SPEED * OBSTACLE_REBOUND_FACTOR;
        assert!((ball.vel - DVec2::new(-expected_speed, 0.0)).length() < 1e-9);
        // center.x (120) - (radius + half of larger side + margin)
        assert!((ball.pos - DVec2::new(120.0 - (12.0 + 20.0 + 5.0), 110.0)).length() < 1e-9);
        assert!(!ball.check_obstacle_collision(&obstacle));
    }

    #[test]
    fn test_goal_collision_is_strict() {
        let goal = Goal::from(Circle::new(200.0, 100.0, 20.0));
        let touching = 12.0 + 20.0;

        let ball = ball_at(200.0 + touching - 1.0, 100.0);
        assert!(ball.check_goal_collision(&goal));

        let ball = ball_at(200.0, 100.0 + touching);
        assert!(!ball.check_goal_collision(&goal));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut ball = ball_at(50.0, 60.0);
        ball.apply_force(DVec2::new(1.0, 1.0));
        ball.pos = DVec2::new(-100.0, 0.0);
        ball.update();
        assert!(ball.is_colliding());

        ball.reset();
        let (pos, vel, colliding) = (ball.pos, ball.vel, ball.is_colliding());
        ball.reset();
        assert_eq!((ball.pos, ball.vel, ball.is_colliding()), (pos, vel, colliding));
        assert_eq!(pos, DVec2::new(50.0, 60.0));
        assert_eq!(vel, DVec2::ZERO);
        assert!(!colliding);
    }

    #[test]
    fn test_set_bounds_keeps_position() {
        let mut ball = ball_at(350.0, 300.0);
        ball.set_bounds(ArenaSize::new(200.0, 600.0));
        assert_eq!(ball.pos.x, 350.0);
        assert_eq!(ball.bounds().right, 188.0);
        ball.update();
        assert_eq!(ball.pos.x, 188.0);
    }

    proptest! {
        #[test]
        fn speed_never_exceeds_max(
            vx in -50.0f64..50.0,
            vy in -50.0f64..50.0,
            fx in -1.0e6f64..1.0e6,
            fy in -1.0e6f64..1.0e6,
        ) {
            let mut ball = ball_at(200.0, 300.0);
            ball.vel = DVec2::new(vx, vy);
            ball.apply_force(DVec2::new(fx, fy));
            prop_assert!(ball.speed() <= BALL_MAX_SPEED + 1e-9);
        }

        #[test]
        fn update_keeps_ball_in_bounds(
            x in -2000.0f64..2000.0,
            y in -2000.0f64..2000.0,
            vx in -500.0f64..500.0,
            vy in -500.0f64..500.0,
        ) {
            let mut ball = ball_at(200.0, 300.0);
            ball.pos = DVec2::new(x, y);
            ball.vel = DVec2::new(vx, vy);
            ball.update();
            prop_assert!(ball.bounds().contains(ball.pos));
        }

        #[test]
        fn zero_force_decays_to_rest(
            vx in -15.0f64..15.0,
            vy in -15.0f64..15.0,
        ) {
            let mut ball = ball_at(200.0, 300.0);
            ball.vel = DVec2::new(vx, vy);
            let mut prev = ball.vel.abs();

            for _ in 0..200 {
                ball.apply_force(DVec2::ZERO);
                ball.update();
                let cur = ball.vel.abs();
                prop_assert!(cur.x <= prev.x + 1e-12 && cur.y <= prev.y + 1e-12);
                prev = cur;
            }
            prop_assert_eq!(ball.vel, DVec2::ZERO);
        }
    }

    #[test]
    fn test_accessors_report_construction_values() {
        let params = BallParams {
            bounce: 0.25,
            ..BallParams::default()
        };
        let mut ball = Ball::new(DVec2::new(30.0, 40.0), 8.0, params, ARENA).unwrap();
        ball.apply_force(DVec2::new(1.0, 1.0));
        ball.update();

        assert_eq!(ball.radius(), 8.0);
        assert_eq!(ball.params().bounce, 0.25);
        assert_eq!(ball.start_pos(), DVec2::new(30.0, 40.0));
        assert_ne!(ball.pos, ball.start_pos());
    }
}
