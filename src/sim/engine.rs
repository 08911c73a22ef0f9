//! Simulation loop
//!
//! Host-driven: the render loop calls [`PhysicsEngine::tick`] once per frame
//! with the current wall-clock time. Within a tick the order is fixed:
//! obstacle motion, force, ball integration and wall clamp, obstacle hits,
//! goal.

use glam::DVec2;

use super::ball::Ball;
use super::force::{ForceSource, KeyState};
use super::geometry::{ArenaSize, GeometryProvider, Goal, Obstacle, build_obstacles};
use crate::settings::{ObstacleMotion, Settings};

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
    /// Goal touched; only `start` leaves this state
    Reached,
}

/// Discrete simulation events
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Ball started touching an arena edge (once per contact episode)
    WallHit,
    /// Ball overlaps an obstacle this tick (every tick of overlap)
    ObstacleHit { index: usize, obstacle: Obstacle },
    GoalReached,
}

/// Receives events synchronously during `tick`
pub trait SimObserver {
    fn on_event(&mut self, event: &SimEvent);
}

impl<F: FnMut(&SimEvent)> SimObserver for F {
    fn on_event(&mut self, event: &SimEvent) {
        self(event)
    }
}

pub struct PhysicsEngine<G: GeometryProvider> {
    geometry: G,
    force: ForceSource,
    motion: ObstacleMotion,
    seed: u64,
    arena: ArenaSize,
    ball: Option<Ball>,
    obstacles: Vec<Obstacle>,
    goal: Option<Goal>,
    gravity: DVec2,
    state: LoopState,
    /// Wall-clock time at `start` (seconds)
    baseline: f64,
    last_tick: f64,
    /// Seconds between the last two ticks
    last_delta: f64,
    observers: Vec<Box<dyn SimObserver>>,
}

impl<G: GeometryProvider> PhysicsEngine<G> {
    pub fn new(geometry: G, settings: &Settings) -> Self {
        let mut engine = Self {
            geometry,
            force: ForceSource::new(settings.tilt_sensitivity(), settings.sensitivity.keyboard),
            motion: settings.obstacle_motion,
            seed: settings.seed,
            arena: ArenaSize::default(),
            ball: None,
            obstacles: Vec::new(),
            goal: None,
            gravity: DVec2::ZERO,
            state: LoopState::Stopped,
            baseline: 0.0,
            last_tick: 0.0,
            last_delta: 0.0,
            observers: Vec::new(),
        };
        engine.rebuild_geometry();
        engine
    }

    /// Register an event observer
    pub fn subscribe(&mut self, observer: impl SimObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn ball(&self) -> Option<&Ball> {
        self.ball.as_ref()
    }

    pub fn ball_mut(&mut self) -> Option<&mut Ball> {
        self.ball.as_mut()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    pub fn gravity(&self) -> DVec2 {
        self.gravity
    }

    pub fn arena(&self) -> ArenaSize {
        self.arena
    }

    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Mutable access to the layout source; call `resize` afterwards
    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    pub fn force_source(&self) -> &ForceSource {
        &self.force
    }

    pub fn force_source_mut(&mut self) -> &mut ForceSource {
        &mut self.force
    }

    /// Install the ball, fitted to the current arena
    pub fn set_ball(&mut self, mut ball: Ball) {
        ball.set_bounds(self.arena);
        self.ball = Some(ball);
    }

    pub fn start(&mut self, now: f64) {
        self.baseline = now;
        self.last_tick = now;
        self.last_delta = 0.0;
        self.state = LoopState::Running;
        log::info!("Simulation started ({} obstacles)", self.obstacles.len());
    }

    /// Continue after `stop` without restarting obstacle phase: the
    /// baseline shifts by the time spent stopped. No-op unless stopped.
    pub fn resume(&mut self, now: f64) {
        if self.state != LoopState::Stopped {
            return;
        }
        self.baseline += now - self.last_tick;
        self.last_tick = now;
        self.last_delta = 0.0;
        self.state = LoopState::Running;
        log::info!("Simulation resumed");
    }

    /// Takes effect before the next tick
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Stopped;
            log::info!("Simulation stopped");
        }
    }

    /// Gravity from device orientation (degrees)
    pub fn update_gravity(&mut self, beta: f64, gamma: f64) {
        self.gravity = self.force.tilt_force(beta, gamma);
    }

    pub fn update_gravity_from_keys(&mut self, keys: &KeyState) {
        self.gravity = self.force.key_force(keys);
    }

    /// Set gravity directly; each axis is clamped to [-1, 1]
    pub fn set_gravity(&mut self, gravity: DVec2) {
        self.gravity = if gravity.is_finite() {
            gravity.clamp(DVec2::NEG_ONE, DVec2::ONE)
        } else {
            DVec2::ZERO
        };
    }

    /// Restore obstacles and ball, zero gravity. Loop state is unchanged.
    pub fn reset(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.reset();
        }
        if let Some(ball) = &mut self.ball {
            ball.reset();
        }
        self.gravity = DVec2::ZERO;
    }

    /// Re-read the layout after the arena changed size. Ball position and
    /// velocity are kept.
    pub fn resize(&mut self) {
        self.rebuild_geometry();
        if let Some(ball) = &mut self.ball {
            ball.set_bounds(self.arena);
        }
    }

    fn rebuild_geometry(&mut self) {
        self.arena = self.geometry.arena_size();
        self.obstacles = build_obstacles(&self.geometry.obstacles(), &self.motion, self.seed);
        self.goal = self.geometry.goal().map(Goal::from);
        if self.goal.is_none() {
            log::warn!("Layout has no goal; goal checks disabled");
        }
        log::info!(
            "Geometry rebuilt: arena {}x{}, {} obstacles",
            self.arena.width,
            self.arena.height,
            self.obstacles.len()
        );
    }

    /// Advance one frame at wall-clock time `now` (seconds)
    pub fn tick(&mut self, now: f64) {
        if self.state != LoopState::Running {
            return;
        }

        self.last_delta = now - self.last_tick;
        self.last_tick = now;
        log::trace!("tick dt={:.4}", self.last_delta);

        // Obstacles follow wall-clock phase, not accumulated deltas
        let elapsed = now - self.baseline;
        for obstacle in &mut self.obstacles {
            obstacle.update_motion(elapsed);
        }

        let Some(ball) = self.ball.as_mut() else {
            return;
        };

        ball.apply_force(self.gravity);
        if ball.update() {
            dispatch(&mut self.observers, &SimEvent::WallHit);
        }

        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if ball.check_obstacle_collision(obstacle) {
                ball.handle_obstacle_collision(obstacle);
                log::debug!("Obstacle {} hit at ({:.1}, {:.1})", index, ball.pos.x, ball.pos.y);
                dispatch(
                    &mut self.observers,
                    &SimEvent::ObstacleHit {
                        index,
                        obstacle: *obstacle,
                    },
                );
            }
        }

        if let Some(goal) = &self.goal
            && ball.check_goal_collision(goal)
        {
            self.state = LoopState::Reached;
            log::info!("Goal reached after {:.2}s", elapsed);
            dispatch(&mut self.observers, &SimEvent::GoalReached);
        }
    }
}

fn dispatch(observers: &mut [Box<dyn SimObserver>], event: &SimEvent) {
    for observer in observers.iter_mut() {
        observer.on_event(event);
    }
}
