//! Motion and collision simulation
//!
//! Everything that moves lives here. No rendering or platform dependencies:
//! - Input is sampled at tick time, never queued
//! - Geometry comes from a `GeometryProvider`
//! - Side effects go out through `SimObserver`

pub mod ball;
pub mod engine;
pub mod force;
pub mod geometry;
pub mod session;

pub use ball::{Ball, BallParams, Bounds};
pub use engine::{LoopState, PhysicsEngine, SimEvent, SimObserver};
pub use force::{ForceSource, Key, KeyState, RawInput};
pub use geometry::{
    ArenaSize, Circle, GeometryProvider, Goal, Layout, Obstacle, Rect, build_obstacles,
};
pub use session::{GameSession, InputMode, SessionPhase};
