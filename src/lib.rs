//! Steering behaviors for autonomous agents in a 3D world
//!
//! This crate provides:
//! - Seek, flee, arrive, pursuit, evade and wander behaviors
//! - Single-probe obstacle avoidance and cover-seeking hide
//! - A path follower with line-of-sight shortcuts and throttled replanning
//! - A rapier3d collision world and grid pathfinder as reference environments
//!
//! Every behavior returns a velocity delta (desired minus current velocity).
//! Applying it is up to the host's motion controller.

pub mod agent;
pub mod ai;
pub mod environment;
pub mod math;
pub mod navigation;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{
        ActorId, ActorState, AgentState, Footprint, FootprintSource, Kinematics, MotionSource,
        Tracked,
    };
    pub use crate::ai::{FollowState, Steering, SteeringBehavior, SteeringConfig};
    pub use crate::environment::{CollisionQuery, CoverTags, Environment, PathSearch};
    pub use crate::navigation::NavGrid;
    pub use crate::physics::{ColliderHandle, Physics, RigidBodyHandle};
    pub use glam::{Quat, Vec2, Vec3};
}
