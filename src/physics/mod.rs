//! Physics module
//!
//! Collision world built on top of rapier3d, usable as the steering
//! environment's geometry and tag service.

mod world;

pub use world::{ColliderHandle, Physics, RigidBodyHandle};
