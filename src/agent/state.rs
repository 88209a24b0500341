//! Agent and target state as seen by the steering layer
//!
//! The host owns position, velocity and orientation. Steering only reads a
//! snapshot of it through the provider traits below.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque identity of a host actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Vertical cylindrical footprint of an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Horizontal radius
    pub radius: f32,
    /// Half of the total height
    pub half_height: f32,
}

impl Footprint {
    /// Create a new footprint
    #[must_use]
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height,
        }
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::new(0.4, 0.9)
    }
}

/// Snapshot of a target actor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActorState {
    /// Host identity, if the target is a real actor
    pub id: Option<ActorId>,
    /// World position
    pub position: Vec3,
    /// World velocity
    pub velocity: Vec3,
}

impl ActorState {
    /// Create a target snapshot without an identity
    #[must_use]
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            id: None,
            position,
            velocity,
        }
    }

    /// Attach an identity
    #[must_use]
    pub fn with_id(mut self, id: ActorId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Everything a behavior reads about the steered agent for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    /// Host identity, used to ignore the agent in its own queries
    pub id: Option<ActorId>,
    /// World position
    pub position: Vec3,
    /// World velocity
    pub velocity: Vec3,
    /// Orientation. Local +X is forward, +Z is up.
    pub rotation: Quat,
    /// Maximum speed of the motion controller
    pub max_speed: f32,
    /// Collision footprint
    pub footprint: Footprint,
    /// World-space center of the footprint
    pub footprint_center: Vec3,
}

impl AgentState {
    /// Create an agent snapshot at rest with identity rotation
    #[must_use]
    pub fn new(position: Vec3, max_speed: f32) -> Self {
        Self {
            id: None,
            position,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            max_speed,
            footprint: Footprint::default(),
            footprint_center: position,
        }
    }

    /// Set the velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the orientation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the footprint (centered on the agent position)
    #[must_use]
    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = footprint;
        self
    }

    /// Set the identity
    #[must_use]
    pub fn with_id(mut self, id: ActorId) -> Self {
        self.id = Some(id);
        self
    }

    /// Forward direction (local +X)
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Transform a point from agent-local space to world space
    #[must_use]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Lowest point of the footprint
    #[must_use]
    pub fn footprint_bottom(&self) -> f32 {
        self.footprint_center.z - self.footprint.half_height
    }

    /// Identities to exclude from the agent's own geometry queries
    #[must_use]
    pub fn ignore_list(&self) -> Vec<ActorId> {
        self.id.into_iter().collect()
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Host-side source of the agent's motion state
pub trait MotionSource {
    /// World position
    fn position(&self) -> Vec3;

    /// World velocity
    fn velocity(&self) -> Vec3;

    /// Orientation
    fn rotation(&self) -> Quat;

    /// Maximum speed of the motion controller
    fn max_speed(&self) -> f32;

    /// Host identity
    fn actor_id(&self) -> Option<ActorId> {
        None
    }
}

/// Host-side source of the agent's collision footprint
pub trait FootprintSource {
    /// Footprint dimensions
    fn footprint(&self) -> Footprint;

    /// World-space center of the footprint
    fn footprint_center(&self) -> Vec3;
}

/// Something that can be followed, pursued or evaded
pub trait Tracked {
    /// Current position and velocity
    fn snapshot(&self) -> ActorState;
}

impl Tracked for ActorState {
    fn snapshot(&self) -> ActorState {
        *self
    }
}

impl<T: MotionSource + ?Sized> MotionSource for Rc<T> {
    fn position(&self) -> Vec3 {
        (**self).position()
    }

    fn velocity(&self) -> Vec3 {
        (**self).velocity()
    }

    fn rotation(&self) -> Quat {
        (**self).rotation()
    }

    fn max_speed(&self) -> f32 {
        (**self).max_speed()
    }

    fn actor_id(&self) -> Option<ActorId> {
        (**self).actor_id()
    }
}

impl<T: MotionSource> MotionSource for RefCell<T> {
    fn position(&self) -> Vec3 {
        self.borrow().position()
    }

    fn velocity(&self) -> Vec3 {
        self.borrow().velocity()
    }

    fn rotation(&self) -> Quat {
        self.borrow().rotation()
    }

    fn max_speed(&self) -> f32 {
        self.borrow().max_speed()
    }

    fn actor_id(&self) -> Option<ActorId> {
        self.borrow().actor_id()
    }
}

impl<T: FootprintSource + ?Sized> FootprintSource for Rc<T> {
    fn footprint(&self) -> Footprint {
        (**self).footprint()
    }

    fn footprint_center(&self) -> Vec3 {
        (**self).footprint_center()
    }
}

impl<T: FootprintSource> FootprintSource for RefCell<T> {
    fn footprint(&self) -> Footprint {
        self.borrow().footprint()
    }

    fn footprint_center(&self) -> Vec3 {
        self.borrow().footprint_center()
    }
}

impl<T: Tracked> Tracked for RefCell<T> {
    fn snapshot(&self) -> ActorState {
        self.borrow().snapshot()
    }
}

// ============================================================================
// Kinematics
// ============================================================================

/// Plain host-side agent body implementing every provider trait
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Host identity
    pub id: Option<ActorId>,
    /// World position
    pub position: Vec3,
    /// World velocity
    pub velocity: Vec3,
    /// Orientation
    pub rotation: Quat,
    /// Maximum speed
    pub max_speed: f32,
    /// Collision footprint, centered on `position`
    pub footprint: Footprint,
}

impl Kinematics {
    /// Create a body at rest
    #[must_use]
    pub fn new(position: Vec3, max_speed: f32) -> Self {
        Self {
            id: None,
            position,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            max_speed,
            footprint: Footprint::default(),
        }
    }

    /// Attach an identity
    #[must_use]
    pub fn with_id(mut self, id: ActorId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the footprint
    #[must_use]
    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = footprint;
        self
    }

    /// Apply a velocity change, clamp to max speed, face the direction of
    /// travel and integrate position
    pub fn integrate(&mut self, velocity_delta: Vec3, dt: f32) {
        self.velocity = (self.velocity + velocity_delta).clamp_length_max(self.max_speed);

        let heading = Vec3::new(self.velocity.x, self.velocity.y, 0.0);
        if heading.length_squared() > f32::EPSILON {
            self.rotation = Quat::from_rotation_arc(Vec3::X, heading.normalize());
        }

        self.position += self.velocity * dt;
    }
}

impl MotionSource for Kinematics {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn actor_id(&self) -> Option<ActorId> {
        self.id
    }
}

impl FootprintSource for Kinematics {
    fn footprint(&self) -> Footprint {
        self.footprint
    }

    fn footprint_center(&self) -> Vec3 {
        self.position
    }
}

impl Tracked for Kinematics {
    fn snapshot(&self) -> ActorState {
        ActorState {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
        }
    }
}

/// Read a full agent snapshot from the two providers
#[must_use]
pub fn read_agent_state<M, F>(motion: &M, footprint: &F) -> AgentState
where
    M: MotionSource + ?Sized,
    F: FootprintSource + ?Sized,
{
    AgentState {
        id: motion.actor_id(),
        position: motion.position(),
        velocity: motion.velocity(),
        rotation: motion.rotation(),
        max_speed: motion.max_speed(),
        footprint: footprint.footprint(),
        footprint_center: footprint.footprint_center(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_is_local_x() {
        let agent = AgentState::new(Vec3::ZERO, 1.0)
            .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert!((agent.forward() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_transform_point() {
        let agent = AgentState::new(Vec3::new(10.0, 0.0, 0.0), 1.0)
            .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let world = agent.transform_point(Vec3::new(2.0, 0.0, 0.0));
        assert!((world - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_shared_kinematics_reads_live_state() {
        let body = Rc::new(RefCell::new(
            Kinematics::new(Vec3::ZERO, 5.0).with_id(ActorId(3)),
        ));
        let motion = Rc::clone(&body);

        body.borrow_mut().position = Vec3::new(1.0, 2.0, 3.0);

        let state = read_agent_state(&motion, &body);
        assert_eq!(state.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.footprint_center, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.id, Some(ActorId(3)));
        assert_eq!(state.ignore_list(), vec![ActorId(3)]);
    }

    #[test]
    fn test_integrate_clamps_and_faces_travel() {
        let mut body = Kinematics::new(Vec3::ZERO, 2.0);
        body.integrate(Vec3::new(0.0, 10.0, 0.0), 1.0);

        assert!((body.velocity.length() - 2.0).abs() < 1e-5);
        assert!((body.position - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
        assert!((body.rotation * Vec3::X - Vec3::Y).length() < 1e-5);
    }
}
