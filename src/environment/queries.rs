//! Query types and collaborator traits

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::agent::ActorId;
use crate::math::Bounds;

/// Bitmask selecting which colliders a probe interacts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionChannel(pub u32);

impl CollisionChannel {
    /// Interacts with every collider
    pub const ALL: Self = Self(u32::MAX);

    /// Check whether two masks overlap
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for CollisionChannel {
    fn default() -> Self {
        Self::ALL
    }
}

/// Which kinds of bodies a sweep tests against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectTypes {
    /// Fixed world geometry
    pub fixed: bool,
    /// Kinematic (host-driven) bodies
    pub kinematic: bool,
    /// Simulated physics bodies
    pub dynamic: bool,
}

impl ObjectTypes {
    /// Static, dynamic and physics geometry
    pub const ALL: Self = Self {
        fixed: true,
        kinematic: true,
        dynamic: true,
    };
}

impl Default for ObjectTypes {
    fn default() -> Self {
        Self::ALL
    }
}

/// Single ray probe
#[derive(Debug, Clone, PartialEq)]
pub struct RayProbe {
    /// Ray start
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Maximum length
    pub length: f32,
    /// Colliders to consider
    pub channel: CollisionChannel,
    /// Actors to skip
    pub ignore: Vec<ActorId>,
}

impl RayProbe {
    /// End point of the probe
    #[must_use]
    pub fn end(&self) -> Vec3 {
        self.origin + self.direction * self.length
    }
}

/// First blocking hit of a ray probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Actor that was hit
    pub actor: ActorId,
    /// Impact point in world space
    pub point: Vec3,
    /// Surface normal at the impact point
    pub normal: Vec3,
}

/// Vertical capsule swept between two points
#[derive(Debug, Clone, PartialEq)]
pub struct CapsuleSweep {
    /// Capsule center at the start
    pub start: Vec3,
    /// Capsule center at the end
    pub end: Vec3,
    /// Capsule radius
    pub radius: f32,
    /// Half of the total capsule height
    pub half_height: f32,
    /// Body kinds that block the sweep
    pub object_types: ObjectTypes,
    /// Actors to skip
    pub ignore: Vec<ActorId>,
}

/// One result of a sphere overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapHit {
    /// Overlapping actor
    pub actor: ActorId,
    /// Distance from the query center to the actor's surface
    pub distance: f32,
    /// Actor origin
    pub position: Vec3,
    /// World-space bounds of the actor's collision
    pub bounds: Bounds,
}

/// Read-only geometry queries against the environment
///
/// Implementations must tolerate independent calls from many agents.
pub trait CollisionQuery {
    /// Cast a ray and return the first blocking hit
    fn ray_probe(&self, probe: &RayProbe) -> Option<ProbeHit>;

    /// Sweep a capsule and report whether anything blocks it
    fn capsule_sweep(&self, sweep: &CapsuleSweep) -> bool;

    /// Find every actor overlapping a sphere
    fn overlap_sphere(&self, center: Vec3, radius: f32, ignore: &[ActorId]) -> Vec<OverlapHit>;

    /// Closest point on an actor's collision surface to `point`
    fn nearest_surface_point(
        &self,
        actor: ActorId,
        point: Vec3,
        channel: CollisionChannel,
    ) -> Option<Vec3>;
}

/// Synchronous navigation search
pub trait PathSearch {
    /// Ordered waypoints from `start` to `goal`, or `None` if unreachable
    fn find_path(&self, start: Vec3, goal: Vec3) -> Option<Vec<Vec3>>;
}

/// Actor tag lookup
pub trait CoverTags {
    /// Whether `actor` carries `tag`
    fn has_tag(&self, actor: ActorId, tag: &str) -> bool;
}

/// Collaborators handed to environment-aware behaviors for one call
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    /// Geometry queries
    pub collision: &'a dyn CollisionQuery,
    /// Navigation search
    pub navigation: &'a dyn PathSearch,
    /// Tag lookup
    pub tags: &'a dyn CoverTags,
}

impl<'a> Environment<'a> {
    /// Bundle the collaborators
    #[must_use]
    pub fn new(
        collision: &'a dyn CollisionQuery,
        navigation: &'a dyn PathSearch,
        tags: &'a dyn CoverTags,
    ) -> Self {
        Self {
            collision,
            navigation,
            tags,
        }
    }
}

impl std::fmt::Debug for Environment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment").finish_non_exhaustive()
    }
}
