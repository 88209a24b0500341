//! Collision world using rapier3d
//!
//! Bodies and colliders are created here by the host; the steering layer
//! reaches the world only through [`CollisionQuery`] and [`CoverTags`].

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::{Ball, Capsule};
use rapier3d::pipeline::QueryFilterFlags;
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::agent::ActorId;
use crate::environment::{
    CapsuleSweep, CollisionChannel, CollisionQuery, CoverTags, OverlapHit, ProbeHit, RayProbe,
};
use crate::math::Bounds;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

impl ColliderHandle {
    /// Actor identity of this collider
    #[must_use]
    pub fn actor_id(self) -> ActorId {
        let (index, generation) = self.0.into_raw_parts();
        ActorId((u64::from(generation) << 32) | u64::from(index))
    }

    /// Collider handle for an actor identity
    #[must_use]
    pub fn from_actor_id(actor: ActorId) -> Self {
        Self(rapier3d::geometry::ColliderHandle::from_raw_parts(
            actor.0 as u32,
            (actor.0 >> 32) as u32,
        ))
    }
}

fn actor_of(handle: rapier3d::geometry::ColliderHandle) -> ActorId {
    ColliderHandle(handle).actor_id()
}

fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn to_glam(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

fn channel_groups(channel: CollisionChannel) -> InteractionGroups {
    InteractionGroups::new(Group::ALL, Group::from_bits_truncate(channel.0))
}

/// Physics world manager
pub struct Physics {
    /// Gravity vector
    pub gravity: Vec3,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Query pipeline for rays, sweeps and overlaps
    query_pipeline: QueryPipeline,
    integration_parameters: IntegrationParameters,
    /// Actor tags, e.g. cover
    tags: FxHashMap<rapier3d::geometry::ColliderHandle, SmallVec<[String; 2]>>,
}

impl Physics {
    /// Create a new physics world with gravity along -Z
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, 0.0, -9.81))
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            tags: FxHashMap::default(),
        }
    }

    /// Step the simulation and refresh the query pipeline
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y, self.gravity.z],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn insert_body(&mut self, builder: RigidBodyBuilder, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let isometry = Isometry::from_parts(
            Translation3::new(position.x, position.y, position.z),
            quat_to_rapier(rotation),
        );
        RigidBodyHandle(self.rigid_body_set.insert(builder.position(isometry).build()))
    }

    /// Create a static rigid body (doesn't move)
    pub fn create_static_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        self.insert_body(RigidBodyBuilder::fixed(), position, rotation)
    }

    /// Create a kinematic rigid body (moved by the host)
    pub fn create_kinematic_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        self.insert_body(
            RigidBodyBuilder::kinematic_position_based(),
            position,
            rotation,
        )
    }

    fn attach(&mut self, body: RigidBodyHandle, collider: Collider) -> ColliderHandle {
        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Add a box collider to a rigid body
    pub fn add_box_collider(&mut self, body: RigidBodyHandle, half_extents: Vec3) -> ColliderHandle {
        let collider =
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();
        self.attach(body, collider)
    }

    /// Add an upright capsule collider matching an agent footprint
    ///
    /// `half_height` is the full half-height, hemispheres included.
    pub fn add_capsule_collider(
        &mut self,
        body: RigidBodyHandle,
        half_height: f32,
        radius: f32,
    ) -> ColliderHandle {
        let segment_half = (half_height - radius).max(0.0);
        self.attach(body, ColliderBuilder::capsule_z(segment_half, radius).build())
    }

    /// Restrict which probe channels see a collider
    pub fn set_collision_channel(&mut self, collider: ColliderHandle, channel: CollisionChannel) {
        if let Some(c) = self.collider_set.get_mut(collider.0) {
            c.set_collision_groups(InteractionGroups::new(
                Group::from_bits_truncate(channel.0),
                Group::ALL,
            ));
        }
    }

    /// Tag a collider
    pub fn add_tag(&mut self, collider: ColliderHandle, tag: impl Into<String>) {
        self.tags.entry(collider.0).or_default().push(tag.into());
    }

    /// Set the next position of a kinematic body
    pub fn set_kinematic_position(&mut self, body: RigidBodyHandle, position: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_next_kinematic_translation(vector![position.x, position.y, position.z]);
        }
    }

    fn overlap_hit(&self, handle: rapier3d::geometry::ColliderHandle, center: Vec3) -> Option<OverlapHit> {
        let collider = self.collider_set.get(handle)?;
        let query_point = to_point(center);
        let projection = collider
            .shape()
            .project_point(collider.position(), &query_point, true);

        let distance = if projection.is_inside {
            0.0
        } else {
            (projection.point - query_point).norm()
        };

        let aabb = collider.compute_aabb();
        Some(OverlapHit {
            actor: actor_of(handle),
            distance,
            position: to_glam(collider.translation()),
            bounds: Bounds::new(
                Vec3::new(aabb.mins.x, aabb.mins.y, aabb.mins.z),
                Vec3::new(aabb.maxs.x, aabb.maxs.y, aabb.maxs.z),
            ),
        })
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionQuery for Physics {
    fn ray_probe(&self, probe: &RayProbe) -> Option<ProbeHit> {
        let direction = probe.direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let ray = Ray::new(
            to_point(probe.origin),
            vector![direction.x, direction.y, direction.z],
        );
        let skip = |handle: rapier3d::geometry::ColliderHandle, _: &Collider| {
            !probe.ignore.contains(&actor_of(handle))
        };
        let filter = QueryFilter::default()
            .groups(channel_groups(probe.channel))
            .predicate(&skip);

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                probe.length,
                true,
                filter,
            )
            .map(|(handle, hit)| {
                let point = ray.point_at(hit.time_of_impact);
                ProbeHit {
                    actor: actor_of(handle),
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: to_glam(&hit.normal),
                }
            })
    }

    fn capsule_sweep(&self, sweep: &CapsuleSweep) -> bool {
        let segment_half = (sweep.half_height - sweep.radius).max(0.0);
        let capsule = Capsule::new_z(segment_half, sweep.radius);
        let start = Isometry::translation(sweep.start.x, sweep.start.y, sweep.start.z);

        let skip = |handle: rapier3d::geometry::ColliderHandle, _: &Collider| {
            !sweep.ignore.contains(&actor_of(handle))
        };
        let mut filter = QueryFilter::default().predicate(&skip);
        if !sweep.object_types.fixed {
            filter.flags |= QueryFilterFlags::EXCLUDE_FIXED;
        }
        if !sweep.object_types.kinematic {
            filter.flags |= QueryFilterFlags::EXCLUDE_KINEMATIC;
        }
        if !sweep.object_types.dynamic {
            filter.flags |= QueryFilterFlags::EXCLUDE_DYNAMIC;
        }

        let delta = sweep.end - sweep.start;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return self
                .query_pipeline
                .intersection_with_shape(
                    &self.rigid_body_set,
                    &self.collider_set,
                    &start,
                    &capsule,
                    filter,
                )
                .is_some();
        }

        let direction = delta / distance;
        self.query_pipeline
            .cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &start,
                &vector![direction.x, direction.y, direction.z],
                &capsule,
                ShapeCastOptions::with_max_time_of_impact(distance),
                filter,
            )
            .is_some()
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, ignore: &[ActorId]) -> Vec<OverlapHit> {
        let ball = Ball::new(radius);
        let position = Isometry::translation(center.x, center.y, center.z);
        let skip = |handle: rapier3d::geometry::ColliderHandle, _: &Collider| {
            !ignore.contains(&actor_of(handle))
        };
        let filter = QueryFilter::default().predicate(&skip);

        let mut handles = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &position,
            &ball,
            filter,
            |handle| {
                handles.push(handle);
                true
            },
        );

        let mut hits: Vec<OverlapHit> = handles
            .into_iter()
            .filter_map(|handle| self.overlap_hit(handle, center))
            .collect();
        // Broad-phase order is arbitrary
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.actor.cmp(&b.actor)));
        hits
    }

    fn nearest_surface_point(
        &self,
        actor: ActorId,
        point: Vec3,
        channel: CollisionChannel,
    ) -> Option<Vec3> {
        let collider = self
            .collider_set
            .get(ColliderHandle::from_actor_id(actor).0)?;
        if !channel_groups(channel).test(collider.collision_groups()) {
            return None;
        }

        let projection = collider
            .shape()
            .project_point(collider.position(), &to_point(point), false);
        let p = projection.point;
        Some(Vec3::new(p.x, p.y, p.z))
    }
}

impl CoverTags for Physics {
    fn has_tag(&self, actor: ActorId, tag: &str) -> bool {
        self.tags
            .get(&ColliderHandle::from_actor_id(actor).0)
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}
