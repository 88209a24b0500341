//! Obstacle avoidance
//!
//! A single forward ray from the footprint center. Only obstacles on that
//! line within the lookahead produce a response.

use glam::Vec3;

use crate::agent::AgentState;
use crate::ai::config::AvoidanceConfig;
use crate::environment::{CollisionQuery, RayProbe};
use crate::math::project_onto_normal;

/// Push away from whatever blocks the forward probe
///
/// The penetration of the probe end past the impact point, measured along
/// the impact normal, scales the normal. Zero when nothing is hit.
pub fn obstacle_avoidance(
    agent: &AgentState,
    config: &AvoidanceConfig,
    collision: &dyn CollisionQuery,
) -> Vec3 {
    let forward = agent.forward().normalize_or_zero();
    if forward == Vec3::ZERO || config.collision_lookahead <= 0.0 {
        return Vec3::ZERO;
    }

    let probe = RayProbe {
        origin: agent.footprint_center,
        direction: forward,
        length: config.collision_lookahead,
        channel: config.channel,
        ignore: agent.ignore_list(),
    };

    match collision.ray_probe(&probe) {
        Some(hit) => {
            let penetration = project_onto_normal(hit.point - probe.end(), hit.normal);
            hit.normal * penetration.length()
        }
        None => Vec3::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ActorId;
    use crate::environment::{CapsuleSweep, CollisionChannel, OverlapHit, ProbeHit};
    use std::cell::RefCell;

    /// Infinite wall at `x = wall_x` facing -X
    struct Wall {
        wall_x: f32,
        probes: RefCell<Vec<RayProbe>>,
    }

    impl CollisionQuery for Wall {
        fn ray_probe(&self, probe: &RayProbe) -> Option<ProbeHit> {
            self.probes.borrow_mut().push(probe.clone());
            if probe.direction.x <= 0.0 {
                return None;
            }
            let t = (self.wall_x - probe.origin.x) / probe.direction.x;
            (t >= 0.0 && t <= probe.length).then(|| ProbeHit {
                actor: ActorId(99),
                point: probe.origin + probe.direction * t,
                normal: Vec3::NEG_X,
            })
        }

        fn capsule_sweep(&self, _sweep: &CapsuleSweep) -> bool {
            false
        }

        fn overlap_sphere(&self, _c: Vec3, _r: f32, _ignore: &[ActorId]) -> Vec<OverlapHit> {
            Vec::new()
        }

        fn nearest_surface_point(
            &self,
            _actor: ActorId,
            _point: Vec3,
            _channel: CollisionChannel,
        ) -> Option<Vec3> {
            None
        }
    }

    fn wall(wall_x: f32) -> Wall {
        Wall {
            wall_x,
            probes: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_avoid_wall_ahead() {
        let agent = AgentState::new(Vec3::ZERO, 5.0).with_id(ActorId(1));
        let config = AvoidanceConfig {
            collision_lookahead: 4.0,
            ..Default::default()
        };
        let wall = wall(3.0);

        let output = obstacle_avoidance(&agent, &config, &wall);

        // Probe ends at x = 4, wall at x = 3: one unit of penetration
        assert!((output - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);

        let probes = wall.probes.borrow();
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].ignore, vec![ActorId(1)]);
        assert_eq!(probes[0].origin, agent.footprint_center);
    }

    #[test]
    fn test_no_hit_no_avoidance() {
        let agent = AgentState::new(Vec3::ZERO, 5.0);
        let output = obstacle_avoidance(&agent, &AvoidanceConfig::default(), &wall(50.0));
        assert_eq!(output, Vec3::ZERO);
    }

    #[test]
    fn test_zero_lookahead_skips_probe() {
        let agent = AgentState::new(Vec3::ZERO, 5.0);
        let config = AvoidanceConfig {
            collision_lookahead: 0.0,
            ..Default::default()
        };
        let wall = wall(0.0);
        assert_eq!(obstacle_avoidance(&agent, &config, &wall), Vec3::ZERO);
        assert!(wall.probes.borrow().is_empty());
    }

    #[test]
    fn test_oblique_wall_uses_normal_penetration() {
        use crate::physics::Physics;
        use glam::Quat;

        let mut physics = Physics::new();
        let body = physics.create_static_body(
            Vec3::new(3.0, 0.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_4),
        );
        physics.add_box_collider(body, Vec3::new(0.1, 2.0, 1.0));
        physics.step(1.0 / 60.0);

        let agent = AgentState::new(Vec3::ZERO, 5.0);
        let config = AvoidanceConfig {
            collision_lookahead: 5.0,
            ..Default::default()
        };

        let output = obstacle_avoidance(&agent, &config, &physics);

        // Hit at x ~ 2.86: 2.14 past the probe end, 1.51 along the normal
        assert!((output - Vec3::new(-1.0707, -1.0707, 0.0)).length() < 1e-3);
        assert!((output.length() - 1.5142).abs() < 1e-3);
    }
}
