//! Wander behavior
//!
//! A target point lives on a circle projected ahead of the agent. Every tick
//! it is jittered, pushed back onto the circle, and sought at wander speed.

use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::agent::AgentState;
use crate::ai::config::WanderConfig;
use crate::ai::steering::seek_at_speed;
use crate::math::random_clamped;

/// Stateful wander behavior, one per agent
#[derive(Debug, Clone)]
pub struct Wander {
    /// Offset on the wander circle in agent-local space. Z is always 0.
    target: Vec3,
    rng: StdRng,
}

impl Wander {
    /// Create a wander behavior seeded from the OS
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Create a reproducible wander behavior
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a wander behavior drawing from `rng`
    #[must_use]
    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            target: Vec3::ZERO,
            rng,
        }
    }

    /// Current offset on the wander circle
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Advance the wander target by one tick and steer toward it
    pub fn steer(&mut self, agent: &AgentState, config: &WanderConfig, delta_time: f32) -> Vec3 {
        let jitter = config.jitter * delta_time;
        let dx = random_clamped(&mut self.rng) * jitter;
        let dy = random_clamped(&mut self.rng) * jitter;
        self.target += Vec3::new(dx, dy, 0.0);

        // Jitter landing exactly on the circle center leaves no direction
        self.target = self.target.try_normalize().unwrap_or(Vec3::X) * config.radius;

        let local = self.target + Vec3::new(config.distance, 0.0, 0.0);
        let world = agent.transform_point(local);
        seek_at_speed(agent, world, config.max_speed)
    }
}

impl Default for Wander {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn config() -> WanderConfig {
        WanderConfig {
            jitter: 40.0,
            radius: 1.5,
            distance: 3.0,
            max_speed: 2.0,
        }
    }

    #[test]
    fn test_wander_target_stays_on_circle() {
        let mut wander = Wander::with_seed(42);
        let agent = AgentState::new(Vec3::ZERO, 5.0);
        let config = config();

        for _ in 0..1000 {
            wander.steer(&agent, &config, 1.0 / 60.0);
            assert!((wander.target().length() - config.radius).abs() < 1e-4);
            assert_eq!(wander.target().z, 0.0);
        }
    }

    #[test]
    fn test_wander_speed_and_heading() {
        let mut wander = Wander::with_seed(1);
        let agent = AgentState::new(Vec3::new(5.0, 5.0, 0.0), 5.0);
        let output = wander.steer(&agent, &config(), 0.016);

        // At rest the delta is the desired velocity itself
        assert!((output.length() - 2.0).abs() < 1e-4);
        // Circle is 3 ahead with radius 1.5, so the heading stays in front
        assert!(output.x > 0.0);
    }

    #[test]
    fn test_wander_follows_orientation() {
        let mut wander = Wander::with_seed(9);
        let agent = AgentState::new(Vec3::ZERO, 5.0)
            .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let output = wander.steer(&agent, &config(), 0.016);

        // Facing +Y now
        assert!(output.y > 0.0);
        assert!(output.y > output.x.abs());
    }

    #[test]
    fn test_zero_jitter_degenerate_target() {
        let mut wander = Wander::with_seed(3);
        let agent = AgentState::new(Vec3::ZERO, 5.0);
        let config = WanderConfig {
            jitter: 0.0,
            ..config()
        };

        let output = wander.steer(&agent, &config, 0.016);
        assert!(output.is_finite());
        assert!((wander.target() - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let agent = AgentState::new(Vec3::ZERO, 5.0);
        let mut a = Wander::with_seed(11);
        let mut b = Wander::with_seed(11);

        for _ in 0..50 {
            let out_a = a.steer(&agent, &config(), 0.02);
            let out_b = b.steer(&agent, &config(), 0.02);
            assert_eq!(out_a, out_b);
        }
    }
}
