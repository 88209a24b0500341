//! Basic steering behaviors
//!
//! Each behavior is a pure function of the agent snapshot and its own
//! parameters. The result is a velocity delta: desired velocity minus the
//! agent's current velocity. Applying it is left to the motion controller.

use glam::Vec3;

use crate::agent::{ActorState, AgentState};
use crate::math::safe_normalize;

/// Trait for stateless steering behaviors
pub trait SteeringBehavior {
    /// Velocity delta for the given agent snapshot
    fn steer(&self, agent: &AgentState) -> Vec3;
}

/// Velocity delta that moves the agent toward `target` at `speed`
///
/// If the agent sits exactly on the target the desired velocity is zero,
/// so the delta only cancels the current velocity.
#[must_use]
pub fn seek_at_speed(agent: &AgentState, target: Vec3, speed: f32) -> Vec3 {
    let desired = safe_normalize(target - agent.position) * speed;
    desired - agent.velocity
}

/// Estimated time until the agent reaches a moving target
///
/// NOTE: the numerator adds a time (distance / max speed) to a speed
/// (|target velocity|). Existing tuning of `modifier` depends on it.
#[must_use]
pub fn look_ahead_time(agent: &AgentState, target: &ActorState, modifier: f32) -> f32 {
    let distance = target.position.distance(agent.position);
    let time_to_reach = if agent.max_speed > 0.0 {
        distance / agent.max_speed
    } else {
        0.0
    };

    let time = (time_to_reach + target.velocity.length()) / modifier;
    if time.is_finite() { time } else { 0.0 }
}

/// Position of a moving target after its look-ahead time
#[must_use]
pub fn predict_position(agent: &AgentState, target: &ActorState, modifier: f32) -> Vec3 {
    target.position + target.velocity * look_ahead_time(agent, target, modifier)
}

/// Seek behavior - move towards a point at full speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seek {
    /// Target position
    pub target: Vec3,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec3) -> Self {
        Self { target }
    }
}

impl SteeringBehavior for Seek {
    fn steer(&self, agent: &AgentState) -> Vec3 {
        seek_at_speed(agent, self.target, agent.max_speed)
    }
}

/// Flee behavior - move away from a point at full speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flee {
    /// Position to flee from
    pub target: Vec3,
    /// Only flee within this distance. Negative means always.
    pub trigger_distance: f32,
}

impl Flee {
    /// Flee regardless of distance
    #[must_use]
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            trigger_distance: -1.0,
        }
    }

    /// Flee only while within `trigger_distance`
    #[must_use]
    pub fn within(target: Vec3, trigger_distance: f32) -> Self {
        Self {
            target,
            trigger_distance,
        }
    }
}

/// Whether a trigger distance admits a squared distance
fn triggered(trigger_distance: f32, distance_squared: f32) -> bool {
    trigger_distance < 0.0 || distance_squared <= trigger_distance * trigger_distance
}

impl SteeringBehavior for Flee {
    fn steer(&self, agent: &AgentState) -> Vec3 {
        let from_target = agent.position - self.target;

        if triggered(self.trigger_distance, from_target.length_squared()) {
            let desired = safe_normalize(from_target) * agent.max_speed;
            return desired - agent.velocity;
        }

        Vec3::ZERO
    }
}

/// Arrive behavior - move towards a point, slowing linearly near it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrive {
    /// Target position
    pub target: Vec3,
    /// Desired speed is `distance / deceleration`, capped at max speed
    pub deceleration: f32,
}

impl Arrive {
    /// Create a new arrive behavior
    #[must_use]
    pub fn new(target: Vec3, deceleration: f32) -> Self {
        Self {
            target,
            deceleration,
        }
    }
}

impl SteeringBehavior for Arrive {
    fn steer(&self, agent: &AgentState) -> Vec3 {
        let to_target = self.target - agent.position;
        let distance = to_target.length();

        if distance > 0.0 {
            let speed = (distance / self.deceleration).min(agent.max_speed);
            let desired = to_target / distance * speed;
            return desired - agent.velocity;
        }

        Vec3::ZERO
    }
}

/// Pursuit behavior - seek the predicted position of a moving target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pursuit {
    /// Target snapshot
    pub target: ActorState,
    /// Divisor of the look-ahead time
    pub look_ahead_modifier: f32,
}

impl Pursuit {
    /// Create a new pursuit behavior
    #[must_use]
    pub fn new(target: ActorState, look_ahead_modifier: f32) -> Self {
        Self {
            target,
            look_ahead_modifier,
        }
    }
}

impl SteeringBehavior for Pursuit {
    fn steer(&self, agent: &AgentState) -> Vec3 {
        let predicted = predict_position(agent, &self.target, self.look_ahead_modifier);
        Seek::new(predicted).steer(agent)
    }
}

/// Evade behavior - flee the predicted position of a moving target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evade {
    /// Target snapshot
    pub target: ActorState,
    /// Only evade while the target is within this distance. Negative means always.
    pub trigger_distance: f32,
    /// Divisor of the look-ahead time
    pub look_ahead_modifier: f32,
}

impl Evade {
    /// Create a new evade behavior
    #[must_use]
    pub fn new(target: ActorState, trigger_distance: f32, look_ahead_modifier: f32) -> Self {
        Self {
            target,
            trigger_distance,
            look_ahead_modifier,
        }
    }
}

impl SteeringBehavior for Evade {
    fn steer(&self, agent: &AgentState) -> Vec3 {
        let to_target = self.target.position - agent.position;

        if triggered(self.trigger_distance, to_target.length_squared()) {
            // Gated on the current distance; the predicted point is always fled.
            let predicted = predict_position(agent, &self.target, self.look_ahead_modifier);
            return Flee::new(predicted).steer(agent);
        }

        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_at_origin(max_speed: f32) -> AgentState {
        AgentState::new(Vec3::ZERO, max_speed)
    }

    #[test]
    fn test_seek() {
        let output = Seek::new(Vec3::new(10.0, 0.0, 0.0)).steer(&agent_at_origin(5.0));
        assert!((output - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_seek_direction_with_velocity() {
        let agent = agent_at_origin(4.0).with_velocity(Vec3::new(0.0, 3.0, 0.0));
        let target = Vec3::new(3.0, 4.0, 0.0);
        let output = Seek::new(target).steer(&agent);

        let desired = output + agent.velocity;
        assert!((desired.length() - 4.0).abs() < 1e-5);
        assert!((desired.normalize() - target.normalize()).length() < 1e-5);
    }

    #[test]
    fn test_seek_at_target_is_finite() {
        let agent = agent_at_origin(5.0).with_velocity(Vec3::X);
        let output = Seek::new(Vec3::ZERO).steer(&agent);
        assert!(output.is_finite());
        assert_eq!(output, -Vec3::X);
    }

    #[test]
    fn test_flee() {
        let output = Flee::new(Vec3::new(10.0, 0.0, 0.0)).steer(&agent_at_origin(5.0));
        assert!(output.x < 0.0); // Flee in opposite direction
        assert!((output.length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_flee_trigger_distance() {
        let agent = agent_at_origin(5.0);

        let near = Flee::within(Vec3::new(3.0, 0.0, 0.0), 5.0).steer(&agent);
        assert!((near - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-5);

        let far = Flee::within(Vec3::new(10.0, 0.0, 0.0), 5.0).steer(&agent);
        assert_eq!(far, Vec3::ZERO);

        // Exactly on the boundary still flees
        let edge = Flee::within(Vec3::new(5.0, 0.0, 0.0), 5.0).steer(&agent);
        assert!(edge.length() > 0.0);
    }

    #[test]
    fn test_arrive_capped() {
        let output = Arrive::new(Vec3::new(100.0, 0.0, 0.0), 10.0).steer(&agent_at_origin(5.0));
        assert!((output - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_arrive_linear_zone() {
        let output = Arrive::new(Vec3::new(20.0, 0.0, 0.0), 10.0).steer(&agent_at_origin(5.0));
        assert!((output - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_arrive_at_target() {
        let agent = agent_at_origin(5.0).with_velocity(Vec3::X);
        let output = Arrive::new(Vec3::ZERO, 10.0).steer(&agent);
        assert_eq!(output, Vec3::ZERO);
    }

    #[test]
    fn test_arrive_speed_monotonic() {
        let agent = agent_at_origin(5.0);
        let mut previous = 0.0;
        for i in 1..200 {
            let distance = i as f32 * 0.5;
            let speed = Arrive::new(Vec3::new(distance, 0.0, 0.0), 10.0)
                .steer(&agent)
                .length();
            assert!(speed + 1e-5 >= previous);
            assert!(speed <= 5.0 + 1e-5);
            previous = speed;
        }
    }

    #[test]
    fn test_look_ahead_formula() {
        let agent = agent_at_origin(5.0);
        let target = ActorState::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0));

        // (10 / 5 + 3) / 2
        assert!((look_ahead_time(&agent, &target, 2.0) - 2.5).abs() < 1e-5);
        let predicted = predict_position(&agent, &target, 2.0);
        assert!((predicted - Vec3::new(10.0, 7.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_look_ahead_degenerate_inputs() {
        let target = ActorState::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Y);
        assert_eq!(look_ahead_time(&agent_at_origin(0.0), &target, 1.0), 1.0);
        assert_eq!(look_ahead_time(&agent_at_origin(5.0), &target, 0.0), 0.0);
    }

    #[test]
    fn test_pursuit_leads_target() {
        let agent = agent_at_origin(5.0);
        let target = ActorState::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        let output = Pursuit::new(target, 1.0).steer(&agent);

        let expected = Seek::new(Vec3::new(10.0, 8.0, 0.0)).steer(&agent);
        assert!((output - expected).length() < 1e-5);
        assert!(output.y > 0.0);
    }

    #[test]
    fn test_evade_trigger_distance() {
        let agent = agent_at_origin(5.0);
        let target = ActorState::new(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO);

        let near = Evade::new(target, 5.0, 1.0).steer(&agent);
        assert!((near - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-5);

        let far_target = ActorState::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(Evade::new(far_target, 5.0, 1.0).steer(&agent), Vec3::ZERO);

        let always = Evade::new(far_target, -1.0, 1.0).steer(&agent);
        assert!(always.x < 0.0);
    }
}
