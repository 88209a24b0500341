//! Per-agent steering component
//!
//! Owns the tunables and the per-agent mutable state (wander target, follow
//! state, waypoint queue, replan time). Agent state is read through the
//! providers handed over at construction, fresh on every call.

use std::rc::Rc;

use glam::Vec3;

use crate::agent::{
    ActorState, AgentState, FootprintSource, MotionSource, Tracked, read_agent_state,
};
use crate::ai::avoidance;
use crate::ai::config::{ConfigError, SteeringConfig};
use crate::ai::hide;
use crate::ai::path_follower::{FollowState, PathFollower};
use crate::ai::steering::{Arrive, Evade, Flee, Pursuit, Seek, SteeringBehavior};
use crate::ai::wander::Wander;
use crate::environment::{CollisionQuery, Environment};

/// Steering component for one agent
#[derive(Debug)]
pub struct Steering<M, F> {
    config: SteeringConfig,
    motion: M,
    footprint: F,
    wander: Wander,
    follower: PathFollower,
}

impl<M: MotionSource, F: FootprintSource> Steering<M, F> {
    /// Create a steering component
    ///
    /// The config is trusted as given; out-of-range tunables only trip a
    /// debug assertion. Use [`Steering::try_new`] for configs loaded at runtime.
    pub fn new(config: SteeringConfig, motion: M, footprint: F) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid steering config");
        Self {
            follower: PathFollower::new(config.path.clone()),
            config,
            motion,
            footprint,
            wander: Wander::new(),
        }
    }

    /// Create a steering component after validating the config
    ///
    /// # Errors
    ///
    /// Returns an error if any tunable is out of range
    pub fn try_new(config: SteeringConfig, motion: M, footprint: F) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, motion, footprint))
    }

    /// Use a reproducible wander sequence
    #[must_use]
    pub fn with_wander_seed(mut self, seed: u64) -> Self {
        self.wander = Wander::with_seed(seed);
        self
    }

    /// Tunables
    #[must_use]
    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Current agent snapshot
    #[must_use]
    pub fn agent_state(&self) -> AgentState {
        read_agent_state(&self.motion, &self.footprint)
    }

    /// Move toward `target` at full speed
    #[must_use]
    pub fn seek(&self, target: Vec3) -> Vec3 {
        Seek::new(target).steer(&self.agent_state())
    }

    /// Move away from `target` while within `trigger_distance` (negative: always)
    #[must_use]
    pub fn flee(&self, target: Vec3, trigger_distance: f32) -> Vec3 {
        Flee::within(target, trigger_distance).steer(&self.agent_state())
    }

    /// Move toward `target`, slowing down on approach
    #[must_use]
    pub fn arrive(&self, target: Vec3) -> Vec3 {
        Arrive::new(target, self.config.deceleration_coefficient).steer(&self.agent_state())
    }

    /// Intercept a moving target
    #[must_use]
    pub fn pursuit<T: Tracked + ?Sized>(&self, target: &T) -> Vec3 {
        Pursuit::new(target.snapshot(), self.config.look_ahead_time_modifier)
            .steer(&self.agent_state())
    }

    /// Run from a moving target while within `trigger_distance` (negative: always)
    #[must_use]
    pub fn evade<T: Tracked + ?Sized>(&self, target: &T, trigger_distance: f32) -> Vec3 {
        Evade::new(
            target.snapshot(),
            trigger_distance,
            self.config.look_ahead_time_modifier,
        )
        .steer(&self.agent_state())
    }

    /// Jittered random walk ahead of the agent
    pub fn wander(&mut self, delta_time: f32) -> Vec3 {
        let agent = self.agent_state();
        self.wander.steer(&agent, &self.config.wander, delta_time)
    }

    /// Current wander circle offset
    #[must_use]
    pub fn wander_target(&self) -> Vec3 {
        self.wander.target()
    }

    /// Steer away from an obstacle directly ahead
    #[must_use]
    pub fn obstacle_avoidance(&self, collision: &dyn CollisionQuery) -> Vec3 {
        avoidance::obstacle_avoidance(&self.agent_state(), &self.config.avoidance, collision)
    }

    /// Run for cover from `target`, evading when there is none
    #[must_use]
    pub fn hide<T: Tracked + ?Sized>(
        &self,
        target: &T,
        trigger_distance: f32,
        env: &Environment<'_>,
    ) -> Vec3 {
        let target: ActorState = target.snapshot();
        hide::hide(
            &self.agent_state(),
            &target,
            trigger_distance,
            &self.config,
            env,
        )
    }

    /// Start following `target`
    pub fn follow(&mut self, target: Rc<dyn Tracked>) {
        self.follower.follow(target);
    }

    /// Stop following
    pub fn stop_following(&mut self) {
        self.follower.stop();
    }

    /// Per-tick path update; returns the path-following velocity delta
    pub fn update_path(&mut self, env: &Environment<'_>, now: f32) -> Vec3 {
        let agent = self.agent_state();
        self.follower
            .update(&agent, env, self.config.deceleration_coefficient, now)
    }

    /// Path follower state
    #[must_use]
    pub fn follow_state(&self) -> FollowState {
        self.follower.state()
    }

    /// Path follower
    #[must_use]
    pub fn path_follower(&self) -> &PathFollower {
        &self.follower
    }

    /// Path follower, mutably
    pub fn path_follower_mut(&mut self) -> &mut PathFollower {
        &mut self.follower
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ActorId, Kinematics};
    use crate::ai::config::WanderConfig;
    use std::cell::RefCell;

    type Body = Rc<RefCell<Kinematics>>;

    fn body(position: Vec3, max_speed: f32) -> Body {
        Rc::new(RefCell::new(
            Kinematics::new(position, max_speed).with_id(ActorId(1)),
        ))
    }

    fn steering(body: &Body, config: SteeringConfig) -> Steering<Body, Body> {
        Steering::new(config, Rc::clone(body), Rc::clone(body)).with_wander_seed(5)
    }

    #[test]
    fn test_reads_live_host_state() {
        let agent = body(Vec3::ZERO, 5.0);
        let steering = steering(&agent, SteeringConfig::default());

        assert!((steering.seek(Vec3::new(10.0, 0.0, 0.0)) - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);

        // Host moves the agent past the target
        agent.borrow_mut().position = Vec3::new(20.0, 0.0, 0.0);
        assert!((steering.seek(Vec3::new(10.0, 0.0, 0.0)) - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_arrive_uses_config() {
        let agent = body(Vec3::ZERO, 5.0);
        let steering = steering(&agent, SteeringConfig::default().with_deceleration(10.0));

        assert!((steering.arrive(Vec3::new(100.0, 0.0, 0.0)) - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert!((steering.arrive(Vec3::new(20.0, 0.0, 0.0)) - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_flee_and_evade() {
        let agent = body(Vec3::ZERO, 5.0);
        let steering = steering(&agent, SteeringConfig::default());

        assert!(steering.flee(Vec3::new(3.0, 0.0, 0.0), 5.0).length() > 0.0);
        assert_eq!(steering.flee(Vec3::new(10.0, 0.0, 0.0), 5.0), Vec3::ZERO);

        let pursuer = Kinematics::new(Vec3::new(3.0, 0.0, 0.0), 4.0);
        assert!(steering.evade(&pursuer, 5.0).x < 0.0);
    }

    #[test]
    fn test_pursuit_of_shared_target() {
        let agent = body(Vec3::ZERO, 5.0);
        let steering = steering(&agent, SteeringConfig::default());
        let target = Rc::new(RefCell::new(ActorState::new(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )));

        let output = steering.pursuit(&*target);
        assert!(output.x > 0.0 && output.y > 0.0);
    }

    #[test]
    fn test_wander_keeps_radius() {
        let agent = body(Vec3::ZERO, 5.0);
        let config = SteeringConfig::default().with_wander(WanderConfig {
            jitter: 20.0,
            radius: 2.0,
            distance: 4.0,
            max_speed: 3.0,
        });
        let mut steering = steering(&agent, config);

        for _ in 0..200 {
            let delta = steering.wander(0.05);
            agent.borrow_mut().integrate(delta, 0.05);
            assert!((steering.wander_target().length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_try_new_rejects_bad_config() {
        let agent = body(Vec3::ZERO, 5.0);
        let result = Steering::try_new(
            SteeringConfig::default().with_look_ahead_modifier(0.0),
            Rc::clone(&agent),
            Rc::clone(&agent),
        );
        assert!(result.is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid steering config")]
    fn test_new_asserts_valid_config() {
        let agent = body(Vec3::ZERO, 5.0);
        let _ = steering(&agent, SteeringConfig::default().with_deceleration(-2.0));
    }

    #[test]
    fn test_follow_and_stop() {
        let agent = body(Vec3::ZERO, 5.0);
        let mut steering = steering(&agent, SteeringConfig::default());
        let target: Rc<dyn Tracked> = Rc::new(ActorState::new(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO));

        steering.follow(target);
        assert!(steering.path_follower().is_following());
        assert_eq!(steering.follow_state(), FollowState::Pending);

        steering.stop_following();
        assert_eq!(steering.follow_state(), FollowState::Idle);
    }
}
