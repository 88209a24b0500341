//! Path following
//!
//! Follows a moving actor through a waypoint queue. When the target moves,
//! the follower first tries a straight capsule sweep; only if that is blocked
//! does it fall back to a navigation search, at most once per
//! `find_interval` seconds.
//!
//! # States
//!
//! | State   | Meaning                                              |
//! |---------|------------------------------------------------------|
//! | Idle    | Nothing is being followed                            |
//! | Pending | Target set, no path requested yet                    |
//! | Direct  | Line of sight; the path is the target itself         |
//! | Planned | Waypoints came from the navigation search            |
//! | Waiting | A search is due but the replan interval has not passed |
//! | Arrived | The last waypoint was reached                        |

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use glam::Vec3;

use crate::agent::{ActorState, AgentState, Tracked};
use crate::ai::config::PathConfig;
use crate::ai::steering::{Arrive, Seek, SteeringBehavior};
use crate::environment::{CapsuleSweep, Environment, ObjectTypes};
use crate::math::distance_2d;

/// Where the follower is in its replanning cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    /// No follow target
    Idle,
    /// Following, before the first path request
    Pending,
    /// Straight path to the target
    Direct,
    /// Navigation search path
    Planned,
    /// Blocked, waiting for the replan interval
    Waiting,
    /// Path used up
    Arrived,
}

/// Outcome of one path-finding attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathUpdate {
    /// Straight line is clear; the path is the target itself
    Direct,
    /// Navigation search replaced the path
    Planned,
    /// Navigation search ran and found nothing; the path is untouched
    Failed,
    /// Search skipped because the replan interval has not elapsed
    Throttled,
}

/// Minimum spacing between expensive searches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplanThrottle {
    interval: f32,
    last_attempt: Option<f32>,
}

impl ReplanThrottle {
    /// Allow one attempt per `interval` seconds
    #[must_use]
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            last_attempt: None,
        }
    }

    /// Whether an attempt may run at time `now`
    #[must_use]
    pub fn ready(&self, now: f32) -> bool {
        match self.last_attempt {
            Some(last) => now - last >= self.interval,
            None => true,
        }
    }

    /// Record an attempt at time `now`
    pub fn record(&mut self, now: f32) {
        self.last_attempt = Some(now);
    }

    /// Time of the last recorded attempt
    #[must_use]
    pub fn last_attempt(&self) -> Option<f32> {
        self.last_attempt
    }
}

/// Waypoint queue and follow state of one agent
pub struct PathFollower {
    config: PathConfig,
    target: Option<Rc<dyn Tracked>>,
    /// Target position when the path was last updated
    last_target_position: Option<Vec3>,
    path: VecDeque<Vec3>,
    throttle: ReplanThrottle,
    state: FollowState,
}

impl PathFollower {
    /// Create an idle follower
    #[must_use]
    pub fn new(config: PathConfig) -> Self {
        Self {
            throttle: ReplanThrottle::new(config.find_interval),
            config,
            target: None,
            last_target_position: None,
            path: VecDeque::new(),
            state: FollowState::Idle,
        }
    }

    /// Start following `target`
    pub fn follow(&mut self, target: Rc<dyn Tracked>) {
        log::debug!("Following target at {:?}", target.snapshot().position);
        self.target = Some(target);
        self.last_target_position = None;
        self.path.clear();
        self.state = FollowState::Pending;
    }

    /// Stop following and drop the path
    pub fn stop(&mut self) {
        self.target = None;
        self.last_target_position = None;
        self.path.clear();
        self.state = FollowState::Idle;
    }

    /// Whether a follow target is set
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.target.is_some()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> FollowState {
        self.state
    }

    /// Remaining waypoints, front first
    #[must_use]
    pub fn path(&self) -> &VecDeque<Vec3> {
        &self.path
    }

    /// Replan rate limiter
    #[must_use]
    pub fn throttle(&self) -> &ReplanThrottle {
        &self.throttle
    }

    /// Replace the waypoint queue
    pub fn set_path(&mut self, waypoints: impl IntoIterator<Item = Vec3>) {
        self.path = waypoints.into_iter().collect();
        self.state = match self.path.len() {
            0 if self.target.is_none() => FollowState::Idle,
            0 => self.state,
            1 => FollowState::Direct,
            _ => FollowState::Planned,
        };
    }

    /// Try to build a path from the agent to `goal`
    ///
    /// A clear straight sweep at the agent's own height wins outright.
    /// Otherwise a navigation search runs if the replan interval allows. The
    /// attempt time is recorded whether or not the search succeeds.
    pub fn find_path(
        &mut self,
        agent: &AgentState,
        goal: &ActorState,
        env: &Environment<'_>,
        now: f32,
    ) -> PathUpdate {
        let start = agent.footprint_center;
        let mut ignore = agent.ignore_list();
        ignore.extend(goal.id);

        let sweep = CapsuleSweep {
            start,
            end: Vec3::new(goal.position.x, goal.position.y, start.z),
            radius: agent.footprint.radius,
            half_height: agent.footprint.half_height,
            object_types: ObjectTypes::ALL,
            ignore,
        };

        if !env.collision.capsule_sweep(&sweep) {
            self.path.clear();
            self.path.push_back(goal.position);
            self.state = FollowState::Direct;
            return PathUpdate::Direct;
        }

        if !self.throttle.ready(now) {
            self.state = FollowState::Waiting;
            return PathUpdate::Throttled;
        }
        self.throttle.record(now);

        match env.navigation.find_path(agent.position, goal.position) {
            Some(waypoints) if !waypoints.is_empty() => {
                log::debug!("Planned path with {} waypoints", waypoints.len());
                self.path = waypoints.into();
                self.state = FollowState::Planned;
                PathUpdate::Planned
            }
            _ => {
                log::debug!("Path search to {:?} failed", goal.position);
                PathUpdate::Failed
            }
        }
    }

    /// Refresh the path if the target moved, then steer along it
    pub fn update(
        &mut self,
        agent: &AgentState,
        env: &Environment<'_>,
        deceleration: f32,
        now: f32,
    ) -> Vec3 {
        let goal = self.target.as_ref().map(|target| target.snapshot());
        if let Some(goal) = goal {
            if self.last_target_position != Some(goal.position) {
                let outcome = self.find_path(agent, &goal, env, now);
                // A throttled attempt is retried next tick
                if outcome != PathUpdate::Throttled {
                    self.last_target_position = Some(goal.position);
                }
            }
        }

        self.advance(agent);
        self.steer(agent, deceleration)
    }

    /// Drop every leading waypoint within tolerance of the agent
    pub fn advance(&mut self, agent: &AgentState) {
        let mut popped = false;
        while let Some(&front) = self.path.front() {
            if distance_2d(agent.position, front) > self.config.proximity_tolerance {
                break;
            }
            log::trace!("Reached waypoint {front:?}");
            self.path.pop_front();
            popped = true;
        }

        if popped && self.path.is_empty() {
            self.state = if self.target.is_some() {
                FollowState::Arrived
            } else {
                FollowState::Idle
            };
        }
    }

    /// Steer toward the front waypoint
    ///
    /// Arrive on the final waypoint, seek on intermediate ones.
    #[must_use]
    pub fn steer(&self, agent: &AgentState, deceleration: f32) -> Vec3 {
        match self.path.len() {
            0 => Vec3::ZERO,
            1 => Arrive::new(self.path[0], deceleration).steer(agent),
            _ => Seek::new(self.path[0]).steer(agent),
        }
    }
}

impl fmt::Debug for PathFollower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFollower")
            .field("state", &self.state)
            .field("following", &self.target.is_some())
            .field("last_target_position", &self.last_target_position)
            .field("path", &self.path)
            .field("throttle", &self.throttle)
            .finish()
    }
}
