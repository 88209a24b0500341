//! Steering module
//!
//! Provides the basic steering behaviors, wander, obstacle avoidance, hiding,
//! path following, and the per-agent component that ties them together.

mod avoidance;
mod component;
mod config;
mod hide;
mod path_follower;
mod steering;
mod wander;

pub use avoidance::obstacle_avoidance;
pub use component::Steering;
pub use config::{
    AvoidanceConfig, BehaviorWeight, BehaviorWeights, ConfigError, HideConfig, PathConfig,
    SteeringConfig, WanderConfig,
};
pub use hide::{find_cover, hide, hiding_spot, is_hidden_by};
pub use path_follower::{FollowState, PathFollower, PathUpdate, ReplanThrottle};
pub use steering::{
    Arrive, Evade, Flee, Pursuit, Seek, SteeringBehavior, look_ahead_time, predict_position,
    seek_at_speed,
};
pub use wander::Wander;
