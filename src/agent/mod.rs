//! Agent module
//!
//! Snapshots of the steered agent and its targets, and the provider traits
//! the host implements to expose them.

mod state;

pub use state::{
    ActorId, ActorState, AgentState, Footprint, FootprintSource, Kinematics, MotionSource,
    Tracked, read_agent_state,
};
