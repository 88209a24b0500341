//! Hide behavior
//!
//! Look for tagged cover near the agent, pick the closest piece that can
//! actually conceal it, and run for the far side. With no usable cover the
//! agent evades instead.

use glam::Vec3;

use crate::agent::{ActorState, AgentState};
use crate::ai::config::{HideConfig, SteeringConfig};
use crate::ai::steering::{Evade, Seek, SteeringBehavior};
use crate::environment::{CollisionQuery, Environment, OverlapHit};
use crate::math::{Bounds, safe_normalize};

/// Whether cover with these bounds straddles the lower half of the agent
///
/// The cover must reach above the footprint's lowest point and start below
/// its center.
#[must_use]
pub fn is_hidden_by(agent: &AgentState, bounds: &Bounds) -> bool {
    bounds.max.z > agent.footprint_bottom() && bounds.min.z < agent.footprint_center.z
}

/// Closest tagged cover within the search radius that conceals the agent
///
/// Ties on distance keep the earlier query result.
#[must_use]
pub fn find_cover(agent: &AgentState, config: &HideConfig, env: &Environment<'_>) -> Option<OverlapHit> {
    let ignore = agent.ignore_list();
    let candidates =
        env.collision
            .overlap_sphere(agent.footprint_center, config.cover_search_radius, &ignore);

    let mut best: Option<OverlapHit> = None;
    for candidate in candidates {
        if !env.tags.has_tag(candidate.actor, &config.cover_tag) {
            continue;
        }
        if !is_hidden_by(agent, &candidate.bounds) {
            continue;
        }
        if best.is_none_or(|b| candidate.distance < b.distance) {
            best = Some(candidate);
        }
    }

    best
}

/// Point behind `cover` as seen from `pursuer`
///
/// A probe point past the obstacle is projected onto the obstacle's surface,
/// then pushed out by `distance_from_cover`.
#[must_use]
pub fn hiding_spot(
    cover: &OverlapHit,
    pursuer: Vec3,
    config: &HideConfig,
    collision: &dyn CollisionQuery,
) -> Vec3 {
    let direction = safe_normalize(cover.position - pursuer);
    let probe = cover.position + direction * config.safe_raycast_distance;

    let surface = collision
        .nearest_surface_point(cover.actor, probe, config.channel)
        .unwrap_or_else(|| {
            log::debug!("No surface found on cover {:?}, using probe point", cover.actor);
            probe
        });

    surface + direction * config.distance_from_cover
}

/// Hide from `target`, or evade it when no cover is usable
pub fn hide(
    agent: &AgentState,
    target: &ActorState,
    trigger_distance: f32,
    config: &SteeringConfig,
    env: &Environment<'_>,
) -> Vec3 {
    match find_cover(agent, &config.hide, env) {
        Some(cover) => {
            let spot = hiding_spot(&cover, target.position, &config.hide, env.collision);
            log::debug!(
                "Hiding behind {:?} at ({:.2}, {:.2}, {:.2})",
                cover.actor,
                spot.x,
                spot.y,
                spot.z
            );
            // Full speed: overshooting a hiding spot is fine
            Seek::new(spot).steer(agent)
        }
        None => {
            log::trace!("No cover available, evading");
            Evade::new(*target, trigger_distance, config.look_ahead_time_modifier).steer(agent)
        }
    }
}
