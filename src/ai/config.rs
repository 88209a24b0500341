//! Steering tunables
//!
//! Every value is per steering instance. Configs can be built in code with
//! the `with_*` methods or loaded from RON or JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::CollisionChannel;

/// Wander tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Maximum random displacement of the wander target per second
    pub jitter: f32,
    /// Radius of the wander circle
    pub radius: f32,
    /// Distance of the wander circle ahead of the agent
    pub distance: f32,
    /// Speed used while wandering
    pub max_speed: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            jitter: 8.0,
            radius: 1.2,
            distance: 2.0,
            max_speed: 3.0,
        }
    }
}

/// Obstacle avoidance tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Length of the forward probe
    pub collision_lookahead: f32,
    /// Colliders the probe reacts to
    pub channel: CollisionChannel,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            collision_lookahead: 4.0,
            channel: CollisionChannel::ALL,
        }
    }
}

/// Hide tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HideConfig {
    /// Tag marking an actor as usable cover
    pub cover_tag: String,
    /// Radius of the cover search around the agent
    pub cover_search_radius: f32,
    /// How far past the obstacle the surface probe starts
    pub safe_raycast_distance: f32,
    /// Margin between the cover surface and the hiding spot
    pub distance_from_cover: f32,
    /// Colliders the surface projection considers
    pub channel: CollisionChannel,
}

impl Default for HideConfig {
    fn default() -> Self {
        Self {
            cover_tag: String::from("Cover"),
            cover_search_radius: 20.0,
            safe_raycast_distance: 5.0,
            distance_from_cover: 1.0,
            channel: CollisionChannel::ALL,
        }
    }
}

/// Path following tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Horizontal distance at which a waypoint counts as reached
    pub proximity_tolerance: f32,
    /// Minimum seconds between navigation searches
    pub find_interval: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            proximity_tolerance: 0.5,
            find_interval: 1.0,
        }
    }
}

/// Enable flag and weight of one behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorWeight {
    /// Whether the behavior participates
    pub enabled: bool,
    /// Relative weight
    pub weight: f32,
}

impl Default for BehaviorWeight {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 1.0,
        }
    }
}

/// Per-behavior weights
///
/// No behavior reads these. They are carried for a future combiner that
/// blends several behavior outputs into one velocity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorWeights {
    /// Seek toward a point
    pub seek: BehaviorWeight,
    /// Flee from a point
    pub flee: BehaviorWeight,
    /// Arrive at a point
    pub arrive: BehaviorWeight,
    /// Pursue a moving actor
    pub pursuit: BehaviorWeight,
    /// Evade a moving actor
    pub evade: BehaviorWeight,
    /// Wander
    pub wander: BehaviorWeight,
    /// Forward probe avoidance
    pub obstacle_avoidance: BehaviorWeight,
    /// Hide behind cover
    pub hide: BehaviorWeight,
}

/// Steering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Arrive slows to `distance / deceleration_coefficient`
    pub deceleration_coefficient: f32,
    /// Divisor of the pursuit/evade look-ahead time
    pub look_ahead_time_modifier: f32,
    /// Wander tunables
    pub wander: WanderConfig,
    /// Obstacle avoidance tunables
    pub avoidance: AvoidanceConfig,
    /// Hide tunables
    pub hide: HideConfig,
    /// Path following tunables
    pub path: PathConfig,
    /// Behavior weights
    pub weights: BehaviorWeights,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            deceleration_coefficient: 2.0,
            look_ahead_time_modifier: 1.0,
            wander: WanderConfig::default(),
            avoidance: AvoidanceConfig::default(),
            hide: HideConfig::default(),
            path: PathConfig::default(),
            weights: BehaviorWeights::default(),
        }
    }
}

impl SteeringConfig {
    /// Set the arrive deceleration coefficient
    #[must_use]
    pub fn with_deceleration(mut self, coefficient: f32) -> Self {
        self.deceleration_coefficient = coefficient;
        self
    }

    /// Set the pursuit/evade look-ahead modifier
    #[must_use]
    pub fn with_look_ahead_modifier(mut self, modifier: f32) -> Self {
        self.look_ahead_time_modifier = modifier;
        self
    }

    /// Replace the wander tunables
    #[must_use]
    pub fn with_wander(mut self, wander: WanderConfig) -> Self {
        self.wander = wander;
        self
    }

    /// Set the obstacle probe length
    #[must_use]
    pub fn with_collision_lookahead(mut self, lookahead: f32) -> Self {
        self.avoidance.collision_lookahead = lookahead;
        self
    }

    /// Replace the hide tunables
    #[must_use]
    pub fn with_hide(mut self, hide: HideConfig) -> Self {
        self.hide = hide;
        self
    }

    /// Replace the path tunables
    #[must_use]
    pub fn with_path(mut self, path: PathConfig) -> Self {
        self.path = path;
        self
    }

    /// Check that every tunable is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("deceleration_coefficient", self.deceleration_coefficient)?;
        positive("look_ahead_time_modifier", self.look_ahead_time_modifier)?;
        non_negative("wander.jitter", self.wander.jitter)?;
        non_negative("wander.radius", self.wander.radius)?;
        non_negative("wander.distance", self.wander.distance)?;
        non_negative("wander.max_speed", self.wander.max_speed)?;
        non_negative(
            "avoidance.collision_lookahead",
            self.avoidance.collision_lookahead,
        )?;
        non_negative("hide.cover_search_radius", self.hide.cover_search_radius)?;
        non_negative("hide.safe_raycast_distance", self.hide.safe_raycast_distance)?;
        non_negative("hide.distance_from_cover", self.hide.distance_from_cover)?;
        non_negative("path.proximity_tolerance", self.path.proximity_tolerance)?;
        non_negative("path.find_interval", self.path.find_interval)?;

        if self.hide.cover_tag.is_empty() {
            return Err(ConfigError::Invalid {
                field: "hide.cover_tag",
                reason: String::from("must not be empty"),
            });
        }

        Ok(())
    }

    /// Parse and validate a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validated()
    }

    /// Parse and validate a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validated()
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        log::info!("Loaded steering config from {}", path.display());
        Ok(config)
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded steering config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if let Err(e) = self.validate() {
            log::warn!("Rejected steering config: {e}");
            return Err(e);
        }
        Ok(self)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a non-negative number, got {value}"),
        })
    }
}

/// Errors that can occur while loading a steering config
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Document could not be parsed
    Parse(String),
    /// Config could not be serialized
    Serialize(String),
    /// A tunable is out of range
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Invalid { field, reason } => write!(f, "Invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
