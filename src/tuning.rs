//! Data-driven game balance
//!
//! Every knob has a default matching the shipped game, so a tuning file only
//! needs to list the values it changes.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Forward speed at run start
    pub start_speed: f32,
    /// Speed gained per second while playing
    pub acceleration: f32,
    /// Downward acceleration during a jump
    pub gravity: f32,
    /// Initial upward velocity of a jump
    pub jump_force: f32,
    /// Rate at which the player's x eases toward the target lane (1/s)
    pub lane_ease_rate: f32,
    /// Roll length used when the player model has no roll clip (seconds)
    pub roll_duration_fallback: f32,
    /// Playback speed of the roll clip
    pub roll_time_scale: f32,

    /// Number of corridor segments
    pub segment_count: usize,
    /// Length of each corridor segment
    pub segment_length: f32,

    /// Seconds between shield spawn attempts
    pub shield_spawn_interval: f32,
    /// Probability that a spawn attempt produces a pickup
    pub shield_spawn_chance: f64,
    /// Shield buff length in seconds
    pub shield_max_duration: f32,

    /// Enemy cap at distance zero
    pub base_max_enemies: u32,
    /// Hard ceiling on the enemy cap
    pub enemy_limit: u32,
    /// Meters per extra allowed enemy
    pub meters_per_extra_enemy: f32,
    /// Spawn interval at distance zero
    pub base_spawn_interval: f32,
    /// Shortest spawn interval
    pub min_spawn_interval: f32,
    /// Meters over which the spawn interval shrinks by one second
    pub spawn_interval_falloff: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_speed: START_SPEED,
            acceleration: ACCELERATION,
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,
            lane_ease_rate: 10.0,
            roll_duration_fallback: 0.6,
            roll_time_scale: 2.0,

            segment_count: SEGMENT_COUNT,
            segment_length: SEGMENT_LENGTH,

            shield_spawn_interval: 5.0,
            shield_spawn_chance: 0.75,
            shield_max_duration: SHIELD_MAX_DURATION,

            base_max_enemies: 12,
            enemy_limit: 150,
            meters_per_extra_enemy: 100.0,
            base_spawn_interval: 1.0,
            min_spawn_interval: 0.3,
            spawn_interval_falloff: 2500.0,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON (for dumping a template tuning file)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Tuning with a constant forward speed
    pub fn constant_speed(speed: f32) -> Self {
        Self {
            start_speed: speed,
            acceleration: 0.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "start_speed": 10.0, "segment_count": 6 }"#).unwrap();
        assert_eq!(tuning.start_speed, 10.0);
        assert_eq!(tuning.segment_count, 6);
        assert_eq!(tuning.gravity, GRAVITY);
        assert_eq!(tuning.enemy_limit, 150);
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::constant_speed(9.0);
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ start_speed: }").is_err());
    }
}
