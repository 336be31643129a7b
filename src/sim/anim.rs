//! Animation clip lookup
//!
//! Models ship clips with loosely-named tracks ("Armature|Run_Forward",
//! "zombie_walk"...), so clips are found by case-insensitive substring and
//! every role has a fallback chain. A missing clip is never an error.

use serde::{Deserialize, Serialize};

use super::kind::LoopMode;

/// One animation clip of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub name: String,
    /// Length in seconds at time scale 1
    pub duration: f32,
}

impl Clip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// The clips shipped with a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipSet {
    pub clips: Vec<Clip>,
}

/// Locomotion fallback chain for enemies
const LOCOMOTION_CHAIN: [&str; 4] = ["run", "walk", "fly", "idle"];
/// Death fallback chain for enemies
const DEATH_CHAIN: [&str; 4] = ["death", "die", "fall", "down"];

impl ClipSet {
    pub fn new(clips: Vec<Clip>) -> Self {
        Self { clips }
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// First clip whose name contains `needle`, ignoring case
    pub fn find(&self, needle: &str) -> Option<&Clip> {
        let needle = needle.to_lowercase();
        self.clips
            .iter()
            .find(|c| c.name.to_lowercase().contains(&needle))
    }

    /// First clip matching any needle, tried in order
    pub fn find_any(&self, needles: &[&str]) -> Option<&Clip> {
        needles.iter().find_map(|n| self.find(n))
    }

    /// Locomotion clip: preferred name, then run/walk/fly/idle, then whatever
    /// comes first
    pub fn locomotion(&self, preferred: Option<&str>) -> Option<&Clip> {
        preferred
            .and_then(|p| self.find(p))
            .or_else(|| self.find_any(&LOCOMOTION_CHAIN))
            .or_else(|| self.clips.first())
    }

    /// Enemy death clip: "death", then die/fall/down
    pub fn enemy_death(&self) -> Option<&Clip> {
        self.find_any(&DEATH_CHAIN)
    }
}

/// The player's clips resolved once at load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerClips {
    pub run: Option<Clip>,
    pub jump: Option<Clip>,
    pub roll: Option<Clip>,
    pub death: Option<Clip>,
    pub hit: Option<Clip>,
}

impl PlayerClips {
    pub fn resolve(set: &ClipSet) -> Self {
        Self {
            run: set.find("run").cloned(),
            jump: set.find_any(&["jump", "attack"]).cloned(),
            roll: set.find("roll").cloned(),
            death: set.find("death").cloned(),
            hit: set.find_any(&["sword_slash", "hit"]).cloned(),
        }
    }
}

/// A request for the presentation layer to play a clip on an entity's rig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationIntent {
    pub clip: String,
    pub mode: LoopMode,
    /// Playback speed multiplier
    pub time_scale: f32,
}

impl AnimationIntent {
    pub fn new(clip: impl Into<String>, mode: LoopMode) -> Self {
        Self {
            clip: clip.into(),
            mode,
            time_scale: 1.0,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> ClipSet {
        ClipSet::new(names.iter().map(|n| Clip::new(*n, 1.0)).collect())
    }

    #[test]
    fn test_find_is_case_insensitive_substring() {
        let clips = set(&["Armature|RUN_Fast", "Idle"]);
        assert_eq!(clips.find("run").map(|c| c.name.as_str()), Some("Armature|RUN_Fast"));
        assert!(clips.find("jump").is_none());
    }

    #[test]
    fn test_locomotion_chain() {
        let clips = set(&["Bite", "Fly_Loop", "Idle"]);
        assert_eq!(clips.locomotion(Some("walk")).unwrap().name, "Fly_Loop");
        assert_eq!(clips.locomotion(None).unwrap().name, "Fly_Loop");

        let clips = set(&["Bite", "Scream"]);
        assert_eq!(clips.locomotion(None).unwrap().name, "Bite");

        assert!(ClipSet::default().locomotion(Some("walk")).is_none());
    }

    #[test]
    fn test_preferred_clip_wins() {
        let clips = set(&["Run", "Walk"]);
        assert_eq!(clips.locomotion(Some("walk")).unwrap().name, "Walk");
    }

    #[test]
    fn test_enemy_death_fallbacks() {
        assert_eq!(set(&["Attack", "FallDown"]).enemy_death().unwrap().name, "FallDown");
        assert!(set(&["Attack"]).enemy_death().is_none());
    }

    #[test]
    fn test_player_clip_resolution() {
        let clips = PlayerClips::resolve(&set(&["Run", "Attack", "Roll", "Death", "Sword_Slash"]));
        assert_eq!(clips.jump.unwrap().name, "Attack");
        assert_eq!(clips.hit.unwrap().name, "Sword_Slash");
        assert!(clips.roll.is_some());
    }
}
