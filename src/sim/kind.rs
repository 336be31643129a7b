//! Enemy archetypes and their static configuration

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which player animation an enemy's attack provokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reaction {
    /// Hit clip first, then the death clip (unless the kind skips it)
    Hit,
    /// Straight to the death clip
    Death,
}

/// Where the player's body comes to rest after dying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestPose {
    Ground,
    Air,
}

/// How a clip repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    Once,
    Repeat,
}

/// Static configuration for one enemy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindConfig {
    /// Asset key of the model
    pub key: &'static str,
    /// Uniform model scale
    pub scale: f32,
    /// Speed added on top of the scroll speed while chasing
    pub run_speed: f32,
    /// Preferred locomotion clip (substring), if any
    pub move_anim: Option<&'static str>,
    /// Clip played when this kind ends the run
    pub attack_anim: &'static str,
    /// How the attack clip loops
    pub attack_loop: LoopMode,
    /// Player reaction to this kind's attack
    pub reaction: Reaction,
    /// Player resting pose after the attack
    pub rest_pose: RestPose,
    /// Skip the player's death clip after the hit clip
    pub skip_death_anim: bool,
    /// Height the enemy travels at
    pub spawn_height: f32,
    /// Yaw applied at spawn (radians)
    pub spawn_yaw: f32,
    /// Half-extents of the model bounds
    pub half_extents: Vec3,
    /// Extra padding added to the bounds for collision
    pub hit_margin: f32,
}

/// The four enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Slow shambling zombie with a generous hitbox
    Walker,
    /// Ground crawler, can be jumped
    Crawler,
    /// Fast sprinting zombie
    Runner,
    /// Bat flying at head height, can be rolled under
    Flyer,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Walker,
        EnemyKind::Crawler,
        EnemyKind::Runner,
        EnemyKind::Flyer,
    ];

    /// Kinds the player can get past without changing lanes
    pub const PASSABLE: [EnemyKind; 2] = [EnemyKind::Crawler, EnemyKind::Flyer];

    pub fn config(self) -> &'static KindConfig {
        match self {
            EnemyKind::Walker => &WALKER,
            EnemyKind::Crawler => &CRAWLER,
            EnemyKind::Runner => &RUNNER,
            EnemyKind::Flyer => &FLYER,
        }
    }

    /// Asset key of the kind's model
    pub fn key(self) -> &'static str {
        self.config().key
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn is_passable(self) -> bool {
        Self::PASSABLE.contains(&self)
    }

    pub fn is_airborne(self) -> bool {
        matches!(self, EnemyKind::Flyer)
    }
}

static WALKER: KindConfig = KindConfig {
    key: "zombie1",
    scale: 0.35,
    run_speed: 3.0,
    move_anim: Some("walk"),
    attack_anim: "Attack",
    attack_loop: LoopMode::Once,
    reaction: Reaction::Hit,
    rest_pose: RestPose::Ground,
    skip_death_anim: false,
    spawn_height: 0.0,
    spawn_yaw: 0.0,
    half_extents: Vec3::new(0.45, 0.9, 0.45),
    hit_margin: 0.8,
};

static CRAWLER: KindConfig = KindConfig {
    key: "zombie2",
    scale: 0.5,
    run_speed: 5.0,
    move_anim: None,
    attack_anim: "Attack",
    attack_loop: LoopMode::Repeat,
    reaction: Reaction::Hit,
    rest_pose: RestPose::Ground,
    skip_death_anim: false,
    spawn_height: 0.0,
    spawn_yaw: 0.0,
    half_extents: Vec3::new(0.45, 0.35, 0.6),
    hit_margin: 0.2,
};

static RUNNER: KindConfig = KindConfig {
    key: "zombie3",
    scale: 1.4,
    run_speed: 15.0,
    move_anim: Some("Run"),
    attack_anim: "Bite",
    attack_loop: LoopMode::Once,
    reaction: Reaction::Hit,
    rest_pose: RestPose::Ground,
    skip_death_anim: false,
    spawn_height: 0.0,
    spawn_yaw: 0.0,
    half_extents: Vec3::new(0.5, 1.2, 0.5),
    hit_margin: 0.2,
};

static FLYER: KindConfig = KindConfig {
    key: "zombie4",
    scale: 1.4,
    run_speed: 8.0,
    move_anim: None,
    attack_anim: "Bite",
    attack_loop: LoopMode::Once,
    reaction: Reaction::Death,
    rest_pose: RestPose::Ground,
    skip_death_anim: false,
    spawn_height: 1.7,
    spawn_yaw: -std::f32::consts::FRAC_PI_2,
    half_extents: Vec3::new(0.6, 0.3, 0.45),
    hit_margin: 0.3,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for kind in EnemyKind::ALL {
            assert_eq!(EnemyKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(EnemyKind::from_key("zombie9"), None);
    }

    #[test]
    fn test_hit_margins_ordering() {
        let walker = EnemyKind::Walker.config().hit_margin;
        let flyer = EnemyKind::Flyer.config().hit_margin;
        let runner = EnemyKind::Runner.config().hit_margin;
        assert!(walker > flyer && flyer > runner);
        assert_eq!(EnemyKind::Crawler.config().hit_margin, runner);
    }

    #[test]
    fn test_only_flyer_is_airborne() {
        assert!(EnemyKind::Flyer.is_airborne());
        assert!(EnemyKind::Flyer.config().spawn_height > 0.0);
        assert!(!EnemyKind::Walker.is_airborne());
        assert!(EnemyKind::Crawler.is_passable());
        assert!(!EnemyKind::Runner.is_passable());
    }
}
