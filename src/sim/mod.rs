//! Frame-driven simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only advances through `tick`
//! - Randomness only through the session's injected RNG
//! - Every entity collection owned by exactly one subsystem
//! - No rendering, DOM or audio dependencies; effects leave as `GameEvent`s

pub mod aabb;
pub mod anim;
pub mod collision;
pub mod difficulty;
pub mod enemy;
pub mod kind;
pub mod player;
pub mod rng;
pub mod shield;
pub mod state;
pub mod tick;
pub mod track;

pub use aabb::Aabb;
pub use anim::{AnimationIntent, Clip, ClipSet, PlayerClips};
pub use collision::{Resolution, resolve};
pub use difficulty::{Difficulty, max_active_enemies, spawn_interval};
pub use enemy::{Enemy, EnemySpawner, EnemyStatus};
pub use kind::{EnemyKind, KindConfig, LoopMode, Reaction, RestPose};
pub use player::{DeathStage, InputIntent, Player, PlayerState};
pub use shield::{ShieldPickup, ShieldSpawner};
pub use state::{
    AnimationToken, EnemyRef, EntityRef, GameEvent, GamePhase, GameSession, Transform, Visual,
};
pub use tick::{TickInput, autopilot_intent, tick};
pub use track::{Decoration, DecorationKind, Track, TrackSegment};
