//! Zomb Rush - An endless zombie runner
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (track, enemies, shields, player, collisions)
//! - `platform`: Collaborator interfaces (presentation, UI, audio, input)
//! - `assets`: Model/clip catalog and its fail-fast loading contract
//! - `highscores`: Best-distance bookkeeping and its storage
//! - `tuning`: Data-driven game balance
//! - `app`: Host-side wiring of the session to its collaborators

pub mod app;
pub mod assets;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use app::Game;
pub use assets::{AssetCatalog, AssetError};
pub use highscores::{BestDistance, MemoryStore, ScoreStore};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Lateral x position of each lane (left, center, right)
    pub const LANE_X: [f32; 3] = [-2.5, 0.0, 2.5];
    /// Number of lanes
    pub const LANE_COUNT: usize = 3;
    /// Lane the player starts in
    pub const START_LANE: usize = 1;

    /// Track segment length along z
    pub const SEGMENT_LENGTH: f32 = 20.0;
    /// Segments kept alive in the corridor loop
    pub const SEGMENT_COUNT: usize = 8;

    /// Forward z past which entities are recycled or removed
    pub const DESPAWN_Z: f32 = 35.0;
    /// Player depth (camera sits behind at z = 15)
    pub const PLAYER_Z: f32 = 6.0;

    /// Forward speed at the start of a run (m/s)
    pub const START_SPEED: f32 = 8.0;
    /// Forward acceleration while playing (m/s²)
    pub const ACCELERATION: f32 = 0.3;

    /// Jump physics
    pub const GRAVITY: f32 = 35.0;
    pub const JUMP_FORCE: f32 = 12.0;

    /// Shield buff length in seconds
    pub const SHIELD_MAX_DURATION: f32 = 10.0;

    /// Enemy reference z used when no enemy is alive
    pub const DEFAULT_ENEMY_MIN_Z: f32 = -60.0;
    /// Shield-killed enemies linger this long before removal (seconds)
    pub const DEAD_ENEMY_GRACE: f32 = 3.0;
}

/// Linear interpolation, `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// X position of a lane index (clamped to the outer lanes)
#[inline]
pub fn lane_x(lane: usize) -> f32 {
    consts::LANE_X[lane.min(consts::LANE_COUNT - 1)]
}
