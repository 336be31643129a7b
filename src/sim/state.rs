//! Session state and the events it hands to the host
//!
//! One `GameSession` lives for the whole process. Retry and home tear down
//! every mutable collection synchronously and bump the generation, so an
//! animation callback captured before the reset can be recognized as stale.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::anim::{AnimationIntent, PlayerClips};
use super::difficulty::Difficulty;
use super::enemy::EnemySpawner;
use super::kind::EnemyKind;
use super::player::{DeathStage, InputIntent, Player, PlayerState};
use super::rng::entropy_rng;
use super::shield::ShieldSpawner;
use super::track::{Decoration, Track};
use crate::assets::AssetCatalog;
use crate::tuning::Tuning;

/// Aura offset from the player's feet
const AURA_OFFSET: Vec3 = Vec3::new(0.0, 1.5, -1.0);
/// Player model scale
const PLAYER_SCALE: f32 = 1.5;

/// Phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start screen, nothing moves
    Menu,
    /// Active run
    Playing,
    /// Run lost, death sequence playing, world frozen
    Dying,
    /// Game-over screen
    GameOver,
}

/// Handle to something the presentation layer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Player,
    /// Shield carried by the player
    ShieldAura,
    Segment(u32),
    Enemy(u32),
    Pickup(u32),
}

/// Placement of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about y (radians)
    pub yaw: f32,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, yaw: f32, scale: Vec3) -> Self {
        Self {
            position,
            yaw,
            scale,
        }
    }
}

/// What to instantiate for a spawned entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Visual {
    /// Clone of the catalog template with this key
    Model(String),
    /// The player's model
    Player,
    /// A track segment with its decorations
    Segment(Vec<Decoration>),
}

/// The enemy that ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyRef {
    pub id: u32,
    pub kind: EnemyKind,
}

/// Identifies one death-sequence clip of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationToken {
    pub generation: u64,
    pub stage: DeathStage,
}

/// Things that happened during a call into the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawn {
        entity: EntityRef,
        visual: Visual,
        transform: Transform,
    },
    Despawn {
        entity: EntityRef,
    },
    Animate {
        entity: EntityRef,
        intent: AnimationIntent,
    },
    StopAnimation {
        entity: EntityRef,
    },
    /// Show or hide a spawned entity without despawning it
    Visibility {
        entity: EntityRef,
        visible: bool,
    },
    PhaseChanged(GamePhase),
    ShieldIndicator(bool),
    /// Remaining shield in percent
    ShieldLevel(f32),
    MusicStart,
    MusicStop,
    DeathCue,
    /// Death sequence done; `meters` is floor(distance)
    RunEnded {
        meters: u32,
    },
}

/// State of one playthrough, re-entered via retry and home
pub struct GameSession<R: Rng = Pcg32> {
    pub phase: GamePhase,
    pub difficulty: Difficulty,
    pub killer: Option<EnemyRef>,
    pub track: Track,
    pub enemies: EnemySpawner,
    pub shields: ShieldSpawner,
    pub player: Player,
    pub tuning: Tuning,
    pub(crate) catalog: AssetCatalog,
    pub(crate) rng: R,
    pub(crate) events: Vec<GameEvent>,
    generation: u64,
}

impl GameSession<Pcg32> {
    /// Session with an entropy-seeded RNG
    pub fn new(tuning: Tuning, catalog: AssetCatalog) -> Self {
        Self::with_rng(tuning, catalog, entropy_rng())
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_rng(tuning: Tuning, catalog: AssetCatalog, mut rng: R) -> Self {
        let track = Track::new(&tuning, &catalog, &mut rng);
        let clips = PlayerClips::resolve(&catalog.player().clips);
        if clips.run.is_none() {
            log::warn!("Player model has no run clip");
        }
        let player = Player::new(&tuning, clips);

        let mut session = Self {
            phase: GamePhase::Menu,
            difficulty: Difficulty::new(&tuning),
            killer: None,
            enemies: EnemySpawner::new(&tuning),
            shields: ShieldSpawner::new(&tuning),
            track,
            player,
            tuning,
            catalog,
            rng,
            events: Vec::new(),
            generation: 0,
        };

        for segment in &session.track.segments {
            session.events.push(GameEvent::Spawn {
                entity: EntityRef::Segment(segment.id),
                visual: Visual::Segment(segment.decorations.clone()),
                transform: Transform::new(Vec3::new(0.0, 0.0, segment.z), 0.0, Vec3::ONE),
            });
        }
        session.events.push(GameEvent::Spawn {
            entity: EntityRef::Player,
            visual: Visual::Player,
            transform: session.player_transform(),
        });
        session.events.push(GameEvent::Visibility {
            entity: EntityRef::Player,
            visible: false,
        });
        session.player.reset(&mut session.events);
        session.events.push(GameEvent::PhaseChanged(GamePhase::Menu));
        session
    }

    pub fn speed(&self) -> f32 {
        self.difficulty.speed
    }

    pub fn distance(&self) -> f32 {
        self.difficulty.distance
    }

    /// Run in progress (including the death sequence)
    pub fn is_started(&self) -> bool {
        matches!(self.phase, GamePhase::Playing | GamePhase::Dying)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The player is only drawn during a run
    fn set_player_visible(&mut self, visible: bool) {
        if self.player.visible == visible {
            return;
        }
        self.player.visible = visible;
        self.events.push(GameEvent::Visibility {
            entity: EntityRef::Player,
            visible,
        });
    }

    fn set_phase(&mut self, phase: GamePhase) {
        log::info!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.events.push(GameEvent::PhaseChanged(phase));
    }

    /// Zero distance and speed, forget the killer, and reset every subsystem
    pub fn reset(&mut self) {
        self.generation += 1;
        self.difficulty = Difficulty::new(&self.tuning);
        self.killer = None;
        self.enemies.reset(&self.tuning, &mut self.events);
        self.shields.reset(&mut self.events);
        self.player.reset(&mut self.events);
    }

    fn begin_run(&mut self) {
        self.reset();
        self.enemies
            .spawn_initial(&self.catalog, &mut self.rng, &mut self.events);
        self.set_player_visible(true);
        self.set_phase(GamePhase::Playing);
        self.events.push(GameEvent::MusicStart);
        log::info!("Run started (generation {})", self.generation);
    }

    /// Menu -> Playing
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Menu {
            return false;
        }
        self.begin_run();
        true
    }

    /// Game over -> Playing
    pub fn retry(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.begin_run();
        true
    }

    /// Back to the menu from anywhere
    pub fn go_home(&mut self) {
        if self.phase == GamePhase::Menu {
            return;
        }
        if self.phase == GamePhase::Playing {
            self.events.push(GameEvent::MusicStop);
        }
        self.reset();
        self.set_player_visible(false);
        self.set_phase(GamePhase::Menu);
    }

    /// Route one input intent to the player; ignored outside an active run
    pub fn handle_input(&mut self, intent: InputIntent) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.player.handle_input(intent, &mut self.events)
    }

    /// Unshielded contact: freeze the world and start the death sequence
    pub(crate) fn end_run(&mut self, killer: EnemyRef) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.killer = Some(killer);
        self.enemies
            .play_attack(killer.id, &self.catalog, &mut self.events);
        self.player.trigger_death(Some(killer.kind), &mut self.events);
        self.events.push(GameEvent::MusicStop);
        self.events.push(GameEvent::DeathCue);
        log::info!(
            "Caught by {} at {}m",
            killer.kind.key(),
            self.difficulty.meters()
        );
        self.set_phase(GamePhase::Dying);
    }

    /// Dying -> GameOver once the death sequence is done
    pub(crate) fn finish_run(&mut self) {
        if self.phase != GamePhase::Dying {
            return;
        }
        let meters = self.difficulty.meters();
        self.set_player_visible(false);
        self.events.push(GameEvent::RunEnded { meters });
        self.set_phase(GamePhase::GameOver);
    }

    /// Token for the death clip currently playing, if any
    pub fn animation_token(&self) -> Option<AnimationToken> {
        match self.player.state {
            PlayerState::Dying { stage, .. } if stage != DeathStage::Finished => Some(AnimationToken {
                generation: self.generation,
                stage,
            }),
            _ => None,
        }
    }

    /// Completion signal for a death clip. Tokens from an earlier generation
    /// are dropped.
    pub fn animation_finished(&mut self, token: AnimationToken) -> bool {
        if token.generation != self.generation || self.phase != GamePhase::Dying {
            log::debug!("Ignoring stale animation token {:?}", token);
            return false;
        }
        self.player.complete_stage(token.stage, &mut self.events);
        if self.player.death_finished() {
            self.finish_run();
        }
        true
    }

    pub fn player_transform(&self) -> Transform {
        Transform::new(self.player.pos, std::f32::consts::PI, Vec3::splat(PLAYER_SCALE))
    }

    /// Where the carried shield is drawn, if carried
    pub fn aura_transform(&self) -> Option<Transform> {
        self.shields.has_shield.then(|| {
            Transform::new(self.player.pos + AURA_OFFSET, std::f32::consts::PI, Vec3::ONE)
        })
    }

    /// Current placement of every live, visible entity
    pub fn transforms(&self) -> Vec<(EntityRef, Transform)> {
        let mut out = Vec::with_capacity(
            self.track.segments.len() + self.enemies.enemies.len() + self.shields.pickups.len() + 2,
        );
        out.extend(self.track.segments.iter().map(|s| {
            (
                EntityRef::Segment(s.id),
                Transform::new(Vec3::new(0.0, 0.0, s.z), 0.0, Vec3::ONE),
            )
        }));
        out.extend(
            self.enemies
                .enemies
                .iter()
                .map(|e| (EntityRef::Enemy(e.id), e.transform())),
        );
        out.extend(
            self.shields
                .pickups
                .iter()
                .map(|p| (EntityRef::Pickup(p.id), p.transform())),
        );
        if self.player.visible {
            out.push((EntityRef::Player, self.player_transform()));
        }
        if let Some(aura) = self.aura_transform() {
            out.push((EntityRef::ShieldAura, aura));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::seeded_rng;

    fn session(seed: u64) -> GameSession {
        GameSession::with_rng(Tuning::default(), AssetCatalog::builtin(), seeded_rng(seed))
    }

    #[test]
    fn test_new_session_is_on_menu() {
        let mut s = session(1);
        assert_eq!(s.phase, GamePhase::Menu);
        assert!(!s.is_started());
        let events = s.drain_events();
        let segments = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Spawn { entity: EntityRef::Segment(_), .. }))
            .count();
        assert_eq!(segments, 8);
        assert_eq!(events.last(), Some(&GameEvent::PhaseChanged(GamePhase::Menu)));
        assert!(s.enemies.enemies.is_empty());
    }

    #[test]
    fn test_start_spawns_opening_burst() {
        let mut s = session(2);
        s.drain_events();
        assert!(s.start());
        assert_eq!(s.phase, GamePhase::Playing);
        assert!(s.enemies.active_count() >= 12);
        assert!(s.events().contains(&GameEvent::MusicStart));
        assert!(!s.start());
    }

    #[test]
    fn test_retry_only_from_game_over() {
        let mut s = session(3);
        assert!(!s.retry());
        s.start();
        assert!(!s.retry());
    }

    #[test]
    fn test_input_ignored_outside_run() {
        let mut s = session(4);
        assert!(!s.handle_input(InputIntent::LaneLeft));
        s.start();
        assert!(s.handle_input(InputIntent::LaneLeft));
        assert_eq!(s.player.lane, 0);
    }

    #[test]
    fn test_end_run_and_stale_token() {
        let mut s = session(5);
        s.start();
        let id = s.enemies.enemies[0].id;
        s.end_run(EnemyRef {
            id,
            kind: EnemyKind::Walker,
        });
        assert_eq!(s.phase, GamePhase::Dying);
        assert!(s.player.is_dying());
        assert!(s.events().contains(&GameEvent::DeathCue));

        let token = s.animation_token().unwrap();
        assert_eq!(token.stage, DeathStage::Hit);

        s.go_home();
        assert_eq!(s.phase, GamePhase::Menu);
        assert!(!s.animation_finished(token));
        assert!(!s.player.is_dying());
        assert!(s.enemies.enemies.is_empty());
        assert!(s.killer.is_none());
    }

    #[test]
    fn test_completion_signal_finishes_run() {
        let mut s = session(6);
        s.start();
        s.end_run(EnemyRef {
            id: 0,
            kind: EnemyKind::Walker,
        });
        let hit = s.animation_token().unwrap();
        assert!(s.animation_finished(hit));
        let death = s.animation_token().unwrap();
        assert_eq!(death.stage, DeathStage::Death);
        s.drain_events();
        assert!(s.animation_finished(death));
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(s.events().contains(&GameEvent::RunEnded { meters: 0 }));
        assert!(s.animation_token().is_none());
        assert!(s.retry());
    }

    fn player_visibility(events: &[GameEvent]) -> Vec<bool> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Visibility {
                    entity: EntityRef::Player,
                    visible,
                } => Some(*visible),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_player_shown_only_during_run() {
        let mut s = session(9);
        assert_eq!(player_visibility(s.events()), vec![false]);
        assert!(!s.player.visible);
        assert!(!s.transforms().iter().any(|(e, _)| *e == EntityRef::Player));

        s.drain_events();
        s.start();
        assert_eq!(player_visibility(s.events()), vec![true]);
        assert!(s.transforms().iter().any(|(e, _)| *e == EntityRef::Player));

        s.drain_events();
        s.go_home();
        assert_eq!(player_visibility(s.events()), vec![false]);
        assert!(!s.transforms().iter().any(|(e, _)| *e == EntityRef::Player));

        // Game over hides the player too
        s.start();
        s.end_run(EnemyRef {
            id: 0,
            kind: EnemyKind::Flyer,
        });
        s.drain_events();
        while let Some(token) = s.animation_token() {
            s.animation_finished(token);
        }
        assert_eq!(s.phase, GamePhase::GameOver);
        assert_eq!(player_visibility(s.events()), vec![false]);
        assert!(!s.player.visible);
    }

    #[test]
    fn test_reset_bumps_generation() {
        let mut s = session(7);
        let g = s.generation();
        s.start();
        assert_eq!(s.generation(), g + 1);
        s.go_home();
        assert_eq!(s.generation(), g + 2);
    }

    #[test]
    fn test_transforms_cover_every_entity() {
        let mut s = session(8);
        s.start();
        s.shields.collect(&s.catalog, &mut s.events);
        let transforms = s.transforms();
        assert_eq!(
            transforms.len(),
            8 + s.enemies.active_count() + s.shields.pickups.len() + 2
        );
        assert!(transforms.iter().any(|(e, _)| *e == EntityRef::Player));
        let aura = transforms
            .iter()
            .find(|(e, _)| *e == EntityRef::ShieldAura)
            .unwrap();
        assert_eq!(aura.1.position, s.player.pos + AURA_OFFSET);
    }
}
