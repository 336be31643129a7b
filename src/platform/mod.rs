//! Platform abstraction layer
//!
//! The narrow interfaces the simulation talks to. Everything here is
//! fire-and-forget from the core's side:
//! - Presentation (spawn/despawn/transform/animation of entities)
//! - UI screens and HUD
//! - Audio cues
//! - Keyboard input mapped to intents

pub use crate::assets::{AssetCatalog, AssetError, AssetProvider, BuiltinAssets};
pub use crate::sim::InputIntent;

use crate::sim::{AnimationIntent, EntityRef, GameEvent, GameSession, Player, Transform, Visual};
use rand::Rng;

/// Draws entities; never queried by the core
pub trait PresentationSink {
    fn spawn(&mut self, entity: EntityRef, visual: &Visual, transform: Transform);
    fn despawn(&mut self, entity: EntityRef);
    fn set_transform(&mut self, entity: EntityRef, transform: Transform);
    fn play_animation(&mut self, entity: EntityRef, intent: &AnimationIntent);
    fn stop_animation(&mut self, entity: EntityRef);
    fn set_visible(&mut self, entity: EntityRef, visible: bool);
    /// Playback speed of whatever clip the entity is running
    fn set_time_scale(&mut self, _entity: EntityRef, _scale: f32) {}
}

/// Screens and HUD
pub trait UiSink {
    fn show_menu(&mut self, high_score: u32);
    fn show_hud(&mut self);
    fn update_distance(&mut self, meters: f32);
    fn show_game_over(&mut self, meters: u32, high_score: u32);
    fn show_shield_indicator(&mut self, visible: bool);
    fn update_shield_indicator(&mut self, percent: f32);
}

/// Music and effects
pub trait AudioSink {
    fn play_music(&mut self);
    fn stop_music(&mut self);
    fn play_death_cue(&mut self);
    /// Shield picked up (`true`) or run out (`false`)
    fn play_shield_cue(&mut self, _up: bool) {}
}

/// Map a `KeyboardEvent.key` value to an intent
pub fn intent_for_key(key: &str) -> Option<InputIntent> {
    InputIntent::from_key(key)
}

/// Forward the presentation and audio parts of an event. UI and score
/// events are left to the caller, which owns the high score.
pub fn dispatch(event: &GameEvent, presentation: &mut impl PresentationSink, audio: &mut impl AudioSink) {
    match event {
        GameEvent::Spawn {
            entity,
            visual,
            transform,
        } => presentation.spawn(*entity, visual, *transform),
        GameEvent::Despawn { entity } => presentation.despawn(*entity),
        GameEvent::Animate { entity, intent } => presentation.play_animation(*entity, intent),
        GameEvent::StopAnimation { entity } => presentation.stop_animation(*entity),
        GameEvent::Visibility { entity, visible } => presentation.set_visible(*entity, *visible),
        GameEvent::MusicStart => audio.play_music(),
        GameEvent::MusicStop => audio.stop_music(),
        GameEvent::DeathCue => audio.play_death_cue(),
        GameEvent::ShieldIndicator(up) => audio.play_shield_cue(*up),
        GameEvent::PhaseChanged(_)
        | GameEvent::ShieldLevel(_)
        | GameEvent::RunEnded { .. } => {}
    }
}

/// Push the current transform of every live entity, plus the run clip speed
pub fn sync_transforms<R: Rng>(session: &GameSession<R>, presentation: &mut impl PresentationSink) {
    for (entity, transform) in session.transforms() {
        presentation.set_transform(entity, transform);
    }
    if session.is_started() && !session.player.is_dying() {
        let scale = Player::run_time_scale(session.speed(), session.tuning.start_speed);
        presentation.set_time_scale(EntityRef::Player, scale);
    }
}

/// Sinks that drop everything (headless runs)
#[derive(Debug, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn spawn(&mut self, _entity: EntityRef, _visual: &Visual, _transform: Transform) {}
    fn despawn(&mut self, _entity: EntityRef) {}
    fn set_transform(&mut self, _entity: EntityRef, _transform: Transform) {}
    fn play_animation(&mut self, _entity: EntityRef, _intent: &AnimationIntent) {}
    fn stop_animation(&mut self, _entity: EntityRef) {}
    fn set_visible(&mut self, _entity: EntityRef, _visible: bool) {}
}

impl UiSink for NullSink {
    fn show_menu(&mut self, _high_score: u32) {}
    fn show_hud(&mut self) {}
    fn update_distance(&mut self, _meters: f32) {}
    fn show_game_over(&mut self, _meters: u32, _high_score: u32) {}
    fn show_shield_indicator(&mut self, _visible: bool) {}
    fn update_shield_indicator(&mut self, _percent: f32) {}
}

impl AudioSink for NullSink {
    fn play_music(&mut self) {}
    fn stop_music(&mut self) {}
    fn play_death_cue(&mut self) {}
}
