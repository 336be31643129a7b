//! Host-side game: owns the session, its collaborators and the best distance
//!
//! Buttons, keys and animation frames come in here; events drained from the
//! session go out to the sinks.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::highscores::{BestDistance, ScoreStore};
use crate::platform::{AudioSink, PresentationSink, UiSink, dispatch, intent_for_key, sync_transforms};
use crate::sim::{AnimationToken, GameEvent, GamePhase, GameSession, InputIntent, TickInput, tick};

/// A running game and everything it talks to
pub struct Game<P, U, A, S, R = Pcg32>
where
    P: PresentationSink,
    U: UiSink,
    A: AudioSink,
    S: ScoreStore,
    R: Rng,
{
    session: GameSession<R>,
    presentation: P,
    ui: U,
    audio: A,
    best: BestDistance<S>,
    /// Intents received since the last frame
    pending: Vec<InputIntent>,
    /// Demo mode
    pub autopilot: bool,
}

impl<P, U, A, S, R> Game<P, U, A, S, R>
where
    P: PresentationSink,
    U: UiSink,
    A: AudioSink,
    S: ScoreStore,
    R: Rng,
{
    pub fn new(session: GameSession<R>, presentation: P, ui: U, audio: A, store: S) -> Self {
        let mut game = Self {
            session,
            presentation,
            ui,
            audio,
            best: BestDistance::new(store),
            pending: Vec::new(),
            autopilot: false,
        };
        game.flush();
        game
    }

    pub fn session(&self) -> &GameSession<R> {
        &self.session
    }

    pub fn best(&self) -> u32 {
        self.best.best()
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Keyboard input; only reaches the player during an active run
    pub fn key_down(&mut self, key: &str) -> bool {
        if self.session.phase != GamePhase::Playing || self.session.player.is_dying() {
            return false;
        }
        match intent_for_key(key) {
            Some(intent) => {
                self.pending.push(intent);
                true
            }
            None => false,
        }
    }

    pub fn start(&mut self) {
        self.pending.clear();
        self.session.start();
        self.flush();
    }

    pub fn retry(&mut self) {
        self.pending.clear();
        self.session.retry();
        self.flush();
    }

    pub fn go_home(&mut self) {
        self.pending.clear();
        self.session.go_home();
        self.flush();
    }

    /// Completion callback from the presentation layer
    pub fn animation_finished(&mut self, token: AnimationToken) {
        self.session.animation_finished(token);
        self.flush();
    }

    /// One animation frame
    pub fn frame(&mut self, dt: f32) {
        let input = TickInput {
            intents: std::mem::take(&mut self.pending),
            autopilot: self.autopilot,
        };
        tick(&mut self.session, &input, dt);
        self.flush();

        sync_transforms(&self.session, &mut self.presentation);
        if self.session.phase == GamePhase::Playing {
            self.ui.update_distance(self.session.distance());
        }
    }

    fn flush(&mut self) {
        for event in self.session.drain_events() {
            self.route(&event);
        }
    }

    fn route(&mut self, event: &GameEvent) {
        dispatch(event, &mut self.presentation, &mut self.audio);
        match *event {
            GameEvent::PhaseChanged(GamePhase::Menu) => self.ui.show_menu(self.best.best()),
            GameEvent::PhaseChanged(GamePhase::Playing) => self.ui.show_hud(),
            GameEvent::RunEnded { meters } => {
                self.best.submit(meters);
                self.ui.show_game_over(meters, self.best.best());
            }
            GameEvent::ShieldIndicator(visible) => self.ui.show_shield_indicator(visible),
            GameEvent::ShieldLevel(percent) => self.ui.update_shield_indicator(percent),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::consts::PLAYER_Z;
    use crate::highscores::MemoryStore;
    use crate::platform::NullSink;
    use crate::sim::{AnimationIntent, EnemyKind, EntityRef, Transform, Visual};
    use crate::sim::rng::seeded_rng;
    use crate::tuning::Tuning;

    #[derive(Debug, Default)]
    struct Screens {
        menus: Vec<u32>,
        huds: usize,
        game_overs: Vec<(u32, u32)>,
        shield_visible: bool,
        last_distance: f32,
    }

    impl UiSink for Screens {
        fn show_menu(&mut self, high_score: u32) {
            self.menus.push(high_score);
        }
        fn show_hud(&mut self) {
            self.huds += 1;
        }
        fn update_distance(&mut self, meters: f32) {
            self.last_distance = meters;
        }
        fn show_game_over(&mut self, meters: u32, high_score: u32) {
            self.game_overs.push((meters, high_score));
        }
        fn show_shield_indicator(&mut self, visible: bool) {
            self.shield_visible = visible;
        }
        fn update_shield_indicator(&mut self, _percent: f32) {}
    }

    #[derive(Debug, Default)]
    struct Speaker {
        music_on: bool,
        cues: usize,
    }

    impl AudioSink for Speaker {
        fn play_music(&mut self) {
            self.music_on = true;
        }
        fn stop_music(&mut self) {
            self.music_on = false;
        }
        fn play_death_cue(&mut self) {
            self.cues += 1;
        }
    }

    /// Records whether the player is on stage and how often it moved
    #[derive(Debug, Default)]
    struct Stage {
        player_shown: bool,
        player_moves: usize,
    }

    impl PresentationSink for Stage {
        fn spawn(&mut self, _entity: EntityRef, _visual: &Visual, _transform: Transform) {}
        fn despawn(&mut self, _entity: EntityRef) {}
        fn set_transform(&mut self, entity: EntityRef, _transform: Transform) {
            if entity == EntityRef::Player {
                self.player_moves += 1;
            }
        }
        fn play_animation(&mut self, _entity: EntityRef, _intent: &AnimationIntent) {}
        fn stop_animation(&mut self, _entity: EntityRef) {}
        fn set_visible(&mut self, entity: EntityRef, visible: bool) {
            if entity == EntityRef::Player {
                self.player_shown = visible;
            }
        }
    }

    type TestGame<P = NullSink> = Game<P, Screens, Speaker, MemoryStore>;

    fn game_with<P: PresentationSink>(presentation: P, best: u32) -> TestGame<P> {
        let session = GameSession::with_rng(Tuning::default(), AssetCatalog::builtin(), seeded_rng(42));
        Game::new(session, presentation, Screens::default(), Speaker::default(), MemoryStore::new(best))
    }

    fn game(best: u32) -> TestGame {
        game_with(NullSink, best)
    }

    /// Run forward with an empty field, then put a walker on the player
    fn lose_after<P: PresentationSink>(game: &mut TestGame<P>, frames: usize) {
        for _ in 0..frames {
            game.session.enemies.reset(&game.session.tuning, &mut game.session.events);
            game.frame(0.1);
        }
        let catalog = game.session.catalog.clone();
        game.session
            .enemies
            .spawn_one(EnemyKind::Walker, game.session.player.lane, PLAYER_Z, &catalog, &mut game.session.events);
        game.frame(0.001);
        for _ in 0..40 {
            game.frame(0.1);
        }
    }

    #[test]
    fn test_menu_shows_stored_best() {
        let g = game(250);
        assert_eq!(g.ui().menus, vec![250]);
    }

    #[test]
    fn test_keys_ignored_on_menu() {
        let mut g = game(0);
        assert!(!g.key_down("a"));
        g.start();
        assert!(g.key_down("a"));
        assert!(!g.key_down("x"));
        g.frame(0.016);
        assert_eq!(g.session().player.lane, 0);
    }

    #[test]
    fn test_full_run_updates_best() {
        let mut g = game(10);
        g.start();
        assert_eq!(g.ui().huds, 1);
        assert!(g.audio().music_on);

        lose_after(&mut g, 50);
        assert_eq!(g.session().phase, GamePhase::GameOver);
        assert!(!g.audio().music_on);
        assert_eq!(g.audio().cues, 1);

        let (meters, best) = g.ui().game_overs[0];
        assert!(meters > 10);
        assert!((meters as f32 - g.ui().last_distance).abs() < 1.0);
        assert!(!g.ui().shield_visible);
        assert_eq!(best, meters);
        assert_eq!(g.best(), meters);
        assert!(!g.key_down("d"));
    }

    #[test]
    fn test_short_run_keeps_best_and_home_shows_it() {
        let mut g = game(5000);
        g.start();
        lose_after(&mut g, 1);
        assert_eq!(g.ui().game_overs.last().map(|r| r.1), Some(5000));
        g.go_home();
        assert_eq!(g.ui().menus.last(), Some(&5000));
        assert_eq!(g.session().phase, GamePhase::Menu);
        g.start();
        assert_eq!(g.session().phase, GamePhase::Playing);
    }

    #[test]
    fn test_player_hidden_on_menu_and_game_over() {
        let mut g = game_with(Stage::default(), 0);
        g.frame(0.016);
        assert!(!g.presentation().player_shown);
        assert_eq!(g.presentation().player_moves, 0);

        g.start();
        g.frame(0.016);
        assert!(g.presentation().player_shown);
        assert!(g.presentation().player_moves > 0);

        lose_after(&mut g, 5);
        assert_eq!(g.session().phase, GamePhase::GameOver);
        assert!(!g.presentation().player_shown);

        g.retry();
        assert!(g.presentation().player_shown);

        g.go_home();
        let moves = g.presentation().player_moves;
        g.frame(0.016);
        assert!(!g.presentation().player_shown);
        assert_eq!(g.presentation().player_moves, moves);
    }

    #[test]
    fn test_stale_callback_after_retry() {
        let mut g = game(0);
        g.start();
        let catalog = g.session.catalog.clone();
        g.session.enemies.reset(&g.session.tuning, &mut g.session.events);
        g.session
            .enemies
            .spawn_one(EnemyKind::Runner, 1, PLAYER_Z, &catalog, &mut g.session.events);
        g.frame(0.001);
        let token = g.session().animation_token().unwrap();
        for _ in 0..40 {
            g.frame(0.1);
        }
        g.retry();
        assert_eq!(g.session().phase, GamePhase::Playing);
        g.animation_finished(token);
        assert_eq!(g.session().phase, GamePhase::Playing);
        assert!(!g.session().player.is_dying());
    }
}
