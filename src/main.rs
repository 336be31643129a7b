//! Zomb Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, HtmlInputElement};

    use zomb_rush::assets::{AssetProvider, BuiltinAssets};
    use zomb_rush::audio::AudioManager;
    use zomb_rush::highscores::SessionStore;
    use zomb_rush::platform::{NullSink, UiSink};
    use zomb_rush::sim::GameSession;
    use zomb_rush::{Game, Settings, Tuning};

    type WebGame = Game<NullSink, DomUi, AudioManager, SessionStore>;

    /// Screens and HUD backed by the page's elements
    struct DomUi {
        document: Document,
    }

    impl DomUi {
        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                let _ = if hidden {
                    classes.add_1("hidden")
                } else {
                    classes.remove_1("hidden")
                };
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }
    }

    impl UiSink for DomUi {
        fn show_menu(&mut self, high_score: u32) {
            self.set_hidden("game-over-page", true);
            self.set_hidden("game-hud", true);
            self.set_hidden("landing-page", false);
            self.set_text("high-score-value", &format!("{} m", high_score));
        }

        fn show_hud(&mut self) {
            self.set_hidden("landing-page", true);
            self.set_hidden("game-over-page", true);
            self.set_hidden("game-hud", false);
        }

        fn update_distance(&mut self, meters: f32) {
            self.set_text("distance-value", &format!("{}", meters.floor() as u32));
        }

        fn show_game_over(&mut self, meters: u32, high_score: u32) {
            self.set_hidden("game-hud", true);
            self.set_hidden("game-over-page", false);
            self.set_text("final-distance", &format!("{} m", meters));
            self.set_text("best-score", &format!("{} m", high_score));
        }

        fn show_shield_indicator(&mut self, visible: bool) {
            self.set_hidden("shield-bar-container", !visible);
        }

        fn update_shield_indicator(&mut self, percent: f32) {
            if let Some(el) = self
                .document
                .get_element_by_id("shield-bar-fill")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let _ = el.style().set_property("width", &format!("{}%", percent));
            }
        }
    }

    /// Shared state of the page
    struct Host {
        game: WebGame,
        settings: Settings,
        last_time: f64,
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Zomb Rush starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let catalog = match BuiltinAssets.load_all() {
            Ok(catalog) => catalog,
            Err(err) => {
                log::error!("Startup aborted: {}", err);
                if let Some(loading) = document.get_element_by_id("loading") {
                    loading.set_text_content(Some(&format!("Failed to load: {}", err)));
                }
                return Err(JsValue::from_str(&err.to_string()));
            }
        };
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let settings = Settings::load();
        let audio = AudioManager::new(&settings);
        let session = GameSession::new(Tuning::default(), catalog);
        let ui = DomUi {
            document: document.clone(),
        };
        let game = Game::new(session, NullSink, ui, audio, SessionStore);

        let host = Rc::new(RefCell::new(Host {
            game,
            settings,
            last_time: 0.0,
        }));

        setup_buttons(&document, host.clone());
        setup_settings(&document, host.clone());
        setup_keyboard(host.clone());
        request_animation_frame(host);
        Ok(())
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, host: Rc<RefCell<Host>>) {
        {
            let host = host.clone();
            on_click(document, "play-btn", move || {
                let mut h = host.borrow_mut();
                h.game.audio().resume();
                h.game.start();
            });
        }
        {
            let host = host.clone();
            on_click(document, "retry-btn", move || host.borrow_mut().game.retry());
        }
        on_click(document, "home-btn", move || host.borrow_mut().game.go_home());
    }

    fn setup_settings(document: &Document, host: Rc<RefCell<Host>>) {
        {
            let doc = document.clone();
            on_click(document, "settings-btn", move || {
                if let Some(el) = doc.get_element_by_id("settings-modal") {
                    let _ = el.class_list().remove_1("hidden");
                }
            });
        }
        {
            let doc = document.clone();
            on_click(document, "close-settings-btn", move || {
                if let Some(el) = doc.get_element_by_id("settings-modal") {
                    let _ = el.class_list().add_1("hidden");
                }
            });
        }

        let (music, sfx) = {
            let h = host.borrow();
            (h.settings.music_volume, h.settings.sfx_volume)
        };
        for (slider_id, label_id, value, is_music) in [
            ("music-volume", "music-value", music, true),
            ("sfx-volume", "sfx-value", sfx, false),
        ] {
            let Some(slider) = document
                .get_element_by_id(slider_id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };
            slider.set_value(&value.to_string());
            if let Some(label) = document.get_element_by_id(label_id) {
                label.set_text_content(Some(&format!("{}%", value)));
            }

            let host = host.clone();
            let doc = document.clone();
            let input = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let percent = Settings::parse_percent(Some(input.value()), value);
                let mut h = host.borrow_mut();
                if is_music {
                    h.settings.set_music_volume(percent);
                } else {
                    h.settings.set_sfx_volume(percent);
                }
                h.settings.save();
                let settings = h.settings.clone();
                h.game.audio_mut().apply_settings(&settings);
                if let Some(label) = doc.get_element_by_id(label_id) {
                    label.set_text_content(Some(&format!("{}%", percent)));
                }
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut h = host.borrow_mut();
            match event.key().as_str() {
                "i" | "I" => {
                    h.game.autopilot = !h.game.autopilot;
                    log::info!("Autopilot: {}", h.game.autopilot);
                }
                key => {
                    if h.game.key_down(key) {
                        event.prevent_default();
                    }
                }
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        {
            let mut h = host.borrow_mut();
            let dt = if h.last_time > 0.0 {
                ((time - h.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            h.last_time = time;
            h.game.frame(dt);
        }

        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Zomb Rush (native) starting headless autopilot run...");

    if let Err(err) = headless::run(std::env::args().nth(1)) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use thiserror::Error;

    use zomb_rush::assets::{AssetError, AssetProvider, BuiltinAssets};
    use zomb_rush::platform::{AudioSink, NullSink, UiSink};
    use zomb_rush::sim::{GamePhase, GameSession};
    use zomb_rush::{Game, MemoryStore, Tuning};

    /// Simulated frame rate
    const FPS: f32 = 60.0;
    /// Longest run before the demo gives up
    const MAX_SECONDS: f32 = 300.0;

    #[derive(Debug, Error)]
    pub enum DemoError {
        #[error("could not read tuning file: {0}")]
        Io(#[from] std::io::Error),
        #[error("invalid tuning file: {0}")]
        Tuning(#[from] serde_json::Error),
        #[error(transparent)]
        Assets(#[from] AssetError),
    }

    /// Logs what a browser page would show
    #[derive(Default)]
    struct LogUi {
        last_logged: u32,
    }

    impl UiSink for LogUi {
        fn show_menu(&mut self, high_score: u32) {
            log::info!("[menu] best {} m", high_score);
        }
        fn show_hud(&mut self) {
            self.last_logged = 0;
            log::info!("[hud] run started");
        }
        fn update_distance(&mut self, meters: f32) {
            let meters = meters.floor() as u32;
            if meters >= self.last_logged + 100 {
                self.last_logged = meters - meters % 100;
                log::info!("[hud] {} m", meters);
            }
        }
        fn show_game_over(&mut self, meters: u32, high_score: u32) {
            log::info!("[game over] {} m (best {} m)", meters, high_score);
        }
        fn show_shield_indicator(&mut self, visible: bool) {
            log::info!("[hud] shield {}", if visible { "up" } else { "down" });
        }
        fn update_shield_indicator(&mut self, _percent: f32) {}
    }

    struct LogAudio;

    impl AudioSink for LogAudio {
        fn play_music(&mut self) {
            log::debug!("[audio] music on");
        }
        fn stop_music(&mut self) {
            log::debug!("[audio] music off");
        }
        fn play_death_cue(&mut self) {
            log::info!("[audio] scream");
        }
    }

    pub fn run(tuning_path: Option<String>) -> Result<(), DemoError> {
        let tuning = match tuning_path {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        let catalog = BuiltinAssets.load_all()?;
        let session = GameSession::new(tuning, catalog);
        let mut game = Game::new(session, NullSink, LogUi::default(), LogAudio, MemoryStore::default());
        game.autopilot = true;
        game.start();

        let dt = 1.0 / FPS;
        let mut elapsed = 0.0;
        while game.session().phase != GamePhase::GameOver && elapsed < MAX_SECONDS {
            game.frame(dt);
            elapsed += dt;
        }

        let session = game.session();
        log::info!(
            "Demo finished after {:.1}s: {:.1} m at {:.1} m/s, {} enemies alive, best {} m",
            elapsed,
            session.distance(),
            session.speed(),
            session.enemies.active_count(),
            game.best()
        );
        Ok(())
    }
}
