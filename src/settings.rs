//! Audio preferences
//!
//! Persisted in LocalStorage as one plain number per volume.

use serde::{Deserialize, Serialize};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Music volume in percent (0-100)
    pub music_volume: u8,
    /// Sound effects volume in percent (0-100)
    pub sfx_volume: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 50,
            sfx_volume: 70,
        }
    }
}

impl Settings {
    #[allow(dead_code)]
    const MUSIC_KEY: &'static str = "zombrush_music_volume";
    #[allow(dead_code)]
    const SFX_KEY: &'static str = "zombrush_sfx_volume";

    pub fn set_music_volume(&mut self, percent: u8) {
        self.music_volume = percent.min(100);
    }

    pub fn set_sfx_volume(&mut self, percent: u8) {
        self.sfx_volume = percent.min(100);
    }

    /// Music gain in [0, 1]
    pub fn music_gain(&self) -> f32 {
        self.music_volume as f32 / 100.0
    }

    /// Effects gain in [0, 1]
    pub fn sfx_gain(&self) -> f32 {
        self.sfx_volume as f32 / 100.0
    }

    /// Parse a stored percentage; garbage falls back to `default`
    pub fn parse_percent(raw: Option<String>, default: u8) -> u8 {
        raw.and_then(|v| v.trim().parse::<u8>().ok())
            .map(|v| v.min(100))
            .unwrap_or(default)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let defaults = Self::default();
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::info!("Using default settings");
            return defaults;
        };
        let settings = Self {
            music_volume: Self::parse_percent(
                storage.get_item(Self::MUSIC_KEY).ok().flatten(),
                defaults.music_volume,
            ),
            sfx_volume: Self::parse_percent(
                storage.get_item(Self::SFX_KEY).ok().flatten(),
                defaults.sfx_volume,
            ),
        };
        log::info!(
            "Loaded settings: music {}%, sfx {}%",
            settings.music_volume,
            settings.sfx_volume
        );
        settings
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::MUSIC_KEY, &self.music_volume.to_string());
            let _ = storage.set_item(Self::SFX_KEY, &self.sfx_volume.to_string());
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
