//! Audio system using Web Audio API
//!
//! Procedurally generated music drone and cues - no external files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::platform::AudioSink;
use crate::settings::Settings;

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Caught by a zombie
    DeathCue,
    /// Shield picked up
    ShieldUp,
    /// Shield ran out
    ShieldDown,
}

/// A running music voice
struct Voice {
    osc: OscillatorNode,
    gain: GainNode,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music: Vec<Voice>,
    music_volume: f32,
    sfx_volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            music: Vec::new(),
            music_volume: settings.music_gain(),
            sfx_volume: settings.sfx_gain(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Pick up new volumes; running music follows immediately
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.music_volume = settings.music_gain();
        self.sfx_volume = settings.sfx_gain();
        for voice in &self.music {
            voice.gain.gain().set_value(self.music_volume * 0.15);
        }
    }

    fn context(&self) -> Option<&AudioContext> {
        let ctx = self.ctx.as_ref()?;
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.sfx_volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = self.context() else { return };

        match effect {
            SoundEffect::DeathCue => Self::play_scream(ctx, vol),
            SoundEffect::ShieldUp => Self::play_chime(ctx, vol, 440.0, 880.0),
            SoundEffect::ShieldDown => Self::play_chime(ctx, vol, 660.0, 220.0),
        }
    }

    /// Falling sawtooth wail
    fn play_scream(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 900.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 1.2)
            .ok();
        osc.frequency().set_value_at_time(900.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(110.0, t + 1.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 1.3).ok();
    }

    /// Short sine sweep
    fn play_chime(ctx: &AudioContext, vol: f32, from: f32, to: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, from, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.25)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + 0.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    fn start_drone(&mut self) {
        if !self.music.is_empty() || self.music_volume <= 0.0 {
            return;
        }
        let Some(ctx) = self.context() else { return };

        // Low detuned fifth
        let mut voices = Vec::new();
        for (freq, kind) in [
            (55.0, OscillatorType::Sawtooth),
            (82.6, OscillatorType::Triangle),
        ] {
            if let Some((osc, gain)) = Self::create_osc(ctx, freq, kind) {
                gain.gain().set_value(self.music_volume * 0.15);
                osc.start().ok();
                voices.push(Voice { osc, gain });
            }
        }
        self.music = voices;
    }

    fn stop_drone(&mut self) {
        for voice in self.music.drain(..) {
            voice.osc.stop().ok();
            voice.gain.disconnect().ok();
        }
    }
}

impl AudioSink for AudioManager {
    fn play_music(&mut self) {
        self.start_drone();
    }

    fn stop_music(&mut self) {
        self.stop_drone();
    }

    fn play_death_cue(&mut self) {
        self.play(SoundEffect::DeathCue);
    }

    fn play_shield_cue(&mut self, up: bool) {
        self.play(if up {
            SoundEffect::ShieldUp
        } else {
            SoundEffect::ShieldDown
        });
    }
}
