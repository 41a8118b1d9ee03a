//! Web Audio cue sink
//!
//! Every cue is synthesized from oscillators, so no audio files are shipped.
//! When no `AudioContext` can be created, every call is a no-op.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::platform::AudioSink;
use crate::sim::Cue;

pub struct WebAudio {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl Default for WebAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAudio {
    pub fn new() -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx, volume: 0.8 }
    }

    /// Resume after a user gesture
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

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

    /// One tone with a frequency sweep and an exponential fade
    fn sweep(ctx: &AudioContext, vol: f32, from: f32, to: f32, len: f64, osc_type: OscillatorType) {
        let Some((osc, gain)) = Self::create_osc(ctx, from, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + len)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + len)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + len + 0.05).ok();
    }

    /// Short notes played one after another
    fn arpeggio(ctx: &AudioContext, vol: f32, notes: &[f32], step: f64, len: f64, osc_type: OscillatorType) {
        for (i, freq) in notes.iter().enumerate() {
            let Some((osc, gain)) = Self::create_osc(ctx, *freq, osc_type) else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * step;
            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + len)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + len + 0.05).ok();
        }
    }
}

impl AudioSink for WebAudio {
    fn play(&mut self, cue: Cue) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            // Solid thump
            Cue::Kick => Self::sweep(ctx, vol * 0.6, 180.0, 70.0, 0.1, OscillatorType::Sine),
            Cue::Bounce => Self::sweep(ctx, vol * 0.25, 320.0, 200.0, 0.06, OscillatorType::Triangle),
            Cue::Goal => Self::arpeggio(
                ctx,
                vol * 0.3,
                &[400.0, 500.0, 600.0, 800.0],
                0.1,
                0.4,
                OscillatorType::Triangle,
            ),
            Cue::Power => Self::arpeggio(ctx, vol * 0.25, &[600.0, 800.0, 1000.0], 0.08, 0.15, OscillatorType::Sine),
            Cue::Combo => Self::sweep(ctx, vol * 0.3, 300.0, 900.0, 0.2, OscillatorType::Square),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}
