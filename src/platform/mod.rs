//! Platform abstraction layer
//!
//! The simulation never draws, plays sound or touches the DOM. Hosts plug in
//! three sinks:
//! - `RenderSink` reads an immutable snapshot each frame
//! - `AudioSink` receives fire-and-forget cues
//! - `ScoreboardSink` receives score and seconds left
//!
//! `Host` wires a `Simulation` to those sinks and applies the player's
//! `Settings` on the way out.

use crate::settings::Settings;
use crate::sim::{Cue, GameEvent, InputState, Score, Simulation, Snapshot, Stage};

/// Draws a snapshot. An `Err` is reported to the simulation as a rendering fault.
pub trait RenderSink {
    fn present(&mut self, snapshot: &Snapshot) -> Result<(), String>;
}

/// Plays named cues. Must tolerate having no output device.
pub trait AudioSink {
    fn play(&mut self, cue: Cue);

    /// Volume in 0..=1 after mute and master/sfx levels
    fn set_volume(&mut self, _volume: f32) {}
}

pub trait ScoreboardSink {
    fn update(&mut self, score: Score, seconds_left: u32);
}

/// Audio fallback when no device is available
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: Cue) {}
}

/// Renderer for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRender;

impl RenderSink for NullRender {
    fn present(&mut self, _snapshot: &Snapshot) -> Result<(), String> {
        Ok(())
    }
}

/// Scoreboard that only logs changes
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScoreboard {
    last: Option<(Score, u32)>,
}

impl ScoreboardSink for LogScoreboard {
    fn update(&mut self, score: Score, seconds_left: u32) {
        if self.last != Some((score, seconds_left)) {
            log::debug!("Score {}-{} ({}s)", score.p1, score.p2, seconds_left);
            self.last = Some((score, seconds_left));
        }
    }
}

/// A simulation plus its output sinks
pub struct Host<R, A, S> {
    pub sim: Simulation,
    pub settings: Settings,
    render: R,
    audio: A,
    scoreboard: S,
    /// Events drained during the last frame, kept for hosts that want them
    last_events: Vec<GameEvent>,
}

impl<R: RenderSink, A: AudioSink, S: ScoreboardSink> Host<R, A, S> {
    pub fn new(sim: Simulation, settings: Settings, render: R, mut audio: A, scoreboard: S) -> Self {
        audio.set_volume(settings.effective_volume());
        Self {
            sim,
            settings,
            render,
            audio,
            scoreboard,
            last_events: Vec::new(),
        }
    }

    /// Replace settings and push the new volume to the audio sink
    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio.set_volume(settings.effective_volume());
        self.settings = settings;
    }

    /// One display frame: advance, then feed every sink
    pub fn frame(&mut self, now: u64, input: &InputState) {
        self.sim.frame(now, input);

        self.last_events = self.sim.drain_events();
        for event in &self.last_events {
            if let GameEvent::Cue(cue) = event {
                self.audio.play(*cue);
            }
        }

        self.scoreboard.update(self.sim.score(), self.sim.time_left());

        let mut snapshot = self.sim.snapshot();
        if !self.settings.effective_screen_shake() {
            snapshot.screen_shake = 0.0;
        }
        if let Err(message) = self.render.present(&snapshot) {
            self.sim.report_fault(Stage::Render, message, now);
        }
    }

    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn scoreboard(&self) -> &S {
        &self.scoreboard
    }
}
