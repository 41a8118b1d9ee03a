//! Match configuration and player preferences
//!
//! `MatchConfig` is fixed for the lifetime of a match and shapes the physics
//! and AI. `Settings` are cosmetic/audio preferences persisted in LocalStorage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who controls player 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Player 2 is driven by the AI
    #[default]
    Single,
    /// Two humans share the keyboard
    Soccer,
}

/// Gravity preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GravityProfile {
    #[default]
    Normal,
    Low,
    High,
}

impl GravityProfile {
    /// Downward acceleration per tick
    pub fn gravity(&self) -> f32 {
        match self {
            GravityProfile::Normal => 0.5,
            GravityProfile::Low => 0.2,
            GravityProfile::High => 0.8,
        }
    }

    /// Base jump multiplier for this preset (effects multiply on top)
    pub fn jump_base(&self) -> f32 {
        match self {
            GravityProfile::Normal => 1.0,
            GravityProfile::Low => 2.0,
            GravityProfile::High => 0.7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GravityProfile::Normal => "Normal",
            GravityProfile::Low => "Low",
            GravityProfile::High => "High",
        }
    }
}

/// AI difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
}

/// Tuning values behind a difficulty preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiTuning {
    /// Scales the AI's horizontal speed cap
    pub speed: f32,
    /// Base per-tick jump probability (doubled when a jump is warranted)
    pub jump_prob: f64,
    pub track: f32,
    pub react: f32,
}

impl Difficulty {
    pub fn tuning(&self) -> AiTuning {
        let (speed, jump_prob, track, react) = match self {
            Difficulty::Easy => (0.7, 0.015, 0.8, 0.9),
            Difficulty::Normal => (1.2, 0.035, 1.1, 1.0),
            Difficulty::Hard => (1.7, 0.065, 1.5, 1.3),
            Difficulty::Expert => (2.0, 0.08, 1.8, 1.6),
        };
        AiTuning {
            speed,
            jump_prob,
            track,
            react,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid match config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("match length must be at least one second")]
    ZeroLength,
    #[error("winning score must be at least 1")]
    ZeroWinningScore,
}

/// Per-match configuration, chosen on the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub mode: Mode,
    pub gravity: GravityProfile,
    /// Only consulted in `Mode::Single`
    pub difficulty: Difficulty,
    /// Cosmetic only
    pub theme: String,
    /// RNG seed for AI jumps, power-up spawns and kickoffs
    pub seed: u64,
    pub match_seconds: u32,
    /// Ends the match early when a side reaches it. None = timer only
    pub winning_score: Option<u32>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Single,
            gravity: GravityProfile::Normal,
            difficulty: Difficulty::Normal,
            theme: "classic".to_string(),
            seed: 0x5eed,
            match_seconds: crate::consts::MATCH_SECONDS,
            winning_score: None,
        }
    }
}

impl MatchConfig {
    /// Parse from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.match_seconds == 0 {
            return Err(ConfigError::ZeroLength);
        }
        if self.winning_score == Some(0) {
            return Err(ConfigError::ZeroWinningScore);
        }
        Ok(())
    }

    /// AI tuning when player 2 is computer controlled
    pub fn ai_tuning(&self) -> Option<AiTuning> {
        match self.mode {
            Mode::Single => Some(self.difficulty.tuning()),
            Mode::Soccer => None,
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Screen shake on kicks
    pub screen_shake: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Volume handed to the audio sink
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "slime_soccer_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
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
