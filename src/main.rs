//! Slime Soccer entry point
//!
//! Native: runs a headless match (scripted player 1 against the AI) and logs
//! the result. Web: exposes a `WasmGame` handle the page drives from
//! `requestAnimationFrame`.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use slime_soccer::audio::WebAudio;
    use slime_soccer::{
        Host, InputState, LogScoreboard, MatchConfig, RenderSink, Settings, Simulation, Snapshot,
    };

    /// Keeps the latest snapshot as JSON for the page's canvas code
    #[derive(Default)]
    struct SnapshotBuffer {
        json: String,
    }

    impl RenderSink for SnapshotBuffer {
        fn present(&mut self, snapshot: &Snapshot) -> Result<(), String> {
            self.json = serde_json::to_string(snapshot).map_err(|e| e.to_string())?;
            Ok(())
        }
    }

    #[wasm_bindgen]
    pub struct WasmGame {
        host: Host<SnapshotBuffer, WebAudio, LogScoreboard>,
        input: InputState,
    }

    #[wasm_bindgen]
    impl WasmGame {
        /// `config_json` may be empty for defaults with a time-based seed
        #[wasm_bindgen(constructor)]
        pub fn new(config_json: &str, width: f32, height: f32) -> Result<WasmGame, JsValue> {
            let config = if config_json.trim().is_empty() {
                MatchConfig {
                    seed: js_sys::Date::now() as u64,
                    ..MatchConfig::default()
                }
            } else {
                MatchConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
            };
            let sim =
                Simulation::new(config, width, height).map_err(|e| JsValue::from_str(&e.to_string()))?;
            let host = Host::new(
                sim,
                Settings::load(),
                SnapshotBuffer::default(),
                WebAudio::new(),
                LogScoreboard::default(),
            );
            Ok(WasmGame {
                host,
                input: InputState::default(),
            })
        }

        pub fn start(&mut self, now: f64) {
            self.host.audio().resume();
            self.host.sim.start_match(now as u64);
        }

        pub fn toggle_pause(&mut self, now: f64) -> bool {
            self.host.sim.toggle_pause(now as u64)
        }

        /// Named control, e.g. `"moveLeft1"`. Returns false for unknown names.
        pub fn set_control(&mut self, name: &str, held: bool) -> bool {
            self.input.set_named(name, held)
        }

        pub fn resize(&mut self, width: f32, height: f32) -> bool {
            self.host.sim.resize(width, height).is_ok()
        }

        pub fn frame(&mut self, now: f64) {
            self.host.frame(now as u64, &self.input);
        }

        /// Latest snapshot as JSON
        pub fn snapshot(&self) -> String {
            self.host.render().json.clone()
        }

        pub fn set_muted(&mut self, muted: bool) {
            let settings = Settings {
                muted,
                ..self.host.settings.clone()
            };
            settings.save();
            self.host.apply_settings(settings);
        }
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }
        log::info!("Slime Soccer starting...");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use slime_soccer::consts::*;
    use slime_soccer::sim::{GameEvent, MatchPhase, PlayerId};
    use slime_soccer::{Host, InputState, LogScoreboard, MatchConfig, NullAudio, NullRender, Settings, Simulation};

    env_logger::init();
    log::info!("Slime Soccer (native) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| MatchConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => MatchConfig::default(),
    };

    let sim = match Simulation::new(config, DEFAULT_WIDTH, DEFAULT_HEIGHT) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let mut host = Host::new(sim, Settings::load(), NullRender, NullAudio, LogScoreboard::default());

    // Fixed 16ms frames; player 1 follows the ball and jumps when it is close
    let frame_ms = 1000 / NOMINAL_TPS as u64;
    let mut now = 0;
    host.sim.start_match(now);
    let mut input = InputState::default();
    let mut goals = 0;

    while host.sim.phase() != MatchPhase::Menu {
        let store = host.sim.entities();
        let me = &store.player(PlayerId::P1).body;
        let ball = &store.ball.body;
        input.p1.left = ball.pos.x < me.pos.x - 10.0;
        input.p1.right = ball.pos.x > me.pos.x + 10.0;
        input.p1.jump = (ball.pos.x - me.pos.x).abs() < 60.0 && ball.pos.y < me.pos.y - 40.0;

        now += frame_ms;
        host.frame(now, &input);
        goals += host
            .last_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Goal { .. }))
            .count();
    }

    let score = host.sim.score();
    log::info!(
        "Final score {}-{} after {} goals, {} faults",
        score.p1,
        score.p2,
        goals,
        host.sim.supervisor().total_faults()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is `wasm_game::start`
}
