//! Per-frame driver: the simulation context and its ordered stages
//!
//! One tick runs clock → input → AI → physics → collision → goal →
//! power-ups → combo/score → match end. Each stage works on a scratch copy of
//! the world that is committed only when the stage returns `Ok`, so a failing
//! stage leaves no partial effects behind.
//!
//! Two clocks are in play. Deferred actions and the countdown run on host
//! time. Entity timestamps (effects, power-ups, combos, bounce debounce) run
//! on game time, which stops while paused.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ai;
use super::collision::{self, ScreenShake};
use super::effects::EffectKind;
use super::events::{BallView, BodyView, Cue, GameEvent, Notice, PlayerView, PowerUpView, Snapshot};
use super::faults::{InitError, Stage, StageFault};
use super::input::InputState;
use super::match_state::{MatchPhase, MatchState, Score};
use super::physics;
use super::powerup::{PowerUp, PowerUpManager};
use super::scoring::{self, ComboState, GoalGuard};
use super::state::{Body, EntityStore, PlayerId};
use super::supervisor::{Supervisor, Verdict};
use super::timers::{TimerAction, TimerHandle, TimerRegistry};
use crate::consts::*;
use crate::settings::{AiTuning, MatchConfig};

/// Values derived from the config once per match
#[derive(Debug, Clone, Copy)]
struct Params {
    gravity: f32,
    jump_base: f32,
    ai: Option<AiTuning>,
}

impl Params {
    fn from_config(config: &MatchConfig) -> Self {
        Self {
            gravity: config.gravity.gravity(),
            jump_base: config.gravity.jump_base(),
            ai: config.ai_tuning(),
        }
    }
}

/// A touch that happened this tick and the combo it produced
#[derive(Debug, Clone, Copy, PartialEq)]
struct TickTouch {
    player: PlayerId,
    combo: u32,
}

/// Everything a stage may mutate
#[derive(Debug, Clone)]
struct World {
    entities: EntityStore,
    power_ups: PowerUpManager,
    combo: ComboState,
    guard: GoalGuard,
    shake: ScreenShake,
    match_state: MatchState,
    rng: Pcg32,
    touches: Vec<TickTouch>,
}

/// Side effects a stage asks for, applied only on success
#[derive(Debug, Default)]
struct StageOutput {
    events: Vec<GameEvent>,
    timers: Vec<(u64, TimerAction)>,
    /// Drop the pending goal-guard clear
    cancel_guard_clear: bool,
}

impl StageOutput {
    fn cue(&mut self, cue: Cue) {
        self.events.push(GameEvent::Cue(cue));
    }
}

/// The simulation context. Owns all match state; the host drives it with `frame`.
#[derive(Debug)]
pub struct Simulation {
    config: MatchConfig,
    params: Params,
    world: World,
    timers: TimerRegistry,
    supervisor: Supervisor,
    events: Vec<GameEvent>,
    last_tick_at: Option<u64>,
    /// Game time of the last tick
    last_game_at: u64,
    /// Pending `ClearGoalGuard`, if any
    guard_clear: Option<TimerHandle>,
    matches_started: u64,
    tick_count: u64,
}

fn check_surface(width: f32, height: f32) -> Result<(), InitError> {
    let ok = width.is_finite()
        && height.is_finite()
        && width >= MIN_SURFACE_WIDTH
        && height >= MIN_SURFACE_HEIGHT;
    if ok {
        Ok(())
    } else {
        Err(InitError::Surface { width, height })
    }
}

fn check_body(body: &Body, what: &'static str) -> Result<(), StageFault> {
    if !(body.radius > 0.0) {
        return Err(StageFault::BadRadius {
            what,
            radius: body.radius,
        });
    }
    if !body.is_sane() {
        return Err(StageFault::NonFinite { what });
    }
    Ok(())
}

fn check_entities(store: &EntityStore) -> Result<(), StageFault> {
    check_body(&store.players[0].body, "player 1")?;
    check_body(&store.players[1].body, "player 2")?;
    check_body(&store.ball.body, "ball")
}

impl Simulation {
    /// Build the core for a `width`×`height` surface. Fails when the surface is
    /// unusable or the config is invalid; the core does not start in that case.
    pub fn new(config: MatchConfig, width: f32, height: f32) -> Result<Self, InitError> {
        let checked = check_surface(width, height)
            .and_then(|()| config.validate().map_err(InitError::from));
        if let Err(e) = checked {
            log::error!("{} failed: {}", Stage::Init, e);
            return Err(e);
        }

        let params = Params::from_config(&config);
        let world = World {
            entities: EntityStore::new(width, height),
            power_ups: PowerUpManager::new(),
            combo: ComboState::default(),
            guard: GoalGuard::default(),
            shake: ScreenShake::default(),
            match_state: MatchState::default(),
            rng: Pcg32::seed_from_u64(config.seed),
            touches: Vec::new(),
        };

        log::info!(
            "Simulation ready: {}x{} mode={:?} gravity={} difficulty={}",
            width,
            height,
            config.mode,
            config.gravity.as_str(),
            config.difficulty.as_str()
        );

        Ok(Self {
            config,
            params,
            world,
            timers: TimerRegistry::default(),
            supervisor: Supervisor::default(),
            events: Vec::new(),
            last_tick_at: None,
            last_game_at: 0,
            guard_clear: None,
            matches_started: 0,
            tick_count: 0,
        })
    }

    // === Match control ===

    /// Start (or restart) a match from any phase
    pub fn start_match(&mut self, now: u64) {
        let from = self.world.match_state.phase;
        let seed = self.config.seed.wrapping_add(self.matches_started);
        self.matches_started += 1;

        self.timers.cancel_all();
        self.guard_clear = None;
        self.supervisor.reset_count();
        self.supervisor.clear_notices();

        let field = self.world.entities.field;
        let w = &mut self.world;
        w.rng = Pcg32::seed_from_u64(seed);
        w.entities = EntityStore::new(field.width, field.height);
        let vx = w.rng.random_range(-KICKOFF_BALL_VX..KICKOFF_BALL_VX);
        w.entities.kickoff(vx);
        w.power_ups.reset(now);
        w.combo.reset();
        w.guard.clear();
        w.shake = ScreenShake::default();
        w.touches.clear();
        w.match_state
            .start(now, self.config.match_seconds, self.config.winning_score);

        self.last_tick_at = None;
        self.last_game_at = now;
        log::info!("Match {} started", self.matches_started);
        if from != MatchPhase::Playing {
            self.phase_changed(from, MatchPhase::Playing);
        }
    }

    /// Replace the config; takes effect on the next `start_match`
    pub fn configure(&mut self, config: MatchConfig) -> Result<(), InitError> {
        config.validate()?;
        self.params = Params::from_config(&config);
        self.config = config;
        Ok(())
    }

    pub fn pause(&mut self, now: u64) -> bool {
        let paused = self.world.match_state.pause(now);
        if paused {
            log::info!("Paused");
            self.phase_changed(MatchPhase::Playing, MatchPhase::Paused);
        }
        paused
    }

    pub fn resume(&mut self, now: u64) -> bool {
        let resumed = self.world.match_state.resume(now);
        if resumed {
            log::info!("Resumed");
            self.phase_changed(MatchPhase::Paused, MatchPhase::Playing);
        }
        resumed
    }

    pub fn toggle_pause(&mut self, now: u64) -> bool {
        match self.phase() {
            MatchPhase::Playing => self.pause(now),
            MatchPhase::Paused => self.resume(now),
            _ => false,
        }
    }

    /// New surface size. Goals are rebuilt and every body returns to kickoff.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), InitError> {
        if let Err(e) = check_surface(width, height) {
            log::warn!("Ignoring resize: {}", e);
            return Err(e);
        }
        self.world.entities.resize(width, height);
        log::debug!("Resized to {}x{}", width, height);
        Ok(())
    }

    /// Fault raised by a collaborator (e.g. a failed draw). Counts like any stage fault.
    pub fn report_fault(&mut self, stage: Stage, message: impl Into<String>, now: u64) {
        self.handle_fault(stage, StageFault::External(message.into()), now);
    }

    // === Frame loop ===

    /// Host entry point, once per display frame. Deferred actions always run;
    /// the tick itself only while playing.
    pub fn frame(&mut self, now: u64, input: &InputState) {
        self.poll_timers(now);
        if self.phase() == MatchPhase::Playing {
            self.tick(now, input);
        }
    }

    /// Run due deferred actions
    pub fn poll_timers(&mut self, now: u64) {
        for action in self.timers.fire_due(now) {
            match action {
                TimerAction::DismissNotice(id) => self.supervisor.dismiss(id),
                TimerAction::ClearGoalGuard => {
                    log::debug!("Goal guard cleared");
                    self.guard_clear = None;
                    self.world.guard.clear();
                }
                TimerAction::ReturnToMenu => {
                    if self.phase() == MatchPhase::Ended {
                        self.world.match_state.to_menu();
                        self.world.entities.ball.frozen = false;
                        self.phase_changed(MatchPhase::Ended, MatchPhase::Menu);
                    }
                }
            }
        }
    }

    /// One ordered pass through every stage
    pub fn tick(&mut self, now: u64, input: &InputState) {
        self.tick_count += 1;
        self.world.touches.clear();
        let params = self.params;
        let last = self.last_tick_at;
        let input = *input;
        let game = self.world.match_state.game_time(now);

        let done = self.run_stage(Stage::Clock, now, |w, _| clock_stage(w, now, last))
            && self.run_stage(Stage::Input, now, |w, _| input_stage(w, &input, &params, game))
            && self.run_stage(Stage::Ai, now, |w, _| ai_stage(w, &params))
            && self.run_stage(Stage::Physics, now, |w, out| physics_stage(w, out, &params, game))
            && self.run_stage(Stage::Collision, now, |w, out| collision_stage(w, out, game))
            && self.run_stage(Stage::Goal, now, |w, out| goal_stage(w, out, now))
            && self.run_stage(Stage::PowerUp, now, |w, out| power_up_stage(w, out, game))
            && self.run_stage(Stage::Scoring, now, |w, out| scoring_stage(w, out))
            && self.run_stage(Stage::MatchEnd, now, |w, out| match_end_stage(w, out, now));

        if !done {
            log::warn!("Tick {} halted early", self.tick_count);
        }
        self.last_tick_at = Some(now);
        self.last_game_at = game;
    }

    /// Run `f` on a scratch world and commit only on success. Returns false
    /// when the loop was halted by an emergency reset.
    fn run_stage<F>(&mut self, stage: Stage, now: u64, f: F) -> bool
    where
        F: FnOnce(&mut World, &mut StageOutput) -> Result<(), StageFault>,
    {
        let mut scratch = self.world.clone();
        let mut out = StageOutput::default();
        match f(&mut scratch, &mut out) {
            Ok(()) => {
                let from = self.world.match_state.phase;
                self.world = scratch;
                self.events.append(&mut out.events);
                if out.cancel_guard_clear {
                    if let Some(handle) = self.guard_clear.take() {
                        self.timers.cancel(handle);
                    }
                }
                for (due, action) in out.timers {
                    let handle = self.timers.schedule(due, action);
                    if action == TimerAction::ClearGoalGuard {
                        self.guard_clear = Some(handle);
                    }
                }
                let to = self.world.match_state.phase;
                if from != to {
                    self.phase_changed(from, to);
                }
                true
            }
            Err(fault) => self.handle_fault(stage, fault, now),
        }
    }

    fn handle_fault(&mut self, stage: Stage, fault: StageFault, now: u64) -> bool {
        self.events.push(GameEvent::Fault {
            stage,
            message: fault.to_string(),
        });
        match self.supervisor.report(stage, &fault, now, &mut self.timers) {
            Verdict::Continue => true,
            Verdict::EmergencyReset => {
                self.emergency_reset();
                false
            }
        }
    }

    fn emergency_reset(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.guard_clear = None;
        self.supervisor.clear_notices();
        let from = self.world.match_state.phase;
        self.world.match_state.to_menu();
        self.world.entities.ball.frozen = false;
        log::error!(
            "Emergency reset: {} pending callbacks cancelled, back to menu",
            cancelled
        );
        self.events.push(GameEvent::EmergencyReset);
        if from != MatchPhase::Menu {
            self.phase_changed(from, MatchPhase::Menu);
        }
    }

    fn phase_changed(&mut self, from: MatchPhase, to: MatchPhase) {
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    // === Read access ===

    pub fn phase(&self) -> MatchPhase {
        self.world.match_state.phase
    }

    pub fn score(&self) -> Score {
        self.world.match_state.score
    }

    pub fn time_left(&self) -> u32 {
        self.world.match_state.time_left
    }

    pub fn error_count(&self) -> u32 {
        self.supervisor.error_count
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn entities(&self) -> &EntityStore {
        &self.world.entities
    }

    /// Direct store access for hosts and tests (e.g. to stage a scenario)
    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.world.entities
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        self.world.power_ups.live()
    }

    pub fn combo(&self) -> &ComboState {
        &self.world.combo
    }

    pub fn goal_guard(&self) -> &GoalGuard {
        &self.world.guard
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn screen_shake(&self) -> f32 {
        self.world.shake.magnitude
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn notices(&self) -> &[Notice] {
        self.supervisor.notices()
    }

    /// Immutable view for the render sink
    pub fn snapshot(&self) -> Snapshot {
        let store = &self.world.entities;
        let view = |b: &Body| BodyView {
            pos: b.pos,
            radius: b.radius,
            color: b.color,
        };
        let player_view = |id: PlayerId| {
            let p = store.player(id);
            PlayerView {
                id,
                body: view(&p.body),
                speed_boosted: p.effects.is_active(EffectKind::Speed, self.last_game_at),
                jump_boosted: p.effects.is_active(EffectKind::Jump, self.last_game_at),
            }
        };

        Snapshot {
            width: store.field.width,
            height: store.field.height,
            floor_y: store.field.floor_y,
            players: [player_view(PlayerId::P1), player_view(PlayerId::P2)],
            ball: BallView {
                body: view(&store.ball.body),
                on_fire: store.ball.on_fire,
                big: store.ball.big_until != 0,
            },
            goals: store.goals,
            power_ups: self
                .world
                .power_ups
                .live()
                .iter()
                .map(|p| PowerUpView {
                    kind: p.kind,
                    pos: p.pos,
                    radius: p.radius,
                })
                .collect(),
            screen_shake: self.world.shake.magnitude,
            phase: self.phase(),
            score: self.score(),
            time_left: self.time_left(),
            notices: self.supervisor.notices().to_vec(),
        }
    }
}

// === Stages ===

fn clock_stage(w: &mut World, now: u64, last: Option<u64>) -> Result<(), StageFault> {
    if let Some(last) = last {
        if now < last {
            return Err(StageFault::ClockRewind { now, last });
        }
    }
    w.match_state.advance_clock(now);
    Ok(())
}

/// Expire timed effects, then apply held controls to the human slimes
fn input_stage(w: &mut World, input: &InputState, params: &Params, now: u64) -> Result<(), StageFault> {
    let store = &mut w.entities;
    store.ball.expire_big(now);

    for id in PlayerId::ALL {
        let human = id == PlayerId::P1 || params.ai.is_none();
        let player = store.player_mut(id);
        player.refresh_multipliers(now);
        if !human {
            continue;
        }

        let pad = input.pad(id);
        player.body.vel.x += pad.axis() * PLAYER_MOVE_ACCEL * player.speed_mul;
        if pad.jump && player.body.on_ground {
            player.body.vel.y = -JUMP_SPEED * params.jump_base * player.jump_mul;
            player.body.on_ground = false;
        }
    }

    check_body(&store.players[0].body, "player 1")?;
    check_body(&store.players[1].body, "player 2")
}

fn ai_stage(w: &mut World, params: &Params) -> Result<(), StageFault> {
    let Some(tuning) = params.ai else {
        return Ok(());
    };
    let decision = ai::step(&mut w.entities, &tuning, params.jump_base, &mut w.rng);
    if decision.jump {
        log::trace!(
            "AI jumps (target x={:.0}, force={:.2})",
            decision.target_x,
            decision.force
        );
    }
    check_body(&w.entities.players[1].body, "player 2")
}

fn physics_stage(w: &mut World, out: &mut StageOutput, params: &Params, now: u64) -> Result<(), StageFault> {
    if let Some(cue) = physics::step(&mut w.entities, params.gravity, now) {
        out.cue(cue);
    }
    check_entities(&w.entities)
}

fn collision_stage(w: &mut World, out: &mut StageOutput, now: u64) -> Result<(), StageFault> {
    let EntityStore { players, ball, .. } = &mut w.entities;
    let mut hit = false;

    for player in players.iter() {
        let Some(touch) = collision::resolve(player, ball, now) else {
            continue;
        };
        hit = true;
        let combo = w.combo.register_hit(touch.player, now);
        w.touches.push(TickTouch {
            player: touch.player,
            combo,
        });
        w.shake.add_hit(touch.impact);
        out.cue(Cue::Kick);
    }

    if !hit {
        w.shake.decay();
        return Ok(());
    }
    check_body(&w.entities.ball.body, "ball")
}

fn goal_stage(w: &mut World, out: &mut StageOutput, now: u64) -> Result<(), StageFault> {
    if w.guard.is_armed() {
        let neutral = w.entities.ball_in_neutral_zone();
        if neutral && !w.guard.clear_pending {
            w.guard.clear_pending = true;
            out.timers
                .push((now + GOAL_GUARD_CLEAR_MS, TimerAction::ClearGoalGuard));
        } else if !neutral && w.guard.clear_pending {
            // Back in a goal mouth before the clear fired: start over
            w.guard.clear_pending = false;
            out.cancel_guard_clear = true;
        }
        return Ok(());
    }

    let Some(scorer) = scoring::detect_goal(&w.entities) else {
        return Ok(());
    };

    w.guard.arm(scorer);
    w.match_state.score.add(scorer);
    w.combo.reset();
    let vx = w.rng.random_range(-KICKOFF_BALL_VX..KICKOFF_BALL_VX);
    w.entities.kickoff(vx);

    let score = w.match_state.score;
    log::info!("Goal by {:?}: {}-{}", scorer, score.p1, score.p2);
    out.cue(Cue::Goal);
    out.events.push(GameEvent::Goal { scorer, score });
    check_entities(&w.entities)
}

fn power_up_stage(w: &mut World, out: &mut StageOutput, now: u64) -> Result<(), StageFault> {
    let report = w.power_ups.step(&mut w.entities, now, &mut w.rng);
    if let Some(kind) = report.spawned {
        log::debug!("Spawned {:?} power-up", kind);
    }
    if report.expired > 0 {
        log::debug!("{} power-up(s) expired", report.expired);
    }
    if report.collected.is_empty() {
        return Ok(());
    }
    for (player, kind) in report.collected {
        log::debug!("{:?} collected {:?}", player, kind);
        out.cue(Cue::Power);
        out.events.push(GameEvent::PowerUpCollected { player, kind });
    }
    check_entities(&w.entities)
}

/// Combo callouts for this tick's touches
fn scoring_stage(w: &mut World, out: &mut StageOutput) -> Result<(), StageFault> {
    for touch in &w.touches {
        if touch.combo >= COMBO_CALLOUT_MIN {
            // A goal this tick already reset the counters
            if w.combo.count(touch.player) < touch.combo {
                continue;
            }
            w.entities.ball.on_fire = true;
            out.cue(Cue::Combo);
            out.events.push(GameEvent::Combo {
                player: touch.player,
                count: touch.combo,
            });
        }
    }
    Ok(())
}

fn match_end_stage(w: &mut World, out: &mut StageOutput, now: u64) -> Result<(), StageFault> {
    if !w.match_state.should_end() {
        return Ok(());
    }
    w.match_state.end();
    w.entities.ball.frozen = true;
    let score = w.match_state.score;
    let winner = score.leader();
    log::info!("Match over {}-{}, winner {:?}", score.p1, score.p2, winner);
    out.events.push(GameEvent::MatchEnded { winner, score });
    out.timers.push((now + END_DISPLAY_MS, TimerAction::ReturnToMenu));
    Ok(())
}
