//! Game session management.
//!
//! The [`SessionController`] owns everything that lives for one run (score,
//! hero, spawned entities, environment) plus the pieces that outlive a run
//! (clock, high score, collaborators, event bus). A run is frozen while
//! paused and after game over; restart replaces the run state wholesale.

use ecorunner_common::{EntityId, PersistenceError, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::collaborators::{AudioCue, AudioSink, HighScoreStore, MemoryHighScore, NullAudio};
use crate::collision::{CollisionOutcome, CollisionResolver, Contact};
use crate::config::GameplayConfig;
use crate::entity::{EntityArena, EntityResult, RemovalReason, SpawnKind, SpawnableEntity};
use crate::environment::{DayPhase, EnvironmentCycle, LayerKind};
use crate::events::{EventBus, GameEvent};
use crate::input::{map_tap, InputAction, TapEvent};
use crate::player::{JumpOutcome, PlayerState, PlayerStateMachine};
use crate::random::{RandomSource, SeededRandom};
use crate::spawn::{SpawnRequest, SpawnScheduler};
use crate::weather::WeatherState;

// ============================================================================
// Session State
// ============================================================================

/// State of a single run. Replaced wholesale on restart.
#[derive(Debug)]
pub struct SessionState {
    /// Distance score
    score: u64,
    /// Power-up score
    eco_score: u64,
    /// Pause gate
    paused: bool,
    /// Terminal gate, cleared only by restart
    game_over: bool,
    /// The hero
    player: PlayerStateMachine,
    /// False once the hero has been taken out of play
    player_attached: bool,
    /// Spawned obstacles and power-ups
    arena: EntityArena,
    /// Spawn timers
    spawner: SpawnScheduler,
    /// Day/night, weather and parallax
    environment: EnvironmentCycle,
}

impl SessionState {
    /// Create a fresh run.
    #[must_use]
    pub fn new(config: &GameplayConfig) -> Self {
        Self::with_arena(config, EntityArena::new())
    }

    fn with_arena(config: &GameplayConfig, arena: EntityArena) -> Self {
        Self {
            score: 0,
            eco_score: 0,
            paused: false,
            game_over: false,
            player: PlayerStateMachine::new(config.player.clone()),
            player_attached: true,
            arena,
            spawner: SpawnScheduler::new(config.spawn.clone(), config.environment.field_width),
            environment: EnvironmentCycle::new(&config.environment),
        }
    }

    /// Distance score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Power-up score.
    #[must_use]
    pub fn eco_score(&self) -> u64 {
        self.eco_score
    }

    /// Whether the run is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the run has ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Whether ticks advance the simulation.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.paused && !self.game_over
    }

    /// The hero.
    #[must_use]
    pub fn player(&self) -> &PlayerStateMachine {
        &self.player
    }

    /// Whether the hero still takes part in the run.
    #[must_use]
    pub fn is_player_attached(&self) -> bool {
        self.player_attached
    }

    /// Spawned entities.
    #[must_use]
    pub fn arena(&self) -> &EntityArena {
        &self.arena
    }

    /// Spawn timers.
    #[must_use]
    pub fn spawner(&self) -> &SpawnScheduler {
        &self.spawner
    }

    /// Environment cycle.
    #[must_use]
    pub fn environment(&self) -> &EnvironmentCycle {
        &self.environment
    }
}

// ============================================================================
// Tick output
// ============================================================================

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Elapsed time after clamping.
    pub dt: f32,
    /// Whether the simulation moved forward.
    pub advanced: bool,
    /// Entities spawned this tick, for the movement collaborator.
    pub spawned: Vec<(EntityId, SpawnRequest)>,
}

/// Everything the rendering collaborator needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Hero base state.
    pub player_state: PlayerState,
    /// Hero centre.
    pub player_position: Vec2,
    /// Hero opacity.
    pub player_alpha: f32,
    /// Whether the hero is still in play.
    pub player_visible: bool,
    /// Whether invincibility is active.
    pub invincible: bool,
    /// Lighting blend, 0 = night, 1 = day.
    pub day_time: f32,
    /// Quarter of the day cycle.
    pub phase: DayPhase,
    /// Active weather.
    pub weather: WeatherState,
    /// Horizontal offset of each background layer, back to front.
    pub layer_offsets: Vec<(LayerKind, f32)>,
    /// Distance score.
    pub score: u64,
    /// Power-up score.
    pub eco_score: u64,
    /// Best score seen.
    pub high_score: u64,
    /// Pause gate.
    pub paused: bool,
    /// Terminal gate.
    pub game_over: bool,
    /// Number of live spawned entities.
    pub entity_count: usize,
}

// ============================================================================
// Session Controller
// ============================================================================

/// Drives a run and routes collaborator callbacks into it.
pub struct SessionController {
    /// Tuning, validated at construction
    config: GameplayConfig,
    /// Frame clock
    clock: Clock,
    /// Current run
    state: SessionState,
    /// Best score, survives restarts
    high_score: u64,
    /// Contact classifier
    resolver: CollisionResolver,
    /// Audio collaborator
    audio: Box<dyn AudioSink>,
    /// Persistence collaborator
    store: Box<dyn HighScoreStore>,
    /// Weather and placement randomness
    rng: Box<dyn RandomSource>,
    /// Outgoing events
    events: EventBus,
}

impl SessionController {
    /// Create a session with injected collaborators and start the
    /// background track.
    pub fn new(
        mut config: GameplayConfig,
        audio: Box<dyn AudioSink>,
        store: Box<dyn HighScoreStore>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        config.validate();
        let high_score = load_high_score(store.as_ref());

        let mut session = Self {
            clock: Clock::new(&config.clock),
            state: SessionState::new(&config),
            high_score,
            resolver: CollisionResolver::new(),
            audio,
            store,
            rng,
            events: EventBus::default(),
            config,
        };
        info!(high_score, "session started");
        session.play_cue(AudioCue::BackgroundMusic);
        session
    }

    /// Create a session with silent audio and an in-memory high score.
    pub fn headless(config: GameplayConfig) -> Self {
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };
        Self::new(
            config,
            Box::new(NullAudio),
            Box::new(MemoryHighScore::new()),
            rng,
        )
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current run.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Validated configuration.
    #[must_use]
    pub fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Frame clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Best score seen, including previous sessions.
    #[must_use]
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Distance score of the current run.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.state.score
    }

    /// Power-up score of the current run.
    #[must_use]
    pub fn eco_score(&self) -> u64 {
        self.state.eco_score
    }

    /// Whether the run is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Whether the run has ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    /// The hero.
    #[must_use]
    pub fn player(&self) -> &PlayerStateMachine {
        &self.state.player
    }

    /// Event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Take every event published since the last drain.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Render state for the current frame.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        let player = &self.state.player;
        let environment = &self.state.environment;
        FrameSnapshot {
            player_state: player.state(),
            player_position: player.position(),
            player_alpha: player.alpha(),
            player_visible: self.state.player_attached,
            invincible: player.is_invincible(),
            day_time: environment.day_time(),
            phase: environment.phase(),
            weather: environment.weather(),
            layer_offsets: environment
                .layers()
                .iter()
                .map(|layer| (layer.kind, layer.offset))
                .collect(),
            score: self.state.score,
            eco_score: self.state.eco_score,
            high_score: self.high_score,
            paused: self.state.paused,
            game_over: self.state.game_over,
            entity_count: self.state.arena.len(),
        }
    }

    // ------------------------------------------------------------------
    // Frame driver
    // ------------------------------------------------------------------

    /// Advance the run by one frame.
    ///
    /// The clock always consumes the sample; the rest of the simulation only
    /// moves while the run is neither paused nor over.
    pub fn tick(&mut self, raw_dt: f32) -> TickReport {
        let dt = self.clock.advance(raw_dt);
        let mut report = TickReport {
            dt,
            ..TickReport::default()
        };
        if !self.state.is_running() || dt <= 0.0 {
            return report;
        }
        report.advanced = true;

        if self.state.player_attached {
            self.state.player.update(dt);
            self.publish_player_events();
        }

        let changes = self.state.environment.update(dt, self.rng.as_mut());
        if let Some((from, to)) = changes.phase {
            self.events.publish(GameEvent::DayPhaseChanged { from, to });
        }
        if let Some(change) = changes.weather {
            self.events.publish(GameEvent::WeatherChanged(change));
        }

        for request in self.state.spawner.update(dt, self.rng.as_mut()) {
            let id = self
                .state
                .arena
                .spawn(request.kind, request.position, request.size);
            debug!(%id, kind = request.kind.display_name(), "entity spawned");
            self.events.publish(GameEvent::EntitySpawned {
                entity_id: id,
                request,
            });
            report.spawned.push((id, request));
        }

        self.accrue_score(dt);
        report
    }

    /// Add distance points for `dt` seconds survived. Skipped while paused
    /// or after game over.
    ///
    /// `dt` is held to the same `[0, max_dt]` range the clock hands out, and
    /// a non-finite `dt` earns nothing.
    pub fn accrue_score(&mut self, dt: f32) {
        if !self.state.is_running() {
            return;
        }
        if !dt.is_finite() {
            debug!(dt, "non-finite dt earns no points");
            return;
        }
        let dt = dt.clamp(0.0, self.clock.max_dt());
        let delta = (dt * self.config.scoring.points_per_second).floor() as u64;
        if delta == 0 {
            return;
        }
        self.state.score = self.state.score.saturating_add(delta);
        self.events.publish(GameEvent::ScoreChanged {
            score: self.state.score,
            delta,
        });
    }

    // ------------------------------------------------------------------
    // Collisions
    // ------------------------------------------------------------------

    /// Handle a contact reported by the physics collaborator.
    pub fn on_contact(&mut self, a: Contact, b: Contact) -> CollisionOutcome {
        let outcome = self.resolver.resolve(a, b);
        self.apply_outcome(outcome);
        outcome
    }

    /// Handle a contact reported as raw category bit masks.
    pub fn on_contact_bits(
        &mut self,
        a_bits: u32,
        b_bits: u32,
        b_entity: Option<EntityId>,
    ) -> CollisionOutcome {
        let outcome = self.resolver.resolve_bits(a_bits, b_bits, b_entity);
        if outcome == CollisionOutcome::Ignored {
            debug!(a_bits, b_bits, "contact has no effect");
        }
        self.apply_outcome(outcome);
        outcome
    }

    fn apply_outcome(&mut self, outcome: CollisionOutcome) {
        if outcome == CollisionOutcome::Ignored {
            return;
        }
        if !self.state.is_running() || !self.state.player_attached {
            debug!(?outcome, "contact ignored, run is frozen");
            return;
        }
        match outcome {
            CollisionOutcome::GameOver => self.trigger_game_over(),
            CollisionOutcome::CollectPowerUp(entity) => self.collect_power_up(entity),
            CollisionOutcome::GroundContact => {
                if self.state.player.state() == PlayerState::Jumping {
                    self.state.player.landed();
                    self.publish_player_events();
                }
            },
            CollisionOutcome::Ignored => {},
        }
    }

    /// Award a power-up and take it out of play.
    ///
    /// Only a contact naming a live power-up awards the bonus. A contact with
    /// no entity, or naming one that is already gone, awards nothing, so a
    /// pickup reported twice in one frame only counts once.
    pub fn collect_power_up(&mut self, entity: Option<EntityId>) {
        let Some(id) = entity else {
            debug!("pickup contact without an entity");
            return;
        };
        match self.state.arena.get(id).map(SpawnableEntity::kind) {
            Ok(SpawnKind::PowerUp) => {},
            Ok(kind) => {
                warn!(%id, kind = kind.display_name(), "pickup contact on a non power-up");
                return;
            },
            Err(err) => {
                debug!(%err, "power-up already collected");
                return;
            },
        }
        if self.state.arena.remove(id).is_ok() {
            self.events.publish(GameEvent::EntityRemoved {
                entity_id: id,
                reason: RemovalReason::Collected,
            });
        }

        let delta = self.config.scoring.power_up_bonus;
        self.state.eco_score = self.state.eco_score.saturating_add(delta);
        debug!(eco_score = self.state.eco_score, "power-up collected");
        self.events.publish(GameEvent::EcoScoreChanged {
            eco_score: self.state.eco_score,
            delta,
        });
        self.play_cue(AudioCue::PowerUpPickup);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// End the run. Repeated calls do nothing.
    pub fn trigger_game_over(&mut self) {
        if self.state.game_over {
            return;
        }
        self.state.game_over = true;
        self.state.paused = false;
        self.state.player_attached = false;
        info!(
            score = self.state.score,
            eco_score = self.state.eco_score,
            "game over"
        );

        if let Err(err) = self.audio.stop() {
            warn!(%err, "failed to stop background audio");
        }
        self.events.publish(GameEvent::GameOver {
            score: self.state.score,
            eco_score: self.state.eco_score,
        });
        self.check_high_score();
    }

    /// Record the current score if it beats the high score.
    ///
    /// Returns `true` if a new high score was set.
    pub fn check_high_score(&mut self) -> bool {
        if self.state.score <= self.high_score {
            return false;
        }
        self.high_score = self.state.score;
        info!(high_score = self.high_score, "new high score");
        if let Err(err) = self.store.save(self.high_score) {
            warn!(%err, "failed to persist high score");
        }
        self.events.publish(GameEvent::NewHighScore {
            high_score: self.high_score,
        });
        true
    }

    /// Flip the pause gate. Does nothing after game over.
    ///
    /// Returns whether the run is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.state.game_over {
            return false;
        }
        self.state.paused = !self.state.paused;
        debug!(paused = self.state.paused, "pause toggled");
        self.events.publish(GameEvent::PauseChanged {
            paused: self.state.paused,
        });
        self.state.paused
    }

    /// Discard the current run and start a fresh one. The high score is
    /// kept.
    ///
    /// A run abandoned from the pause menu still has its background track
    /// playing, so that is stopped before the track starts again.
    pub fn restart(&mut self) {
        if !self.state.game_over {
            if let Err(err) = self.audio.stop() {
                warn!(%err, "failed to stop background audio");
            }
        }
        let mut arena = std::mem::take(&mut self.state.arena);
        for id in arena.clear() {
            self.events.publish(GameEvent::EntityRemoved {
                entity_id: id,
                reason: RemovalReason::SessionReset,
            });
        }

        self.state = SessionState::with_arena(&self.config, arena);
        self.clock.reset();
        info!(high_score = self.high_score, "session restarted");
        self.events.publish(GameEvent::Restarted);
        self.play_cue(AudioCue::BackgroundMusic);
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Route a tap according to the current gates.
    pub fn handle_tap(&mut self, tap: &TapEvent) -> InputAction {
        let action = map_tap(tap, self.state.paused, self.state.game_over);
        match action {
            InputAction::Jump => {
                self.jump();
            },
            InputAction::TogglePause => {
                self.toggle_pause();
            },
            InputAction::Restart => self.restart(),
            InputAction::None => {},
        }
        action
    }

    /// Make the hero jump.
    pub fn jump(&mut self) -> JumpOutcome {
        if !self.player_active() {
            return JumpOutcome::Ignored;
        }
        let outcome = self.state.player.jump();
        self.publish_player_events();
        outcome
    }

    /// Start a regular attack.
    pub fn start_attack(&mut self) -> bool {
        if !self.player_active() {
            return false;
        }
        let started = self.state.player.start_attack();
        self.publish_player_events();
        started
    }

    /// Play the special move.
    pub fn trigger_special_move(&mut self) {
        if !self.player_active() {
            return;
        }
        self.state.player.trigger_special_move();
        self.publish_player_events();
    }

    /// Put the hero in the hit state.
    pub fn take_damage(&mut self) {
        if !self.player_active() {
            return;
        }
        self.state.player.take_damage();
        self.publish_player_events();
    }

    /// Stop the hero in place.
    pub fn idle(&mut self) -> bool {
        if !self.player_active() {
            return false;
        }
        let stopped = self.state.player.idle();
        self.publish_player_events();
        stopped
    }

    /// Get the hero running again.
    pub fn start_running(&mut self) {
        if !self.player_active() {
            return;
        }
        self.state.player.start_running();
        self.publish_player_events();
    }

    fn player_active(&self) -> bool {
        self.state.is_running() && self.state.player_attached
    }

    // ------------------------------------------------------------------
    // Physics collaborator reports
    // ------------------------------------------------------------------

    /// Latest hero vertical velocity from physics.
    pub fn report_player_velocity(&mut self, vertical_velocity: f32) {
        if self.state.player_attached {
            self.state.player.set_vertical_velocity(vertical_velocity);
        }
    }

    /// Latest hero position from physics.
    pub fn report_player_position(&mut self, position: Vec2) {
        if self.state.player_attached {
            self.state.player.set_position(position);
        }
    }

    /// Physics picked up a spawned entity and started moving it.
    pub fn activate_entity(&mut self, id: EntityId) -> EntityResult<()> {
        self.state.arena.activate(id)
    }

    /// Latest position of a spawned entity.
    pub fn report_entity_position(&mut self, id: EntityId, position: Vec2) -> EntityResult<()> {
        self.state.arena.set_position(id, position)
    }

    /// A spawned entity reached the end of its travel.
    pub fn on_travel_complete(&mut self, id: EntityId) -> EntityResult<()> {
        let entity = self.state.arena.remove(id)?;
        debug!(%id, kind = entity.kind().display_name(), "entity left the play field");
        self.events.publish(GameEvent::EntityRemoved {
            entity_id: id,
            reason: RemovalReason::TravelComplete,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn publish_player_events(&mut self) {
        for event in self.state.player.drain_events() {
            self.events.publish(GameEvent::Player(event));
        }
    }

    fn play_cue(&mut self, cue: AudioCue) {
        if let Err(err) = self.audio.play(cue) {
            warn!(%err, cue = cue.file_name(), "audio cue failed");
        }
    }
}

fn load_high_score(store: &dyn HighScoreStore) -> u64 {
    match store.load() {
        Ok(high_score) => high_score,
        Err(PersistenceError::Missing) => {
            debug!("no stored high score");
            0
        },
        Err(err) => {
            warn!(%err, "failed to load high score, starting from 0");
            0
        },
    }
}
