//! Headless run loop.
//!
//! Wires the file-backed high score, the tracing audio sink and the
//! kinematic physics into a session and drives it at a fixed frame rate.

use ecorunner_common::RunnerResult;
use ecorunner_gameplay::{
    GameEvent, RandomSource, SeededRandom, SessionController, TickReport,
};
use tracing::{debug, info, warn};

use crate::audio::TracingAudio;
use crate::autopilot::Autopilot;
use crate::config::EngineConfig;
use crate::high_score::FileHighScoreStore;
use crate::physics::{HeadlessPhysics, PhysicsReport};

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames simulated
    pub frames: u64,
    /// Games that ended in a game over
    pub games_over: u32,
    /// Best score reached in any game of this run
    pub best_score: u64,
    /// Power-ups collected across all games
    pub power_ups: u64,
    /// High score at the end of the run
    pub high_score: u64,
}

/// Host state for one run.
struct EcoRunnerApp {
    /// Host configuration
    config: EngineConfig,
    /// Simulation core
    session: SessionController,
    /// Movement collaborator
    physics: HeadlessPhysics,
    /// Scripted input, if enabled
    autopilot: Option<Autopilot>,
    /// Running totals
    summary: RunSummary,
}

impl EcoRunnerApp {
    fn new(config: EngineConfig) -> RunnerResult<Self> {
        let path = config
            .high_score_path
            .clone()
            .unwrap_or_else(FileHighScoreStore::default_path);
        let store = FileHighScoreStore::open(path)?;
        info!("High score file: {}", store.path().display());

        let rng: Box<dyn RandomSource> = match config.gameplay.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };

        let session = SessionController::new(
            config.gameplay.clone(),
            Box::new(TracingAudio::new()),
            Box::new(store),
            rng,
        );
        let physics = HeadlessPhysics::new(
            &config.gameplay.player,
            config.gameplay.environment.field_width,
            config.gravity,
        );
        let autopilot = config
            .autopilot
            .then(|| Autopilot::new(config.jump_distance, config.restart_on_game_over));

        Ok(Self {
            config,
            session,
            physics,
            autopilot,
            summary: RunSummary::default(),
        })
    }

    fn run(mut self) -> RunSummary {
        let dt = self.config.frame_dt();
        let frames = self.config.total_frames();
        info!(frames, dt, "Starting headless run");

        for _ in 0..frames {
            self.frame(dt);
        }

        self.summary.high_score = self.session.high_score();
        self.summary.best_score = self.summary.best_score.max(self.session.score());
        self.summary
    }

    fn frame(&mut self, dt: f32) {
        self.summary.frames += 1;

        if let Some(tap) = self.autopilot.and_then(|pilot| pilot.decide(&self.session)) {
            let action = self.session.handle_tap(&tap);
            debug!(?action, "autopilot tap");
        }

        let report = self.session.tick(dt);
        self.hand_off_spawns(&report);
        if report.advanced {
            self.step_physics(report.dt);
        }
        self.dispatch_events();
    }

    fn hand_off_spawns(&mut self, report: &TickReport) {
        for (id, request) in &report.spawned {
            self.physics.spawn(*id, request);
            if let Err(e) = self.session.activate_entity(*id) {
                warn!("Spawned entity not accepted: {e}");
            }
        }
    }

    fn step_physics(&mut self, dt: f32) {
        let reports = self
            .physics
            .step(dt, self.session.player().vertical_velocity());

        self.session.report_player_velocity(self.physics.hero_velocity());
        self.session.report_player_position(self.physics.hero_position());
        for (id, position) in self.physics.positions() {
            if let Err(e) = self.session.report_entity_position(id, position) {
                debug!("Position for unknown entity: {e}");
            }
        }

        for report in reports {
            match report {
                PhysicsReport::Contact(a, b) => {
                    self.session.on_contact(a, b);
                },
                PhysicsReport::TravelComplete(id) => {
                    if let Err(e) = self.session.on_travel_complete(id) {
                        debug!("Travel end for unknown entity: {e}");
                    }
                },
            }
        }
    }

    fn dispatch_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::EntityRemoved { entity_id, .. } => self.physics.remove(entity_id),
                GameEvent::EcoScoreChanged { .. } => self.summary.power_ups += 1,
                GameEvent::GameOver { score, eco_score } => {
                    self.summary.games_over += 1;
                    self.summary.best_score = self.summary.best_score.max(score);
                    info!(score, eco_score, game = self.summary.games_over, "Game over");
                },
                GameEvent::Restarted => self.physics.reset(),
                GameEvent::WeatherChanged(change) => {
                    info!(
                        "Weather: {} -> {}",
                        change.from.display_name(),
                        change.to.display_name()
                    );
                },
                GameEvent::DayPhaseChanged { to, .. } => {
                    debug!("Day phase: {}", to.display_name());
                },
                other => debug!(?other, "event"),
            }
        }
    }
}

/// Run the headless host until the configured run length elapses.
pub fn run(config: EngineConfig) -> RunnerResult<RunSummary> {
    let app = EcoRunnerApp::new(config)?;
    Ok(app.run())
}
