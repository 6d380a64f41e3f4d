//! # EcoRunner Gameplay
//!
//! Per-frame simulation core for the EcoRunner side-scroller.
//!
//! This crate owns the game state and advances it given an elapsed-time
//! increment:
//! - Frame clock with dt clamping
//! - Day/night cycle, weather and parallax scrolling
//! - Hero state machine with timed overlays and invincibility
//! - Periodic obstacle and power-up spawning into an entity arena
//! - Contact classification
//! - Session lifecycle (score, pause, game over, restart, high score)
//! - Event bus for presentation layers
//!
//! Rendering, physics, audio and persistence are collaborators reached
//! through the traits in [`collaborators`] or fed in through
//! [`SessionController`] callbacks.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod collaborators;
pub mod collision;
pub mod config;
pub mod entity;
pub mod environment;
pub mod events;
pub mod input;
pub mod player;
pub mod random;
pub mod session;
pub mod spawn;
pub mod weather;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::collaborators::*;
    pub use crate::collision::*;
    pub use crate::config::*;
    pub use crate::entity::*;
    pub use crate::environment::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::player::*;
    pub use crate::random::*;
    pub use crate::session::*;
    pub use crate::spawn::*;
    pub use crate::weather::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use ecorunner_common::Vec2;

    fn session(seed: u64) -> (SessionController, RecordingAudio, MemoryHighScore) {
        let audio = RecordingAudio::new();
        let store = MemoryHighScore::new();
        let session = SessionController::new(
            GameplayConfig::default(),
            Box::new(audio.clone()),
            Box::new(store.clone()),
            Box::new(SeededRandom::new(seed)),
        );
        (session, audio, store)
    }

    #[test]
    fn test_full_run_until_obstacle_hit() {
        let (mut session, audio, store) = session(11);
        session.tick(0.016);

        let mut obstacle = None;
        while obstacle.is_none() {
            let report = session.tick(0.1);
            obstacle = report
                .spawned
                .into_iter()
                .find(|(_, r)| r.kind == SpawnKind::Obstacle)
                .map(|(id, _)| id);
        }
        let id = obstacle.expect("obstacle spawned");
        session.activate_entity(id).expect("fresh entity");

        let score_before = session.score();
        assert_eq!(score_before, 200);

        session.on_contact(
            Contact::entity(ContactCategory::Obstacle, id),
            Contact::new(ContactCategory::Player),
        );
        assert!(session.is_game_over());
        assert_eq!(store.value(), Some(score_before));
        assert_eq!(audio.log().stops, 1);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::GameOver {
            score: score_before,
            eco_score: 0,
        }));

        let frozen = session.snapshot();
        session.tick(0.1);
        assert_eq!(session.snapshot(), frozen);
    }

    #[test]
    fn test_jump_and_land_cycle() {
        let (mut session, _, _) = session(3);
        session.tick(0.016);

        session.handle_tap(&TapEvent::play_field(Vec2::new(100.0, 100.0)));
        assert_eq!(session.player().state(), PlayerState::Jumping);
        assert!(session.player().vertical_velocity() > 0.0);

        // Physics reports the hero coming back down
        session.report_player_velocity(-20.0);
        session.on_contact_bits(
            ContactCategory::Player.bits(),
            ContactCategory::Ground.bits(),
            None,
        );
        assert_eq!(session.player().state(), PlayerState::Running);
        assert!(session.player().vertical_velocity().abs() < f32::EPSILON);
    }

    #[test]
    fn test_restart_after_game_over_starts_music_again() {
        let (mut session, audio, _) = session(5);
        session.trigger_game_over();
        session.restart();

        let log = audio.log();
        assert_eq!(
            log.played,
            vec![AudioCue::BackgroundMusic, AudioCue::BackgroundMusic]
        );
        assert_eq!(log.stops, 1);
    }
}
