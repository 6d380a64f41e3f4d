//! Scripted input for unattended runs.

use ecorunner_common::Vec2;
use ecorunner_gameplay::{PlayerState, SessionController, SpawnKind, TapEvent};

/// Taps to jump when an obstacle gets close, and taps to restart after a
/// game over.
#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Distance ahead of the hero that triggers a jump
    jump_distance: f32,
    /// Whether to start over after game over
    restart: bool,
}

impl Autopilot {
    /// Create an autopilot.
    #[must_use]
    pub fn new(jump_distance: f32, restart: bool) -> Self {
        Self {
            jump_distance,
            restart,
        }
    }

    /// Decide whether to tap this frame.
    #[must_use]
    pub fn decide(&self, session: &SessionController) -> Option<TapEvent> {
        if session.is_game_over() {
            return self.restart.then(|| TapEvent::play_field(Vec2::ZERO));
        }
        if session.is_paused() || session.player().state() == PlayerState::Jumping {
            return None;
        }

        let hero_x = session.player().position().x;
        let threatened = session
            .state()
            .arena()
            .iter_by_kind(SpawnKind::Obstacle)
            .map(|obstacle| obstacle.position().x - hero_x)
            .any(|ahead| ahead > 0.0 && ahead <= self.jump_distance);

        threatened.then(|| TapEvent::play_field(Vec2::new(hero_x, 0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecorunner_gameplay::GameplayConfig;

    fn session() -> SessionController {
        SessionController::headless(GameplayConfig {
            seed: Some(1),
            ..GameplayConfig::default()
        })
    }

    #[test]
    fn test_quiet_field_no_tap() {
        let session = session();
        let pilot = Autopilot::new(110.0, true);
        assert!(pilot.decide(&session).is_none());
    }

    #[test]
    fn test_taps_when_obstacle_close() {
        let mut session = session();
        session.tick(0.016);
        let mut spawned = Vec::new();
        while spawned.is_empty() {
            spawned = session.tick(0.1).spawned;
        }

        let (id, _) = spawned[0];
        let hero_x = session.player().position().x;
        session
            .report_entity_position(id, Vec2::new(hero_x + 80.0, 110.0))
            .expect("entity exists");

        let pilot = Autopilot::new(110.0, true);
        assert!(pilot.decide(&session).is_some());
        assert!(Autopilot::new(50.0, true).decide(&session).is_none());
    }

    #[test]
    fn test_restart_tap_after_game_over() {
        let mut session = session();
        session.trigger_game_over();
        assert!(Autopilot::new(110.0, true).decide(&session).is_some());
        assert!(Autopilot::new(110.0, false).decide(&session).is_none());
    }
}
