//! Tap-to-action mapping.
//!
//! Hit testing belongs to the host: it tells the core which region a tap
//! landed in, and the core decides what the tap means given the current
//! pause and game-over gates.

use ecorunner_common::Vec2;
use serde::{Deserialize, Serialize};

/// Entry in the pause menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuItem {
    /// Close the menu and continue.
    Resume,
    /// Throw the run away and start over.
    Restart,
}

/// Region a tap landed in, as resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TapTarget {
    /// Anywhere in the play field.
    #[default]
    PlayField,
    /// The pause toggle.
    PauseButton,
    /// An item in the pause overlay.
    PauseMenu(MenuItem),
}

/// A discrete tap.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TapEvent {
    /// Scene position of the tap.
    pub location: Vec2,
    /// Region it hit.
    pub target: TapTarget,
}

impl TapEvent {
    /// Tap on the play field.
    #[must_use]
    pub fn play_field(location: Vec2) -> Self {
        Self {
            location,
            target: TapTarget::PlayField,
        }
    }

    /// Tap on some other region.
    #[must_use]
    pub fn on(target: TapTarget) -> Self {
        Self {
            location: Vec2::ZERO,
            target,
        }
    }
}

/// What a tap asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Make the hero jump.
    Jump,
    /// Flip the pause gate.
    TogglePause,
    /// Start a fresh session.
    Restart,
    /// The tap means nothing right now.
    None,
}

/// Map a tap to an action given the session gates.
///
/// After game over any tap restarts. While paused only the pause button and
/// the menu respond.
#[must_use]
pub fn map_tap(tap: &TapEvent, paused: bool, game_over: bool) -> InputAction {
    if game_over {
        return InputAction::Restart;
    }
    match (tap.target, paused) {
        (TapTarget::PauseButton, _) | (TapTarget::PauseMenu(MenuItem::Resume), true) => {
            InputAction::TogglePause
        },
        (TapTarget::PauseMenu(MenuItem::Restart), true) => InputAction::Restart,
        (TapTarget::PlayField, false) => InputAction::Jump,
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_field_jumps_when_running() {
        let tap = TapEvent::play_field(Vec2::new(10.0, 10.0));
        assert_eq!(map_tap(&tap, false, false), InputAction::Jump);
        assert_eq!(map_tap(&tap, true, false), InputAction::None);
    }

    #[test]
    fn test_game_over_restarts_on_any_tap() {
        for target in [
            TapTarget::PlayField,
            TapTarget::PauseButton,
            TapTarget::PauseMenu(MenuItem::Resume),
        ] {
            assert_eq!(map_tap(&TapEvent::on(target), false, true), InputAction::Restart);
        }
    }

    #[test]
    fn test_pause_menu_only_while_paused() {
        let resume = TapEvent::on(TapTarget::PauseMenu(MenuItem::Resume));
        let restart = TapEvent::on(TapTarget::PauseMenu(MenuItem::Restart));
        assert_eq!(map_tap(&resume, true, false), InputAction::TogglePause);
        assert_eq!(map_tap(&restart, true, false), InputAction::Restart);
        assert_eq!(map_tap(&resume, false, false), InputAction::None);
        assert_eq!(map_tap(&restart, false, false), InputAction::None);
    }

    #[test]
    fn test_pause_button_always_toggles() {
        let tap = TapEvent::on(TapTarget::PauseButton);
        assert_eq!(map_tap(&tap, false, false), InputAction::TogglePause);
        assert_eq!(map_tap(&tap, true, false), InputAction::TogglePause);
    }
}
