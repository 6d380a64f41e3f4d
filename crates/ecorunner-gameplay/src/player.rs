//! Hero state machine.
//!
//! The hero has a base state plus two independent overlays:
//! - a timed action (attack, special move or hit blink) that returns the hero
//!   to `Running` once its duration has accumulated
//! - invincibility, which decays on its own clock and toggles a blink alpha
//!   every tick while active
//!
//! Both overlays are plain counters advanced by [`PlayerStateMachine::update`];
//! nothing is scheduled.

use ecorunner_common::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PlayerConfig;

/// Alpha the hit blink fades down to.
const HIT_BLINK_MIN_ALPHA: f32 = 0.2;
/// Alpha shown on the "off" ticks of the invincibility blink.
const INVINCIBLE_BLINK_ALPHA: f32 = 0.5;

/// Base state of the hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// Standing still
    Idle,
    /// Running along the ground (initial state)
    #[default]
    Running,
    /// In the air after a jump
    Jumping,
    /// Playing an attack
    Attacking,
    /// Recoiling from damage
    Hit,
}

impl PlayerState {
    /// Get the display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Jumping => "Jumping",
            Self::Attacking => "Attacking",
            Self::Hit => "Hit",
        }
    }
}

/// Timed action currently playing on top of the base state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Regular attack.
    Attack,
    /// Shortened attack that also grants invincibility.
    SpecialMove,
    /// Damage blink.
    HitBlink,
}

impl OverlayKind {
    /// Base state this overlay belongs to.
    #[must_use]
    pub fn state(self) -> PlayerState {
        match self {
            Self::Attack | Self::SpecialMove => PlayerState::Attacking,
            Self::HitBlink => PlayerState::Hit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct TimedOverlay {
    kind: OverlayKind,
    elapsed: f32,
    duration: f32,
}

/// Result of a jump request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpOutcome {
    /// Already jumping; nothing changed.
    Ignored,
    /// State flipped to `Jumping` and the impulse was applied.
    Launched,
    /// State flipped to `Jumping` but the hero was not grounded, so no
    /// impulse was applied.
    StateOnly,
}

/// Things the hero did that presentation layers care about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Base state changed.
    StateChanged {
        /// Previous state
        from: PlayerState,
        /// New state
        to: PlayerState,
    },
    /// Upward impulse applied.
    Jumped {
        /// Impulse magnitude
        impulse: f32,
    },
    /// Dust effect request at the hero's feet. Fire-and-forget.
    LandingEffect {
        /// Where to show it
        position: Vec2,
        /// How long it lives
        duration: f32,
    },
    /// Invincibility granted.
    InvincibilityStarted,
    /// Invincibility ran out.
    InvincibilityEnded,
}

/// The hero.
#[derive(Debug, Clone)]
pub struct PlayerStateMachine {
    /// Current base state
    state: PlayerState,
    /// Last vertical velocity reported by physics (plus our own impulses)
    vertical_velocity: f32,
    /// Centre position in scene units
    position: Vec2,
    /// Invincibility overlay flag
    is_invincible: bool,
    /// Time spent invincible so far
    invincible_elapsed: f32,
    /// Alpha driven by the invincibility blink
    invincible_alpha: f32,
    /// Active timed action, if any
    overlay: Option<TimedOverlay>,
    /// Tuning
    config: PlayerConfig,
    /// Events since the last drain
    events: Vec<PlayerEvent>,
}

impl Default for PlayerStateMachine {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl PlayerStateMachine {
    /// Create a hero that is already running, standing on the ground.
    #[must_use]
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            state: PlayerState::Running,
            vertical_velocity: 0.0,
            position: Vec2::new(config.start_x, config.ground_y),
            is_invincible: false,
            invincible_elapsed: 0.0,
            invincible_alpha: 1.0,
            overlay: None,
            config,
            events: Vec::new(),
        }
    }

    /// Get the current base state.
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Get the vertical velocity.
    #[must_use]
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Record a vertical velocity sample from the physics collaborator.
    pub fn set_vertical_velocity(&mut self, velocity: f32) {
        self.vertical_velocity = velocity;
    }

    /// Get the hero's centre position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Record a position reported by the physics collaborator.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Hero sprite size.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.config.size.0, self.config.size.1)
    }

    /// Check whether the invincibility overlay is active.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.is_invincible
    }

    /// Time spent invincible so far.
    #[must_use]
    pub fn invincible_elapsed(&self) -> f32 {
        self.invincible_elapsed
    }

    /// Timed action currently playing, if any.
    #[must_use]
    pub fn overlay(&self) -> Option<OverlayKind> {
        self.overlay.map(|o| o.kind)
    }

    /// Render opacity.
    ///
    /// During the hit blink the hero fades to 0.2 and back once per blink
    /// interval; otherwise the invincibility toggle decides.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        match self.overlay {
            Some(TimedOverlay {
                kind: OverlayKind::HitBlink,
                elapsed,
                ..
            }) => {
                let interval = self.config.hit_blink_interval;
                let half = interval / 2.0;
                let t = elapsed % interval;
                let depth = 1.0 - HIT_BLINK_MIN_ALPHA;
                if t < half {
                    1.0 - depth * (t / half)
                } else {
                    HIT_BLINK_MIN_ALPHA + depth * ((t - half) / half)
                }
            },
            _ => self.invincible_alpha,
        }
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Jump.
    ///
    /// The state check and the grounded check are independent: a hero that
    /// is not yet `Jumping` always becomes `Jumping`, but only gets the
    /// impulse if its vertical velocity is exactly zero.
    #[allow(clippy::float_cmp)]
    pub fn jump(&mut self) -> JumpOutcome {
        if self.state == PlayerState::Jumping {
            return JumpOutcome::Ignored;
        }

        self.set_state(PlayerState::Jumping);

        if self.vertical_velocity == 0.0 {
            self.vertical_velocity += self.config.jump_impulse;
            self.events.push(PlayerEvent::Jumped {
                impulse: self.config.jump_impulse,
            });
            JumpOutcome::Launched
        } else {
            debug!(
                velocity = self.vertical_velocity,
                "jump while airborne, no impulse"
            );
            JumpOutcome::StateOnly
        }
    }

    /// Ground contact. Only does anything while `Jumping`.
    ///
    /// Returns `true` if the hero landed.
    pub fn landed(&mut self) -> bool {
        if self.state != PlayerState::Jumping {
            return false;
        }

        let feet = Vec2::new(
            self.position.x,
            self.position.y - self.config.size.1 / 2.0,
        );
        self.events.push(PlayerEvent::LandingEffect {
            position: feet,
            duration: self.config.landing_effect_duration,
        });
        self.vertical_velocity = 0.0;
        self.set_state(PlayerState::Running);
        true
    }

    /// Start a regular attack. Only possible while `Running`.
    pub fn start_attack(&mut self) -> bool {
        if self.state != PlayerState::Running {
            return false;
        }
        self.set_state(PlayerState::Attacking);
        self.start_overlay(OverlayKind::Attack, self.config.attack_duration);
        true
    }

    /// Take damage from any state. Replaces any timed action with the hit
    /// blink; invincibility is left alone.
    pub fn take_damage(&mut self) {
        self.overlay = None;
        self.set_state(PlayerState::Hit);
        self.start_overlay(OverlayKind::HitBlink, self.config.hit_duration());
    }

    /// Special move: attack and become invincible.
    pub fn trigger_special_move(&mut self) {
        self.set_state(PlayerState::Attacking);
        self.start_overlay(
            OverlayKind::SpecialMove,
            self.config.special_move_duration,
        );
        self.is_invincible = true;
        self.invincible_elapsed = 0.0;
        self.events.push(PlayerEvent::InvincibilityStarted);
    }

    /// Stop in place. Only from `Running`.
    pub fn idle(&mut self) -> bool {
        if self.state != PlayerState::Running {
            return false;
        }
        self.set_state(PlayerState::Idle);
        true
    }

    /// Return to `Running`, cancelling any timed action.
    pub fn start_running(&mut self) {
        self.overlay = None;
        self.set_state(PlayerState::Running);
    }

    /// Advance timed overlays and the invincibility blink.
    pub fn update(&mut self, dt: f32) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.elapsed += dt;
            if overlay.elapsed >= overlay.duration {
                let kind = overlay.kind;
                self.overlay = None;
                if self.state == kind.state() {
                    self.set_state(PlayerState::Running);
                }
            }
        }

        if self.is_invincible {
            self.invincible_elapsed += dt;
            if self.invincible_elapsed >= self.config.invincible_duration {
                self.is_invincible = false;
                self.invincible_elapsed = 0.0;
                self.invincible_alpha = 1.0;
                self.events.push(PlayerEvent::InvincibilityEnded);
            } else {
                #[allow(clippy::float_cmp)]
                let visible = self.invincible_alpha == 1.0;
                self.invincible_alpha = if visible {
                    INVINCIBLE_BLINK_ALPHA
                } else {
                    1.0
                };
            }
        }
    }

    fn start_overlay(&mut self, kind: OverlayKind, duration: f32) {
        self.overlay = Some(TimedOverlay {
            kind,
            elapsed: 0.0,
            duration,
        });
    }

    fn set_state(&mut self, to: PlayerState) {
        let from = self.state;
        if from == to {
            return;
        }
        if let Some(overlay) = self.overlay {
            if overlay.kind.state() != to {
                self.overlay = None;
            }
        }
        self.state = to;
        debug!(?from, ?to, "player state changed");
        self.events.push(PlayerEvent::StateChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_changes(events: &[PlayerEvent]) -> Vec<(PlayerState, PlayerState)> {
        events
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_starts_running() {
        let player = PlayerStateMachine::default();
        assert_eq!(player.state(), PlayerState::Running);
        assert!(!player.is_invincible());
        assert!((player.alpha() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_double_jump_single_impulse() {
        let mut player = PlayerStateMachine::default();

        assert_eq!(player.jump(), JumpOutcome::Launched);
        assert_eq!(player.jump(), JumpOutcome::Ignored);

        assert_eq!(player.state(), PlayerState::Jumping);
        assert!((player.vertical_velocity() - 350.0).abs() < f32::EPSILON);
        let impulses = player
            .drain_events()
            .iter()
            .filter(|e| matches!(e, PlayerEvent::Jumped { .. }))
            .count();
        assert_eq!(impulses, 1);
    }

    #[test]
    fn test_airborne_jump_flips_state_without_impulse() {
        let mut player = PlayerStateMachine::default();
        player.set_vertical_velocity(-40.0);

        assert_eq!(player.jump(), JumpOutcome::StateOnly);
        assert_eq!(player.state(), PlayerState::Jumping);
        assert!((player.vertical_velocity() + 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_landed_only_from_jumping() {
        let mut player = PlayerStateMachine::default();
        assert!(!player.landed());
        assert!(player.drain_events().is_empty());

        player.jump();
        player.drain_events();
        assert!(player.landed());
        assert_eq!(player.state(), PlayerState::Running);

        let events = player.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, PlayerEvent::LandingEffect { .. })));
        assert_eq!(
            state_changes(&events),
            vec![(PlayerState::Jumping, PlayerState::Running)]
        );
    }

    #[test]
    fn test_attack_returns_to_running() {
        let mut player = PlayerStateMachine::default();
        assert!(player.start_attack());
        assert_eq!(player.state(), PlayerState::Attacking);
        assert_eq!(player.overlay(), Some(OverlayKind::Attack));

        player.update(0.2);
        assert_eq!(player.state(), PlayerState::Attacking);
        player.update(0.25);
        assert_eq!(player.state(), PlayerState::Running);
        assert_eq!(player.overlay(), None);
    }

    #[test]
    fn test_attack_requires_running() {
        let mut player = PlayerStateMachine::default();
        player.jump();
        assert!(!player.start_attack());
        assert_eq!(player.state(), PlayerState::Jumping);
    }

    #[test]
    fn test_hit_blinks_for_one_second() {
        let mut player = PlayerStateMachine::default();
        player.start_attack();
        player.take_damage();
        assert_eq!(player.state(), PlayerState::Hit);
        assert_eq!(player.overlay(), Some(OverlayKind::HitBlink));

        // Halfway through the first fade.
        player.update(0.05);
        assert!((player.alpha() - 0.6).abs() < 1e-4);

        for _ in 0..9 {
            player.update(0.1);
        }
        assert_eq!(player.state(), PlayerState::Hit);
        player.update(0.1);
        assert_eq!(player.state(), PlayerState::Running);
        assert!((player.alpha() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_special_move_invincibility_decays_independently() {
        let mut player = PlayerStateMachine::default();
        player.trigger_special_move();
        assert_eq!(player.state(), PlayerState::Attacking);
        assert!(player.is_invincible());

        player.update(0.1);
        assert!((player.alpha() - 0.5).abs() < f32::EPSILON);
        player.update(0.1);
        assert!((player.alpha() - 1.0).abs() < f32::EPSILON);

        // Attack finished, invincibility still running.
        player.update(0.2);
        assert_eq!(player.state(), PlayerState::Running);
        assert!(player.is_invincible());

        for _ in 0..12 {
            player.update(0.1);
        }
        assert!(!player.is_invincible());
        assert!((player.alpha() - 1.0).abs() < f32::EPSILON);
        assert!(player
            .drain_events()
            .contains(&PlayerEvent::InvincibilityEnded));
    }

    #[test]
    fn test_damage_keeps_invincibility() {
        let mut player = PlayerStateMachine::default();
        player.trigger_special_move();
        player.take_damage();
        assert_eq!(player.state(), PlayerState::Hit);
        assert!(player.is_invincible());
    }

    #[test]
    fn test_jump_cancels_attack_overlay() {
        let mut player = PlayerStateMachine::default();
        player.start_attack();
        player.jump();
        assert_eq!(player.overlay(), None);

        player.update(1.0);
        assert_eq!(player.state(), PlayerState::Jumping);
    }

    #[test]
    fn test_idle_and_resume() {
        let mut player = PlayerStateMachine::default();
        assert!(player.idle());
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(!player.idle());

        player.start_running();
        assert_eq!(player.state(), PlayerState::Running);
        assert_eq!(PlayerState::Idle.display_name(), "Idle");
    }
}
