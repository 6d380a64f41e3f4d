//! Event bus between the simulation core and presentation layers.
//!
//! The core publishes everything a renderer, HUD or sound layer might react
//! to; the host drains the bus once per frame.

use crossbeam_channel::{bounded, Receiver, Sender};
use ecorunner_common::EntityId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::RemovalReason;
use crate::environment::DayPhase;
use crate::player::PlayerEvent;
use crate::spawn::SpawnRequest;
use crate::weather::WeatherChange;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Entity spawned and handed to the movement collaborator
    EntitySpawned {
        /// Entity ID
        entity_id: EntityId,
        /// Placement and travel data
        request: SpawnRequest,
    },
    /// Entity left the play field
    EntityRemoved {
        /// Entity ID
        entity_id: EntityId,
        /// Why it left
        reason: RemovalReason,
    },
    /// Something happened to the hero
    Player(PlayerEvent),
    /// Weather changed
    WeatherChanged(WeatherChange),
    /// Day phase changed
    DayPhaseChanged {
        /// Previous phase
        from: DayPhase,
        /// New phase
        to: DayPhase,
    },
    /// Distance score increased
    ScoreChanged {
        /// New score
        score: u64,
        /// Amount added
        delta: u64,
    },
    /// Eco score increased
    EcoScoreChanged {
        /// New eco score
        eco_score: u64,
        /// Amount added
        delta: u64,
    },
    /// Pause gate toggled
    PauseChanged {
        /// Whether the simulation is now paused
        paused: bool,
    },
    /// The run ended
    GameOver {
        /// Final score
        score: u64,
        /// Final eco score
        eco_score: u64,
    },
    /// A new best score was recorded
    NewHighScore {
        /// The new high score
        high_score: u64,
    },
    /// A fresh session replaced the old one
    Restarted,
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        if self.sender.try_send(event).is_err() {
            warn!(capacity = self.capacity, "event bus full, dropping event");
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}
