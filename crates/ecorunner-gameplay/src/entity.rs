//! Arena storage for spawned obstacles and power-ups.
//!
//! Other systems refer to entities only by [`EntityId`]; a removed entity's id
//! simply stops resolving, so a late contact report for it is harmless.

use ahash::AHashMap;
use ecorunner_common::{EntityId, IdAllocator, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for entity operations.
#[derive(Debug, Error)]
pub enum EntityError {
    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(EntityId),
    /// Entity is not in the lifecycle stage the operation expects
    #[error("Entity {id} is {actual:?}, expected {expected:?}")]
    WrongLifecycle {
        /// The entity
        id: EntityId,
        /// Stage the operation needs
        expected: Lifecycle,
        /// Stage the entity is in
        actual: Lifecycle,
    },
}

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Kind of spawned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    /// Ends the run on contact.
    Obstacle,
    /// Collected for eco points.
    PowerUp,
}

impl SpawnKind {
    /// Get the display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Obstacle => "Obstacle",
            Self::PowerUp => "PowerUp",
        }
    }
}

/// Lifecycle of a spawned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Requested but not yet picked up by the movement collaborator.
    Spawned,
    /// Moving across the play field.
    Active,
    /// Gone; kept only in the value returned by [`EntityArena::remove`].
    Removed,
}

/// Why an entity left the play field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Collected by the player.
    Collected,
    /// Reached the far side of the play field.
    TravelComplete,
    /// Discarded with the session.
    SessionReset,
}

/// An obstacle or power-up in the play field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnableEntity {
    /// Unique identifier
    id: EntityId,
    /// Obstacle or power-up
    kind: SpawnKind,
    /// Spawn position (centre) in scene units
    position: Vec2,
    /// Size in scene units
    size: Vec2,
    /// Lifecycle stage
    lifecycle: Lifecycle,
}

impl SpawnableEntity {
    /// Returns the entity's ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(&self) -> SpawnKind {
        self.kind
    }

    /// Returns the last reported position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Returns the entity size.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Returns the lifecycle stage.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

/// Id-keyed storage for spawned entities.
#[derive(Debug, Default)]
pub struct EntityArena {
    /// Live entities
    entities: AHashMap<EntityId, SpawnableEntity>,
    /// Id source
    ids: IdAllocator,
}

impl EntityArena {
    /// Creates a new empty entity arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Insert a freshly requested entity in the `Spawned` stage.
    pub fn spawn(&mut self, kind: SpawnKind, position: Vec2, size: Vec2) -> EntityId {
        let id = self.ids.next_id();
        self.entities.insert(
            id,
            SpawnableEntity {
                id,
                kind,
                position,
                size,
                lifecycle: Lifecycle::Spawned,
            },
        );
        id
    }

    /// Mark a spawned entity as moving.
    pub fn activate(&mut self, id: EntityId) -> EntityResult<()> {
        let entity = self.entities.get_mut(&id).ok_or(EntityError::NotFound(id))?;
        if entity.lifecycle != Lifecycle::Spawned {
            return Err(EntityError::WrongLifecycle {
                id,
                expected: Lifecycle::Spawned,
                actual: entity.lifecycle,
            });
        }
        entity.lifecycle = Lifecycle::Active;
        Ok(())
    }

    /// Record a position reported by the movement collaborator.
    pub fn set_position(&mut self, id: EntityId, position: Vec2) -> EntityResult<()> {
        let entity = self.entities.get_mut(&id).ok_or(EntityError::NotFound(id))?;
        entity.position = position;
        Ok(())
    }

    /// Remove an entity. The returned record is in the `Removed` stage.
    pub fn remove(&mut self, id: EntityId) -> EntityResult<SpawnableEntity> {
        let mut entity = self.entities.remove(&id).ok_or(EntityError::NotFound(id))?;
        entity.lifecycle = Lifecycle::Removed;
        Ok(entity)
    }

    /// Gets a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> EntityResult<&SpawnableEntity> {
        self.entities.get(&id).ok_or(EntityError::NotFound(id))
    }

    /// Checks if an entity with the given ID exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns an iterator over all live entities, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &SpawnableEntity> {
        self.entities.values()
    }

    /// Returns an iterator over live entities of one kind.
    pub fn iter_by_kind(&self, kind: SpawnKind) -> impl Iterator<Item = &SpawnableEntity> {
        self.iter().filter(move |e| e.kind == kind)
    }

    /// Total number of entities ever spawned into this arena.
    #[must_use]
    pub fn spawned_total(&self) -> u64 {
        self.ids.issued()
    }

    /// Remove every entity, returning their ids in ascending order. The id
    /// allocator keeps counting, so ids are never reused.
    pub fn clear(&mut self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.drain().map(|(id, _)| id).collect();
        ids.sort_unstable();
        ids
    }
}
