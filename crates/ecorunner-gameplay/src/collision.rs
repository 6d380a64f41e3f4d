//! Contact dispatch.
//!
//! The physics collaborator reports contacts as unordered pairs. Each pair is
//! ordered by category value before matching, so `(Obstacle, Player)` and
//! `(Player, Obstacle)` take the same path. Pairs with no table entry are
//! ignored.

use ecorunner_common::EntityId;
use serde::{Deserialize, Serialize};

/// Physics category of a contact participant.
///
/// The discriminants are the physics bit masks; their numeric order is the
/// canonical pair order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum ContactCategory {
    /// The hero
    Player = 0b1,
    /// An obstacle
    Obstacle = 0b10,
    /// A power-up
    PowerUp = 0b100,
    /// The ground strip
    Ground = 0b1000,
}

impl ContactCategory {
    /// Bit mask of this category.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decode a raw mask. Anything other than exactly one known bit is
    /// rejected.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0b1 => Some(Self::Player),
            0b10 => Some(Self::Obstacle),
            0b100 => Some(Self::PowerUp),
            0b1000 => Some(Self::Ground),
            _ => None,
        }
    }
}

/// One side of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contact {
    /// Participant category
    pub category: ContactCategory,
    /// Spawned entity involved, if the participant is one
    pub entity: Option<EntityId>,
}

impl Contact {
    /// A participant that is not an arena entity (player, ground).
    #[must_use]
    pub const fn new(category: ContactCategory) -> Self {
        Self {
            category,
            entity: None,
        }
    }

    /// A participant backed by an arena entity.
    #[must_use]
    pub const fn entity(category: ContactCategory, id: EntityId) -> Self {
        Self {
            category,
            entity: Some(id),
        }
    }
}

/// What a contact means for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionOutcome {
    /// The hero ran into an obstacle.
    GameOver,
    /// The hero touched a power-up.
    CollectPowerUp(Option<EntityId>),
    /// The hero touched the ground.
    GroundContact,
    /// No table entry for this pair.
    Ignored,
}

/// Order a pair so the lower category comes first.
#[must_use]
pub fn canonicalize(a: Contact, b: Contact) -> (Contact, Contact) {
    if a.category <= b.category {
        (a, b)
    } else {
        (b, a)
    }
}

/// Stateless contact classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Create a resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classify an unordered contact pair.
    #[must_use]
    pub fn resolve(&self, a: Contact, b: Contact) -> CollisionOutcome {
        let (first, second) = canonicalize(a, b);
        match (first.category, second.category) {
            (ContactCategory::Player, ContactCategory::Obstacle) => CollisionOutcome::GameOver,
            (ContactCategory::Player, ContactCategory::PowerUp) => {
                CollisionOutcome::CollectPowerUp(second.entity)
            },
            (ContactCategory::Player, ContactCategory::Ground) => CollisionOutcome::GroundContact,
            _ => CollisionOutcome::Ignored,
        }
    }

    /// Classify a contact reported as raw bit masks.
    #[must_use]
    pub fn resolve_bits(
        &self,
        a_bits: u32,
        b_bits: u32,
        b_entity: Option<EntityId>,
    ) -> CollisionOutcome {
        match (
            ContactCategory::from_bits(a_bits),
            ContactCategory::from_bits(b_bits),
        ) {
            (Some(a), Some(b)) => self.resolve(
                Contact::new(a),
                Contact {
                    category: b,
                    entity: b_entity,
                },
            ),
            _ => CollisionOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ContactCategory; 4] = [
        ContactCategory::Player,
        ContactCategory::Obstacle,
        ContactCategory::PowerUp,
        ContactCategory::Ground,
    ];

    #[test]
    fn test_dispatch_table() {
        let resolver = CollisionResolver::new();
        let id = EntityId::from_raw(7);
        let player = Contact::new(ContactCategory::Player);

        assert_eq!(
            resolver.resolve(player, Contact::entity(ContactCategory::Obstacle, id)),
            CollisionOutcome::GameOver
        );
        assert_eq!(
            resolver.resolve(player, Contact::entity(ContactCategory::PowerUp, id)),
            CollisionOutcome::CollectPowerUp(Some(id))
        );
        assert_eq!(
            resolver.resolve(player, Contact::new(ContactCategory::Ground)),
            CollisionOutcome::GroundContact
        );
    }

    #[test]
    fn test_canonicalization_is_commutative() {
        let resolver = CollisionResolver::new();
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i..] {
                let x = Contact::entity(*a, EntityId::from_raw(1));
                let y = Contact::entity(*b, EntityId::from_raw(2));
                assert_eq!(resolver.resolve(x, y), resolver.resolve(y, x), "{a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn test_unmatched_pairs_ignored() {
        let resolver = CollisionResolver::new();
        let pairs = [
            (ContactCategory::Obstacle, ContactCategory::Ground),
            (ContactCategory::PowerUp, ContactCategory::Obstacle),
            (ContactCategory::Player, ContactCategory::Player),
            (ContactCategory::Ground, ContactCategory::Ground),
        ];
        for (a, b) in pairs {
            assert_eq!(
                resolver.resolve(Contact::new(a), Contact::new(b)),
                CollisionOutcome::Ignored
            );
        }
    }

    #[test]
    fn test_bits() {
        let resolver = CollisionResolver::new();
        for category in ALL {
            assert_eq!(ContactCategory::from_bits(category.bits()), Some(category));
        }
        assert_eq!(ContactCategory::from_bits(0), None);
        assert_eq!(ContactCategory::from_bits(0b11), None);
        assert_eq!(ContactCategory::from_bits(0b1_0000), None);

        assert_eq!(resolver.resolve_bits(0b10, 0b1, None), CollisionOutcome::GameOver);
        assert_eq!(resolver.resolve_bits(0b1, 0b11, None), CollisionOutcome::Ignored);
    }
}
