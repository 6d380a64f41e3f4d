//! # EcoRunner Common
//!
//! Common types shared by the EcoRunner simulation core and its host:
//! - ID types (`EntityId`) and the id allocator used by entity arenas
//! - The 2D vector type used for positions and sizes
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;

/// 2D vector used for scene-space positions, sizes and velocities.
pub use glam::Vec2;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use glam::Vec2;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_allocation() {
        let mut ids = IdAllocator::new();
        let id1 = ids.next_id();
        let id2 = ids.next_id();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_error_wrapping() {
        let err: RunnerError = PersistenceError::Unavailable("no disk".to_string()).into();
        assert!(err.to_string().contains("no disk"));
    }
}
