//! Entity trait: identity + soft-delete lifecycle.

use crate::error::{DomainError, DomainResult};

/// A persisted record with a stable identity.
///
/// Both entities in this system are soft-deleted: they are never removed from
/// storage, only flagged inactive.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether the record is active (`activo = true`).
    fn is_active(&self) -> bool;

    /// Treat an inactive record as missing.
    fn ensure_active(&self, not_found: &str) -> DomainResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::not_found(not_found))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record {
        id: u32,
        activo: bool,
    }

    impl Entity for Record {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn is_active(&self) -> bool {
            self.activo
        }
    }

    #[test]
    fn inactive_records_are_not_found() {
        let live = Record { id: 1, activo: true };
        assert!(live.ensure_active("gone").is_ok());
        assert_eq!(*live.id(), 1);

        let dead = Record { id: 2, activo: false };
        assert_eq!(dead.ensure_active("gone"), Err(DomainError::not_found("gone")));
    }
}
