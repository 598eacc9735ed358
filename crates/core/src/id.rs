//! Store-assigned entity identities.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Identity of a record within one entity store.
///
/// Identities are positive and assigned by the store on create. The zero value
/// means "not yet assigned" and is what deserialized input carries when the
/// `id` field is omitted.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// The unassigned identity.
    pub const UNASSIGNED: EntityId = EntityId(0);

    /// The largest representable identity. It has no successor.
    pub const MAX: EntityId = EntityId(u64::MAX);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }

    /// The identity following this one, or `None` at [`EntityId::MAX`].
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<EntityId> for u64 {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

/// Failure to parse an identity from text (e.g. a URL path segment).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier '{input}': expected a positive integer")]
pub struct InvalidEntityId {
    pub input: String,
}

impl FromStr for EntityId {
    type Err = InvalidEntityId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(Self(value)),
            _ => Err(InvalidEntityId {
                input: s.to_string(),
            }),
        }
    }
}
