//! Entity trait: identity + continuity across state changes.

use crate::id::EntityId;

/// Record type kept in an entity store.
///
/// The store owns identity assignment, so entities expose both a getter and a
/// setter for their identity field. Values are cloned in and out of the store;
/// callers never hold live references to stored state.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human-readable kind used in errors and log fields (e.g. `"book"`).
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> EntityId;

    /// Overwrites the entity identifier.
    fn set_id(&mut self, id: EntityId);
}

/// Marker for entities whose stored records may be replaced after creation.
///
/// Entities without this marker are immutable once created; their stores
/// expose no update operation.
pub trait Revisable: Entity {}
