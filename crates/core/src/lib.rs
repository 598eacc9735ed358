//! `bookstore-core`: building blocks shared by every entity store.
//!
//! This crate contains **pure domain** primitives (no storage concerns):
//! identities, the entity trait, the cancellation context, and the typed search
//! criteria evaluator.

pub mod context;
pub mod criteria;
pub mod entity;
pub mod id;

pub use context::{CancelReason, Cancelled, Context};
pub use criteria::{FilterSpec, MatchKind, Matcher, Query, SearchCriteria, Searchable};
pub use entity::{Entity, Revisable};
pub use id::{EntityId, InvalidEntityId};
