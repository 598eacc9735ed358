//! Infrastructure layer: entity stores, snapshot hydration, config.

pub mod aggregate;
pub mod config;
pub mod repository;
pub mod snapshot;


pub use aggregate::{StoreAggregate, StoreInitializer, StoreSummary};
pub use config::{BookstoreConfig, ConfigError};
pub use repository::{InMemoryStore, MutableRepository, Repository, StoreError, StoreResult};
pub use snapshot::{Snapshot, SnapshotError, SnapshotSource};
