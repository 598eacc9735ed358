//! On-disk snapshot used to hydrate the store aggregate at startup.
//!
//! The document is a JSON object with one optional section per entity store;
//! each section maps decimal identity strings to entity records:
//!
//! ```json
//! {
//!   "authors": { "1": { "firstName": "Frank", "lastName": "Herbert" } },
//!   "books":   { "1": { "title": "Dune", "genres": ["Science Fiction"], "price": 9.99 } }
//! }
//! ```
//!
//! Sections may be omitted; their stores start empty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bookstore_catalog::{Author, Book};
use bookstore_core::{Entity, EntityId};
use bookstore_customers::Customer;
use bookstore_sales::{BookSale, Order, OrderItem};

use crate::repository::InMemoryStore;

/// Startup hydration failure. Fatal: the process must not serve requests
/// from a partially hydrated aggregate.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode snapshot {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot section '{section}' has invalid identity {id}")]
    InvalidIdentity { section: &'static str, id: EntityId },
}

/// Where the aggregate's initial contents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Start with six empty stores.
    Empty,
    /// Hydrate from a JSON snapshot file. A missing file means "start empty".
    File(PathBuf),
}

/// Decoded snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<BTreeMap<EntityId, Book>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<BTreeMap<EntityId, Author>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<BTreeMap<EntityId, Customer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<BTreeMap<EntityId, Order>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_items: Option<BTreeMap<EntityId, OrderItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_sales: Option<BTreeMap<EntityId, BookSale>>,
}

impl Snapshot {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Read and decode a snapshot file.
    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes).map_err(|source| SnapshotError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Turn one snapshot section into a store.
///
/// Rejects the unassigned identity and [`EntityId::MAX`], which has no
/// successor for the store's counter.
///
/// An omitted section becomes an empty store.
pub(crate) fn hydrate_section<T: Entity>(
    section: &'static str,
    records: Option<BTreeMap<EntityId, T>>,
) -> Result<InMemoryStore<T>, SnapshotError> {
    let Some(records) = records else {
        tracing::debug!(section, "snapshot section absent; starting empty");
        return Ok(InMemoryStore::new());
    };

    for reserved in [EntityId::UNASSIGNED, EntityId::MAX] {
        if records.contains_key(&reserved) {
            return Err(SnapshotError::InvalidIdentity { section, id: reserved });
        }
    }

    Ok(InMemoryStore::with_records(records))
}
