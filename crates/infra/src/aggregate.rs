//! The store aggregate: one store per entity type, built once per process.

use std::io::ErrorKind;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Serialize;

use bookstore_catalog::{Author, Book};
use bookstore_customers::Customer;
use bookstore_sales::{BookSale, Order, OrderItem};

use crate::repository::{
    AuthorRepository, BookRepository, BookSaleRepository, CustomerRepository, InMemoryStore,
    OrderItemRepository, OrderRepository,
};
use crate::snapshot::{Snapshot, SnapshotError, SnapshotSource, hydrate_section};

/// Record counts per store.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub books: usize,
    pub authors: usize,
    pub customers: usize,
    pub orders: usize,
    pub order_items: usize,
    pub book_sales: usize,
}

impl StoreSummary {
    pub fn total(&self) -> usize {
        self.books + self.authors + self.customers + self.orders + self.order_items + self.book_sales
    }
}

/// Owns one in-memory store per entity type.
///
/// Stores are independent: each has its own lock and identity counter, and no
/// operation spans two of them. Hand the aggregate around as `Arc<StoreAggregate>`
/// and select stores through the repository accessors.
#[derive(Debug, Default)]
pub struct StoreAggregate {
    books: Arc<InMemoryStore<Book>>,
    authors: Arc<InMemoryStore<Author>>,
    customers: Arc<InMemoryStore<Customer>>,
    orders: Arc<InMemoryStore<Order>>,
    order_items: Arc<InMemoryStore<OrderItem>>,
    book_sales: Arc<InMemoryStore<BookSale>>,
}

impl StoreAggregate {
    /// Six empty stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build stores from a decoded snapshot. Omitted sections start empty.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        Ok(Self {
            books: Arc::new(hydrate_section("books", snapshot.books)?),
            authors: Arc::new(hydrate_section("authors", snapshot.authors)?),
            customers: Arc::new(hydrate_section("customers", snapshot.customers)?),
            orders: Arc::new(hydrate_section("orders", snapshot.orders)?),
            order_items: Arc::new(hydrate_section("orderItems", snapshot.order_items)?),
            book_sales: Arc::new(hydrate_section("bookSales", snapshot.book_sales)?),
        })
    }

    /// Build the aggregate from `source`.
    ///
    /// A configured snapshot file that does not exist yields empty stores (with
    /// a warning). Any other read failure, a decode failure, or an invalid
    /// identity is returned as an error and must be treated as fatal.
    pub fn open(source: &SnapshotSource) -> Result<Self, SnapshotError> {
        let path = match source {
            SnapshotSource::Empty => return Ok(Self::new()),
            SnapshotSource::File(path) => path,
        };

        match Snapshot::read(path) {
            Ok(snapshot) => {
                let aggregate = Self::from_snapshot(snapshot)?;
                tracing::info!(path = %path.display(), records = aggregate.summary().total(), "stores hydrated from snapshot");
                Ok(aggregate)
            }
            Err(SnapshotError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "snapshot file not found; starting with empty stores");
                Ok(Self::new())
            }
            Err(err) => Err(err),
        }
    }

    pub fn books(&self) -> Arc<dyn BookRepository> {
        self.books.clone()
    }

    pub fn authors(&self) -> Arc<dyn AuthorRepository> {
        self.authors.clone()
    }

    pub fn customers(&self) -> Arc<dyn CustomerRepository> {
        self.customers.clone()
    }

    pub fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    pub fn order_items(&self) -> Arc<dyn OrderItemRepository> {
        self.order_items.clone()
    }

    pub fn book_sales(&self) -> Arc<dyn BookSaleRepository> {
        self.book_sales.clone()
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            books: self.books.len(),
            authors: self.authors.len(),
            customers: self.customers.len(),
            orders: self.orders.len(),
            order_items: self.order_items.len(),
            book_sales: self.book_sales.len(),
        }
    }
}

/// Construct-once guard for the process-wide aggregate.
///
/// Owned by process startup and passed to whatever needs the stores. The first
/// successful [`StoreInitializer::get_or_init`] builds the aggregate; every later
/// call returns that same instance without reading the source again. A failed
/// first attempt leaves the guard empty.
#[derive(Debug, Default)]
pub struct StoreInitializer {
    cell: OnceCell<Arc<StoreAggregate>>,
}

impl StoreInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_init(&self, source: &SnapshotSource) -> Result<Arc<StoreAggregate>, SnapshotError> {
        self.cell
            .get_or_try_init(|| StoreAggregate::open(source).map(Arc::new))
            .cloned()
    }

    /// The aggregate, if already built.
    pub fn get(&self) -> Option<Arc<StoreAggregate>> {
        self.cell.get().cloned()
    }
}
