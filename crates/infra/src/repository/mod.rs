//! Entity repositories: the storage contract and its in-memory implementation.
//!
//! One generic [`InMemoryStore`] backs all six entity types. Whether a store
//! supports `update` is decided by the entity type: only `Revisable` entities
//! get a [`MutableRepository`] implementation, so book sales cannot be updated:
//!
//! ```compile_fail
//! use bookstore_infra::repository::{InMemoryStore, MutableRepository};
//! use bookstore_sales::BookSale;
//!
//! fn requires_update<R: MutableRepository<BookSale>>(_: &R) {}
//! requires_update(&InMemoryStore::<BookSale>::new());
//! ```

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use r#trait::{
    AuthorRepository, BookRepository, BookSaleRepository, CustomerRepository, MutableRepository,
    OrderItemRepository, OrderRepository, Repository, StoreError, StoreResult,
};
