use std::sync::Arc;

use thiserror::Error;

use bookstore_catalog::{Author, Book};
use bookstore_core::{Cancelled, Context, Entity, EntityId, SearchCriteria};
use bookstore_customers::Customer;
use bookstore_sales::{BookSale, Order, OrderItem};

/// Result type returned by every repository operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Repository operation error.
///
/// - **NotFound**: get/update/delete targeted an identity that is not stored
/// - **Cancelled**: the caller's context was already stopped at entry
/// - **Poisoned**: a writer panicked while holding the store lock
/// - **IdentitiesExhausted**: the identity counter reached its limit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error("{entity} store lock poisoned")]
    Poisoned { entity: &'static str },

    #[error("{entity} store has no identities left")]
    IdentitiesExhausted { entity: &'static str },
}

impl StoreError {
    pub fn not_found<T: Entity>(id: EntityId) -> Self {
        Self::NotFound { entity: T::KIND, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled(_))
    }
}

/// Storage contract for one entity type: create, get, delete, search.
///
/// Callers depend on this contract (or [`MutableRepository`]), never on a
/// concrete store, so the in-memory implementation can be swapped without
/// touching them.
///
/// ## Semantics
///
/// - `create` ignores any identity carried by `entity` and assigns the next one
/// - `get` returns an independent copy of the stored record
/// - `delete` removes the record; identities are never reused
/// - `search` returns every record matching all criteria, in no particular
///   order; empty criteria return everything, and criteria that cannot match
///   return an empty list rather than an error
///
/// Every operation checks `ctx` before touching stored state and fails with
/// [`StoreError::Cancelled`] if it has stopped.
pub trait Repository<T: Entity>: Send + Sync {
    fn create(&self, ctx: &Context, entity: T) -> StoreResult<T>;

    fn get(&self, ctx: &Context, id: EntityId) -> StoreResult<T>;

    fn delete(&self, ctx: &Context, id: EntityId) -> StoreResult<()>;

    fn search(&self, ctx: &Context, criteria: &SearchCriteria) -> StoreResult<Vec<T>>;
}

/// Storage contract for entities whose records may be replaced.
pub trait MutableRepository<T: Entity>: Repository<T> {
    /// Replace the record at `entity.id()` wholesale.
    fn update(&self, ctx: &Context, entity: T) -> StoreResult<T>;

    /// Replace the record at `id`, overriding whatever identity `entity` carries.
    fn update_at(&self, ctx: &Context, id: EntityId, mut entity: T) -> StoreResult<T> {
        entity.set_id(id);
        self.update(ctx, entity)
    }
}

impl<T, S> Repository<T> for Arc<S>
where
    T: Entity,
    S: Repository<T> + ?Sized,
{
    fn create(&self, ctx: &Context, entity: T) -> StoreResult<T> {
        (**self).create(ctx, entity)
    }

    fn get(&self, ctx: &Context, id: EntityId) -> StoreResult<T> {
        (**self).get(ctx, id)
    }

    fn delete(&self, ctx: &Context, id: EntityId) -> StoreResult<()> {
        (**self).delete(ctx, id)
    }

    fn search(&self, ctx: &Context, criteria: &SearchCriteria) -> StoreResult<Vec<T>> {
        (**self).search(ctx, criteria)
    }
}

impl<T, S> MutableRepository<T> for Arc<S>
where
    T: Entity,
    S: MutableRepository<T> + ?Sized,
{
    fn update(&self, ctx: &Context, entity: T) -> StoreResult<T> {
        (**self).update(ctx, entity)
    }
}

macro_rules! repository_alias {
    ($(#[$meta:meta])* $name:ident: $contract:ident<$entity:ty>) => {
        $(#[$meta])*
        pub trait $name: $contract<$entity> {}

        impl<S> $name for S where S: $contract<$entity> + ?Sized {}
    };
}

repository_alias!(
    /// Book storage contract.
    BookRepository: MutableRepository<Book>
);
repository_alias!(
    /// Author storage contract.
    AuthorRepository: MutableRepository<Author>
);
repository_alias!(
    /// Customer storage contract.
    CustomerRepository: MutableRepository<Customer>
);
repository_alias!(
    /// Order storage contract.
    OrderRepository: MutableRepository<Order>
);
repository_alias!(
    /// Order item storage contract.
    OrderItemRepository: MutableRepository<OrderItem>
);
repository_alias!(
    /// Book sale storage contract. Sales are immutable: there is no update.
    BookSaleRepository: Repository<BookSale>
);
