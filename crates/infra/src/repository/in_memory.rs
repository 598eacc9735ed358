use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bookstore_core::{Context, Entity, EntityId, Query, Revisable, SearchCriteria, Searchable};

use super::r#trait::{MutableRepository, Repository, StoreError, StoreResult};

#[derive(Debug)]
struct StoreState<T> {
    records: HashMap<EntityId, T>,
    /// Identity handed to the next create. Only ever advances.
    next_id: EntityId,
}

/// In-memory entity store: one map, one identity counter, one lock.
///
/// Every operation checks the caller's context first, then holds the store-wide
/// mutex for its whole critical section, so mutations are linearizable and a
/// search sees a consistent snapshot. Records are cloned in and out.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    state: Mutex<StoreState<T>>,
}

impl<T: Entity> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                records: HashMap::new(),
                next_id: EntityId::new(1),
            }),
        }
    }

    /// Build a store pre-populated with `records`.
    ///
    /// Each record takes its key as identity. The counter starts after the
    /// largest key so later creates never collide with hydrated records.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (EntityId, T)>,
    {
        let records: HashMap<EntityId, T> = records
            .into_iter()
            .map(|(id, mut record)| {
                record.set_id(id);
                (id, record)
            })
            .collect();
        // A largest key of `EntityId::MAX` leaves the counter parked there;
        // `create` then reports exhaustion instead of wrapping.
        let next_id = match records.keys().max() {
            Some(&max) => max.next().unwrap_or(EntityId::MAX),
            None => EntityId::new(1),
        };

        Self {
            state: Mutex::new(StoreState { records, next_id }),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState<T>>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Poisoned { entity: T::KIND })
    }
}

impl<T: Entity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Repository<T> for InMemoryStore<T>
where
    T: Entity + Searchable,
{
    fn create(&self, ctx: &Context, mut entity: T) -> StoreResult<T> {
        ctx.check()?;

        let mut state = self.lock()?;
        let id = state.next_id;
        let Some(next_id) = id.next() else {
            return Err(StoreError::IdentitiesExhausted { entity: T::KIND });
        };
        entity.set_id(id);
        state.records.insert(id, entity.clone());
        state.next_id = next_id;
        drop(state);

        tracing::debug!(entity = T::KIND, %id, "record created");
        Ok(entity)
    }

    fn get(&self, ctx: &Context, id: EntityId) -> StoreResult<T> {
        ctx.check()?;

        let state = self.lock()?;
        state
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<T>(id))
    }

    fn delete(&self, ctx: &Context, id: EntityId) -> StoreResult<()> {
        ctx.check()?;

        let mut state = self.lock()?;
        if state.records.remove(&id).is_none() {
            return Err(StoreError::not_found::<T>(id));
        }
        drop(state);

        tracing::debug!(entity = T::KIND, %id, "record deleted");
        Ok(())
    }

    fn search(&self, ctx: &Context, criteria: &SearchCriteria) -> StoreResult<Vec<T>> {
        ctx.check()?;

        let query = Query::<T>::compile(criteria);
        if query.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let state = self.lock()?;
        Ok(state
            .records
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }
}

impl<T> MutableRepository<T> for InMemoryStore<T>
where
    T: Entity + Searchable + Revisable,
{
    fn update(&self, ctx: &Context, entity: T) -> StoreResult<T> {
        ctx.check()?;

        let id = entity.id();
        let mut state = self.lock()?;
        let Some(slot) = state.records.get_mut(&id) else {
            return Err(StoreError::not_found::<T>(id));
        };
        *slot = entity.clone();
        drop(state);

        tracing::debug!(entity = T::KIND, %id, "record updated");
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_catalog::{Author, Book};
    use bookstore_core::CancelReason;
    use serde_json::json;

    fn ctx() -> Context {
        Context::background()
    }

    fn book(title: &str, genres: &[&str], price: f64) -> Book {
        Book::new(title, Author::new("Jon", "Bodner"), price).with_genres(genres.iter().copied())
    }

    fn criteria(value: serde_json::Value) -> SearchCriteria {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_assigns_sequential_identities_and_ignores_input_id() {
        let store = InMemoryStore::<Book>::new();
        let mut input = book("Learning Go", &["Tech"], 40.0);
        input.id = EntityId::new(77);

        let first = store.create(&ctx(), input).unwrap();
        let second = store.create(&ctx(), book("Learning C", &[], 25.0)).unwrap();

        assert_eq!(first.id, EntityId::new(1));
        assert_eq!(second.id, EntityId::new(2));
        assert!(store.get(&ctx(), EntityId::new(77)).unwrap_err().is_not_found());
    }

    #[test]
    fn get_returns_created_value() {
        let store = InMemoryStore::<Book>::new();
        let created = store.create(&ctx(), book("Learning Go", &["Tech"], 40.0)).unwrap();
        assert_eq!(store.get(&ctx(), created.id).unwrap(), created);
    }

    #[test]
    fn returned_values_are_copies() {
        let store = InMemoryStore::<Book>::new();
        let mut created = store.create(&ctx(), book("Learning Go", &["Tech"], 40.0)).unwrap();
        created.title.push_str(" (mutated)");

        assert_eq!(store.get(&ctx(), created.id).unwrap().title, "Learning Go");
    }

    #[test]
    fn update_replaces_wholesale() {
        let store = InMemoryStore::<Book>::new();
        let created = store
            .create(&ctx(), book("Learning Go", &["Tech"], 40.0).with_stock(5))
            .unwrap();

        let mut replacement = book("Learning Go, 2nd ed.", &[], 45.0);
        replacement.id = created.id;
        let updated = store.update(&ctx(), replacement.clone()).unwrap();

        assert_eq!(updated, replacement);
        let stored = store.get(&ctx(), created.id).unwrap();
        assert_eq!(stored.stock, 0);
        assert!(stored.genres.is_empty());
    }

    #[test]
    fn update_at_uses_key_identity() {
        let store = InMemoryStore::<Book>::new();
        for title in ["a", "b", "c"] {
            store.create(&ctx(), book(title, &[], 1.0)).unwrap();
        }

        let mut changed = book("c, revised", &[], 2.0);
        changed.id = EntityId::new(1);
        changed.author.id = EntityId::new(1);
        let updated = store.update_at(&ctx(), EntityId::new(3), changed).unwrap();

        assert_eq!(updated.id, EntityId::new(3));
        assert_eq!(store.get(&ctx(), EntityId::new(1)).unwrap().title, "a");
        assert_eq!(store.get(&ctx(), EntityId::new(3)).unwrap().title, "c, revised");
    }

    #[test]
    fn absent_identity_fails_identically_for_get_update_delete() {
        let store = InMemoryStore::<Book>::new();
        let id = EntityId::new(5);
        let mut absent = book("ghost", &[], 0.0);
        absent.id = id;

        let expected = StoreError::NotFound { entity: "book", id };
        assert_eq!(store.get(&ctx(), id).unwrap_err(), expected);
        assert_eq!(store.update(&ctx(), absent).unwrap_err(), expected);
        assert_eq!(store.delete(&ctx(), id).unwrap_err(), expected);
        assert!(store.is_empty());
    }

    #[test]
    fn deleted_identities_are_never_reused() {
        let store = InMemoryStore::<Book>::new();
        let first = store.create(&ctx(), book("a", &[], 1.0)).unwrap();
        store.delete(&ctx(), first.id).unwrap();

        assert!(store.get(&ctx(), first.id).unwrap_err().is_not_found());
        assert!(store.delete(&ctx(), first.id).unwrap_err().is_not_found());

        let second = store.create(&ctx(), book("b", &[], 1.0)).unwrap();
        assert_eq!(second.id, EntityId::new(2));
    }

    #[test]
    fn search_applies_conjunction() {
        let store = InMemoryStore::<Book>::new();
        let go = store
            .create(&ctx(), book("Learning Go", &["Fiction", "Tech"], 40.0))
            .unwrap();
        store
            .create(&ctx(), book("Learning C", &["Fiction"], 25.0))
            .unwrap();

        let found = store
            .search(&ctx(), &criteria(json!({"title": "Go", "genre": "Fiction"})))
            .unwrap();
        assert_eq!(found, vec![go]);
    }

    #[test]
    fn search_with_empty_criteria_returns_everything() {
        let store = InMemoryStore::<Book>::new();
        for title in ["a", "b", "c"] {
            store.create(&ctx(), book(title, &[], 1.0)).unwrap();
        }

        let mut titles: Vec<String> = store
            .search(&ctx(), &SearchCriteria::new())
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn impossible_or_mistyped_criteria_yield_empty_not_error() {
        let store = InMemoryStore::<Book>::new();
        store.create(&ctx(), book("Learning Go", &["Tech"], 40.0)).unwrap();

        let none = store
            .search(&ctx(), &criteria(json!({"minPrice": 50, "maxPrice": 10})))
            .unwrap();
        assert!(none.is_empty());

        let mistyped = store
            .search(&ctx(), &criteria(json!({"price": "forty"})))
            .unwrap();
        assert!(mistyped.is_empty());
    }

    #[test]
    fn cancelled_context_short_circuits_every_operation() {
        let store = InMemoryStore::<Book>::new();
        let existing = store.create(&ctx(), book("kept", &[], 1.0)).unwrap();

        let cancelled = Context::background().child();
        cancelled.cancel();

        let is_cancelled = |err: StoreError| {
            matches!(err, StoreError::Cancelled(c) if c.reason() == CancelReason::Cancelled)
        };

        assert!(is_cancelled(store.create(&cancelled, book("new", &[], 1.0)).unwrap_err()));
        assert!(is_cancelled(store.get(&cancelled, existing.id).unwrap_err()));
        let mut changed = existing.clone();
        changed.title = "changed".to_string();
        assert!(is_cancelled(store.update(&cancelled, changed).unwrap_err()));
        assert!(is_cancelled(store.delete(&cancelled, existing.id).unwrap_err()));
        assert!(is_cancelled(store.search(&cancelled, &SearchCriteria::new()).unwrap_err()));

        assert_eq!(store.search(&ctx(), &SearchCriteria::new()).unwrap(), vec![existing]);
        let next = store.create(&ctx(), book("after", &[], 1.0)).unwrap();
        assert_eq!(next.id, EntityId::new(2));
    }

    #[test]
    fn hydrated_store_continues_after_largest_key() {
        let store = InMemoryStore::with_records([
            (EntityId::new(4), book("four", &[], 1.0)),
            (EntityId::new(9), book("nine", &[], 1.0)),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&ctx(), EntityId::new(9)).unwrap().id, EntityId::new(9));
        let created = store.create(&ctx(), book("ten", &[], 1.0)).unwrap();
        assert_eq!(created.id, EntityId::new(10));
    }

    #[test]
    fn exhausted_identities_fail_without_mutating() {
        let store = InMemoryStore::with_records([(
            EntityId::new(u64::MAX - 1),
            book("last", &[], 1.0),
        )]);

        for _ in 0..2 {
            assert_eq!(
                store.create(&ctx(), book("overflow", &[], 1.0)).unwrap_err(),
                StoreError::IdentitiesExhausted { entity: "book" }
            );
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&ctx(), EntityId::new(u64::MAX - 1)).unwrap().title, "last");
        assert!(store.get(&ctx(), EntityId::MAX).unwrap_err().is_not_found());
        assert!(store.get(&ctx(), EntityId::new(1)).unwrap_err().is_not_found());
    }

    #[test]
    fn store_holding_max_identity_never_wraps() {
        let store = InMemoryStore::with_records([(EntityId::MAX, book("max", &[], 1.0))]);

        let err = store.create(&ctx(), book("wrapped", &[], 1.0)).unwrap_err();
        assert!(matches!(err, StoreError::IdentitiesExhausted { .. }));
        assert_eq!(store.search(&ctx(), &SearchCriteria::new()).unwrap().len(), 1);
    }

    #[test]
    fn poisoned_lock_surfaces_as_error() {
        let store = std::sync::Arc::new(InMemoryStore::<Book>::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("poison the store lock");
        })
        .join();

        assert_eq!(
            store.get(&ctx(), EntityId::new(1)).unwrap_err(),
            StoreError::Poisoned { entity: "book" }
        );
        assert_eq!(store.len(), 0);
    }
}
