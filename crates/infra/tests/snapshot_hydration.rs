use std::path::PathBuf;
use std::sync::Arc;

use bookstore_core::{Context, EntityId, SearchCriteria};
use bookstore_infra::{
    MutableRepository, Repository, SnapshotError, SnapshotSource, StoreAggregate, StoreInitializer,
};
use bookstore_sales::OrderStatus;
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn criteria(value: serde_json::Value) -> SearchCriteria {
    serde_json::from_value(value).expect("criteria must be a JSON object")
}

#[test]
fn full_snapshot_hydrates_every_store() {
    let aggregate = StoreAggregate::open(&SnapshotSource::File(fixture("database.json"))).unwrap();
    let summary = aggregate.summary();

    assert_eq!(summary.authors, 2);
    assert_eq!(summary.books, 3);
    assert_eq!(summary.customers, 1);
    assert_eq!(summary.orders, 1);
    assert_eq!(summary.order_items, 1);
    assert_eq!(summary.book_sales, 1);
}

#[test]
fn hydrated_records_take_identity_from_section_keys() {
    let aggregate = StoreAggregate::open(&SnapshotSource::File(fixture("database.json"))).unwrap();
    let ctx = Context::background();

    let earthsea = aggregate.books().get(&ctx, EntityId::new(5)).unwrap();
    assert_eq!(earthsea.id, EntityId::new(5));
    assert_eq!(earthsea.title, "A Wizard of Earthsea");
    assert_eq!(earthsea.author.full_name(), "Ursula Le Guin");

    let order = aggregate.orders().get(&ctx, EntityId::new(1)).unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.customer.email, "ada@example.com");
}

#[test]
fn identity_counter_continues_after_largest_key() {
    let aggregate = StoreAggregate::open(&SnapshotSource::File(fixture("database.json"))).unwrap();
    let ctx = Context::background();

    let mut book = aggregate.books().get(&ctx, EntityId::new(1)).unwrap();
    book.title = "Dune Messiah".to_string();
    let created = aggregate.books().create(&ctx, book).unwrap();
    assert_eq!(created.id, EntityId::new(6));

    let author = aggregate
        .authors()
        .create(&ctx, bookstore_catalog::Author::new("Octavia", "Butler"))
        .unwrap();
    assert_eq!(author.id, EntityId::new(3));
}

#[test]
fn hydrated_stores_are_searchable() {
    let aggregate = StoreAggregate::open(&SnapshotSource::File(fixture("database.json"))).unwrap();
    let ctx = Context::background();

    let sci_fi = aggregate
        .books()
        .search(&ctx, &criteria(json!({"genre": "Science"})))
        .unwrap();
    assert_eq!(sci_fi.len(), 2);

    let cheap_le_guin = aggregate
        .books()
        .search(&ctx, &criteria(json!({"author": "Ursula", "maxPrice": 10})))
        .unwrap();
    assert_eq!(cheap_le_guin.len(), 1);
    assert_eq!(cheap_le_guin[0].id, EntityId::new(5));

    let shipped = aggregate
        .orders()
        .search(&ctx, &criteria(json!({"status": "shipped", "title": "Dune"})))
        .unwrap();
    assert_eq!(shipped.len(), 1);

    let londoners = aggregate
        .customers()
        .search(&ctx, &criteria(json!({"city": "London"})))
        .unwrap();
    assert_eq!(londoners.len(), 1);
}

#[test]
fn partial_snapshot_leaves_missing_sections_empty_and_usable() {
    let aggregate = StoreAggregate::open(&SnapshotSource::File(fixture("partial.json"))).unwrap();
    let ctx = Context::background();
    let summary = aggregate.summary();

    assert_eq!(summary.books, 1);
    assert_eq!(summary.total(), 1);

    let neuromancer = aggregate.books().get(&ctx, EntityId::new(3)).unwrap();
    assert_eq!(neuromancer.price, 11.0);
    assert_eq!(neuromancer.stock, 0);
    assert!(neuromancer.published_at.is_none());

    let sale = aggregate
        .book_sales()
        .create(&ctx, bookstore_sales::BookSale::new(neuromancer, 1))
        .unwrap();
    assert_eq!(sale.id, EntityId::new(1));
}

#[test]
fn malformed_snapshot_is_a_decode_error() {
    let path = fixture("malformed.json");
    let err = StoreAggregate::open(&SnapshotSource::File(path.clone())).err().unwrap();
    match err {
        SnapshotError::Decode { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected decode error, got {other}"),
    }
}

#[test]
fn missing_snapshot_starts_with_empty_stores() {
    let aggregate = StoreAggregate::open(&SnapshotSource::File(fixture("absent.json"))).unwrap();
    assert_eq!(aggregate.summary().total(), 0);
}

#[test]
fn directory_as_snapshot_is_an_io_error() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let err = StoreAggregate::open(&SnapshotSource::File(dir)).err().unwrap();
    assert!(matches!(err, SnapshotError::Io { .. }));
}

#[test]
fn initializer_failure_leaves_guard_empty_for_retry() {
    let init = StoreInitializer::new();

    assert!(init.get_or_init(&SnapshotSource::File(fixture("malformed.json"))).is_err());
    assert!(init.get().is_none());

    let aggregate = init.get_or_init(&SnapshotSource::File(fixture("database.json"))).unwrap();
    assert_eq!(aggregate.summary().books, 3);
}

#[test]
fn initializer_shares_one_aggregate_across_threads() {
    let init = Arc::new(StoreInitializer::new());
    let source = SnapshotSource::File(fixture("database.json"));

    let aggregates: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let init = init.clone();
                let source = source.clone();
                scope.spawn(move || init.get_or_init(&source).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &aggregates[0];
    assert!(aggregates.iter().all(|a| Arc::ptr_eq(a, first)));

    let ctx = Context::background();
    let mut dune = first.books().get(&ctx, EntityId::new(1)).unwrap();
    dune.stock = 11;
    first.books().update(&ctx, dune).unwrap();
    assert_eq!(aggregates[7].books().get(&ctx, EntityId::new(1)).unwrap().stock, 11);
}
