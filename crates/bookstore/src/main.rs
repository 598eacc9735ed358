use anyhow::Context as _;

use bookstore_infra::{BookstoreConfig, StoreInitializer};

fn main() -> anyhow::Result<()> {
    let config = BookstoreConfig::from_env().context("invalid configuration")?;
    bookstore_observability::init_with(config.log_format);

    let stores = StoreInitializer::new();
    let aggregate = stores
        .get_or_init(&config.snapshot)
        .context("failed to hydrate stores")?;

    let summary = aggregate.summary();
    tracing::info!(
        books = summary.books,
        authors = summary.authors,
        customers = summary.customers,
        orders = summary.orders,
        order_items = summary.order_items,
        book_sales = summary.book_sales,
        "stores ready"
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
