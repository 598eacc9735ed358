use serde::{Deserialize, Serialize};

use bookstore_catalog::{Book, BookField};
use bookstore_core::{Entity, EntityId, FilterSpec, MatchKind, Matcher, Searchable};

/// A recorded sale of some copies of a book.
///
/// Sales are immutable once recorded: `BookSale` is deliberately not
/// `Revisable`, so its store offers create/get/delete/search but no update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookSale {
    pub id: EntityId,
    pub book: Book,
    pub quantity: i64,
}

impl BookSale {
    pub fn new(book: Book, quantity: i64) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            book,
            quantity,
        }
    }

    /// Revenue of the sale at the embedded book's price.
    pub fn revenue(&self) -> f64 {
        self.book.price * self.quantity as f64
    }
}

impl Entity for BookSale {
    const KIND: &'static str = "book sale";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BookSaleField {
    Book(BookField),
    Quantity,
}

impl Searchable for BookSale {
    type Field = BookSaleField;

    const FILTERS: &'static [FilterSpec<BookSaleField>] = &[
        FilterSpec::new("title", BookSaleField::Book(BookField::Title), MatchKind::Substring),
        FilterSpec::new("author", BookSaleField::Book(BookField::Author), MatchKind::Substring),
        FilterSpec::new("genre", BookSaleField::Book(BookField::Genre), MatchKind::Substring),
        FilterSpec::new("quantity", BookSaleField::Quantity, MatchKind::ExactInteger),
    ];

    fn matches(&self, field: BookSaleField, matcher: &Matcher) -> bool {
        match field {
            BookSaleField::Book(book_field) => self.book.matches(book_field, matcher),
            BookSaleField::Quantity => matcher.integer(self.quantity),
        }
    }
}
