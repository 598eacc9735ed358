use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookstore_core::{Entity, EntityId, FilterSpec, MatchKind, Matcher, Revisable, Searchable};

use crate::author::Author;

/// A catalog book.
///
/// The author is embedded by value: the book keeps the author record as it
/// was when the book was written to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    pub id: EntityId,
    pub title: String,
    pub author: Author,
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub price: f64,
    pub stock: i64,
}

impl Book {
    pub fn new(title: impl Into<String>, author: Author, price: f64) -> Self {
        Self {
            title: title.into(),
            author,
            price,
            ..Self::default()
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

impl Entity for Book {
    const KIND: &'static str = "book";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl Revisable for Book {}

/// Book fields addressable by search criteria.
///
/// Reused by compositions that embed a book (order items, book sales).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BookField {
    Title,
    /// Author first name.
    Author,
    /// Any of the book's genres.
    Genre,
    Price,
}

impl Searchable for Book {
    type Field = BookField;

    const FILTERS: &'static [FilterSpec<BookField>] = &[
        FilterSpec::new("title", BookField::Title, MatchKind::Substring),
        FilterSpec::new("author", BookField::Author, MatchKind::Substring),
        FilterSpec::new("genre", BookField::Genre, MatchKind::Substring),
        FilterSpec::new("price", BookField::Price, MatchKind::ExactDecimal),
        FilterSpec::new("minPrice", BookField::Price, MatchKind::AtLeast),
        FilterSpec::new("maxPrice", BookField::Price, MatchKind::AtMost),
    ];

    fn matches(&self, field: BookField, matcher: &Matcher) -> bool {
        match field {
            BookField::Title => matcher.text(&self.title),
            BookField::Author => matcher.text(&self.author.first_name),
            BookField::Genre => matcher.any_text(self.genres.iter().map(String::as_str)),
            BookField::Price => matcher.decimal(self.price),
        }
    }
}
