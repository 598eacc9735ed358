use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookstore_catalog::{Book, BookField};
use bookstore_core::{Entity, EntityId, FilterSpec, MatchKind, Matcher, Revisable, Searchable};
use bookstore_customers::Customer;

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line: a book (embedded by value) and a quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItem {
    pub id: EntityId,
    pub book: Book,
    pub quantity: i64,
}

impl OrderItem {
    pub fn new(book: Book, quantity: i64) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            book,
            quantity,
        }
    }

    /// Book price times quantity.
    pub fn subtotal(&self) -> f64 {
        self.book.price * self.quantity as f64
    }
}

impl Entity for OrderItem {
    const KIND: &'static str = "order item";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl Revisable for OrderItem {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderItemField {
    Book(BookField),
    Quantity,
}

impl Searchable for OrderItem {
    type Field = OrderItemField;

    const FILTERS: &'static [FilterSpec<OrderItemField>] = &[
        FilterSpec::new("title", OrderItemField::Book(BookField::Title), MatchKind::Substring),
        FilterSpec::new("author", OrderItemField::Book(BookField::Author), MatchKind::Substring),
        FilterSpec::new("genre", OrderItemField::Book(BookField::Genre), MatchKind::Substring),
        FilterSpec::new("quantity", OrderItemField::Quantity, MatchKind::ExactInteger),
    ];

    fn matches(&self, field: OrderItemField, matcher: &Matcher) -> bool {
        match field {
            OrderItemField::Book(book_field) => self.book.matches(book_field, matcher),
            OrderItemField::Quantity => matcher.integer(self.quantity),
        }
    }
}

/// A customer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub id: EntityId,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
}

impl Order {
    /// Build a pending order whose total is the sum of its item subtotals.
    pub fn new(customer: Customer, items: Vec<OrderItem>) -> Self {
        let mut order = Self {
            customer,
            items,
            ..Self::default()
        };
        order.total_price = order.items_total();
        order
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sum of item subtotals. May differ from `total_price` when the stored
    /// total includes discounts or shipping.
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

impl Entity for Order {
    const KIND: &'static str = "order";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl Revisable for Order {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderField {
    /// Customer name.
    Customer,
    /// Customer email.
    Email,
    Status,
    /// Title of any ordered book.
    Title,
    TotalPrice,
}

impl Searchable for Order {
    type Field = OrderField;

    const FILTERS: &'static [FilterSpec<OrderField>] = &[
        FilterSpec::new("customer", OrderField::Customer, MatchKind::Substring),
        FilterSpec::new("email", OrderField::Email, MatchKind::Substring),
        FilterSpec::new("status", OrderField::Status, MatchKind::Substring),
        FilterSpec::new("title", OrderField::Title, MatchKind::Substring),
        FilterSpec::new("totalPrice", OrderField::TotalPrice, MatchKind::ExactDecimal),
        FilterSpec::new("minTotal", OrderField::TotalPrice, MatchKind::AtLeast),
        FilterSpec::new("maxTotal", OrderField::TotalPrice, MatchKind::AtMost),
    ];

    fn matches(&self, field: OrderField, matcher: &Matcher) -> bool {
        match field {
            OrderField::Customer => matcher.text(&self.customer.name),
            OrderField::Email => matcher.text(&self.customer.email),
            OrderField::Status => matcher.text(self.status.as_str()),
            OrderField::Title => matcher.any_text(self.items.iter().map(|item| item.book.title.as_str())),
            OrderField::TotalPrice => matcher.decimal(self.total_price),
        }
    }
}
