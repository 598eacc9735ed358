use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookstore_core::{Entity, EntityId, FilterSpec, MatchKind, Matcher, Revisable, Searchable};

/// Postal address embedded in a customer (value object, no identity).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// A bookstore customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Customer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

impl Entity for Customer {
    const KIND: &'static str = "customer";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl Revisable for Customer {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Email,
    City,
    State,
    Country,
}

impl Searchable for Customer {
    type Field = CustomerField;

    const FILTERS: &'static [FilterSpec<CustomerField>] = &[
        FilterSpec::new("name", CustomerField::Name, MatchKind::Substring),
        FilterSpec::new("email", CustomerField::Email, MatchKind::Substring),
        FilterSpec::new("city", CustomerField::City, MatchKind::Substring),
        FilterSpec::new("state", CustomerField::State, MatchKind::Substring),
        FilterSpec::new("country", CustomerField::Country, MatchKind::Substring),
    ];

    fn matches(&self, field: CustomerField, matcher: &Matcher) -> bool {
        match field {
            CustomerField::Name => matcher.text(&self.name),
            CustomerField::Email => matcher.text(&self.email),
            CustomerField::City => matcher.text(&self.address.city),
            CustomerField::State => matcher.text(&self.address.state),
            CustomerField::Country => matcher.text(&self.address.country),
        }
    }
}
