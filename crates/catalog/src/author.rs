use serde::{Deserialize, Serialize};

use bookstore_core::{Entity, EntityId, FilterSpec, MatchKind, Matcher, Revisable, Searchable};

/// A book author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

impl Author {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    /// "First Last", the form matched by the `name` criterion.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Author {
    const KIND: &'static str = "author";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl Revisable for Author {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthorField {
    FirstName,
    LastName,
    FullName,
}

impl Searchable for Author {
    type Field = AuthorField;

    const FILTERS: &'static [FilterSpec<AuthorField>] = &[
        FilterSpec::new("firstName", AuthorField::FirstName, MatchKind::Substring),
        FilterSpec::new("lastName", AuthorField::LastName, MatchKind::Substring),
        FilterSpec::new("name", AuthorField::FullName, MatchKind::Substring),
    ];

    fn matches(&self, field: AuthorField, matcher: &Matcher) -> bool {
        match field {
            AuthorField::FirstName => matcher.text(&self.first_name),
            AuthorField::LastName => matcher.text(&self.last_name),
            AuthorField::FullName => matcher.text(&self.full_name()),
        }
    }
}
