//! Search criteria and the typed filter evaluator.
//!
//! Criteria arrive as an open-ended JSON object (`{"title": "Go", "price": 12.5}`).
//! Each searchable entity publishes a static filter schema binding criteria keys
//! to one of its fields and a [`MatchKind`]. [`Query::compile`] converts every
//! criteria value into a typed [`Matcher`] up front, so evaluation never performs
//! an unchecked type assertion:
//!
//! - unknown keys are ignored;
//! - a value that cannot convert to the key's expected type makes the whole
//!   query unsatisfiable (it matches no record) instead of failing the search.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Loosely typed search criteria: filter name -> JSON value.
///
/// Absence of a key means "no constraint on that field"; empty criteria match
/// every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchCriteria {
    filters: Map<String, JsonValue>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode criteria from a request body.
    ///
    /// An empty body, malformed JSON, or a JSON value that is not an object all
    /// decode to empty criteria (match everything).
    pub fn from_json_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<JsonValue>(body) {
            Ok(JsonValue::Object(filters)) => Self { filters },
            Ok(other) => {
                tracing::debug!(kind = json_kind(&other), "non-object search body; matching all");
                Self::default()
            }
            Err(err) => {
                if !body.iter().all(u8::is_ascii_whitespace) {
                    tracing::debug!(error = %err, "malformed search body; matching all");
                }
                Self::default()
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.filters.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.filters.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Map<String, JsonValue>> for SearchCriteria {
    fn from(filters: Map<String, JsonValue>) -> Self {
        Self { filters }
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for SearchCriteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// How a criteria value is compared against a field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchKind {
    /// Criteria string must be a case-sensitive substring of the field.
    Substring,
    /// Criteria must be a whole number equal to the field.
    ExactInteger,
    /// Criteria must be a number equal to the field.
    ExactDecimal,
    /// Field must be greater than or equal to the criteria number.
    AtLeast,
    /// Field must be less than or equal to the criteria number.
    AtMost,
}

/// One row of an entity's filter schema.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FilterSpec<F> {
    pub key: &'static str,
    pub field: F,
    pub kind: MatchKind,
}

impl<F> FilterSpec<F> {
    pub const fn new(key: &'static str, field: F, kind: MatchKind) -> Self {
        Self { key, field, kind }
    }
}

/// A criteria value converted to the type its field expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    Substring(String),
    ExactInteger(i64),
    ExactDecimal(f64),
    AtLeast(f64),
    AtMost(f64),
}

impl Matcher {
    /// Convert a raw criteria value for a given match kind.
    ///
    /// Returns `None` when the value's JSON type does not fit the kind
    /// (e.g. a string where a number is expected). No coercion is attempted
    /// between strings and numbers.
    pub fn convert(kind: MatchKind, value: &JsonValue) -> Option<Self> {
        match kind {
            MatchKind::Substring => value.as_str().map(|s| Matcher::Substring(s.to_string())),
            MatchKind::ExactInteger => whole_number(value).map(Matcher::ExactInteger),
            MatchKind::ExactDecimal => value.as_f64().map(Matcher::ExactDecimal),
            MatchKind::AtLeast => value.as_f64().map(Matcher::AtLeast),
            MatchKind::AtMost => value.as_f64().map(Matcher::AtMost),
        }
    }

    /// Test a text field. Only substring matchers can match text.
    pub fn text(&self, value: &str) -> bool {
        match self {
            Matcher::Substring(needle) => value.contains(needle.as_str()),
            _ => false,
        }
    }

    /// Test a collection of text values: matches if any element matches.
    pub fn any_text<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        values.into_iter().any(|value| self.text(value))
    }

    /// Test an integer field.
    pub fn integer(&self, value: i64) -> bool {
        match self {
            Matcher::ExactInteger(expected) => value == *expected,
            Matcher::AtLeast(bound) => value as f64 >= *bound,
            Matcher::AtMost(bound) => value as f64 <= *bound,
            _ => false,
        }
    }

    /// Test a decimal field.
    pub fn decimal(&self, value: f64) -> bool {
        match self {
            Matcher::ExactDecimal(expected) => value == *expected,
            Matcher::AtLeast(bound) => value >= *bound,
            Matcher::AtMost(bound) => value <= *bound,
            _ => false,
        }
    }
}

fn whole_number(value: &JsonValue) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// An entity that can be filtered by [`SearchCriteria`].
pub trait Searchable {
    /// Field selector for this entity's filter schema.
    type Field: Copy + core::fmt::Debug + 'static;

    /// Criteria keys understood by this entity.
    const FILTERS: &'static [FilterSpec<Self::Field>];

    /// Evaluate one typed predicate against this record.
    fn matches(&self, field: Self::Field, matcher: &Matcher) -> bool;
}

/// Criteria compiled against an entity's filter schema.
pub struct Query<T: Searchable> {
    filters: Vec<(T::Field, Matcher)>,
    unsatisfiable: bool,
    _entity: PhantomData<fn(&T)>,
}

impl<T: Searchable> Query<T> {
    /// A query with no constraints.
    pub fn match_all() -> Self {
        Self {
            filters: Vec::new(),
            unsatisfiable: false,
            _entity: PhantomData,
        }
    }

    pub fn compile(criteria: &SearchCriteria) -> Self {
        let mut query = Self::match_all();

        for (key, value) in criteria.iter() {
            let Some(filter) = T::FILTERS.iter().find(|filter| filter.key == key) else {
                tracing::debug!(key, "ignoring unknown search criterion");
                continue;
            };

            match Matcher::convert(filter.kind, value) {
                Some(matcher) => query.filters.push((filter.field, matcher)),
                None => {
                    tracing::debug!(
                        key,
                        expected = ?filter.kind,
                        found = json_kind(value),
                        "search criterion has the wrong type; nothing can match"
                    );
                    query.unsatisfiable = true;
                }
            }
        }

        query
    }

    /// Whether a criterion failed type conversion.
    pub fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    /// Number of typed predicates that will be evaluated.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Logical AND across every compiled predicate.
    pub fn matches(&self, item: &T) -> bool {
        !self.unsatisfiable
            && self
                .filters
                .iter()
                .all(|(field, matcher)| item.matches(*field, matcher))
    }
}
