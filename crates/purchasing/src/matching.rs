//! Attribute patterns and the records that can be matched against them.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use supplyerp_core::CompanyId;
use supplyerp_parties::PartyId;
use supplyerp_products::ProductId;

/// Value of a matchable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Party(PartyId),
    Product(ProductId),
    Company(CompanyId),
    Integer(i64),
    Text(String),
}

/// Attribute name → required value.
///
/// Keys absent from the pattern are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(BTreeMap<String, AttributeValue>);

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Add `name` only when a value is given; `None` leaves it a wildcard.
    pub fn with_optional(self, name: impl Into<String>, value: Option<AttributeValue>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A record that can be compared against a [`Pattern`].
///
/// Only the fields a record declares as matchable take part; pattern keys
/// naming other fields are ignored. A declared field with no value on the
/// record matches anything.
pub trait Matchable {
    /// Names of the attributes that take part in matching.
    fn matchable_fields(&self) -> &'static [&'static str];

    /// Current value of a matchable attribute.
    fn attribute(&self, name: &str) -> Option<AttributeValue>;

    fn matches(&self, pattern: &Pattern) -> bool {
        let fields = self.matchable_fields();
        pattern
            .iter()
            .filter(|(name, _)| fields.iter().any(|field| field == name))
            .all(|(name, expected)| match self.attribute(name) {
                Some(value) => &value == expected,
                None => true,
            })
    }
}

/// Order by ascending `sequence`, records without one last.
pub fn sequence_order(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
