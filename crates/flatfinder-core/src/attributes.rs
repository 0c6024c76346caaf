//! Attribute mappings and the structured/extra classifier.
//!
//! An [`AttributeMapping`] is the unit of query intent handed to the search
//! pipeline: field name → scalar value, produced by an external extraction
//! step and never trusted to be complete or well-typed.
//!
//! [`classify`] splits a mapping at the schema boundary:
//!
//! - **structured** keys (known listing columns) become typed
//!   [`StructuredField`] variants that the predicate builder can bind,
//! - **extra** keys (semantic-only signals such as `allows_pets`) are
//!   forwarded opaquely for query-text synthesis and negation checks.
//!
//! # Example
//!
//! ```
//! use flatfinder_core::{classify, AttributeMapping, StructuredField};
//!
//! let mapping = AttributeMapping::new()
//!     .with("location", "Lviv")
//!     .with("rooms", 2)
//!     .with("allows_pets", true);
//!
//! let classified = classify(&mapping);
//! assert_eq!(
//!     classified.structured,
//!     vec![StructuredField::Location("Lviv".into()), StructuredField::Rooms(2)]
//! );
//! assert_eq!(classified.extra_keys(), vec!["allows_pets"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

// =============================================================================
// ATTRIBUTE VALUES
// =============================================================================

/// A scalar attribute value.
///
/// Deserialization is untagged: JSON booleans, integers, floats and strings
/// map to the matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Convert a JSON value into a scalar attribute value.
    ///
    /// Returns `None` for `null`, arrays and objects.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Bool(b) => Some(Self::Bool(*b)),
            JsonValue::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Number)),
            JsonValue::String(s) => Some(Self::Text(s.clone())),
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }

    /// Strict boolean view: only `Bool` carries a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Loose truthiness used for phrasing.
    ///
    /// Numbers are truthy when non-zero. Text is truthy unless it is blank
    /// or reads `false`, `0` or `no` (case-insensitive).
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Number(f) => *f != 0.0,
            Self::Text(s) => {
                let s = s.trim();
                !(s.is_empty()
                    || ["false", "0", "no"]
                        .iter()
                        .any(|falsy| s.eq_ignore_ascii_case(falsy)))
            }
        }
    }

    /// Coerce to a whole number that fits an `INTEGER` column.
    pub fn to_i32(&self) -> Option<i32> {
        match self {
            Self::Integer(i) => i32::try_from(*i).ok(),
            Self::Number(f) => whole_f64_to_i32(*f),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_f64_to_i32))
            }
            Self::Bool(_) => None,
        }
    }

    /// Coerce to a finite decimal.
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Integer(i) => *i as f64,
            Self::Number(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Coerce to a boolean, accepting `"true"`/`"false"` text.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Self::Integer(_) | Self::Number(_) => None,
        }
    }

    /// Coerce to non-empty text; numbers use their display form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Integer(_) | Self::Number(_) => Some(self.to_string()),
            Self::Bool(_) => None,
        }
    }
}

fn whole_f64_to_i32(f: f64) -> Option<i32> {
    if f.is_finite() && f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for AttributeValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        Self::Number(f)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// =============================================================================
// ATTRIBUTE MAPPING
// =============================================================================

/// Caller search intent as key/value pairs.
///
/// Backed by a `BTreeMap`, so iteration is always in sorted key order and
/// identical mappings produce identical downstream text and predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Map<String, JsonValue>")]
pub struct AttributeMapping(BTreeMap<String, AttributeValue>);

impl AttributeMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether `key` is set to boolean `true` (not merely truthy).
    pub fn is_required(&self, key: &str) -> bool {
        self.get(key).and_then(AttributeValue::as_bool) == Some(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a mapping from a JSON value.
    ///
    /// Returns `None` when the value is not an object. Non-scalar members are
    /// dropped.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_object().map(|map| Self::from(map.clone()))
    }

    /// Parse a mapping from a JSON object string.
    pub fn from_json_str(s: &str) -> crate::Result<Self> {
        let value: JsonValue = serde_json::from_str(s)?;
        Self::from_json(&value).ok_or_else(|| {
            crate::Error::InvalidInput("attribute mapping must be a JSON object".to_string())
        })
    }
}

impl From<serde_json::Map<String, JsonValue>> for AttributeMapping {
    fn from(map: serde_json::Map<String, JsonValue>) -> Self {
        let inner = map
            .iter()
            .filter_map(|(k, v)| AttributeValue::from_json(v).map(|value| (k.clone(), value)))
            .collect();
        Self(inner)
    }
}

impl FromIterator<(String, AttributeValue)> for AttributeMapping {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// KNOWN FIELDS
// =============================================================================

/// Keys that map onto queryable listing columns.
///
/// Variant order is the canonical clause order used by the predicate builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KnownField {
    Location,
    Rooms,
    Beds,
    Area,
    Floor,
    Price,
    MinPrice,
    MaxPrice,
    HasWifi,
    HasParking,
    HasKitchen,
}

impl KnownField {
    /// All known fields in canonical order.
    pub const ALL: [KnownField; 11] = [
        Self::Location,
        Self::Rooms,
        Self::Beds,
        Self::Area,
        Self::Floor,
        Self::Price,
        Self::MinPrice,
        Self::MaxPrice,
        Self::HasWifi,
        Self::HasParking,
        Self::HasKitchen,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Attribute key as it appears in a mapping.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Rooms => "rooms",
            Self::Beds => "beds",
            Self::Area => "area",
            Self::Floor => "floor",
            Self::Price => "price",
            Self::MinPrice => "min_price",
            Self::MaxPrice => "max_price",
            Self::HasWifi => "has_wifi",
            Self::HasParking => "has_parking",
            Self::HasKitchen => "has_kitchen",
        }
    }

    /// Store column the field binds to. The three price keys share `price`.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Price | Self::MinPrice | Self::MaxPrice => "price",
            other => other.key(),
        }
    }
}

impl fmt::Display for KnownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A typed, queryable filter value for one known field.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredField {
    Location(String),
    Rooms(i32),
    Beds(i32),
    Area(f64),
    Floor(i32),
    Price(f64),
    MinPrice(f64),
    MaxPrice(f64),
    HasWifi(bool),
    HasParking(bool),
    HasKitchen(bool),
}

impl StructuredField {
    /// Coerce a raw attribute value into the typed variant for `field`.
    ///
    /// Returns `None` when the value cannot represent the column type.
    pub fn coerce(field: KnownField, value: &AttributeValue) -> Option<Self> {
        Some(match field {
            KnownField::Location => Self::Location(value.to_text()?),
            KnownField::Rooms => Self::Rooms(value.to_i32()?),
            KnownField::Beds => Self::Beds(value.to_i32()?),
            KnownField::Area => Self::Area(value.to_f64()?),
            KnownField::Floor => Self::Floor(value.to_i32()?),
            KnownField::Price => Self::Price(value.to_f64()?),
            KnownField::MinPrice => Self::MinPrice(value.to_f64()?),
            KnownField::MaxPrice => Self::MaxPrice(value.to_f64()?),
            KnownField::HasWifi => Self::HasWifi(value.to_bool()?),
            KnownField::HasParking => Self::HasParking(value.to_bool()?),
            KnownField::HasKitchen => Self::HasKitchen(value.to_bool()?),
        })
    }

    pub fn field(&self) -> KnownField {
        match self {
            Self::Location(_) => KnownField::Location,
            Self::Rooms(_) => KnownField::Rooms,
            Self::Beds(_) => KnownField::Beds,
            Self::Area(_) => KnownField::Area,
            Self::Floor(_) => KnownField::Floor,
            Self::Price(_) => KnownField::Price,
            Self::MinPrice(_) => KnownField::MinPrice,
            Self::MaxPrice(_) => KnownField::MaxPrice,
            Self::HasWifi(_) => KnownField::HasWifi,
            Self::HasParking(_) => KnownField::HasParking,
            Self::HasKitchen(_) => KnownField::HasKitchen,
        }
    }
}

// =============================================================================
// CLASSIFIER
// =============================================================================

/// Output of [`classify`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedFilters {
    /// Known fields with coercible values, in canonical order.
    pub structured: Vec<StructuredField>,
    /// Unknown keys, forwarded untouched.
    pub extras: BTreeMap<String, AttributeValue>,
    /// Known keys whose value could not be coerced to the column type.
    pub rejected: Vec<String>,
}

impl ClassifiedFilters {
    pub fn extra_keys(&self) -> Vec<&str> {
        self.extras.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.structured.is_empty() && self.extras.is_empty() && self.rejected.is_empty()
    }
}

/// Split a mapping into structured fields and extra attributes.
///
/// Never fails: unknown keys become extras, uncoercible known keys are
/// recorded in [`ClassifiedFilters::rejected`] and omitted from the
/// structured subset.
pub fn classify(mapping: &AttributeMapping) -> ClassifiedFilters {
    let mut out = ClassifiedFilters::default();

    for (key, value) in mapping.iter() {
        match KnownField::from_key(key) {
            Some(field) => match StructuredField::coerce(field, value) {
                Some(structured) => out.structured.push(structured),
                None => {
                    warn!(
                        subsystem = "search",
                        component = "classifier",
                        attribute = key,
                        value = %value,
                        "Dropping structured filter with uncoercible value"
                    );
                    out.rejected.push(key.to_string());
                }
            },
            None => {
                out.extras.insert(key.to_string(), value.clone());
            }
        }
    }

    out.structured.sort_by_key(StructuredField::field);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mapping_classifies_to_empty() {
        let classified = classify(&AttributeMapping::new());
        assert!(classified.structured.is_empty());
        assert!(classified.extras.is_empty());
        assert!(classified.is_empty());
    }

    #[test]
    fn test_known_keys_are_structured() {
        let mapping = AttributeMapping::new()
            .with("has_kitchen", false)
            .with("location", "Kyiv")
            .with("max_price", 120.5)
            .with("beds", 3);

        let classified = classify(&mapping);

        assert_eq!(
            classified.structured,
            vec![
                StructuredField::Location("Kyiv".to_string()),
                StructuredField::Beds(3),
                StructuredField::MaxPrice(120.5),
                StructuredField::HasKitchen(false),
            ]
        );
        assert!(classified.extras.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_extras() {
        let mapping = AttributeMapping::new()
            .with("has_pool", true)
            .with("allows_pets", true)
            .with("view", "sea");

        let classified = classify(&mapping);

        assert!(classified.structured.is_empty());
        assert_eq!(classified.extra_keys(), vec!["allows_pets", "has_pool", "view"]);
        assert_eq!(classified.extras["view"], AttributeValue::Text("sea".into()));
    }

    #[test]
    fn test_every_known_key_is_recognised() {
        for field in KnownField::ALL {
            assert_eq!(KnownField::from_key(field.key()), Some(field));
        }
        assert_eq!(KnownField::from_key("has_pool"), None);
        assert_eq!(KnownField::from_key("Location"), None);
    }

    #[test]
    fn test_price_keys_share_column() {
        assert_eq!(KnownField::Price.column(), "price");
        assert_eq!(KnownField::MinPrice.column(), "price");
        assert_eq!(KnownField::MaxPrice.column(), "price");
        assert_eq!(KnownField::Rooms.column(), "rooms");
    }

    #[test]
    fn test_loosely_typed_values_are_coerced() {
        let mapping = AttributeMapping::new()
            .with("rooms", "2")
            .with("floor", 4.0)
            .with("area", "55.5")
            .with("has_wifi", "TRUE")
            .with("location", 42);

        let classified = classify(&mapping);

        assert_eq!(
            classified.structured,
            vec![
                StructuredField::Location("42".to_string()),
                StructuredField::Rooms(2),
                StructuredField::Area(55.5),
                StructuredField::Floor(4),
                StructuredField::HasWifi(true),
            ]
        );
        assert!(classified.rejected.is_empty());
    }

    #[test]
    fn test_uncoercible_values_are_rejected_not_fatal() {
        let mapping = AttributeMapping::new()
            .with("rooms", "two")
            .with("floor", 2.5)
            .with("has_parking", 1)
            .with("location", "   ")
            .with("beds", 1);

        let classified = classify(&mapping);

        assert_eq!(classified.structured, vec![StructuredField::Beds(1)]);
        assert_eq!(
            classified.rejected,
            vec!["floor", "has_parking", "location", "rooms"]
        );
        assert!(classified.extras.is_empty());
    }

    #[test]
    fn test_mapping_from_json_drops_non_scalars() {
        let json = serde_json::json!({
            "location": "Lviv",
            "rooms": 2,
            "price": 99.9,
            "has_wifi": true,
            "tags": ["a", "b"],
            "meta": {"x": 1},
            "nothing": null
        });

        let mapping = AttributeMapping::from_json(&json).unwrap();

        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.get("rooms"), Some(&AttributeValue::Integer(2)));
        assert_eq!(mapping.get("price"), Some(&AttributeValue::Number(99.9)));
        assert!(!mapping.contains_key("tags"));
        assert!(!mapping.contains_key("nothing"));
    }

    #[test]
    fn test_mapping_deserialize_uses_same_rules() {
        let mapping: AttributeMapping =
            serde_json::from_str(r#"{"allows_pets": true, "junk": [1]}"#).unwrap();
        assert!(mapping.is_required("allows_pets"));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_mapping_from_json_str_rejects_non_object() {
        let err = AttributeMapping::from_json_str("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("JSON object"));
        assert!(AttributeMapping::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_is_required_is_strict_boolean() {
        let mapping = AttributeMapping::new()
            .with("allows_pets", "true")
            .with("has_pool", true)
            .with("allows_smoking", false);

        assert!(!mapping.is_required("allows_pets"));
        assert!(mapping.is_required("has_pool"));
        assert!(!mapping.is_required("allows_smoking"));
        assert!(!mapping.is_required("missing"));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(AttributeValue::Integer(2).to_string(), "2");
        assert_eq!(AttributeValue::Number(2.5).to_string(), "2.5");
        assert_eq!(AttributeValue::Bool(true).to_string(), "true");
        assert_eq!(AttributeValue::Text("x".into()).to_string(), "x");
    }

    #[test]
    fn test_integer_coercion_bounds() {
        assert_eq!(AttributeValue::Integer(i64::MAX).to_i32(), None);
        assert_eq!(AttributeValue::Number(f64::NAN).to_i32(), None);
        assert_eq!(AttributeValue::Text(" 3 ".into()).to_i32(), Some(3));
        assert_eq!(AttributeValue::Text("3.0".into()).to_i32(), Some(3));
        assert_eq!(AttributeValue::Number(f64::INFINITY).to_f64(), None);
    }
}
