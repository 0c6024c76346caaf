//! Negation pattern table for extra attributes.
//!
//! Maps an extra-attribute key to phrases whose presence in a listing
//! description contradicts that attribute being required. The table is
//! read-only once built; [`NegationPatternTable::shared`] is the process-wide
//! default.

use once_cell::sync::Lazy;

use crate::attributes::AttributeMapping;

/// Built-in patterns, keyed by extra attribute.
pub const DEFAULT_NEGATION_PATTERNS: &[(&str, &[&str])] = &[
    (
        "allows_pets",
        &[
            "no pets",
            "pets are not allowed",
            "not pet-friendly",
            "pets prohibited",
        ],
    ),
    ("has_pool", &["no pool", "pool not available"]),
    (
        "allows_smoking",
        &[
            "no smoking",
            "smoking not allowed",
            "non-smoking",
            "smoke-free",
        ],
    ),
    (
        "allows_parties",
        &["no parties", "parties not allowed", "no alcohol"],
    ),
    (
        "allows_children",
        &[
            "no children",
            "children not allowed",
            "not suitable for children",
            "no kids",
        ],
    ),
];

static SHARED: Lazy<NegationPatternTable> = Lazy::new(NegationPatternTable::builtin);

/// A description phrase that contradicts a required attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contradiction<'a> {
    pub attribute: &'a str,
    pub pattern: &'a str,
}

/// Ordered attribute → lowercase phrase list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegationPatternTable {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for NegationPatternTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NegationPatternTable {
    /// An empty table (never vetoes anything).
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Table populated from [`DEFAULT_NEGATION_PATTERNS`].
    pub fn builtin() -> Self {
        DEFAULT_NEGATION_PATTERNS
            .iter()
            .fold(Self::empty(), |table, (key, patterns)| {
                table.with_patterns(*key, patterns.iter().copied())
            })
    }

    /// Process-wide built-in table.
    pub fn shared() -> &'static NegationPatternTable {
        &SHARED
    }

    /// Add patterns for `attribute`, appending to any existing entry.
    ///
    /// Patterns are stored lowercased; empty patterns are ignored.
    pub fn with_patterns<I, S>(mut self, attribute: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let attribute = attribute.into();
        let lowered = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty());

        match self.entries.iter_mut().find(|(key, _)| *key == attribute) {
            Some((_, existing)) => existing.extend(lowered),
            None => self.entries.push((attribute, lowered.collect())),
        }
        self
    }

    pub fn patterns_for(&self, attribute: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == attribute)
            .map(|(_, patterns)| patterns.as_slice())
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First phrase in `description` that negates an attribute the mapping
    /// requires (set to boolean `true`).
    ///
    /// Matching is case-insensitive substring search. Attributes that are
    /// false, absent, or not booleans never produce a contradiction.
    pub fn find_contradiction(
        &self,
        description: &str,
        mapping: &AttributeMapping,
    ) -> Option<Contradiction<'_>> {
        let mut lowered: Option<String> = None;

        for (attribute, patterns) in &self.entries {
            if !mapping.is_required(attribute) {
                continue;
            }
            let text = lowered.get_or_insert_with(|| description.to_lowercase());
            if let Some(pattern) = patterns.iter().find(|p| text.contains(p.as_str())) {
                return Some(Contradiction {
                    attribute,
                    pattern,
                });
            }
        }

        None
    }
}
