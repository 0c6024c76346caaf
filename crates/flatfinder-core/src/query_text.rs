//! Render an attribute mapping as embedding input text.
//!
//! The phrase produced here is the only bridge between symbolic filters and
//! the embedding space, so it must be byte-identical for identical mappings.
//! [`AttributeMapping`] iterates in sorted key order, which makes the output
//! reproducible without any extra bookkeeping.

use crate::attributes::{AttributeMapping, AttributeValue};

/// Count-like fields rendered first as `"<value> <field>"`, in this order.
pub const COUNT_FIELDS: [&str; 3] = ["beds", "rooms", "floor"];

/// Readable forms that take the `-friendly` suffix when allowed.
const FRIENDLY_SUBJECTS: [&str; 3] = ["pets", "children", "kids"];

const HAS_PREFIX: &str = "has_";
const ALLOWS_PREFIX: &str = "allows_";

/// Synthesize a comma-joined phrase from the whole mapping.
///
/// Rules:
/// - `beds`, `rooms`, `floor` → `"2 rooms"`
/// - `has_<x>` → `"has <x>"` / `"no <x>"`
/// - `allows_<x>` → `"<x>-friendly"` (pets, children, kids), `"<x> allowed"`,
///   or `"<x> not allowed"`
/// - anything else is dropped
///
/// ```
/// use flatfinder_core::{synthesize_query_text, AttributeMapping};
///
/// let mapping = AttributeMapping::new()
///     .with("rooms", 2)
///     .with("has_wifi", true)
///     .with("allows_pets", true)
///     .with("location", "Lviv");
///
/// assert_eq!(synthesize_query_text(&mapping), "2 rooms, pets-friendly, has wifi");
/// ```
pub fn synthesize_query_text(mapping: &AttributeMapping) -> String {
    let mut parts: Vec<String> = Vec::new();

    for field in COUNT_FIELDS {
        if let Some(value) = mapping.get(field) {
            parts.push(format!("{} {}", value, field));
        }
    }

    for (key, value) in mapping.iter() {
        if COUNT_FIELDS.contains(&key) {
            continue;
        }
        if let Some(part) = render_flag(key, value) {
            parts.push(part);
        }
    }

    parts.join(", ")
}

fn render_flag(key: &str, value: &AttributeValue) -> Option<String> {
    if let Some(rest) = key.strip_prefix(HAS_PREFIX) {
        let readable = readable(rest);
        return Some(if value.is_truthy() {
            format!("has {}", readable)
        } else {
            format!("no {}", readable)
        });
    }

    if let Some(rest) = key.strip_prefix(ALLOWS_PREFIX) {
        let readable = readable(rest);
        return Some(if !value.is_truthy() {
            format!("{} not allowed", readable)
        } else if FRIENDLY_SUBJECTS.contains(&readable.as_str()) {
            format!("{}-friendly", readable)
        } else {
            format!("{} allowed", readable)
        });
    }

    None
}

fn readable(rest: &str) -> String {
    rest.replace('_', " ")
}
