//! Text heuristics for pulling structured fields out of free-text entries.
//!
//! These are deliberately narrow: a quantity is `<number><unit>` from a fixed
//! vocabulary, and a set is `<weight>[unit] x <reps>`. Anything else is left
//! in the raw text untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::WorkoutSet;

/// Unit used for a set when the text names none.
pub const DEFAULT_SET_UNIT: &str = "lb";

static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<qty>[0-9]+(?:\.[0-9]+)?)\s*(?P<unit>g|gram|grams|oz|lb|ml|cup|cups|tbsp|tsp|serving|servings)\b",
    )
    .expect("quantity pattern is valid")
});

static SET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<w>[0-9]+(?:\.[0-9]+)?)\s*(?P<unit>lbs|lb|kg)?\s*[x×]\s*(?P<reps>[0-9]+)")
        .expect("set pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

/// First `<number><unit>` in the text, unit lower-cased.
///
/// `"250 g chicken"` gives `250.0 g`; `"2 Cups rice"` gives `2.0 cups`.
#[must_use]
pub fn parse_quantity(text: &str) -> Option<Quantity> {
    let caps = QUANTITY_RE.captures(text)?;
    let value = caps["qty"].parse().ok()?;
    Some(Quantity {
        value,
        unit: caps["unit"].to_lowercase(),
    })
}

/// Every `weight x reps` token, left to right.
///
/// `"Bench: 135x8, 140x8"` gives two sets in pounds. A bare rep list such as
/// `"55s 10,10,8"` has no separator and yields nothing.
#[must_use]
pub fn parse_sets(text: &str) -> Vec<WorkoutSet> {
    SET_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let weight: f64 = caps["w"].parse().ok()?;
            let reps: u32 = caps["reps"].parse().ok()?;
            let unit = caps
                .name("unit")
                .map_or_else(|| DEFAULT_SET_UNIT.to_string(), |m| m.as_str().to_lowercase());
            Some(WorkoutSet { weight, reps, unit })
        })
        .collect()
}

/// Text before the first colon, trimmed. `None` without a colon or when the
/// prefix is blank.
#[must_use]
pub fn guess_exercise(text: &str) -> Option<String> {
    let (head, _) = text.split_once(':')?;
    let head = head.trim();
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}
