use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use fitlog_core::models::{Confidence, InjuryStatus};

/// The current local calendar date.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn parse_confidence(s: &str) -> Result<Confidence, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

pub(crate) fn parse_injury_status(s: &str) -> Result<InjuryStatus, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

/// Render an optional number for a table cell, `-` when absent.
pub(crate) fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, no_neg_zero(v)))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Shorten `s` to at most `max` characters, ending in `...` when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max < 3 {
        return s.chars().take(max).collect();
    }
    let kept: String = s.chars().take(max - 3).collect();
    format!("{kept}...")
}
