use anyhow::Result;
use serde_json::json;

use fitlog_core::db::Database;
use fitlog_core::record::set_targets;

use super::helpers::print_json;

pub(crate) fn cmd_set_targets(
    db: &Database,
    kcal: f64,
    protein: f64,
    fat: f64,
    carbs: Option<f64>,
) -> Result<()> {
    let targets = set_targets(db, kcal, protein, fat, carbs)?;
    print_json(&json!({ "ok": true, "targets": targets }))
}
