use anyhow::Result;

use fitlog_core::db::Database;
use fitlog_core::record::{
    CheckinLog, FoodLog, InjuryLog, WorkoutLog, log_checkin, log_food, log_injury, log_workout,
};

use super::helpers::{print_json, today};

pub(crate) fn cmd_log_food(db: &Database, log: &FoodLog) -> Result<()> {
    let receipt = log_food(db, log, today())?;
    print_json(&receipt)
}

pub(crate) fn cmd_log_workout(db: &Database, log: &WorkoutLog) -> Result<()> {
    let receipt = log_workout(db, log, today())?;
    print_json(&receipt)
}

pub(crate) fn cmd_log_checkin(db: &Database, log: &CheckinLog) -> Result<()> {
    let receipt = log_checkin(db, log, today())?;
    print_json(&receipt)
}

pub(crate) fn cmd_log_injury(db: &Database, log: &InjuryLog) -> Result<()> {
    let receipt = log_injury(db, log, today())?;
    print_json(&receipt)
}
