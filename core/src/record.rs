//! One recorder per entry kind: resolve the day, harvest parser output,
//! write a single row.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::db::Database;
use crate::models::{
    Confidence, DailyTargets, FoodPreset, InjuryStatus, LogReceipt, NewCheckin, NewFoodEntry,
    NewInjuryEntry, NewWorkoutEntry, PresetKind, WorkoutSummary, validate_targets,
};
use crate::parse::{guess_exercise, parse_quantity, parse_sets};

/// Source recorded for preset-based entries whose payload names none.
pub const PRESET_SOURCE: &str = "preset";

/// An explicit day is trusted verbatim; otherwise `today` as `YYYY-MM-DD`.
#[must_use]
pub fn resolve_day(day: Option<&str>, today: NaiveDate) -> String {
    day.map_or_else(|| today.format("%Y-%m-%d").to_string(), str::to_string)
}

#[derive(Debug, Clone)]
pub struct FoodLog {
    pub text: String,
    pub day: Option<String>,
    pub item: Option<String>,
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub confidence: Confidence,
    pub source: Option<String>,
    /// Save the resolved entry under this preset key.
    pub save_preset: Option<String>,
    /// Fill item and macros from this preset key.
    pub use_preset: Option<String>,
}

impl FoodLog {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            day: None,
            item: None,
            kcal: None,
            protein_g: None,
            carbs_g: None,
            fat_g: None,
            confidence: Confidence::Unknown,
            source: Some("manual".to_string()),
            save_preset: None,
            use_preset: None,
        }
    }
}

pub fn log_food(db: &Database, log: &FoodLog, today: NaiveDate) -> Result<LogReceipt> {
    let day = resolve_day(log.day.as_deref(), today);

    let mut item = log.item.clone();
    let mut kcal = log.kcal;
    let mut protein_g = log.protein_g;
    let mut carbs_g = log.carbs_g;
    let mut fat_g = log.fat_g;
    let mut confidence = log.confidence;
    let mut source = log.source.clone();

    if let Some(key) = &log.use_preset {
        let preset = db
            .get_preset(key)?
            .with_context(|| format!("Preset not found: {key}"))?;
        if preset.kind != PresetKind::Food {
            bail!("Preset '{key}' is a {} preset, not a food preset", preset.kind.as_str());
        }
        let payload: FoodPreset = serde_json::from_value(preset.payload)
            .with_context(|| format!("Preset '{key}' is not a valid food preset"))?;
        debug!(key, "using food preset");
        item = payload.item;
        kcal = payload.kcal;
        protein_g = payload.protein_g;
        carbs_g = payload.carbs_g;
        fat_g = payload.fat_g;
        confidence = payload.confidence.unwrap_or(Confidence::Estimate);
        source = Some(payload.source.unwrap_or_else(|| PRESET_SOURCE.to_string()));
    }

    let quantity = parse_quantity(&log.text);
    let meta = quantity.as_ref().map(|q| {
        serde_json::json!({
            "parsed_qty": q.value,
            "parsed_unit": q.unit,
        })
    });

    let id = db.insert_food_entry(&NewFoodEntry {
        day: day.clone(),
        raw_text: log.text.clone(),
        item: item.clone(),
        qty: quantity.as_ref().map(|q| q.value),
        unit: quantity.map(|q| q.unit),
        kcal,
        protein_g,
        carbs_g,
        fat_g,
        confidence,
        source: source.clone(),
        meta,
    })?;

    if let Some(key) = &log.save_preset {
        let payload = FoodPreset {
            item: Some(item.unwrap_or_else(|| log.text.clone())),
            kcal,
            protein_g,
            carbs_g,
            fat_g,
            confidence: Some(confidence),
            source,
        };
        db.upsert_preset(key, PresetKind::Food, &serde_json::to_value(&payload)?)?;
    }

    info!(id, %day, "logged food");
    Ok(LogReceipt {
        ok: true,
        id,
        day,
        workout: None,
    })
}

#[derive(Debug, Clone)]
pub struct WorkoutLog {
    pub text: String,
    pub day: Option<String>,
    /// Overrides the name guessed from the text.
    pub exercise: Option<String>,
}

pub fn log_workout(db: &Database, log: &WorkoutLog, today: NaiveDate) -> Result<LogReceipt> {
    let day = resolve_day(log.day.as_deref(), today);
    let exercise = log.exercise.clone().or_else(|| guess_exercise(&log.text));
    let sets = parse_sets(&log.text);
    let set_count = sets.len();

    let (sets, meta) = if sets.is_empty() {
        (None, None)
    } else {
        (Some(sets), Some(serde_json::json!({ "parsed": true })))
    };

    let id = db.insert_workout_entry(&NewWorkoutEntry {
        day: day.clone(),
        raw_text: log.text.clone(),
        exercise: exercise.clone(),
        sets,
        meta,
    })?;

    info!(id, %day, set_count, "logged workout");
    Ok(LogReceipt {
        ok: true,
        id,
        day,
        workout: Some(WorkoutSummary {
            exercise,
            set_count,
        }),
    })
}

#[derive(Debug, Clone, Default)]
pub struct CheckinLog {
    pub day: Option<String>,
    pub weight_lb: Option<f64>,
    pub waist_in: Option<f64>,
    pub steps: Option<i64>,
    pub sleep_h: Option<f64>,
    pub notes: Option<String>,
}

pub fn log_checkin(db: &Database, log: &CheckinLog, today: NaiveDate) -> Result<LogReceipt> {
    let day = resolve_day(log.day.as_deref(), today);
    let id = db.insert_checkin(&NewCheckin {
        day: day.clone(),
        weight_lb: log.weight_lb,
        waist_in: log.waist_in,
        steps: log.steps,
        sleep_h: log.sleep_h,
        notes: log.notes.clone(),
    })?;

    info!(id, %day, "logged checkin");
    Ok(LogReceipt {
        ok: true,
        id,
        day,
        workout: None,
    })
}

#[derive(Debug, Clone)]
pub struct InjuryLog {
    pub text: String,
    pub day: Option<String>,
    pub area: Option<String>,
    pub severity: Option<f64>,
    pub status: InjuryStatus,
}

pub fn log_injury(db: &Database, log: &InjuryLog, today: NaiveDate) -> Result<LogReceipt> {
    let day = resolve_day(log.day.as_deref(), today);
    let id = db.insert_injury_entry(&NewInjuryEntry {
        day: day.clone(),
        raw_text: log.text.clone(),
        area: log.area.clone(),
        severity: log.severity,
        status: log.status,
    })?;

    info!(id, %day, status = %log.status, "logged injury");
    Ok(LogReceipt {
        ok: true,
        id,
        day,
        workout: None,
    })
}

pub fn set_targets(
    db: &Database,
    kcal: f64,
    protein_g: f64,
    fat_g: f64,
    carbs_g: Option<f64>,
) -> Result<DailyTargets> {
    validate_targets(kcal, protein_g, fat_g, carbs_g)?;
    let targets = db.set_targets(kcal, protein_g, fat_g, carbs_g)?;
    info!(kcal, protein_g, fat_g, "updated daily targets");
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_resolve_day() {
        assert_eq!(resolve_day(None, today()), "2024-06-15");
        assert_eq!(resolve_day(Some("2024-01-02"), today()), "2024-01-02");
        // not validated
        assert_eq!(resolve_day(Some("someday"), today()), "someday");
    }

    #[test]
    fn test_log_food_parses_quantity_into_meta() {
        let db = Database::open_in_memory().unwrap();
        let mut log = FoodLog::new("250 g chicken breast");
        log.kcal = Some(410.0);
        log.confidence = Confidence::Estimate;
        let receipt = log_food(&db, &log, today()).unwrap();
        assert!(receipt.ok);
        assert_eq!(receipt.day, "2024-06-15");

        let entry = db.get_food_entry(receipt.id).unwrap();
        assert_eq!(entry.qty, Some(250.0));
        assert_eq!(entry.unit.as_deref(), Some("g"));
        let meta = entry.meta.unwrap();
        assert_eq!(meta["parsed_qty"], 250.0);
        assert_eq!(meta["parsed_unit"], "g");
        assert_eq!(entry.source.as_deref(), Some("manual"));
    }

    #[test]
    fn test_log_food_without_quantity_has_no_meta() {
        let db = Database::open_in_memory().unwrap();
        let receipt = log_food(&db, &FoodLog::new("had a snack"), today()).unwrap();
        let entry = db.get_food_entry(receipt.id).unwrap();
        assert!(entry.meta.is_none());
        assert!(entry.qty.is_none());
        assert!(entry.unit.is_none());
        assert_eq!(entry.confidence, Confidence::Unknown);
    }

    #[test]
    fn test_log_food_preset_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let mut first = FoodLog::new("usual breakfast: oats and whey");
        first.item = Some("oats + whey".to_string());
        first.kcal = Some(520.0);
        first.protein_g = Some(42.0);
        first.carbs_g = Some(60.0);
        first.fat_g = Some(11.0);
        first.confidence = Confidence::Exact;
        first.source = Some("label".to_string());
        first.save_preset = Some("abc".to_string());
        let original = db
            .get_food_entry(log_food(&db, &first, today()).unwrap().id)
            .unwrap();

        let mut second = FoodLog::new("breakfast again");
        second.day = Some("2024-06-16".to_string());
        second.kcal = Some(1.0);
        second.use_preset = Some("abc".to_string());
        let repeat = db
            .get_food_entry(log_food(&db, &second, today()).unwrap().id)
            .unwrap();

        assert_eq!(repeat.day, "2024-06-16");
        assert_eq!(repeat.item, original.item);
        assert_eq!(repeat.kcal, original.kcal);
        assert_eq!(repeat.protein_g, original.protein_g);
        assert_eq!(repeat.carbs_g, original.carbs_g);
        assert_eq!(repeat.fat_g, original.fat_g);
        assert_eq!(repeat.confidence, original.confidence);
        assert_eq!(repeat.source, original.source);
    }

    #[test]
    fn test_saved_preset_falls_back_to_text_for_item() {
        let db = Database::open_in_memory().unwrap();
        let mut log = FoodLog::new("protein bar");
        log.save_preset = Some("bar".to_string());
        log_food(&db, &log, today()).unwrap();

        let preset = db.get_preset("bar").unwrap().unwrap();
        assert_eq!(preset.kind, PresetKind::Food);
        assert_eq!(preset.payload["item"], "protein bar");
        assert_eq!(preset.payload["confidence"], "unknown");
    }

    #[test]
    fn test_preset_defaults_when_payload_is_sparse() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_preset("shake", PresetKind::Food, &serde_json::json!({"kcal": 300.0}))
            .unwrap();
        let mut log = FoodLog::new("shake");
        log.use_preset = Some("shake".to_string());
        let entry = db
            .get_food_entry(log_food(&db, &log, today()).unwrap().id)
            .unwrap();
        assert_eq!(entry.kcal, Some(300.0));
        assert_eq!(entry.confidence, Confidence::Estimate);
        assert_eq!(entry.source.as_deref(), Some(PRESET_SOURCE));
    }

    #[test]
    fn test_unknown_preset_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let mut log = FoodLog::new("mystery");
        log.use_preset = Some("nope".to_string());
        let err = log_food(&db, &log, today()).unwrap_err();
        assert!(err.to_string().contains("Preset not found: nope"));
        assert_eq!(db.food_totals_for_day("2024-06-15").unwrap().entry_count, 0);
    }

    #[test]
    fn test_workout_preset_rejected_for_food() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_preset("push", PresetKind::Workout, &serde_json::json!({}))
            .unwrap();
        let mut log = FoodLog::new("oops");
        log.use_preset = Some("push".to_string());
        assert!(log_food(&db, &log, today()).is_err());
    }

    #[test]
    fn test_log_workout_parses_sets() {
        let db = Database::open_in_memory().unwrap();
        let log = WorkoutLog {
            text: "Bench: 135x8, 140x8, 140x7".to_string(),
            day: None,
            exercise: None,
        };
        let receipt = log_workout(&db, &log, today()).unwrap();
        let summary = receipt.workout.clone().unwrap();
        assert_eq!(summary.exercise.as_deref(), Some("Bench"));
        assert_eq!(summary.set_count, 3);

        let entry = db.get_workout_entry(receipt.id).unwrap();
        let sets = entry.sets.unwrap();
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[2].reps, 7);
        assert_eq!(sets[2].unit, "lb");
        assert_eq!(entry.meta.unwrap()["parsed"], true);
    }

    #[test]
    fn test_log_workout_without_sets() {
        let db = Database::open_in_memory().unwrap();
        let log = WorkoutLog {
            text: "DB incline 55s 10,10,8".to_string(),
            day: Some("2024-06-14".to_string()),
            exercise: Some("DB incline".to_string()),
        };
        let receipt = log_workout(&db, &log, today()).unwrap();
        assert_eq!(receipt.day, "2024-06-14");
        assert_eq!(
            receipt.workout,
            Some(WorkoutSummary {
                exercise: Some("DB incline".to_string()),
                set_count: 0,
            })
        );

        let entry = db.get_workout_entry(receipt.id).unwrap();
        assert!(entry.sets.is_none());
        assert!(entry.meta.is_none());
    }

    #[test]
    fn test_log_checkin_and_injury() {
        let db = Database::open_in_memory().unwrap();
        let receipt = log_checkin(
            &db,
            &CheckinLog {
                weight_lb: Some(182.4),
                steps: Some(9000),
                ..CheckinLog::default()
            },
            today(),
        )
        .unwrap();
        assert_eq!(receipt.day, "2024-06-15");

        let receipt = log_injury(
            &db,
            &InjuryLog {
                text: "left scapula twinge on rows".to_string(),
                day: None,
                area: Some("left scapula".to_string()),
                severity: Some(3.0),
                status: InjuryStatus::default(),
            },
            today(),
        )
        .unwrap();
        let injuries = db.injuries_since("2024-06-15").unwrap();
        assert_eq!(injuries.len(), 1);
        assert_eq!(injuries[0].id, receipt.id);
        assert_eq!(injuries[0].status, InjuryStatus::Active);
    }

    #[test]
    fn test_set_targets_rejects_negative() {
        let db = Database::open_in_memory().unwrap();
        assert!(set_targets(&db, -100.0, 150.0, 70.0, None).is_err());
        assert!(db.get_targets().unwrap().is_none());
        set_targets(&db, 2000.0, 150.0, 70.0, None).unwrap();
        assert!(db.get_targets().unwrap().is_some());
    }

    #[test]
    fn test_set_targets_rejects_nan_and_keeps_reports_readable() {
        let db = Database::open_in_memory().unwrap();
        set_targets(&db, 2000.0, 150.0, 70.0, None).unwrap();
        assert!(set_targets(&db, f64::NAN, 150.0, 70.0, None).is_err());
        assert!(set_targets(&db, 2000.0, 150.0, 70.0, Some(f64::NAN)).is_err());

        let targets = db.get_targets().unwrap().unwrap();
        assert!((targets.kcal - 2000.0).abs() < f64::EPSILON);
        assert!(crate::report::day_report(&db, "2024-06-15").is_ok());
    }
}
