//! Read-only aggregate views.

use anyhow::Result;
use chrono::{Duration, NaiveDate};

use crate::db::Database;
use crate::models::{Checkin, CheckinReport, DayReport, InjuryReport};

/// Lookback window used when the caller gives none.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// First day (inclusive) of a window reaching `days` back from `today`.
/// Windows reaching past the earliest representable date start there.
#[must_use]
pub fn window_start(today: NaiveDate, days: u32) -> String {
    today
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN)
        .format("%Y-%m-%d")
        .to_string()
}

pub fn day_report(db: &Database, day: &str) -> Result<DayReport> {
    Ok(DayReport {
        day: day.to_string(),
        targets: db.get_targets()?,
        totals: db.food_totals_for_day(day)?,
        entries: db.food_entries_for_day(day)?,
    })
}

pub fn checkin_report(db: &Database, days: u32, today: NaiveDate) -> Result<CheckinReport> {
    let rows = db.checkins_since(&window_start(today, days))?;
    Ok(CheckinReport {
        days,
        entries: latest_per_day(rows),
    })
}

pub fn injury_report(db: &Database, days: u32, today: NaiveDate) -> Result<InjuryReport> {
    Ok(InjuryReport {
        days,
        entries: db.injuries_since(&window_start(today, days))?,
    })
}

/// Keep the first row seen for each day. Input must already be ordered by
/// day descending, newest entry first within a day.
fn latest_per_day(rows: Vec<Checkin>) -> Vec<Checkin> {
    let mut out: Vec<Checkin> = Vec::with_capacity(rows.len());
    for row in rows {
        if out.last().is_some_and(|last| last.day == row.day) {
            continue;
        }
        out.push(row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, InjuryStatus, NewCheckin, NewFoodEntry, NewInjuryEntry};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn food(day: &str, kcal: Option<f64>, protein_g: Option<f64>) -> NewFoodEntry {
        NewFoodEntry {
            day: day.to_string(),
            raw_text: "food".to_string(),
            item: None,
            qty: None,
            unit: None,
            kcal,
            protein_g,
            carbs_g: None,
            fat_g: None,
            confidence: Confidence::Estimate,
            source: None,
            meta: None,
        }
    }

    fn checkin(day: &str, weight_lb: f64) -> NewCheckin {
        NewCheckin {
            day: day.to_string(),
            weight_lb: Some(weight_lb),
            ..NewCheckin::default()
        }
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(today(), 30), "2024-05-16");
        assert_eq!(window_start(today(), 0), "2024-06-15");
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let start = window_start(today(), u32::MAX);
        assert!(start.as_str() < "0001-01-01");

        let db = Database::open_in_memory().unwrap();
        db.insert_checkin(&checkin("1999-12-31", 190.0)).unwrap();
        db.insert_checkin(&checkin("2024-06-15", 180.0)).unwrap();
        let report = checkin_report(&db, 200_000_000, today()).unwrap();
        assert_eq!(report.entries.len(), 2);
        let injuries = injury_report(&db, u32::MAX, today()).unwrap();
        assert!(injuries.entries.is_empty());
    }

    #[test]
    fn test_day_report_totals() {
        let db = Database::open_in_memory().unwrap();
        db.insert_food_entry(&food("2024-06-15", Some(100.0), Some(10.0)))
            .unwrap();
        db.insert_food_entry(&food("2024-06-15", None, None)).unwrap();
        db.insert_food_entry(&food("2024-06-15", Some(50.0), Some(5.5)))
            .unwrap();
        db.insert_food_entry(&food("2024-06-14", Some(700.0), None))
            .unwrap();

        let report = day_report(&db, "2024-06-15").unwrap();
        assert_eq!(report.day, "2024-06-15");
        assert!((report.totals.kcal - 150.0).abs() < f64::EPSILON);
        assert!((report.totals.protein_g - 15.5).abs() < f64::EPSILON);
        assert_eq!(report.totals.entry_count, 3);
        assert_eq!(report.entries.len(), 3);
        assert!(report.entries[0].id < report.entries[2].id);
    }

    #[test]
    fn test_day_report_empty_without_targets() {
        let db = Database::open_in_memory().unwrap();
        let report = day_report(&db, "2024-06-15").unwrap();
        assert!(report.targets.is_none());
        assert!(report.entries.is_empty());
        assert_eq!(report.totals.entry_count, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["targets"], serde_json::json!({}));
    }

    #[test]
    fn test_day_report_includes_targets() {
        let db = Database::open_in_memory().unwrap();
        db.set_targets(2100.0, 170.0, 70.0, Some(210.0)).unwrap();
        let report = day_report(&db, "2024-06-15").unwrap();
        let targets = report.targets.unwrap();
        assert!((targets.kcal - 2100.0).abs() < f64::EPSILON);
        assert_eq!(targets.carbs_g, Some(210.0));
    }

    #[test]
    fn test_checkin_report_collapses_to_latest_per_day() {
        let db = Database::open_in_memory().unwrap();
        db.insert_checkin(&checkin("2024-06-14", 181.0)).unwrap();
        db.insert_checkin(&checkin("2024-06-15", 180.0)).unwrap();
        let later = db.insert_checkin(&checkin("2024-06-15", 179.5)).unwrap();

        let report = checkin_report(&db, 30, today()).unwrap();
        assert_eq!(report.days, 30);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].day, "2024-06-15");
        assert_eq!(report.entries[0].id, later);
        assert_eq!(report.entries[0].weight_lb, Some(179.5));
        assert_eq!(report.entries[1].day, "2024-06-14");
    }

    #[test]
    fn test_checkin_collapse_follows_created_at_not_insert_order() {
        let rows = vec![
            Checkin {
                id: 1,
                day: "2024-06-15".to_string(),
                created_at: "2024-06-15T20:00:00+00:00".to_string(),
                weight_lb: Some(178.0),
                waist_in: None,
                steps: None,
                sleep_h: None,
                notes: None,
            },
            Checkin {
                id: 2,
                day: "2024-06-15".to_string(),
                created_at: "2024-06-15T08:00:00+00:00".to_string(),
                weight_lb: Some(181.0),
                waist_in: None,
                steps: None,
                sleep_h: None,
                notes: None,
            },
        ];
        let collapsed = latest_per_day(rows);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].id, 1);
    }

    #[test]
    fn test_checkin_report_respects_window() {
        let db = Database::open_in_memory().unwrap();
        db.insert_checkin(&checkin("2024-05-01", 185.0)).unwrap();
        db.insert_checkin(&checkin("2024-06-10", 182.0)).unwrap();

        let report = checkin_report(&db, 7, today()).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].day, "2024-06-10");

        let empty = checkin_report(&db, 1, today()).unwrap();
        assert!(empty.entries.is_empty());
    }

    #[test]
    fn test_injury_report_lists_everything_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let mut ids = Vec::new();
        for (day, status) in [
            ("2024-04-01", InjuryStatus::Resolved),
            ("2024-06-12", InjuryStatus::Active),
            ("2024-06-12", InjuryStatus::Flare),
        ] {
            ids.push(
                db.insert_injury_entry(&NewInjuryEntry {
                    day: day.to_string(),
                    raw_text: "ankle".to_string(),
                    area: Some("right ankle".to_string()),
                    severity: Some(5.0),
                    status,
                })
                .unwrap(),
            );
        }

        let report = injury_report(&db, 30, today()).unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].id, ids[2]);
        assert_eq!(report.entries[0].status, InjuryStatus::Flare);
        assert_eq!(report.entries[1].id, ids[1]);
    }

    #[test]
    fn test_injury_report_empty() {
        let db = Database::open_in_memory().unwrap();
        let report = injury_report(&db, 30, today()).unwrap();
        assert!(report.entries.is_empty());
    }
}
