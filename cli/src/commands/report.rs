use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::db::Database;
use fitlog_core::models::DayReport;
use fitlog_core::report::{checkin_report, day_report, injury_report};

use super::helpers::{fmt_opt, no_neg_zero, print_json, today, truncate};

pub(crate) fn cmd_report_day(db: &Database, day: &str, table: bool) -> Result<()> {
    let report = day_report(db, day)?;
    if table {
        print_day_table(&report);
        Ok(())
    } else {
        print_json(&report)
    }
}

fn print_day_table(report: &DayReport) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Item")]
        item: String,
        #[tabled(rename = "kcal")]
        kcal: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
        #[tabled(rename = "Conf")]
        confidence: String,
    }

    let day = &report.day;
    println!("=== {day} ===");

    if report.entries.is_empty() {
        println!("  No food entries");
    } else {
        let rows: Vec<FoodRow> = report
            .entries
            .iter()
            .map(|e| FoodRow {
                id: e.id,
                item: truncate(e.item.as_deref().unwrap_or(&e.raw_text), 35),
                kcal: fmt_opt(e.kcal, 0),
                protein: fmt_opt(e.protein_g, 0),
                carbs: fmt_opt(e.carbs_g, 0),
                fat: fmt_opt(e.fat_g, 0),
                confidence: e.confidence.to_string(),
            })
            .collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    let t = &report.totals;
    let (kcal, p, c, f) = (
        no_neg_zero(t.kcal),
        no_neg_zero(t.protein_g),
        no_neg_zero(t.carbs_g),
        no_neg_zero(t.fat_g),
    );
    let count = t.entry_count;
    println!("  TOTAL ({count} entries): {kcal:.0} kcal | P:{p:.0}g C:{c:.0}g F:{f:.0}g");

    if let Some(target) = &report.targets {
        let carbs = fmt_opt(target.carbs_g, 0);
        println!(
            "  TARGET: {:.0} kcal | P:{:.0}g C:{carbs}g F:{:.0}g",
            target.kcal, target.protein_g, target.fat_g
        );
        println!(
            "  REMAINING: {:.0} kcal | P:{:.0}g F:{:.0}g",
            target.kcal - kcal,
            target.protein_g - p,
            target.fat_g - f
        );
    }
}

pub(crate) fn cmd_report_checkins(db: &Database, days: u32, table: bool) -> Result<()> {
    let report = checkin_report(db, days, today())?;
    if !table {
        return print_json(&report);
    }

    if report.entries.is_empty() {
        eprintln!("No check-ins in the last {days} days");
        return Ok(());
    }

    #[derive(Tabled)]
    struct CheckinRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Weight (lb)")]
        weight: String,
        #[tabled(rename = "Waist (in)")]
        waist: String,
        #[tabled(rename = "Steps")]
        steps: String,
        #[tabled(rename = "Sleep (h)")]
        sleep: String,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let rows: Vec<CheckinRow> = report
        .entries
        .iter()
        .map(|c| CheckinRow {
            day: c.day.clone(),
            weight: fmt_opt(c.weight_lb, 1),
            waist: fmt_opt(c.waist_in, 1),
            steps: c.steps.map_or_else(|| "-".to_string(), |s| s.to_string()),
            sleep: fmt_opt(c.sleep_h, 1),
            notes: truncate(c.notes.as_deref().unwrap_or_default(), 40),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_report_injuries(db: &Database, days: u32, table: bool) -> Result<()> {
    let report = injury_report(db, days, today())?;
    if !table {
        return print_json(&report);
    }

    if report.entries.is_empty() {
        eprintln!("No injury notes in the last {days} days");
        return Ok(());
    }

    #[derive(Tabled)]
    struct InjuryRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Area")]
        area: String,
        #[tabled(rename = "Severity")]
        severity: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Note")]
        text: String,
    }

    let rows: Vec<InjuryRow> = report
        .entries
        .iter()
        .map(|i| InjuryRow {
            day: i.day.clone(),
            area: i.area.clone().unwrap_or_default(),
            severity: fmt_opt(i.severity, 0),
            status: i.status.to_string(),
            text: truncate(&i.raw_text, 40),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}
