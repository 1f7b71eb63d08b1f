mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    cmd_log_checkin, cmd_log_food, cmd_log_injury, cmd_log_workout, cmd_report_checkins,
    cmd_report_day, cmd_report_injuries, cmd_set_targets, parse_confidence, parse_injury_status,
    today,
};
use crate::config::{Config, DATA_DIR_ENV};
use fitlog_core::db::Database;
use fitlog_core::models::{Confidence, InjuryStatus};
use fitlog_core::record::{CheckinLog, FoodLog, InjuryLog, WorkoutLog, resolve_day};
use fitlog_core::report::DEFAULT_WINDOW_DAYS;

#[derive(Parser)]
#[command(
    name = "fitlog",
    version,
    about = "Log food, workouts, check-ins and injuries to a local database"
)]
struct Cli {
    /// Data directory holding db.sqlite (overrides FITLOG_DIR)
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a weigh-in / daily check-in
    LogCheckin {
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        day: Option<String>,
        /// Morning weight in lb
        #[arg(long)]
        weight: Option<f64>,
        /// Waist at navel in inches
        #[arg(long)]
        waist: Option<f64>,
        /// Steps for the day
        #[arg(long)]
        steps: Option<i64>,
        /// Sleep hours
        #[arg(long)]
        sleep: Option<f64>,
        /// Freeform notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Log a food entry, optionally with macros
    LogFood {
        /// Raw text as typed (e.g. "250 g chicken breast")
        #[arg(long)]
        text: String,
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        day: Option<String>,
        /// Normalized item name
        #[arg(long)]
        item: Option<String>,
        #[arg(long)]
        kcal: Option<f64>,
        /// Protein in grams
        #[arg(long)]
        protein: Option<f64>,
        /// Carbs in grams
        #[arg(long)]
        carbs: Option<f64>,
        /// Fat in grams
        #[arg(long)]
        fat: Option<f64>,
        /// How trustworthy the macros are: exact, estimate, unknown
        #[arg(long, default_value = "unknown", value_parser = parse_confidence)]
        confidence: Confidence,
        /// Where the macros came from: label, restaurant, off, usda, manual, other
        #[arg(long, default_value = "manual")]
        source: String,
        /// Save this entry as a reusable preset under KEY
        #[arg(long, value_name = "KEY")]
        preset: Option<String>,
        /// Take item and macros from the preset KEY
        #[arg(long, value_name = "KEY")]
        use_preset: Option<String>,
    },
    /// Log an injury or pain note
    LogInjury {
        /// Raw text as typed
        #[arg(long)]
        text: String,
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        day: Option<String>,
        /// Body area, e.g. "left scapula"
        #[arg(long)]
        area: Option<String>,
        /// Pain on a 0-10 scale
        #[arg(long)]
        severity: Option<f64>,
        /// Status: active, improving, resolved, flare
        #[arg(long, default_value = "active", value_parser = parse_injury_status)]
        status: InjuryStatus,
    },
    /// Log a workout (sets like "135x8" are parsed from the text)
    LogWorkout {
        /// Raw text as typed (e.g. "Bench: 135x8, 140x8")
        #[arg(long)]
        text: String,
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        day: Option<String>,
        /// Exercise name (default: text before the first colon)
        #[arg(long)]
        exercise: Option<String>,
    },
    /// Report recent check-ins, latest per day
    ReportCheckins {
        /// Lookback window in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,
        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Report food totals and entries for a day
    ReportDay {
        /// Day (YYYY-MM-DD, default: today)
        #[arg(long)]
        day: Option<String>,
        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Report recent injury notes
    ReportInjuries {
        /// Lookback window in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,
        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Set daily macro targets
    SetTargets {
        #[arg(long)]
        kcal: f64,
        /// Protein in grams
        #[arg(long)]
        protein: f64,
        /// Fat in grams
        #[arg(long)]
        fat: f64,
        /// Carbs in grams
        #[arg(long)]
        carbs: Option<f64>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_with_level(if cli.verbose { "debug" } else { "warn" });

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data_dir, std::env::var_os(DATA_DIR_ENV))?;
    tracing::debug!(data_dir = %config.data_dir.display(), "resolved data directory");
    let db = Database::open(&config.db_path)?;

    match cli.command {
        Commands::LogCheckin {
            day,
            weight,
            waist,
            steps,
            sleep,
            notes,
        } => cmd_log_checkin(
            &db,
            &CheckinLog {
                day,
                weight_lb: weight,
                waist_in: waist,
                steps,
                sleep_h: sleep,
                notes,
            },
        ),
        Commands::LogFood {
            text,
            day,
            item,
            kcal,
            protein,
            carbs,
            fat,
            confidence,
            source,
            preset,
            use_preset,
        } => cmd_log_food(
            &db,
            &FoodLog {
                text,
                day,
                item,
                kcal,
                protein_g: protein,
                carbs_g: carbs,
                fat_g: fat,
                confidence,
                source: Some(source),
                save_preset: preset,
                use_preset,
            },
        ),
        Commands::LogInjury {
            text,
            day,
            area,
            severity,
            status,
        } => cmd_log_injury(
            &db,
            &InjuryLog {
                text,
                day,
                area,
                severity,
                status,
            },
        ),
        Commands::LogWorkout {
            text,
            day,
            exercise,
        } => cmd_log_workout(&db, &WorkoutLog { text, day, exercise }),
        Commands::ReportCheckins { days, table } => cmd_report_checkins(&db, days, table),
        Commands::ReportDay { day, table } => {
            let day = resolve_day(day.as_deref(), today());
            cmd_report_day(&db, &day, table)
        }
        Commands::ReportInjuries { days, table } => cmd_report_injuries(&db, days, table),
        Commands::SetTargets {
            kcal,
            protein,
            fat,
            carbs,
        } => cmd_set_targets(&db, kcal, protein, fat, carbs),
    }
}
