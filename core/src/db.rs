use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::models::{
    Checkin, DailyTargets, DayTotals, FoodEntry, InjuryEntry, NewCheckin, NewFoodEntry,
    NewInjuryEntry, NewWorkoutEntry, Preset, PresetKind, WorkoutEntry, WorkoutSet,
};

const FOOD_COLUMNS: &str = "id, day, created_at, raw_text, item, qty, unit, kcal, protein_g, carbs_g, fat_g, confidence, source, meta_json";
const WORKOUT_COLUMNS: &str = "id, day, created_at, raw_text, exercise, sets_json, meta_json";
const CHECKIN_COLUMNS: &str =
    "id, day, created_at, weight_lb, waist_in, steps, sleep_h, notes";
const INJURY_COLUMNS: &str = "id, day, created_at, raw_text, area, severity, status";

/// Creation timestamp for new rows: UTC, whole seconds.
#[must_use]
pub fn utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database file and its parent directory.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get(0)
        })?;
        debug!(path = %path.display(), journal_mode = %mode, "opened database");
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Create every table. Safe to run on each start: all statements are
    /// `IF NOT EXISTS` and the batch is skipped once `user_version` is set.
    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            debug!("creating schema");
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS food_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    day TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    raw_text TEXT NOT NULL,
                    item TEXT,
                    qty REAL,
                    unit TEXT,
                    kcal REAL,
                    protein_g REAL,
                    carbs_g REAL,
                    fat_g REAL,
                    confidence TEXT NOT NULL CHECK (confidence IN ('exact', 'estimate', 'unknown')),
                    source TEXT,
                    meta_json TEXT
                );

                CREATE TABLE IF NOT EXISTS workout_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    day TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    raw_text TEXT NOT NULL,
                    exercise TEXT,
                    sets_json TEXT,
                    meta_json TEXT
                );

                CREATE TABLE IF NOT EXISTS checkins (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    day TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    weight_lb REAL,
                    waist_in REAL,
                    steps INTEGER,
                    sleep_h REAL,
                    notes TEXT
                );

                CREATE TABLE IF NOT EXISTS injury_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    day TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    raw_text TEXT NOT NULL,
                    area TEXT,
                    severity REAL,
                    status TEXT NOT NULL DEFAULT 'active'
                );

                CREATE TABLE IF NOT EXISTS presets (
                    key TEXT PRIMARY KEY,
                    kind TEXT NOT NULL,
                    value_json TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS daily_targets (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    kcal REAL,
                    protein_g REAL,
                    fat_g REAL,
                    carbs_g REAL
                );

                CREATE INDEX IF NOT EXISTS idx_food_entries_day ON food_entries(day);
                CREATE INDEX IF NOT EXISTS idx_workout_entries_day ON workout_entries(day);
                CREATE INDEX IF NOT EXISTS idx_checkins_day ON checkins(day);
                CREATE INDEX IF NOT EXISTS idx_injury_entries_day ON injury_entries(day);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn parse_tag<T>(idx: usize, value: &str) -> rusqlite::Result<T>
    where
        T: std::str::FromStr<Err = anyhow::Error>,
    {
        value
            .parse()
            .map_err(|e: anyhow::Error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
    }

    fn parse_json<T: serde::de::DeserializeOwned>(
        idx: usize,
        value: Option<String>,
    ) -> rusqlite::Result<Option<T>> {
        value
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn food_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodEntry> {
        let confidence: String = row.get(11)?;
        Ok(FoodEntry {
            id: row.get(0)?,
            day: row.get(1)?,
            created_at: row.get(2)?,
            raw_text: row.get(3)?,
            item: row.get(4)?,
            qty: row.get(5)?,
            unit: row.get(6)?,
            kcal: row.get(7)?,
            protein_g: row.get(8)?,
            carbs_g: row.get(9)?,
            fat_g: row.get(10)?,
            confidence: Self::parse_tag(11, &confidence)?,
            source: row.get(12)?,
            meta: Self::parse_json(13, row.get(13)?)?,
        })
    }

    fn workout_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<WorkoutEntry> {
        Ok(WorkoutEntry {
            id: row.get(0)?,
            day: row.get(1)?,
            created_at: row.get(2)?,
            raw_text: row.get(3)?,
            exercise: row.get(4)?,
            sets: Self::parse_json::<Vec<WorkoutSet>>(5, row.get(5)?)?,
            meta: Self::parse_json(6, row.get(6)?)?,
        })
    }

    fn checkin_from_row(row: &rusqlite::Row) -> rusqlite::Result<Checkin> {
        Ok(Checkin {
            id: row.get(0)?,
            day: row.get(1)?,
            created_at: row.get(2)?,
            weight_lb: row.get(3)?,
            waist_in: row.get(4)?,
            steps: row.get(5)?,
            sleep_h: row.get(6)?,
            notes: row.get(7)?,
        })
    }

    fn injury_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<InjuryEntry> {
        let status: String = row.get(6)?;
        Ok(InjuryEntry {
            id: row.get(0)?,
            day: row.get(1)?,
            created_at: row.get(2)?,
            raw_text: row.get(3)?,
            area: row.get(4)?,
            severity: row.get(5)?,
            status: Self::parse_tag(6, &status)?,
        })
    }

    // --- Food entries ---

    pub fn insert_food_entry(&self, entry: &NewFoodEntry) -> Result<i64> {
        let meta_json = entry.meta.as_ref().map(serde_json::to_string).transpose()?;
        self.conn.execute(
            "INSERT INTO food_entries (day, created_at, raw_text, item, qty, unit, kcal, protein_g, carbs_g, fat_g, confidence, source, meta_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                entry.day,
                utc_now(),
                entry.raw_text,
                entry.item,
                entry.qty,
                entry.unit,
                entry.kcal,
                entry.protein_g,
                entry.carbs_g,
                entry.fat_g,
                entry.confidence.as_str(),
                entry.source,
                meta_json,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, day = %entry.day, "inserted food entry");
        Ok(id)
    }

    pub fn get_food_entry(&self, id: i64) -> Result<FoodEntry> {
        self.conn
            .query_row(
                &format!("SELECT {FOOD_COLUMNS} FROM food_entries WHERE id = ?1"),
                params![id],
                Self::food_entry_from_row,
            )
            .context("Food entry not found")
    }

    /// Entries for one day in the order they were logged.
    pub fn food_entries_for_day(&self, day: &str) -> Result<Vec<FoodEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FOOD_COLUMNS} FROM food_entries WHERE day = ?1 ORDER BY created_at ASC, id ASC"
        ))?;
        let entries = stmt
            .query_map(params![day], Self::food_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn food_totals_for_day(&self, day: &str) -> Result<DayTotals> {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(kcal), 0),
                        COALESCE(SUM(protein_g), 0),
                        COALESCE(SUM(carbs_g), 0),
                        COALESCE(SUM(fat_g), 0),
                        COUNT(*)
                 FROM food_entries
                 WHERE day = ?1",
                params![day],
                |row| {
                    Ok(DayTotals {
                        kcal: row.get(0)?,
                        protein_g: row.get(1)?,
                        carbs_g: row.get(2)?,
                        fat_g: row.get(3)?,
                        entry_count: row.get(4)?,
                    })
                },
            )
            .context("Failed to total food entries")
    }

    // --- Workout entries ---

    pub fn insert_workout_entry(&self, entry: &NewWorkoutEntry) -> Result<i64> {
        let sets_json = entry.sets.as_ref().map(serde_json::to_string).transpose()?;
        let meta_json = entry.meta.as_ref().map(serde_json::to_string).transpose()?;
        self.conn.execute(
            "INSERT INTO workout_entries (day, created_at, raw_text, exercise, sets_json, meta_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.day,
                utc_now(),
                entry.raw_text,
                entry.exercise,
                sets_json,
                meta_json,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, day = %entry.day, "inserted workout entry");
        Ok(id)
    }

    pub fn get_workout_entry(&self, id: i64) -> Result<WorkoutEntry> {
        self.conn
            .query_row(
                &format!("SELECT {WORKOUT_COLUMNS} FROM workout_entries WHERE id = ?1"),
                params![id],
                Self::workout_entry_from_row,
            )
            .context("Workout entry not found")
    }

    // --- Check-ins ---

    pub fn insert_checkin(&self, checkin: &NewCheckin) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO checkins (day, created_at, weight_lb, waist_in, steps, sleep_h, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                checkin.day,
                utc_now(),
                checkin.weight_lb,
                checkin.waist_in,
                checkin.steps,
                checkin.sleep_h,
                checkin.notes,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, day = %checkin.day, "inserted checkin");
        Ok(id)
    }

    /// Check-ins on or after `since_day`, newest day first and, within a day,
    /// newest entry first.
    pub fn checkins_since(&self, since_day: &str) -> Result<Vec<Checkin>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CHECKIN_COLUMNS} FROM checkins
             WHERE day >= ?1
             ORDER BY day DESC, created_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map(params![since_day], Self::checkin_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // --- Injuries ---

    pub fn insert_injury_entry(&self, entry: &NewInjuryEntry) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO injury_entries (day, created_at, raw_text, area, severity, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.day,
                utc_now(),
                entry.raw_text,
                entry.area,
                entry.severity,
                entry.status.as_str(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, day = %entry.day, status = %entry.status, "inserted injury entry");
        Ok(id)
    }

    pub fn injuries_since(&self, since_day: &str) -> Result<Vec<InjuryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INJURY_COLUMNS} FROM injury_entries
             WHERE day >= ?1
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map(params![since_day], Self::injury_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // --- Presets ---

    pub fn upsert_preset(
        &self,
        key: &str,
        kind: PresetKind,
        payload: &serde_json::Value,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO presets (key, kind, value_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET kind = excluded.kind, value_json = excluded.value_json",
            params![key, kind.as_str(), serde_json::to_string(payload)?],
        )?;
        debug!(key, kind = kind.as_str(), "saved preset");
        Ok(())
    }

    pub fn get_preset(&self, key: &str) -> Result<Option<Preset>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT kind, value_json FROM presets WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((kind, value_json)) = row else {
            return Ok(None);
        };
        let payload = serde_json::from_str(&value_json)
            .with_context(|| format!("Preset '{key}' has a malformed payload"))?;
        Ok(Some(Preset {
            key: key.to_string(),
            kind: kind.parse()?,
            payload,
        }))
    }

    // --- Targets ---

    pub fn set_targets(
        &self,
        kcal: f64,
        protein_g: f64,
        fat_g: f64,
        carbs_g: Option<f64>,
    ) -> Result<DailyTargets> {
        self.conn.execute(
            "INSERT INTO daily_targets (id, kcal, protein_g, fat_g, carbs_g) VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                kcal = excluded.kcal,
                protein_g = excluded.protein_g,
                fat_g = excluded.fat_g,
                carbs_g = excluded.carbs_g",
            params![kcal, protein_g, fat_g, carbs_g],
        )?;
        Ok(DailyTargets {
            kcal,
            protein_g,
            fat_g,
            carbs_g,
        })
    }

    pub fn get_targets(&self) -> Result<Option<DailyTargets>> {
        let targets = self
            .conn
            .query_row(
                "SELECT kcal, protein_g, fat_g, carbs_g FROM daily_targets WHERE id = 1",
                [],
                |row| {
                    Ok(DailyTargets {
                        kcal: row.get(0)?,
                        protein_g: row.get(1)?,
                        fat_g: row.get(2)?,
                        carbs_g: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(targets)
    }
}
