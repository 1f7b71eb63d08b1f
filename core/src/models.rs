use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize, Serializer};

// --- Tags ---

/// How trustworthy the macro values on a food entry are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Estimate,
    Unknown,
}

impl Confidence {
    pub const ALL: &'static [&'static str] = &["exact", "estimate", "unknown"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Estimate => "estimate",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for Confidence {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "estimate" => Ok(Self::Estimate),
            "unknown" => Ok(Self::Unknown),
            _ => bail!(
                "Invalid confidence '{s}'. Must be one of: {}",
                Self::ALL.join(", ")
            ),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjuryStatus {
    #[default]
    Active,
    Improving,
    Resolved,
    Flare,
}

impl InjuryStatus {
    pub const ALL: &'static [&'static str] = &["active", "improving", "resolved", "flare"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Improving => "improving",
            Self::Resolved => "resolved",
            Self::Flare => "flare",
        }
    }
}

impl FromStr for InjuryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "improving" => Ok(Self::Improving),
            "resolved" => Ok(Self::Resolved),
            "flare" => Ok(Self::Flare),
            _ => bail!(
                "Invalid injury status '{s}'. Must be one of: {}",
                Self::ALL.join(", ")
            ),
        }
    }
}

impl fmt::Display for InjuryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    Food,
    Workout,
}

impl PresetKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Workout => "workout",
        }
    }
}

impl FromStr for PresetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "food" => Ok(Self::Food),
            "workout" => Ok(Self::Workout),
            _ => bail!("Invalid preset kind '{s}'. Must be one of: food, workout"),
        }
    }
}

// --- Food ---

#[derive(Debug, Clone, Serialize)]
pub struct FoodEntry {
    pub id: i64,
    pub day: String,
    pub created_at: String,
    pub raw_text: String,
    pub item: Option<String>,
    pub qty: Option<f64>,
    pub unit: Option<String>,
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub confidence: Confidence,
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NewFoodEntry {
    pub day: String,
    pub raw_text: String,
    pub item: Option<String>,
    pub qty: Option<f64>,
    pub unit: Option<String>,
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub confidence: Confidence,
    pub source: Option<String>,
    pub meta: Option<serde_json::Value>,
}

/// Payload stored under a `food` preset key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPreset {
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub kcal: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub source: Option<String>,
}

// --- Workouts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub weight: f64,
    pub reps: u32,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutEntry {
    pub id: i64,
    pub day: String,
    pub created_at: String,
    pub raw_text: String,
    pub exercise: Option<String>,
    pub sets: Option<Vec<WorkoutSet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NewWorkoutEntry {
    pub day: String,
    pub raw_text: String,
    pub exercise: Option<String>,
    pub sets: Option<Vec<WorkoutSet>>,
    pub meta: Option<serde_json::Value>,
}

// --- Check-ins ---

#[derive(Debug, Clone, Serialize)]
pub struct Checkin {
    pub id: i64,
    pub day: String,
    pub created_at: String,
    pub weight_lb: Option<f64>,
    pub waist_in: Option<f64>,
    pub steps: Option<i64>,
    pub sleep_h: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCheckin {
    pub day: String,
    pub weight_lb: Option<f64>,
    pub waist_in: Option<f64>,
    pub steps: Option<i64>,
    pub sleep_h: Option<f64>,
    pub notes: Option<String>,
}

// --- Injuries ---

#[derive(Debug, Clone, Serialize)]
pub struct InjuryEntry {
    pub id: i64,
    pub day: String,
    pub created_at: String,
    pub raw_text: String,
    pub area: Option<String>,
    pub severity: Option<f64>,
    pub status: InjuryStatus,
}

#[derive(Debug, Clone)]
pub struct NewInjuryEntry {
    pub day: String,
    pub raw_text: String,
    pub area: Option<String>,
    pub severity: Option<f64>,
    pub status: InjuryStatus,
}

// --- Presets & targets ---

#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub key: String,
    pub kind: PresetKind,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTargets {
    pub kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: Option<f64>,
}

/// Targets must be finite and non-negative.
pub fn validate_targets(kcal: f64, protein_g: f64, fat_g: f64, carbs_g: Option<f64>) -> Result<()> {
    let fields = [
        ("kcal", Some(kcal)),
        ("protein", Some(protein_g)),
        ("fat", Some(fat_g)),
        ("carbs", carbs_g),
    ];
    for (name, value) in fields {
        let Some(v) = value else { continue };
        if !v.is_finite() {
            bail!("{name} target must be a finite number");
        }
        if v < 0.0 {
            bail!("{name} target must not be negative");
        }
    }
    Ok(())
}

// --- Reports ---

#[derive(Debug, Clone, Default, Serialize)]
pub struct DayTotals {
    pub kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub entry_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub day: String,
    #[serde(serialize_with = "none_as_empty_map")]
    pub targets: Option<DailyTargets>,
    pub totals: DayTotals,
    pub entries: Vec<FoodEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckinReport {
    pub days: u32,
    pub entries: Vec<Checkin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InjuryReport {
    pub days: u32,
    pub entries: Vec<InjuryEntry>,
}

/// Confirmation returned by every recorder.
#[derive(Debug, Clone, Serialize)]
pub struct LogReceipt {
    pub ok: bool,
    pub id: i64,
    pub day: String,
    /// Present only on workout receipts.
    #[serde(flatten)]
    pub workout: Option<WorkoutSummary>,
}

/// Workout fields of a receipt. `exercise` is always emitted, `null` when
/// none was given or guessed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub exercise: Option<String>,
    pub set_count: usize,
}

fn none_as_empty_map<S: Serializer>(
    targets: &Option<DailyTargets>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    match targets {
        Some(t) => t.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
