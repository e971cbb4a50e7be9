//! Core domain types for the remission program.
//!
//! This module defines the fundamental types used throughout the system:
//! - Diet types, cuisines and meal slots used to key templates
//! - Program days and their diet, exercise and sleep content
//! - Progress measurements recorded by enrolled users

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Template Keys
// ============================================================================

/// Dietary preference a day's meals are written for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DietType {
    Veg,
    #[serde(alias = "non_veg")]
    Nonveg,
}

impl DietType {
    pub const ALL: [DietType; 2] = [DietType::Veg, DietType::Nonveg];
}

impl fmt::Display for DietType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DietType::Veg => write!(f, "Vegetarian"),
            DietType::Nonveg => write!(f, "Non-Vegetarian"),
        }
    }
}

impl FromStr for DietType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "veg" | "vegetarian" => Ok(DietType::Veg),
            "nonveg" | "non_veg" | "non-veg" | "non-vegetarian" => Ok(DietType::Nonveg),
            other => Err(crate::Error::Validation(format!(
                "Unknown diet type '{}' (expected veg or nonveg)",
                other
            ))),
        }
    }
}

/// Regional cuisine style. Program days alternate between the two.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Cuisine {
    North,
    South,
}

impl Cuisine {
    pub const ALL: [Cuisine; 2] = [Cuisine::North, Cuisine::South];

    /// Cuisine for a zero-based day offset: even offsets are North
    pub fn for_offset(offset: usize) -> Self {
        if offset % 2 == 0 {
            Cuisine::North
        } else {
            Cuisine::South
        }
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cuisine::North => write!(f, "North Indian"),
            Cuisine::South => write!(f, "South Indian"),
        }
    }
}

impl FromStr for Cuisine {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "north" | "north indian" => Ok(Cuisine::North),
            "south" | "south indian" => Ok(Cuisine::South),
            other => Err(crate::Error::Validation(format!(
                "Unknown region '{}' (expected north or south)",
                other
            ))),
        }
    }
}

/// Template-driven meal slot. Mid-morning is a fixed filler and has no templates.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealKind {
    Breakfast,
    Main,
    Snack,
}

impl fmt::Display for MealKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealKind::Breakfast => write!(f, "breakfast"),
            MealKind::Main => write!(f, "main"),
            MealKind::Snack => write!(f, "snack"),
        }
    }
}

// ============================================================================
// Program Day Types
// ============================================================================

/// One meal within a diet day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealSlot {
    pub name: String,
    pub target_calories: u32,
    pub recipe: String,
}

/// A full day of meals for one diet type
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DietDay {
    pub cuisine_style: Cuisine,
    pub meals: Vec<MealSlot>,
}

impl DietDay {
    /// Sum of the target calories across all meals
    pub fn total_calories(&self) -> u32 {
        self.meals.iter().map(|m| m.target_calories).sum()
    }

    /// Find a meal by its slot name (e.g. "Lunch")
    pub fn meal(&self, name: &str) -> Option<&MealSlot> {
        self.meals.iter().find(|m| m.name == name)
    }
}

/// Vegetarian and non-vegetarian variants of the same day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DietVariants {
    pub veg: DietDay,
    pub nonveg: DietDay,
}

impl DietVariants {
    pub fn get(&self, diet: DietType) -> &DietDay {
        match diet {
            DietType::Veg => &self.veg,
            DietType::Nonveg => &self.nonveg,
        }
    }
}

/// An exercise routine from the weekly cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutineEntry {
    pub name: String,
    pub description: String,
    pub estimated_calories: u32,
}

/// Everything a user sees on one day of the program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgramDay {
    /// 1-based position within the cycle
    pub day_index: u32,
    pub diet_variants: DietVariants,
    pub exercise: RoutineEntry,
    pub sleep_tip: String,
}

// ============================================================================
// Progress Types
// ============================================================================

/// A recorded set of health measurements
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub recorded_on: NaiveDate,
    pub recorded_at: DateTime<Utc>,
    pub weight_kg: Option<f64>,
    pub fasting_blood_sugar: Option<f64>,
    pub postprandial_blood_sugar: Option<f64>,
}
