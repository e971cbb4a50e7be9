//! Configuration file support for the remission kit.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/remission/config.toml`.

use crate::generator::{DietPlan, ProgramSettings, SlotCalories, DEFAULT_CYCLE_LENGTH};
use crate::{DietType, Error, Program, Result, TemplateLibrary, TemplateSet};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub program: ProgramConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Program generation and day-boundary configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramConfig {
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,

    /// Offset whose midnight starts a new program day, e.g. "+05:30"
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// Custom template file; the built-in templates are used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_path: Option<PathBuf>,

    #[serde(default)]
    pub veg: DietPlanConfig,

    #[serde(default)]
    pub nonveg: DietPlanConfig,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            cycle_length: default_cycle_length(),
            utc_offset: default_utc_offset(),
            templates_path: None,
            veg: DietPlanConfig::default(),
            nonveg: DietPlanConfig::default(),
        }
    }
}

/// Per-diet overrides. Unset fields fall back to that diet's shipped defaults.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DietPlanConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner_offset: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_morning: Option<String>,

    #[serde(default)]
    pub calories: CaloriesConfig,
}

/// Per-slot calorie overrides
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CaloriesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_morning: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snack: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner: Option<u32>,
}

impl DietPlanConfig {
    /// Merge these overrides onto the defaults for `diet`
    pub fn resolve(&self, diet: DietType) -> DietPlan {
        let base = DietPlan::default_for(diet);
        let c = &self.calories;
        DietPlan {
            dinner_offset: self.dinner_offset.unwrap_or(base.dinner_offset),
            mid_morning: self.mid_morning.clone().unwrap_or(base.mid_morning),
            calories: SlotCalories {
                breakfast: c.breakfast.unwrap_or(base.calories.breakfast),
                mid_morning: c.mid_morning.unwrap_or(base.calories.mid_morning),
                lunch: c.lunch.unwrap_or(base.calories.lunch),
                snack: c.snack.unwrap_or(base.calories.snack),
                dinner: c.dinner.unwrap_or(base.calories.dinner),
            },
        }
    }
}

impl ProgramConfig {
    /// Generator settings with all overrides applied
    pub fn settings(&self) -> ProgramSettings {
        ProgramSettings {
            cycle_length: self.cycle_length,
            veg: self.veg.resolve(DietType::Veg),
            nonveg: self.nonveg.resolve(DietType::Nonveg),
        }
    }

    /// Parse the configured day-boundary offset
    pub fn fixed_offset(&self) -> Result<FixedOffset> {
        self.utc_offset.parse::<FixedOffset>().map_err(|e| {
            Error::Configuration(format!(
                "Invalid utc_offset '{}': {} (expected e.g. \"+05:30\")",
                self.utc_offset, e
            ))
        })
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("remission")
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_utc_offset() -> String {
    "+00:00".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("remission").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("Failed to serialize config: {}", e)))
    }

    /// Template library from `templates_path`, or the built-in one
    pub fn template_library(&self) -> Result<TemplateLibrary> {
        match &self.program.templates_path {
            Some(path) => TemplateLibrary::from_set(&TemplateSet::load_from(path)?),
            None => TemplateLibrary::builtin(),
        }
    }

    /// Build the program this configuration describes
    pub fn build_program(&self) -> Result<Program> {
        let library = self.template_library()?;
        let offset = self.program.fixed_offset()?;
        Program::build(&library, &self.program.settings(), offset)
    }
}
