//! Content templates the program is generated from.
//!
//! A [`TemplateSet`] is the raw, deserializable form (TOML or JSON). A
//! [`TemplateLibrary`] is the validated form: every list is non-empty and
//! every `(slot, cuisine, diet)` combination the generator needs is present.

use crate::{Cuisine, DietType, Error, MealKind, Result, RoutineEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An ordered, immutable, non-empty list of template items
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateList<T> {
    items: Vec<T>,
}

impl<T> TemplateList<T> {
    /// Build a list, rejecting an empty one
    pub fn new(label: &str, items: Vec<T>) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::Configuration(format!(
                "Template list '{}' is empty",
                label
            )));
        }
        Ok(Self { items })
    }

    /// Cyclic lookup: `items[i mod len]`
    pub fn lookup(&self, i: usize) -> &T {
        &self.items[i % self.items.len()]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for parity with `len`
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

// ============================================================================
// Raw Template Set
// ============================================================================

/// A list of dishes for one meal slot and diet type.
///
/// When `cuisine` is omitted the list applies to both cuisines.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MealTemplate {
    pub slot: MealKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<Cuisine>,
    pub diet: DietType,
    pub items: Vec<String>,
}

/// An exercise routine as written in a template file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutineTemplate {
    pub name: String,
    pub description: String,
    pub calories: u32,
}

impl From<&RoutineTemplate> for RoutineEntry {
    fn from(t: &RoutineTemplate) -> Self {
        RoutineEntry {
            name: t.name.clone(),
            description: t.description.clone(),
            estimated_calories: t.calories,
        }
    }
}

/// Unvalidated template content
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TemplateSet {
    #[serde(default)]
    pub sleep_tips: Vec<String>,
    #[serde(default)]
    pub meals: Vec<MealTemplate>,
    #[serde(default)]
    pub routines: Vec<RoutineTemplate>,
}

impl TemplateSet {
    /// Load a template set from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let set: TemplateSet = toml::from_str(&contents)?;
        tracing::info!("Loaded templates from {:?}", path);
        Ok(set)
    }

    /// Render as TOML, for copying into a custom template file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("Failed to serialize templates: {}", e)))
    }

    /// The shipped North/South Indian program content
    pub fn builtin() -> Self {
        builtin_template_set()
    }
}

// ============================================================================
// Validated Library
// ============================================================================

/// Key for a meal template list
pub type TemplateKey = (MealKind, Cuisine, DietType);

/// Validated, immutable template content
#[derive(Clone, Debug)]
pub struct TemplateLibrary {
    meals: BTreeMap<TemplateKey, TemplateList<String>>,
    routines: TemplateList<RoutineEntry>,
    sleep_tips: TemplateList<String>,
}

impl TemplateLibrary {
    /// Validate a raw set and build a library from it
    ///
    /// Fails with [`Error::Configuration`] if any list is empty or blank,
    /// if a `(slot, cuisine, diet)` combination is defined twice, or if
    /// any combination is missing.
    pub fn from_set(set: &TemplateSet) -> Result<Self> {
        let mut meals = BTreeMap::new();

        for template in &set.meals {
            let cuisines: Vec<Cuisine> = match template.cuisine {
                Some(c) => vec![c],
                None => Cuisine::ALL.to_vec(),
            };

            for cuisine in cuisines {
                let key = (template.slot, cuisine, template.diet);
                let label = format_key(&key);
                if template.items.iter().any(|s| s.trim().is_empty()) {
                    return Err(Error::Configuration(format!(
                        "Template list '{}' contains a blank entry",
                        label
                    )));
                }
                let list = TemplateList::new(&label, template.items.clone())?;
                if meals.insert(key, list).is_some() {
                    return Err(Error::Configuration(format!(
                        "Template list '{}' is defined more than once",
                        label
                    )));
                }
            }
        }

        for slot in [MealKind::Breakfast, MealKind::Main, MealKind::Snack] {
            for cuisine in Cuisine::ALL {
                for diet in DietType::ALL {
                    let key = (slot, cuisine, diet);
                    if !meals.contains_key(&key) {
                        return Err(Error::Configuration(format!(
                            "Missing template list '{}'",
                            format_key(&key)
                        )));
                    }
                }
            }
        }

        let routines = TemplateList::new(
            "routines",
            set.routines.iter().map(RoutineEntry::from).collect(),
        )?;

        if set.sleep_tips.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::Configuration(
                "Template list 'sleep_tips' contains a blank entry".into(),
            ));
        }
        let sleep_tips = TemplateList::new("sleep_tips", set.sleep_tips.clone())?;

        tracing::debug!(
            "Built template library: {} meal lists, {} routines, {} sleep tips",
            meals.len(),
            routines.len(),
            sleep_tips.len()
        );

        Ok(Self {
            meals,
            routines,
            sleep_tips,
        })
    }

    /// Library built from the shipped content
    pub fn builtin() -> Result<Self> {
        Self::from_set(&TemplateSet::builtin())
    }

    /// Meal list for a slot, cuisine and diet.
    ///
    /// Construction guarantees every combination is present.
    pub fn meals(&self, slot: MealKind, cuisine: Cuisine, diet: DietType) -> &TemplateList<String> {
        &self.meals[&(slot, cuisine, diet)]
    }

    pub fn routines(&self) -> &TemplateList<RoutineEntry> {
        &self.routines
    }

    pub fn sleep_tips(&self) -> &TemplateList<String> {
        &self.sleep_tips
    }
}

fn format_key((slot, cuisine, diet): &TemplateKey) -> String {
    format!("{}/{:?}/{:?}", slot, cuisine, diet).to_lowercase()
}

// ============================================================================
// Built-in Content
// ============================================================================

fn meal(slot: MealKind, cuisine: Option<Cuisine>, diet: DietType, items: &[&str]) -> MealTemplate {
    MealTemplate {
        slot,
        cuisine,
        diet,
        items: items.iter().map(|s| s.to_string()).collect(),
    }
}

fn routine(name: &str, description: &str, calories: u32) -> RoutineTemplate {
    RoutineTemplate {
        name: name.into(),
        description: description.into(),
        calories,
    }
}

fn builtin_template_set() -> TemplateSet {
    use Cuisine::{North, South};
    use DietType::{Nonveg, Veg};
    use MealKind::{Breakfast, Main, Snack};

    let meals = vec![
        // ====================================================================
        // Breakfast
        // ====================================================================
        meal(
            Breakfast,
            Some(North),
            Veg,
            &[
                "Poha with peanuts and vegetables",
                "Besan chilla with mint chutney",
                "Vegetable upma with sambhar",
                "Masala oats with sprouts",
                "Whole-wheat paratha with curd",
                "Methi thepla with pickle",
                "Aloo paratha (oil-free) with low-fat yogurt",
            ],
        ),
        meal(
            Breakfast,
            Some(South),
            Veg,
            &[
                "Idli with coconut chutney and sambhar",
                "Dosa with tomato chutney",
                "Rava upma with veggies",
                "Pongal with chutney",
                "Ragi dosa with chutney",
                "Uttapam with onion and tomato",
                "Appam with stew",
            ],
        ),
        meal(
            Breakfast,
            Some(North),
            Nonveg,
            &[
                "Egg white omelette with multigrain toast",
                "Chicken keema with roti",
                "Paneer (low fat) bhurji with toast",
                "Boiled eggs with sprouts salad",
                "Grilled fish with spinach",
                "Masala omelette with tomato salad",
                "Shakshuka with whole-wheat bread",
            ],
        ),
        meal(
            Breakfast,
            Some(South),
            Nonveg,
            &[
                "Egg dosa with chutney",
                "Prawn upma",
                "Chicken idli (steamed with shredded chicken)",
                "Fish curry with appam",
                "Egg appam with stew",
                "Chicken uttapam",
                "Anchovy stir fry with idiyappam",
            ],
        ),
        // ====================================================================
        // Lunch and dinner
        // ====================================================================
        meal(
            Main,
            Some(North),
            Veg,
            &[
                "Dal tadka with brown rice and cucumber salad",
                "Rajma with roti and mixed vegetable sabzi",
                "Chickpea curry with jeera rice and salad",
                "Palak paneer (low fat) with roti",
                "Baingan bharta with jowar roti",
                "Mixed vegetable curry with paratha",
                "Sarson ka saag with makki roti",
            ],
        ),
        meal(
            Main,
            Some(South),
            Veg,
            &[
                "Sambhar with brown rice and cucumber raita",
                "Coconut curry with kodo millet",
                "Avial with red rice",
                "Kootu with steamed rice",
                "Drumstick curry with dosa",
                "Tomato pappu with rice",
                "Mixed veg kurma with chapathi",
            ],
        ),
        meal(
            Main,
            Some(North),
            Nonveg,
            &[
                "Grilled chicken with roti and salad",
                "Fish curry with brown rice",
                "Egg curry with quinoa",
                "Chicken tikka with roti",
                "Chicken stew with red rice",
                "Mutton rogan josh (lean) with millet roti",
                "Fish fry (shallow) with dal and rice",
            ],
        ),
        meal(
            Main,
            Some(South),
            Nonveg,
            &[
                "Chettinad chicken with dosa",
                "Fish molee with appam",
                "Prawn curry with steamed rice",
                "Chicken ghee roast with neer dosa",
                "Kerala fish curry with brown rice",
                "Egg curry with idiyappam",
                "Mutton sukka (lean) with ragi mudde",
            ],
        ),
        // ====================================================================
        // Snacks (shared across cuisines)
        // ====================================================================
        meal(
            Snack,
            None,
            Veg,
            &[
                "Roasted chana",
                "Fresh fruit salad",
                "Low-fat yogurt with cucumber",
                "Sprouts chaat",
                "Handful of nuts (almonds/walnuts)",
                "Vegetable soup",
                "Buttermilk",
            ],
        ),
        meal(
            Snack,
            None,
            Nonveg,
            &[
                "Boiled egg with pepper",
                "Grilled fish bites",
                "Chicken salad (small portion)",
                "Egg white scramble",
                "Tuna salad lettuce cups",
                "Prawn skewers",
                "Paneer tikka (high protein)",
            ],
        ),
    ];

    let routines = vec![
        routine(
            "Cardio & Walk",
            "45-minute brisk walk (approx. 6 000-8 000 steps) plus 15-minute stretching",
            600,
        ),
        routine(
            "Yoga & Mobility",
            "60-minute yoga session focusing on flexibility and breathing",
            500,
        ),
        routine(
            "Strength Training",
            "30-minute body-weight exercises (squats, lunges, push-ups) and 20-minute core workout",
            700,
        ),
        routine(
            "High-Intensity Interval Training",
            "20 minutes of HIIT (e.g., jumping jacks, burpees) plus 20-minute walk",
            800,
        ),
        routine(
            "Cycling",
            "45-minute outdoor or stationary cycling at moderate pace",
            650,
        ),
        routine(
            "Swimming / Water Aerobics",
            "30-minute swimming or low-impact water aerobics session",
            550,
        ),
        routine(
            "Restorative Activity",
            "30-minute mindful walking or tai chi and 15-minute meditation",
            500,
        ),
    ];

    let sleep_tips = [
        "Aim for 7-8 hours of sleep each night; go to bed and wake up at the same time.",
        "Avoid caffeine after 4 PM and have a light dinner before 8 PM.",
        "Limit screen time 1 hour before bed; read a book or practice meditation instead.",
        "Create a dark, cool and quiet bedroom environment to promote deep sleep.",
        "Engage in 10 minutes of deep breathing exercises before bedtime.",
        "Take a short walk after dinner to aid digestion and support sleep.",
        "Keep a journal by your bed; jot down worries to clear your mind before sleeping.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    TemplateSet {
        sleep_tips,
        meals,
        routines,
    }
}
