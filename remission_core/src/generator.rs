//! Program generation.
//!
//! Expands the template library into a full cycle of [`ProgramDay`]s using
//! modular index arithmetic only:
//! - Cuisine alternates North/South by day parity
//! - Breakfast, lunch and snack use the day offset into their lists
//! - Dinner uses the same main list as lunch, shifted by a per-diet offset
//! - Exercise and sleep tips cycle through their own lists
//!
//! The 2-day cuisine cycle, the routine cycle and the meal list lengths are
//! independent; nothing here assumes they share a period.

use crate::{
    Cuisine, DietDay, DietType, DietVariants, Error, MealKind, MealSlot, ProgramDay, Result,
    TemplateLibrary,
};

pub const DEFAULT_CYCLE_LENGTH: u32 = 90;

/// Longest cycle the generator will materialize (ten years)
pub const MAX_CYCLE_LENGTH: u32 = 3650;

/// Calorie targets per meal slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotCalories {
    pub breakfast: u32,
    pub mid_morning: u32,
    pub lunch: u32,
    pub snack: u32,
    pub dinner: u32,
}

/// Per-diet generation parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DietPlan {
    /// Shift applied to the lunch index when picking dinner
    pub dinner_offset: usize,
    /// Fixed mid-morning filler, not template driven
    pub mid_morning: String,
    pub calories: SlotCalories,
}

impl DietPlan {
    /// Shipped defaults for a diet type
    pub fn default_for(diet: DietType) -> Self {
        match diet {
            DietType::Veg => DietPlan {
                dinner_offset: 2,
                mid_morning: "Seasonal fruit (e.g., papaya, guava)".into(),
                calories: SlotCalories {
                    breakfast: 300,
                    mid_morning: 150,
                    lunch: 400,
                    snack: 150,
                    dinner: 500,
                },
            },
            DietType::Nonveg => DietPlan {
                dinner_offset: 3,
                mid_morning: "Seasonal fruit (e.g., watermelon, apple)".into(),
                calories: SlotCalories {
                    breakfast: 350,
                    mid_morning: 150,
                    lunch: 450,
                    snack: 150,
                    dinner: 550,
                },
            },
        }
    }
}

/// Everything the generator needs besides the templates
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramSettings {
    pub cycle_length: u32,
    pub veg: DietPlan,
    pub nonveg: DietPlan,
}

impl ProgramSettings {
    pub fn diet_plan(&self, diet: DietType) -> &DietPlan {
        match diet {
            DietType::Veg => &self.veg,
            DietType::Nonveg => &self.nonveg,
        }
    }
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            veg: DietPlan::default_for(DietType::Veg),
            nonveg: DietPlan::default_for(DietType::Nonveg),
        }
    }
}

/// Deterministic generator over an immutable template library
pub struct ProgramGenerator<'a> {
    library: &'a TemplateLibrary,
    settings: &'a ProgramSettings,
}

impl<'a> ProgramGenerator<'a> {
    pub fn new(library: &'a TemplateLibrary, settings: &'a ProgramSettings) -> Self {
        Self { library, settings }
    }

    /// Generate the full cycle, days `1..=cycle_length` in order
    ///
    /// Fails with [`Error::Configuration`] if the cycle is empty or a dinner
    /// offset would make dinner repeat lunch for some main list.
    pub fn generate(&self) -> Result<Vec<ProgramDay>> {
        self.validate()?;

        let cycle_length = self.settings.cycle_length;
        let days: Vec<ProgramDay> = (0..cycle_length as usize)
            .map(|offset| self.build_day(offset))
            .collect();

        tracing::info!("Generated {} program days", days.len());
        Ok(days)
    }

    /// Check the settings against the library before generating
    fn validate(&self) -> Result<()> {
        if self.settings.cycle_length == 0 {
            return Err(Error::Configuration(
                "Cycle length must be at least 1 day".into(),
            ));
        }
        if self.settings.cycle_length > MAX_CYCLE_LENGTH {
            return Err(Error::Configuration(format!(
                "Cycle length {} exceeds the maximum of {} days",
                self.settings.cycle_length, MAX_CYCLE_LENGTH
            )));
        }

        for diet in DietType::ALL {
            let offset = self.settings.diet_plan(diet).dinner_offset;
            for cuisine in Cuisine::ALL {
                let mains = self.library.meals(MealKind::Main, cuisine, diet);
                let len = mains.len();
                if offset % len == 0 {
                    return Err(Error::Configuration(format!(
                        "Dinner offset {} for {:?} is a multiple of the {:?} main list length {}; \
                         dinner would repeat lunch",
                        offset, diet, cuisine, len
                    )));
                }
                // Distinct indices can still name the same dish if the list repeats one
                if let Some(i) = (0..len).find(|&i| mains.lookup(i) == mains.lookup(i + offset)) {
                    return Err(Error::Configuration(format!(
                        "{:?}/{:?} main list repeats '{}' at dinner offset {}",
                        cuisine,
                        diet,
                        mains.lookup(i),
                        offset
                    )));
                }
            }
        }

        Ok(())
    }

    fn build_day(&self, offset: usize) -> ProgramDay {
        let cuisine = Cuisine::for_offset(offset);

        ProgramDay {
            day_index: offset as u32 + 1,
            diet_variants: DietVariants {
                veg: self.build_diet_day(DietType::Veg, cuisine, offset),
                nonveg: self.build_diet_day(DietType::Nonveg, cuisine, offset),
            },
            exercise: self.library.routines().lookup(offset).clone(),
            sleep_tip: self.library.sleep_tips().lookup(offset).clone(),
        }
    }

    fn build_diet_day(&self, diet: DietType, cuisine: Cuisine, offset: usize) -> DietDay {
        let plan = self.settings.diet_plan(diet);
        let breakfasts = self.library.meals(MealKind::Breakfast, cuisine, diet);
        let mains = self.library.meals(MealKind::Main, cuisine, diet);
        let snacks = self.library.meals(MealKind::Snack, cuisine, diet);

        let slot = |name: &str, target_calories: u32, recipe: &str| MealSlot {
            name: name.into(),
            target_calories,
            recipe: recipe.into(),
        };

        DietDay {
            cuisine_style: cuisine,
            meals: vec![
                slot("Breakfast", plan.calories.breakfast, breakfasts.lookup(offset)),
                slot("Mid-Morning", plan.calories.mid_morning, &plan.mid_morning),
                slot("Lunch", plan.calories.lunch, mains.lookup(offset)),
                slot("Snack", plan.calories.snack, snacks.lookup(offset)),
                slot(
                    "Dinner",
                    plan.calories.dinner,
                    mains.lookup(offset + plan.dinner_offset),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MealTemplate, TemplateSet};

    fn generate_default() -> Vec<ProgramDay> {
        let library = TemplateLibrary::builtin().unwrap();
        let settings = ProgramSettings::default();
        ProgramGenerator::new(&library, &settings).generate().unwrap()
    }

    #[test]
    fn test_generates_full_cycle() {
        let days = generate_default();
        assert_eq!(days.len(), 90);
        for (i, day) in days.iter().enumerate() {
            assert_eq!(day.day_index, i as u32 + 1);
        }
    }

    #[test]
    fn test_lunch_and_dinner_differ_every_day() {
        for day in generate_default() {
            for diet in DietType::ALL {
                let diet_day = day.diet_variants.get(diet);
                let lunch = diet_day.meal("Lunch").unwrap();
                let dinner = diet_day.meal("Dinner").unwrap();
                assert_ne!(
                    lunch.recipe, dinner.recipe,
                    "Day {} {:?} repeats lunch at dinner",
                    day.day_index, diet
                );
            }
        }
    }

    #[test]
    fn test_cuisine_alternates() {
        for day in generate_default() {
            let expected = if (day.day_index - 1) % 2 == 0 {
                Cuisine::North
            } else {
                Cuisine::South
            };
            assert_eq!(day.diet_variants.veg.cuisine_style, expected);
            assert_eq!(day.diet_variants.nonveg.cuisine_style, expected);
        }
    }

    #[test]
    fn test_meal_order_and_calories() {
        let days = generate_default();
        let veg = &days[0].diet_variants.veg;
        let names: Vec<_> = veg.meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Breakfast", "Mid-Morning", "Lunch", "Snack", "Dinner"]
        );
        assert_eq!(veg.total_calories(), 1500);
        assert_eq!(days[0].diet_variants.nonveg.total_calories(), 1650);
    }

    #[test]
    fn test_first_days_match_shipped_content() {
        let days = generate_default();

        let veg = &days[0].diet_variants.veg;
        assert_eq!(veg.meals[0].recipe, "Poha with peanuts and vegetables");
        assert_eq!(
            veg.meals[2].recipe,
            "Dal tadka with brown rice and cucumber salad"
        );
        assert_eq!(
            veg.meals[4].recipe,
            "Chickpea curry with jeera rice and salad"
        );

        let nonveg = &days[1].diet_variants.nonveg;
        assert_eq!(nonveg.cuisine_style, Cuisine::South);
        assert_eq!(nonveg.meals[2].recipe, "Fish molee with appam");
        assert_eq!(nonveg.meals[4].recipe, "Kerala fish curry with brown rice");
    }

    #[test]
    fn test_exercise_and_sleep_follow_weekly_cycle() {
        let days = generate_default();
        assert_eq!(days[0].exercise.name, "Cardio & Walk");
        assert_eq!(days[1].exercise.name, "Yoga & Mobility");
        assert_eq!(days[1].exercise.estimated_calories, 500);
        // Day 8 starts the second week
        assert_eq!(days[7].exercise, days[0].exercise);
        assert_eq!(days[8].sleep_tip, days[1].sleep_tip);
        assert_eq!(days[89].exercise, days[89 % 7].exercise);
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate_default(), generate_default());
    }

    #[test]
    fn test_zero_offset_rejected() {
        let library = TemplateLibrary::builtin().unwrap();
        let mut settings = ProgramSettings::default();
        settings.veg.dinner_offset = 0;

        let result = ProgramGenerator::new(&library, &settings).generate();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_offset_multiple_of_list_length_rejected() {
        let library = TemplateLibrary::builtin().unwrap();
        let mut settings = ProgramSettings::default();
        settings.nonveg.dinner_offset = 14;

        let result = ProgramGenerator::new(&library, &settings).generate();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_offset_checked_against_custom_list_length() {
        // Offset 2 is fine for 7 dishes but collides with a 2-dish list
        let mut set = TemplateSet::builtin();
        set.meals.retain(|m| {
            !(m.slot == MealKind::Main
                && m.cuisine == Some(Cuisine::South)
                && m.diet == DietType::Veg)
        });
        set.meals.push(MealTemplate {
            slot: MealKind::Main,
            cuisine: Some(Cuisine::South),
            diet: DietType::Veg,
            items: vec!["Sambhar rice".into(), "Curd rice".into()],
        });
        let library = TemplateLibrary::from_set(&set).unwrap();
        let settings = ProgramSettings::default();

        let result = ProgramGenerator::new(&library, &settings).generate();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_duplicate_dish_collision_rejected() {
        let mut set = TemplateSet::builtin();
        for m in set.meals.iter_mut() {
            if m.slot == MealKind::Main && m.cuisine == Some(Cuisine::North) && m.diet == DietType::Veg
            {
                m.items[2] = m.items[0].clone();
            }
        }
        let library = TemplateLibrary::from_set(&set).unwrap();
        let settings = ProgramSettings::default();

        let result = ProgramGenerator::new(&library, &settings).generate();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_zero_cycle_rejected() {
        let library = TemplateLibrary::builtin().unwrap();
        let settings = ProgramSettings {
            cycle_length: 0,
            ..ProgramSettings::default()
        };

        let result = ProgramGenerator::new(&library, &settings).generate();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_oversized_cycle_rejected() {
        let library = TemplateLibrary::builtin().unwrap();
        let settings = ProgramSettings {
            cycle_length: 4_000_000_000,
            ..ProgramSettings::default()
        };

        let result = ProgramGenerator::new(&library, &settings).generate();
        assert!(matches!(result, Err(Error::Configuration(_))));

        let settings = ProgramSettings {
            cycle_length: MAX_CYCLE_LENGTH,
            ..ProgramSettings::default()
        };
        let days = ProgramGenerator::new(&library, &settings).generate().unwrap();
        assert_eq!(days.len(), MAX_CYCLE_LENGTH as usize);
    }

    #[test]
    fn test_custom_cycle_length() {
        let library = TemplateLibrary::builtin().unwrap();
        let settings = ProgramSettings {
            cycle_length: 30,
            ..ProgramSettings::default()
        };

        let days = ProgramGenerator::new(&library, &settings).generate().unwrap();
        assert_eq!(days.len(), 30);
        assert_eq!(days.last().unwrap().day_index, 30);
    }
}
