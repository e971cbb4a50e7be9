//! The materialized program cycle.
//!
//! A [`Program`] is generated once and only read afterwards, so it can be
//! shared across threads without locking.

use crate::generator::{ProgramGenerator, ProgramSettings};
use crate::{
    DayResolver, DietDay, DietType, Error, ProgramDay, Result, RoutineEntry, TemplateLibrary,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use once_cell::sync::OnceCell;

/// Cached built-in program - generated on first use and reused afterwards
static DEFAULT_PROGRAM: OnceCell<Program> = OnceCell::new();

/// Get a reference to the cached built-in program
pub fn default_program() -> Result<&'static Program> {
    DEFAULT_PROGRAM.get_or_try_init(|| {
        let library = TemplateLibrary::builtin()?;
        Program::build(&library, &ProgramSettings::default(), Utc.fix())
    })
}

/// A fully generated cycle plus the resolver that indexes into it
#[derive(Clone, Debug)]
pub struct Program {
    days: Vec<ProgramDay>,
    resolver: DayResolver,
}

impl Program {
    /// Generate the cycle from templates and settings
    pub fn build(
        library: &TemplateLibrary,
        settings: &ProgramSettings,
        utc_offset: FixedOffset,
    ) -> Result<Self> {
        let resolver = DayResolver::with_offset(settings.cycle_length, utc_offset)?;
        let days = ProgramGenerator::new(library, settings).generate()?;
        Ok(Self { days, resolver })
    }

    pub fn cycle_length(&self) -> u32 {
        self.resolver.cycle_length()
    }

    pub fn resolver(&self) -> &DayResolver {
        &self.resolver
    }

    /// All days in order, day 1 first
    pub fn days(&self) -> &[ProgramDay] {
        &self.days
    }

    /// Look up a day by its 1-based number
    pub fn get_program_day(&self, day: u32) -> Result<&ProgramDay> {
        if day == 0 || day > self.cycle_length() {
            return Err(Error::IndexOutOfRange {
                day,
                cycle_length: self.cycle_length(),
            });
        }
        Ok(&self.days[(day - 1) as usize])
    }

    /// Day number a user enrolled on `enrolled` should see on `today`
    pub fn resolve_day(&self, enrolled: NaiveDate, today: NaiveDate) -> Result<u32> {
        self.resolver.resolve(enrolled, today)
    }

    /// Resolve and look up today's content in one step
    pub fn today(&self, enrolled: NaiveDate, now: DateTime<Utc>) -> Result<&ProgramDay> {
        let today = self.resolver.calendar_date(now);
        let day = self.resolve_day(enrolled, today)?;
        self.get_program_day(day)
    }

    /// Meal plan for one diet on a given day
    pub fn meal_plan(&self, day: u32, diet: DietType) -> Result<&DietDay> {
        Ok(self.get_program_day(day)?.diet_variants.get(diet))
    }

    /// Exercise routine for a given day
    pub fn exercise(&self, day: u32) -> Result<&RoutineEntry> {
        Ok(&self.get_program_day(day)?.exercise)
    }

    /// Sleep recommendation for a given day
    pub fn sleep_tip(&self, day: u32) -> Result<&str> {
        Ok(&self.get_program_day(day)?.sleep_tip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cuisine;
    use chrono::{Duration, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_program_is_cached() {
        let a = default_program().unwrap();
        let b = default_program().unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.cycle_length(), 90);
    }

    #[test]
    fn test_get_program_day_bounds() {
        let program = default_program().unwrap();

        assert_eq!(program.get_program_day(1).unwrap().day_index, 1);
        assert_eq!(program.get_program_day(90).unwrap().day_index, 90);
        assert!(matches!(
            program.get_program_day(0),
            Err(Error::IndexOutOfRange {
                day: 0,
                cycle_length: 90
            })
        ));
        assert!(matches!(
            program.get_program_day(91),
            Err(Error::IndexOutOfRange { day: 91, .. })
        ));
    }

    #[test]
    fn test_every_day_has_distinct_veg_lunch_and_dinner() {
        let program = default_program().unwrap();
        for day in 1..=90 {
            let veg = program.meal_plan(day, DietType::Veg).unwrap();
            let lunch = veg.meal("Lunch").expect("Lunch slot");
            let dinner = veg.meal("Dinner").expect("Dinner slot");
            assert_ne!(lunch.recipe, dinner.recipe);
        }
    }

    #[test]
    fn test_cuisine_by_day_number() {
        let program = default_program().unwrap();
        for day in 1..=90 {
            let style = program.meal_plan(day, DietType::Nonveg).unwrap().cuisine_style;
            assert_eq!(style == Cuisine::North, (day - 1) % 2 == 0);
        }
    }

    #[test]
    fn test_enrollment_week_example() {
        let program = default_program().unwrap();
        let day = program
            .resolve_day(date(2024, 1, 1), date(2024, 1, 8))
            .unwrap();
        assert_eq!(day, 8);

        // Day 8 is offset 7, the start of the second week
        let library = TemplateLibrary::builtin().unwrap();
        let expected = library.routines().lookup(7);
        assert_eq!(program.exercise(day).unwrap(), expected);
        assert_eq!(program.exercise(day).unwrap().name, "Cardio & Walk");
    }

    #[test]
    fn test_today_wraps_after_cycle() {
        let program = default_program().unwrap();
        let enrolled = date(2024, 1, 1);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::days(90);

        let day = program.today(enrolled, now).unwrap();
        assert_eq!(day.day_index, 1);
    }

    #[test]
    fn test_today_before_enrollment_fails() {
        let program = default_program().unwrap();
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 9, 0, 0).unwrap();

        assert!(matches!(
            program.today(date(2024, 1, 1), now),
            Err(Error::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_views_match_program_day() {
        let program = default_program().unwrap();
        let day = program.get_program_day(12).unwrap();

        assert_eq!(program.sleep_tip(12).unwrap(), day.sleep_tip);
        assert_eq!(program.exercise(12).unwrap(), &day.exercise);
        assert_eq!(
            program.meal_plan(12, DietType::Veg).unwrap(),
            &day.diet_variants.veg
        );
        assert!(program.sleep_tip(0).is_err());
    }

    #[test]
    fn test_rebuild_is_identical() {
        let library = TemplateLibrary::builtin().unwrap();
        let settings = ProgramSettings::default();
        let a = Program::build(&library, &settings, Utc.fix()).unwrap();
        let b = Program::build(&library, &settings, Utc.fix()).unwrap();
        assert_eq!(a.days(), b.days());
    }

    #[test]
    fn test_shared_across_threads() {
        let program = default_program().unwrap();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let enrolled = date(2024, 1, 1);
                    let query = enrolled + Duration::days(i * 30);
                    let day = program.resolve_day(enrolled, query).unwrap();
                    program.get_program_day(day).unwrap().day_index
                })
            })
            .collect();

        let results: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![1, 31, 61, 1]);
    }
}
