use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use remission_core::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "remission")]
#[command(about = "90-day diet, exercise and sleep program", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's program day (default)
    Today {
        /// Resolve for this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Only show meals for this diet (veg, nonveg)
        #[arg(long)]
        diet: Option<DietType>,

        /// Print the full day as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a specific program day
    Day {
        /// Day number within the cycle
        day: u32,

        /// Only show meals for this diet (veg, nonveg)
        #[arg(long)]
        diet: Option<DietType>,

        /// Print the full day as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register and start the program
    Enroll {
        #[arg(long)]
        name: String,

        /// Indian mobile number; +91 is added if missing
        #[arg(long)]
        phone: String,

        /// Preferred region (north, south)
        #[arg(long)]
        region: Option<Cuisine>,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Replace an existing enrollment
        #[arg(long)]
        force: bool,
    },

    /// Record and review weight and blood sugar
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },

    /// Export the whole cycle to CSV
    Export {
        /// Output file (defaults to <data-dir>/program.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the built-in templates as TOML
    Templates,

    /// Print the effective configuration as TOML
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum ProgressAction {
    /// Record today's measurements
    Log {
        /// Body weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Fasting blood sugar (mg/dL)
        #[arg(long)]
        fasting: Option<f64>,

        /// Post-meal blood sugar (mg/dL)
        #[arg(long)]
        postprandial: Option<f64>,

        /// Date of the measurement (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List recorded measurements
    Show,

    /// Roll up the progress log to CSV
    Rollup {
        /// Clean up processed logs after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

/// File locations under the data directory
struct Paths {
    enrollment: PathBuf,
    progress_dir: PathBuf,
    progress_log: PathBuf,
    progress_csv: PathBuf,
    program_csv: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        let progress_dir = data_dir.join("progress");
        Self {
            enrollment: data_dir.join("enrollment.json"),
            progress_log: progress_dir.join("progress.jsonl"),
            progress_dir,
            progress_csv: data_dir.join("progress.csv"),
            program_csv: data_dir.join("program.csv"),
        }
    }
}

fn main() -> ExitCode {
    remission_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let paths = Paths::new(&data_dir);

    match cli.command {
        Some(Commands::Today { date, diet, json }) => cmd_today(&config, &paths, date, diet, json),
        Some(Commands::Day { day, diet, json }) => cmd_day(&config, day, diet, json),
        Some(Commands::Enroll {
            name,
            phone,
            region,
            date,
            force,
        }) => cmd_enroll(&config, &paths, &name, &phone, region, date, force),
        Some(Commands::Progress { action }) => match action {
            ProgressAction::Log {
                weight,
                fasting,
                postprandial,
                date,
            } => cmd_progress_log(
                &config,
                &paths,
                Measurements {
                    weight_kg: weight,
                    fasting_blood_sugar: fasting,
                    postprandial_blood_sugar: postprandial,
                },
                date,
            ),
            ProgressAction::Show => cmd_progress_show(&paths),
            ProgressAction::Rollup { cleanup } => cmd_progress_rollup(&paths, cleanup),
        },
        Some(Commands::Export { output }) => {
            cmd_export(&config, output.unwrap_or_else(|| paths.program_csv.clone()))
        }
        Some(Commands::Templates) => {
            print!("{}", TemplateSet::builtin().to_toml()?);
            Ok(())
        }
        Some(Commands::Config { save }) => cmd_config(&config, cli.config.as_deref(), save),
        None => cmd_today(&config, &paths, None, None, false),
    }
}

fn report_error(error: &Error) {
    match error {
        Error::InvalidDateRange { enrolled, .. } => {
            eprintln!("Not yet enrolled: your program starts on {}.", enrolled);
        }
        Error::IndexOutOfRange { day, cycle_length } => {
            eprintln!(
                "Invalid day {}: day must be between 1 and {}.",
                day, cycle_length
            );
        }
        Error::NotEnrolled => {
            eprintln!("Not enrolled. Run `remission enroll --name <NAME> --phone <PHONE>` first.");
        }
        other => eprintln!("Error: {}", other),
    }
}

fn cmd_today(
    config: &Config,
    paths: &Paths,
    date: Option<NaiveDate>,
    diet: Option<DietType>,
    json: bool,
) -> Result<()> {
    let enrollment = Enrollment::require(&paths.enrollment)?;
    let program = config.build_program()?;

    let today = date.unwrap_or_else(|| program.resolver().calendar_date(Utc::now()));
    let day_number = program.resolve_day(enrollment.enrolled_on, today)?;
    let day = program.get_program_day(day_number)?;

    if json {
        println!("{}", serde_json::to_string_pretty(day)?);
        return Ok(());
    }

    let cycles = program
        .resolver()
        .cycles_completed(enrollment.enrolled_on, today)?;
    println!("\nHello {}!", enrollment.name);
    if cycles > 0 {
        println!("(Program restarted: cycle {})", cycles + 1);
    }
    display_day(day, program.cycle_length(), diet);
    Ok(())
}

fn cmd_day(config: &Config, day: u32, diet: Option<DietType>, json: bool) -> Result<()> {
    let program = config.build_program()?;
    let program_day = program.get_program_day(day)?;

    if json {
        println!("{}", serde_json::to_string_pretty(program_day)?);
    } else {
        display_day(program_day, program.cycle_length(), diet);
    }
    Ok(())
}

fn cmd_enroll(
    config: &Config,
    paths: &Paths,
    name: &str,
    phone: &str,
    region: Option<Cuisine>,
    date: Option<NaiveDate>,
    force: bool,
) -> Result<()> {
    if !force {
        if let Some(existing) = Enrollment::load(&paths.enrollment)? {
            return Err(Error::Validation(format!(
                "{} is already enrolled since {} (use --force to replace)",
                existing.name, existing.enrolled_on
            )));
        }
    }

    let offset = config.program.fixed_offset()?;
    let enrolled_on =
        date.unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());
    let enrollment = Enrollment::new(name, phone, region, enrolled_on)?;
    enrollment.save(&paths.enrollment)?;

    println!("✓ Registration successful!");
    println!("  Name: {}", enrollment.name);
    println!("  Phone: {}", enrollment.phone);
    println!("  Day 1 starts on {}", enrollment.enrolled_on);
    Ok(())
}

fn cmd_progress_log(
    config: &Config,
    paths: &Paths,
    measurements: Measurements,
    date: Option<NaiveDate>,
) -> Result<()> {
    let now = Utc::now();
    let offset = config.program.fixed_offset()?;
    let recorded_on = date.unwrap_or_else(|| now.with_timezone(&offset).date_naive());

    let record = ProgressRecord::new(recorded_on, now, measurements)?;
    let mut sink = JsonlProgressSink::new(&paths.progress_log);
    sink.append(&record)?;

    println!("✓ Progress recorded for {}", record.recorded_on);
    Ok(())
}

fn cmd_progress_show(paths: &Paths) -> Result<()> {
    let records = read_records(&paths.progress_log)?;
    if records.is_empty() {
        println!("No progress recorded yet.");
        return Ok(());
    }

    println!("{:<12} {:>10} {:>10} {:>14}", "Date", "Weight", "Fasting", "Postprandial");
    for record in &records {
        println!(
            "{:<12} {:>10} {:>10} {:>14}",
            record.recorded_on.to_string(),
            format_measurement(record.weight_kg),
            format_measurement(record.fasting_blood_sugar),
            format_measurement(record.postprandial_blood_sugar),
        );
    }
    Ok(())
}

fn cmd_progress_rollup(paths: &Paths, cleanup: bool) -> Result<()> {
    if !paths.progress_log.exists() {
        println!("No progress log found - nothing to roll up.");
        return Ok(());
    }

    let count = rollup_to_csv(&paths.progress_log, &paths.progress_csv)?;

    println!("✓ Rolled up {} records to CSV", count);
    println!("  CSV: {}", paths.progress_csv.display());

    if cleanup {
        let cleaned = cleanup_processed_logs(&paths.progress_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed progress logs", cleaned);
        }
    }

    Ok(())
}

fn cmd_export(config: &Config, output: PathBuf) -> Result<()> {
    let program = config.build_program()?;
    let rows = export_program_csv(&program, &output)?;

    println!("✓ Exported {} days ({} rows)", program.cycle_length(), rows);
    println!("  CSV: {}", output.display());
    Ok(())
}

fn cmd_config(config: &Config, path: Option<&Path>, save: bool) -> Result<()> {
    if save {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::default_config_path);
        config.save_to(&path)?;
        println!("✓ Saved config to {}", path.display());
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(())
}

fn format_measurement(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".into())
}

fn display_day(day: &ProgramDay, cycle_length: u32, diet: Option<DietType>) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  DAY {} OF {}", day.day_index, cycle_length);
    println!("╰─────────────────────────────────────────╯");

    let diets: Vec<DietType> = match diet {
        Some(d) => vec![d],
        None => DietType::ALL.to_vec(),
    };

    for diet in diets {
        let diet_day = day.diet_variants.get(diet);
        println!();
        println!(
            "  {} ({}, {} cal)",
            diet,
            diet_day.cuisine_style,
            diet_day.total_calories()
        );
        for meal in &diet_day.meals {
            println!(
                "  → {}: {} ({} cal)",
                meal.name, meal.recipe, meal.target_calories
            );
        }
    }

    println!();
    println!("  Exercise: {}", day.exercise.name);
    println!(
        "  → {} (≈{} cal burned)",
        day.exercise.description, day.exercise.estimated_calories
    );
    println!();
    println!("  Sleep: {}", day.sleep_tip);
    println!();
}
