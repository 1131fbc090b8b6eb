use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use recitation_tracker::config::Config;
use recitation_tracker::rubric::ReviewLevel;
use recitation_tracker::session::ScoringSession;
use recitation_tracker::storage::JsonFileStore;
use recitation_tracker::student::StudentRecord;
use recitation_tracker::tracker::{SaveError, Tracker};
use recitation_tracker::{output, report, rubric, tui};

const EXIT_SUCCESS: i32 = 0;
const EXIT_STORAGE: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive terminal UI (default if no subcommand)
    Tui,
    /// List students with session count and average
    List,
    /// Add a student
    Add {
        /// Student name
        name: String,
    },
    /// Show a student's details and session history
    Show {
        /// Student id or name
        student: String,
    },
    /// Print a rubric with its categories, points and hints
    Rubric {
        /// basic or advanced (defaults to the configured level)
        level: Option<ReviewLevel>,
    },
    /// Score a recitation session and append it to a student
    Score {
        /// Student id or name
        student: String,
        /// Rubric to score against
        #[arg(long)]
        level: Option<ReviewLevel>,
        /// Surah recited
        #[arg(long, default_value = "")]
        surah: String,
        /// Ayah range, e.g. 1-7
        #[arg(long, default_value = "")]
        ayah: String,
        /// Session date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Teacher notes
        #[arg(long, default_value = "")]
        notes: String,
        /// Sub-score as <category>.<index>=<value>, repeatable
        #[arg(long = "set", value_name = "CATEGORY.INDEX=VALUE")]
        scores: Vec<String>,
    },
    /// Write a report card file for a student
    Report {
        /// Student id or name
        student: String,
    },
    /// Open an email to a student's parent
    Email {
        /// Student id or name
        student: String,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "recitation-tracker")]
#[command(about = "Quran recitation progress tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/recitation-tracker/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);
    let config_path = cli.config.map(PathBuf::from);

    // Init runs before config loading (the file may not exist yet)
    if let Commands::Init = command {
        match recitation_tracker::config::run_init_wizard(config_path) {
            Ok(()) => std::process::exit(EXIT_SUCCESS),
            Err(e) => {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    let config = match recitation_tracker::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let mut errors = Vec::new();
    if let Err(config_errors) = recitation_tracker::config::validate_config(&config) {
        errors.extend(config_errors);
    }
    for definition in rubric::all_rubrics() {
        if let Err(rubric_errors) = rubric::validate_rubric(definition) {
            errors.extend(rubric_errors);
        }
    }
    if !errors.is_empty() {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_path = config.data_path();
    if cli.verbose {
        eprintln!("Data file: {}", data_path.display());
        eprintln!("Default review level: {}", config.default_level());
    }

    let tracker = Tracker::open(Box::new(JsonFileStore::new(&data_path)));
    if cli.verbose {
        eprintln!("Loaded {} students", tracker.students().len());
    }

    let use_colors = output::should_use_colors();

    let code = match command {
        Commands::Tui => {
            let theme = tui::ThemeColors::for_theme(tui::resolve_theme());
            if cli.verbose {
                eprintln!("Launching TUI");
            }
            let app = tui::App::new(tracker, config, theme, cli.verbose);
            match tui::run_tui(app).await {
                Ok(()) => EXIT_SUCCESS,
                Err(e) => {
                    eprintln!("TUI error: {:#}", e);
                    EXIT_STORAGE
                }
            }
        }
        Commands::List => {
            println!("{}", output::format_student_table(tracker.students(), use_colors));
            EXIT_SUCCESS
        }
        Commands::Add { name } => {
            let mut tracker = tracker;
            match tracker.add_student(&name) {
                Ok(Some(id)) => {
                    println!("Added {} (id {})", name.trim(), id);
                    EXIT_SUCCESS
                }
                Ok(None) => {
                    eprintln!("Name is empty; nothing added");
                    EXIT_SUCCESS
                }
                Err(e) => report_save_error(&e),
            }
        }
        Commands::Show { student } => match find_student(&tracker, &student) {
            Some(s) => {
                println!("{}", output::format_student_detail(s, use_colors));
                println!();
                println!("{}", output::format_session_history(s, use_colors));
                EXIT_SUCCESS
            }
            None => EXIT_CONFIG,
        },
        Commands::Rubric { level } => {
            let definition = rubric::select_rubric(level.unwrap_or(config.default_level()));
            println!("{}", output::format_rubric(definition, use_colors));
            EXIT_SUCCESS
        }
        Commands::Score {
            student,
            level,
            surah,
            ayah,
            date,
            notes,
            scores,
        } => {
            let mut tracker = tracker;
            let Some(id) = find_student(&tracker, &student).map(|s| s.id()) else {
                std::process::exit(EXIT_CONFIG);
            };

            let mut session = ScoringSession::new(level.unwrap_or(config.default_level()));
            if let Some(date) = date {
                session.set_date(date.to_string());
            }
            session.set_surah(surah);
            session.set_ayah_range(ayah);
            session.set_notes(notes);
            session.begin_scoring();

            for arg in &scores {
                let Some((category, index, value)) = parse_score_arg(arg) else {
                    eprintln!("Invalid --set '{}': expected <category>.<index>=<value>", arg);
                    std::process::exit(EXIT_CONFIG);
                };
                match session.set_score(category, index, value) {
                    Ok(stored) => {
                        if cli.verbose {
                            eprintln!("  {}.{} = {}", category, index, stored);
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                }
            }

            println!("{}", output::format_breakdown(&session.breakdown(), use_colors));
            let record = session.finalize();
            match tracker.record_session(id, record) {
                Ok(()) => {
                    if let Some(s) = tracker.student(id) {
                        println!(
                            "Saved. {} now has {} sessions, average {}%",
                            s.name(),
                            s.sessions().len(),
                            output::format_average(s.average_score())
                        );
                    }
                    EXIT_SUCCESS
                }
                Err(e) => report_save_error(&e),
            }
        }
        Commands::Report { student } => match find_student(&tracker, &student) {
            Some(s) => match report::print_report_card(s, &config.report_dir()) {
                Ok(path) => {
                    println!("Report written to {}", path.display());
                    EXIT_SUCCESS
                }
                Err(e) => {
                    eprintln!("Failed to print report: {:#}", e);
                    EXIT_STORAGE
                }
            },
            None => EXIT_CONFIG,
        },
        Commands::Email { student } => match find_student(&tracker, &student) {
            Some(s) => email_parent(s, &config, cli.verbose),
            None => EXIT_CONFIG,
        },
        Commands::Init => EXIT_SUCCESS,
    };

    std::process::exit(code);
}

/// Resolve an id or name, printing the lookup error
fn find_student<'a>(tracker: &'a Tracker, reference: &str) -> Option<&'a StudentRecord> {
    match tracker.roster().find(reference) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    }
}

fn email_parent(student: &StudentRecord, config: &Config, verbose: bool) -> i32 {
    let recipient = config.parent_email(student.name());
    if recipient.is_none() {
        eprintln!("No parent email configured for {}", student.name());
    }
    // Not fatal: the URL is printed so it can be opened by hand
    match report::send_email_to_parent(student, recipient) {
        Ok(url) => {
            if verbose {
                eprintln!("Opened {}", url);
            }
            println!("Opened email for {}", student.name());
        }
        Err(e) => {
            eprintln!("{:#}", e);
            println!("{}", report::build_mailto(student, recipient));
        }
    }
    EXIT_SUCCESS
}

fn report_save_error(e: &SaveError) -> i32 {
    match e {
        SaveError::Persist(err) => {
            eprintln!("Failed to save data: {:#}", err);
            EXIT_STORAGE
        }
        SaveError::Roster(err) => {
            eprintln!("{}", err);
            EXIT_CONFIG
        }
    }
}

/// Parse `<category>.<index>=<value>`. The value is kept as text and goes
/// through the same lenient parse and clamp as interactive input.
fn parse_score_arg(arg: &str) -> Option<(&str, usize, &str)> {
    let (target, value) = arg.split_once('=')?;
    let (category, index) = target.trim().rsplit_once('.')?;
    let index = index.parse().ok()?;
    if category.is_empty() {
        return None;
    }
    Some((category, index, value))
}
