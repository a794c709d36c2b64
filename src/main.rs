use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use studyplan::domain::{StudySession, StudyWindow, TermData};
use studyplan::engine::{Resolution, ScheduleOutcome, generate_study_sessions};
use studyplan::planner::{self, PlanReport};
use studyplan::store::TermStore;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studyplan")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("studyplan.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the config file
    let env = env_logger::Env::default().default_filter_or(log_level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn open_store(cli: &Cli, config: &Config) -> Result<TermStore> {
    let path = cli.db.as_ref().unwrap_or(&config.storage.db_path);
    info!("Opening store at {}", path.display());
    TermStore::open_at(path)
}

fn read_term_file(path: &Path) -> Result<TermData> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read term file {}", path.display()))?;

    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let data: TermData = if is_json {
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?
    };

    data.validate()?;
    Ok(data)
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let window = config.schedule.study_window()?;

    match &cli.command {
        Commands::Import { file } => handle_import_command(file, cli, config),
        Commands::Schedule { term_id, dry_run } => handle_schedule_command(term_id, *dry_run, &window, cli, config),
        Commands::Sessions { term_id, json } => handle_sessions_command(term_id, *json, cli, config),
        Commands::Terms => handle_terms_command(cli, config),
        Commands::Solve { file, json } => handle_solve_command(file, *json, &window, cli.is_verbose()),
    }
}

fn handle_import_command(file: &Path, cli: &Cli, config: &Config) -> Result<()> {
    info!("Importing term file: {}", file.display());
    let data = read_term_file(file)?;
    let mut store = open_store(cli, config)?;
    store.import_term(&data)?;

    let assignments = data.assignments().count();
    let meetings = data.meetings().count();
    println!(
        "{} term {} ({} courses, {} meetings, {} assignments)",
        "Imported:".green(),
        data.term.id.bold(),
        data.courses.len(),
        meetings,
        assignments
    );
    Ok(())
}

fn handle_schedule_command(term_id: &str, dry_run: bool, window: &StudyWindow, cli: &Cli, config: &Config) -> Result<()> {
    info!("Scheduling term {} (dry run: {})", term_id, dry_run);
    let mut store = open_store(cli, config)?;

    let report = if dry_run {
        let outcome = planner::preview_term(&store, term_id, window)?;
        if cli.is_verbose() {
            print_sessions(&outcome.sessions);
        }
        planner::dry_run_report(&outcome)
    } else {
        planner::plan_term(&mut store, term_id, window)?
    };

    print_report(&report);
    Ok(())
}

fn handle_sessions_command(term_id: &str, json: bool, cli: &Cli, config: &Config) -> Result<()> {
    info!("Listing sessions for term {}", term_id);
    let store = open_store(cli, config)?;
    let sessions = store.list_sessions(term_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
    } else if sessions.is_empty() {
        println!("{} no sessions for term {}", "Empty:".yellow(), term_id);
    } else {
        print_sessions(&sessions);
    }
    Ok(())
}

fn handle_terms_command(cli: &Cli, config: &Config) -> Result<()> {
    let store = open_store(cli, config)?;
    let terms = store.list_terms()?;
    if terms.is_empty() {
        println!("{}", "No terms imported".yellow());
    }
    for term in terms {
        let sessions = store.count_sessions(&term.id)?;
        println!(
            "{}  {} .. {}  {}  {} sessions",
            term.id.bold(),
            term.start_date,
            term.end_date,
            term.timezone.dimmed(),
            sessions
        );
    }
    Ok(())
}

fn handle_solve_command(file: &Path, json: bool, window: &StudyWindow, verbose: bool) -> Result<()> {
    info!("Solving term file: {}", file.display());
    let data = read_term_file(file)?;
    let outcome: ScheduleOutcome = generate_study_sessions(&data, window)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if verbose {
        print_sessions(&outcome.sessions);
    }
    print_report(&planner::dry_run_report(&outcome));
    Ok(())
}

fn print_sessions(sessions: &[StudySession]) {
    let mut current_day = None;
    for session in sessions {
        if current_day != Some(session.day()) {
            current_day = Some(session.day());
            println!("{}", session.day().format("%a %Y-%m-%d").to_string().cyan());
        }
        println!(
            "  {}-{}  {}",
            session.start.format("%H:%M"),
            session.end.format("%H:%M"),
            session.assignment_id
        );
    }
}

fn print_report(report: &PlanReport) {
    let status = match &report.resolution {
        Resolution::NothingToSchedule => "nothing to schedule".normal(),
        Resolution::Greedy => "fully allocated".green(),
        Resolution::Optimized { .. } => "fully allocated (optimized)".green(),
        Resolution::Infeasible { .. } => "infeasible".red(),
    };

    println!("{} {}: {}", "Term".bold(), report.term_id, status);
    println!("  sessions:      {}", report.session_count);
    println!("  busiest day:   {}", report.max_day_load);
    if let Resolution::Infeasible { reason } = &report.resolution {
        println!("  reason:        {}", reason);
    }
    if !report.persisted {
        println!("  {}", "(not persisted)".dimmed());
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the configured level is known
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
