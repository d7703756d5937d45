use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use sf_core::SessionEngine;
use sf_db::Database;
use tracing_subscriber::EnvFilter;

use sf_cli::commands::{gesture, plan, run, session, status, tasks, traces, util};
use sf_cli::{Cli, Commands, Config};

/// Load config, open the database and restore the engine as of `now`.
///
/// The engine is ticked once so a running manual block is up to date before
/// any command looks at it.
fn open_engine(
    config_path: Option<&Path>,
    now_override: Option<&str>,
) -> Result<(SessionEngine<Database>, DateTime<Utc>)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let engine_config = config.engine_config()?;

    let now = match now_override {
        Some(value) => util::parse_datetime(value, Utc::now(), &engine_config.clock)
            .context("invalid --now")?,
        None => Utc::now(),
    };

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let mut engine = SessionEngine::restore(db, engine_config, now);
    engine.tick_at(now);
    Ok((engine, now))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut engine, now) = open_engine(cli.config.as_deref(), cli.now.as_deref())?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Status { json } => status::run(&mut out, &engine, now, *json)?,
        Commands::Tap => gesture::tap(&mut out, &mut engine, now)?,
        Commands::Pause => gesture::pause(&mut out, &mut engine, now)?,
        Commands::Resume => gesture::resume(&mut out, &mut engine, now)?,
        Commands::Drag { dy } => gesture::drag(&mut out, &mut engine, *dy, now)?,
        Commands::Transition { state } => session::transition(&mut out, &mut engine, *state, now)?,
        Commands::Close => session::close(&mut out, &mut engine, now)?,
        Commands::Reset => session::reset(&mut out, &mut engine, now)?,
        Commands::SelectDate { date } => {
            let date = util::parse_date(date, now, engine.clock())?;
            session::select_date(&mut out, &mut engine, date)?;
        }
        Commands::Plan(args) => plan::run(&mut out, &mut engine, args, now)?,
        Commands::Tasks(action) => tasks::run(&mut out, &mut engine, action, now)?,
        Commands::Traces(action) => traces::run(&mut out, &mut engine, action, now)?,
        Commands::Run { close_on_exit } => run::run(&mut out, &mut engine, *close_on_exit)?,
    }

    Ok(())
}
