use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use syncsched::domain::{ConditionRating, Priority, SchedulingStats, SyncDecision};
use syncsched::engine::{Clock, SystemClock, active_window};
use syncsched::providers::FixedConditions;
use syncsched::stats::StatsTracker;
use syncsched::storage::{MemoryStore, SqliteStore};
use syncsched::transport::QueueTransport;
use syncsched::Scheduler;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, ConditionArgs};
use config::Config;

/// Pick the log filter: RUST_LOG wins, then --verbose, then the config file
fn log_filter(rust_log: Option<String>, verbose: bool, configured: Option<&str>) -> String {
    match rust_log {
        Some(filter) if !filter.trim().is_empty() => filter,
        _ if verbose => "debug".to_string(),
        _ => configured.unwrap_or("info").to_string(),
    }
}

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("syncsched")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("syncsched.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let filter = log_filter(std::env::var("RUST_LOG").ok(), verbose, config.log_level.as_deref());
    env_logger::Builder::new()
        .parse_filters(&filter)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized at '{}', writing to: {}", filter, log_file.display());
    Ok(())
}

fn rating_label(rating: ConditionRating) -> ColoredString {
    match rating {
        ConditionRating::Good => rating.as_str().green(),
        ConditionRating::Acceptable => rating.as_str().yellow(),
        ConditionRating::Poor => rating.as_str().red(),
    }
}

fn print_decision(decision: &SyncDecision) {
    let verdict = if decision.should_sync {
        "SYNC".green().bold()
    } else {
        "WAIT".red().bold()
    };
    println!("{} {} ({}% confidence)", verdict, decision.reason, decision.confidence);
    if decision.suggested_delay_ms > 0 {
        println!("  Suggested delay: {}s", decision.suggested_delay_ms / 1000);
    }
    println!(
        "  battery={} network={} activity={} performance={}",
        rating_label(decision.conditions.battery),
        rating_label(decision.conditions.network),
        rating_label(decision.conditions.activity),
        rating_label(decision.conditions.performance)
    );
    for rec in &decision.recommendations {
        println!("  - {}", rec);
    }
}

fn print_stats(stats: &SchedulingStats) {
    println!("{}", "Scheduling stats".cyan().bold());
    println!("  Total decisions: {}", stats.total_decisions);
    println!("  Approved:        {}", stats.sync_approved);
    println!("  Delayed:         {}", stats.sync_delayed);
    println!("  Denied:          {}", stats.sync_denied);
    println!("  Approval rate:   {:.1}%", stats.approval_rate() * 100.0);
    println!("  Average delay:   {:.0}ms", stats.average_delay_ms);
    let b = &stats.condition_breakdown;
    println!(
        "  Blocks: battery={} network={} activity={} performance={}",
        b.battery_blocks, b.network_blocks, b.activity_blocks, b.performance_blocks
    );
}

async fn handle_evaluate(conditions: &ConditionArgs, priority: Priority, json: bool, config: &Config) -> Result<()> {
    info!("Evaluating single decision at {} priority", priority.as_str());
    let scheduler = Scheduler::builder(
        Arc::new(FixedConditions::new(conditions.to_conditions())),
        Arc::new(QueueTransport::new(0)),
        Arc::new(MemoryStore::new()),
    )
    .config(config.scheduling.clone())
    .options(config.scheduler.clone())
    .build()
    .context("Failed to build scheduler")?;

    let decision = scheduler.make_sync_decision(priority).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        print_decision(&decision);
    }
    Ok(())
}

fn handle_window(config: &Config) -> Result<()> {
    let now = SystemClock.now();
    info!("Looking up active window at {}", now);
    match active_window(&now, &config.scheduling.schedule_windows) {
        Some(window) => {
            println!(
                "{} {} ({:02}:00-{:02}:00, {} priority)",
                "Active window:".green(),
                window.name,
                window.start_hour,
                window.end_hour,
                window.priority.as_str()
            );
        }
        None => println!("{}", "No schedule window active".yellow()),
    }
    Ok(())
}

async fn handle_run(
    conditions: &ConditionArgs,
    ticks: u32,
    queued: u64,
    interval_ms: Option<u64>,
    config: &Config,
) -> Result<()> {
    let mut options = config.scheduler.clone();
    if let Some(ms) = interval_ms {
        options.tick_interval = Duration::from_millis(ms);
    }
    let interval = options.tick_interval;
    info!("Running scheduler for {} ticks every {:?}", ticks, interval);

    let store = SqliteStore::open(&config.storage.stats_db)
        .with_context(|| format!("Failed to open stats store {}", config.storage.stats_db.display()))?;
    let transport = Arc::new(QueueTransport::new(queued));

    let scheduler = Scheduler::builder(
        Arc::new(FixedConditions::new(conditions.to_conditions())),
        transport.clone(),
        Arc::new(store),
    )
    .config(config.scheduling.clone())
    .options(options)
    .build()
    .context("Failed to build scheduler")?;

    let subscription = scheduler.on_sync_decision(print_decision);

    scheduler.start().await.context("Failed to start scheduler")?;
    println!("{} {} ticks every {:?}", "Running:".cyan(), ticks, interval);
    tokio::time::sleep(interval * ticks + interval / 2).await;
    scheduler.stop().await;
    subscription.unsubscribe();

    let tick_state = scheduler.tick_state();
    println!(
        "{} {} ticks, {} syncs started, {} failed, {} operations still queued",
        "Done:".green(),
        tick_state.tick_count,
        tick_state.syncs_triggered,
        tick_state.trigger_failures,
        transport.queued()
    );
    print_stats(&scheduler.get_stats());
    Ok(())
}

fn open_tracker(config: &Config) -> Result<(SqliteStore, StatsTracker)> {
    let store = SqliteStore::open(&config.storage.stats_db)
        .with_context(|| format!("Failed to open stats store {}", config.storage.stats_db.display()))?;
    let mut tracker = StatsTracker::new();
    tracker.load(&store).context("Failed to load stats")?;
    Ok((store, tracker))
}

fn handle_stats(config: &Config) -> Result<()> {
    let (_store, tracker) = open_tracker(config)?;
    print_stats(&tracker.snapshot());
    Ok(())
}

fn handle_reset_stats(config: &Config) -> Result<()> {
    let (store, mut tracker) = open_tracker(config)?;
    tracker.reset();
    tracker.save(&store).context("Failed to save stats")?;
    info!("Stats reset in {}", config.storage.stats_db.display());
    println!("{}", "Stats reset".green());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Evaluate {
            conditions,
            priority,
            json,
        } => handle_evaluate(conditions, *priority, *json, config).await,
        Commands::Window => handle_window(config),
        Commands::Run {
            conditions,
            ticks,
            queued,
            interval_ms,
        } => handle_run(conditions, *ticks, *queued, *interval_ms, config).await,
        Commands::Stats => handle_stats(config),
        Commands::ResetStats => handle_reset_stats(config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Logging level comes from the flags and config, so it starts after both
    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
