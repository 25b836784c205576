//! nudged - The nudge reminder service
//!
//! Wires the components together:
//! - Configuration loading
//! - Store initialization
//! - Reminder manager
//! - Delivery scheduler
//!
//! Besides `run`, a handful of operator subcommands act on the store directly.

mod delivery;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use delivery::{StdoutNotifier, UnconfiguredResponder};
use nudge_config::{ServiceConfig, load_or_default};
use nudge_core::{
    ListFilter, NewReminder, Recurrence, Reminder, ReminderKind, ReminderManager, Scheduler,
    describe_recurrence, render,
};
use nudge_notify::AiRole;
use nudge_store::{SqliteStore, Store};
use nudge_util::{OwnerId, ReminderId, default_config_path, format_date, format_time};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// nudged - Scheduled reminders with optional AI answers
#[derive(Parser, Debug)]
#[command(name = "nudged")]
#[command(about = "Scheduled reminder service", long_about = None)]
struct Cli {
    /// Configuration file path (default: ~/.config/nudge/config.toml)
    #[arg(short, long, global = true, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set NUDGE_DATA_DIR env var)
    #[arg(short, long, global = true, env = "NUDGE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scheduler until SIGINT or SIGTERM
    Run,
    /// Deliver everything due right now, once
    Tick,
    /// Create a reminder
    Add(AddArgs),
    /// List an owner's reminders
    List {
        #[arg(long)]
        owner: i64,
        /// Include deleted and already delivered reminders
        #[arg(long)]
        all: bool,
    },
    /// Show one reminder as it would be delivered
    Show { id: ReminderId },
    /// Delete a reminder on behalf of its owner
    Delete {
        id: ReminderId,
        #[arg(long)]
        owner: i64,
    },
    /// List owners with reminders
    Owners,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    owner: i64,

    #[arg(long)]
    title: String,

    /// Text shown with a plain reminder
    #[arg(long, conflicts_with = "prompt")]
    description: Option<String>,

    /// Ask the AI responder this at fire time instead of sending plain text
    #[arg(long)]
    prompt: Option<String>,

    /// AI persona (assistant, scientist, creative, developer)
    #[arg(long, requires = "prompt")]
    role: Option<String>,

    /// First firing date, YYYY-MM-DD (default: today in the service offset)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Time of day, HH:MM
    #[arg(long, value_parser = parse_time)]
    time: NaiveTime,

    #[arg(long, value_enum, default_value_t = Repeat::None)]
    repeat: Repeat,

    /// Repeat every N units
    #[arg(long, default_value_t = 1)]
    every: u32,

    /// Day of month for monthly reminders
    #[arg(long)]
    month_day: Option<u32>,

    /// Weekday indices, 0 = Monday
    #[arg(long, value_delimiter = ',')]
    weekdays: Option<Vec<u8>>,

    /// Last date a recurring reminder may fire
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Stop after this many firings
    #[arg(long)]
    max: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Repeat {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<Repeat> for Recurrence {
    fn from(repeat: Repeat) -> Self {
        match repeat {
            Repeat::None => Recurrence::None,
            Repeat::Daily => Recurrence::Daily,
            Repeat::Weekly => Recurrence::Weekly,
            Repeat::Monthly => Recurrence::Monthly,
            Repeat::Yearly => Recurrence::Yearly,
        }
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| format!("expected HH:MM: {e}"))
}

impl AddArgs {
    fn into_new_reminder(self) -> NewReminder {
        let owner = OwnerId::new(self.owner);
        let date = self.date.unwrap_or_else(nudge_util::today);
        let mut new = match self.prompt {
            Some(prompt) => NewReminder::ai_query(
                owner,
                self.title,
                prompt,
                AiRole::parse_or_default(self.role.as_deref().unwrap_or_default()),
                date,
                self.time,
            ),
            None => NewReminder::simple(
                owner,
                self.title,
                self.description.unwrap_or_default(),
                date,
                self.time,
            ),
        }
        .repeating(self.repeat.into(), self.every);

        if let Some(day) = self.month_day {
            new = new.on_month_day(day);
        }
        if let Some(days) = self.weekdays {
            new = new.on_weekdays(days);
        }
        if let Some(end) = self.until {
            new = new.until(end);
        }
        if let Some(max) = self.max {
            new = new.max_occurrences(max);
        }
        new
    }
}

/// Open the store and build the manager from resolved configuration
fn open_manager(cli: &Cli) -> Result<(ServiceConfig, Arc<ReminderManager>)> {
    let mut config = load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", config.data_dir))?;

    let db_path = config.database_path();
    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?,
    );

    info!(db_path = %db_path.display(), "Store initialized");

    let manager = Arc::new(ReminderManager::new(store));
    Ok((config, manager))
}

fn build_scheduler(config: &ServiceConfig, manager: Arc<ReminderManager>) -> Scheduler {
    Scheduler::new(
        manager,
        Arc::new(StdoutNotifier),
        Arc::new(UnconfiguredResponder),
        config.scheduler.tick_interval,
    )
}

async fn run(config: ServiceConfig, manager: Arc<ReminderManager>) -> Result<()> {
    if !config.scheduler.enabled {
        warn!("Scheduler disabled in configuration, nothing to run");
        return Ok(());
    }

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

    let scheduler = build_scheduler(&config, manager);
    scheduler.start();

    info!("Service running");

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
        _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
    }

    scheduler.stop().await;
    info!("Shutdown complete");
    Ok(())
}

fn print_summary(reminder: &Reminder) {
    let state = if !reminder.is_active {
        "inactive"
    } else if reminder.is_sent {
        "sent"
    } else {
        "pending"
    };
    let kind = match reminder.kind {
        ReminderKind::Simple { .. } => "simple",
        ReminderKind::AiQuery { .. } => "ai",
    };
    println!(
        "{}  {} {}  {:<8} {:<6} {}  [{}]",
        reminder.id,
        format_date(&reminder.anchor()),
        format_time(&reminder.remind_time),
        state,
        kind,
        reminder.title,
        describe_recurrence(reminder)
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if nudge_util::is_mock_time_active() {
        warn!(now = %nudge_util::now(), "Mock time is active");
    }

    let (config, manager) = open_manager(&cli)?;

    match cli.command {
        Command::Run => {
            info!(version = env!("CARGO_PKG_VERSION"), "nudged starting");
            run(config, manager).await?;
        }
        Command::Tick => {
            let report = build_scheduler(&config, manager).tick(nudge_util::now()).await;
            println!(
                "due: {}, delivered: {}, failed: {}",
                report.due, report.delivered, report.failed
            );
        }
        Command::Add(args) => {
            let id = manager.create(args.into_new_reminder())?;
            println!("{id}");
        }
        Command::List { owner, all } => {
            let filter = if all { ListFilter::ALL } else { ListFilter::UPCOMING };
            for reminder in manager.list_for_owner(OwnerId::new(owner), filter) {
                print_summary(&reminder);
            }
        }
        Command::Show { id } => {
            let Some(reminder) = manager.get(&id) else {
                bail!("Reminder {id} not found");
            };
            print_summary(&reminder);
            println!();
            match &reminder.kind {
                ReminderKind::Simple { .. } => println!("{}", render::simple_message(&reminder)),
                ReminderKind::AiQuery { prompt, role } => {
                    println!("AI query ({role}): {prompt}");
                    if let Some(next) = render::upcoming_occurrence(&reminder) {
                        println!("Following occurrence: {}", format_date(&next));
                    }
                }
            }
        }
        Command::Delete { id, owner } => {
            manager.remove(&id, OwnerId::new(owner))?;
            println!("Deleted {id}");
        }
        Command::Owners => {
            for owner in manager.owners() {
                println!("{owner}");
            }
        }
    }

    Ok(())
}
