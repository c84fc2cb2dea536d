//! Habit-tracking CLI with LLM-generated motivational tips.
//!
//! Reads the API key for `motivate` from the `OPENROUTER_KEY` environment
//! variable. All other commands are fully offline.
//!
//! # Examples
//!
//! ```sh
//! # Log a habit (status defaults to "Completed")
//! habitify log Exercise
//! habitify log Meditate --status Skipped
//!
//! # View everything, or one habit
//! habitify view
//! habitify view --habit Exercise
//!
//! # Delete all entries for a habit, or one entry by id
//! habitify delete Exercise
//! habitify delete --id 3
//!
//! # Get a motivational tip
//! habitify motivate Exercise
//! ```

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use habitify::{
    CoachConfig, CompletionClient, Error, HabitLog, Selector, TipGenerator,
};

/// Habit-tracking CLI with LLM-generated motivational tips.
#[derive(Parser)]
#[command(name = "habitify", version)]
struct Cli {
    /// Path to the habit events file.
    #[arg(long, global = true, default_value = ".habitify/events.jsonl")]
    data_file: PathBuf,

    /// Enable debug logging to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log a new habit event.
    Log {
        /// Name of the habit.
        habit_name: String,

        /// Status label for this entry. Any non-empty text is accepted.
        #[arg(long, default_value = "Completed")]
        status: String,
    },

    /// List logged habit events in logging order.
    View {
        /// Only show events for this habit (exact, case-sensitive match).
        #[arg(long)]
        habit: Option<String>,
    },

    /// Delete habit events: all entries for a habit, or one entry by id.
    Delete {
        /// Habit name — removes every entry for that habit.
        #[arg(required_unless_present = "id", conflicts_with = "id")]
        habit_name: Option<String>,

        /// Event id — removes that single entry.
        #[arg(long)]
        id: Option<u64>,
    },

    /// Generate a motivational tip for a habit.
    Motivate {
        /// Name of the habit.
        habit_name: String,

        /// Model to use for generation.
        #[arg(long, default_value = habitify::DEFAULT_MODEL)]
        model: String,

        /// Maximum tokens the model may produce.
        #[arg(long, default_value_t = 96)]
        max_tokens: u32,

        /// Sampling temperature.
        #[arg(long, default_value_t = 0.7)]
        temperature: f32,

        /// Deadline in seconds for each generation call.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

/// Map an error kind to the process exit code. Each kind gets a distinct
/// code so scripts can tell a bad argument from a broken data file from a
/// failed model call.
fn exit_code(err: &Error) -> i32 {
    match err {
        Error::Validation(_) => 2,
        Error::Storage { .. } | Error::StorageCorrupt { .. } => 3,
        Error::Generation(_) => 4,
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Log { habit_name, status } => {
            let log = HabitLog::open(&cli.data_file)?;
            let event = log.log(&habit_name, &status)?;
            println!(
                "Habit '{}' logged with status: {}",
                event.habit_name, event.status
            );
        }

        Command::View { habit } => {
            let log = HabitLog::open(&cli.data_file)?;
            let events = log.view(habit.as_deref())?;
            for event in &events {
                println!(
                    "{:>4}  {}  {}: {}",
                    event.id,
                    event.timestamp.format("%Y-%m-%d"),
                    event.habit_name,
                    event.status
                );
            }
            if events.is_empty() {
                eprintln!("No habit events found.");
            }
        }

        Command::Delete { habit_name, id } => {
            let log = HabitLog::open(&cli.data_file)?;
            let selector = match (habit_name, id) {
                (_, Some(id)) => Selector::ById(id),
                (Some(name), None) => Selector::ByName(name),
                (None, None) => unreachable!("clap requires a selector"),
            };
            let removed = log.delete(&selector)?;
            match removed {
                0 => println!("No matching events."),
                n => println!("Removed {n} event(s)."),
            }
        }

        Command::Motivate {
            habit_name,
            model,
            max_tokens,
            temperature,
            timeout_secs,
        } => {
            let api_key = match std::env::var("OPENROUTER_KEY") {
                Ok(key) => key,
                Err(_) => {
                    eprintln!("Error: OPENROUTER_KEY environment variable is not set");
                    process::exit(1);
                }
            };

            // Built once per process; the reqwest pool is the expensive
            // model handle and lives behind the generator.
            let client = CompletionClient::new(api_key, &model)?;

            let config = CoachConfig {
                model,
                max_tokens,
                temperature,
                timeout: Duration::from_secs(timeout_secs),
                ..CoachConfig::default()
            };

            let generator = TipGenerator::new(&client, config);
            let tip = generator.generate(&habit_name).await?;
            println!("Motivational tip for '{habit_name}': {tip}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(exit_code(&e));
    }
}
