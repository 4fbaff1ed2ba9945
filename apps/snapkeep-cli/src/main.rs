use std::io::Read;
use std::path::PathBuf;

use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use snapkeep_core::SnapshotLogSettings;
use snapkeep_store::SnapshotLog;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snapkeep", about = "Versioned snapshot logs with tiered retention")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the snapshot files
    #[arg(long, default_value = "./snapshots")]
    dir: PathBuf,

    /// Name of the snapshot log
    #[arg(long, default_value = "snapshot")]
    log: String,

    /// Newest snapshots always kept, regardless of age
    #[arg(long, default_value = "5")]
    keep_at_least: usize,

    /// Hours within which every snapshot is kept
    #[arg(long, default_value = "24")]
    preserve_all_hours: i64,

    /// Hours within which at most one snapshot per hour is kept
    #[arg(long, default_value = "168")]
    preserve_hourly_hours: i64,

    /// Hours within which at most one snapshot per day is kept
    #[arg(long, default_value = "720")]
    preserve_daily_hours: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a new snapshot from a JSON file, or from stdin when no file
    /// is given
    Save {
        /// File containing the JSON payload
        input: Option<PathBuf>,
    },
    /// Print the snapshot stored under a name
    Load { name: String },
    /// Print the most recent snapshot
    Latest,
    /// List all snapshot names, newest last
    List,
    /// Delete one snapshot
    Delete { name: String },
    /// Delete every snapshot of the log
    Purge,
    /// Delete snapshots the retention policy no longer wants
    Prune,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = SnapshotLogSettings::new(&cli.log)
        .with_min_keep_count(cli.keep_at_least)
        .with_preserve_all_within(TimeDelta::hours(cli.preserve_all_hours))
        .with_preserve_hourly_within(TimeDelta::hours(cli.preserve_hourly_hours))
        .with_preserve_daily_within(TimeDelta::hours(cli.preserve_daily_hours));
    let log: SnapshotLog<serde_json::Value> = SnapshotLog::file(settings, &cli.dir)?;

    match cli.command {
        Commands::Save { input } => {
            let text = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let value: serde_json::Value = serde_json::from_str(&text)?;
            let name = log.save(&value)?;
            println!("{name}");
        }
        Commands::Load { name } => {
            let value = log.load(&name)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Latest => match log.latest_name()? {
            Some(name) => {
                let value = log.load(&name)?;
                println!("{name}");
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            None => println!("(no snapshots)"),
        },
        Commands::List => {
            let mut names = log.names()?;
            names.sort();
            for name in names {
                println!("{name}");
            }
        }
        Commands::Delete { name } => {
            log.delete(&name)?;
            println!("deleted {name}");
        }
        Commands::Purge => {
            let count = log.names()?.len();
            log.delete_all()?;
            println!("deleted {count} snapshot(s)");
        }
        Commands::Prune => {
            let pruned = log.prune()?;
            println!("pruned {} snapshot(s)", pruned.len());
            for name in pruned {
                println!("  {name}");
            }
        }
    }

    Ok(())
}
