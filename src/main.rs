mod commands;
mod sync;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use stride_core::{
    config::{self, Config},
    model::Priority,
    traits::ReminderStore,
};
use stride_remote::{Catalog, HttpStore, MemoryStore};
use sync::{SyncCoordinator, SyncEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stride",
    version,
    about = "Stride: priority reminders and undoable history for your fitness tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List reminders, most urgent first.
    List,
    /// Add a reminder.
    Add {
        /// Priority from 1 (low) to 10 (urgent).
        #[arg(short, long)]
        priority: i64,
        /// Reminder text.
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Show the action history.
    History,
    /// Undo the most recent action.
    Undo,
    /// Search exercises and foods.
    Search {
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,
    },
    /// Interactive shell with live search.
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_logging(&cfg)?;

    let store = build_store(&cfg)?;
    let (coord, mut events) = SyncCoordinator::new(store, &cfg);

    match cli.command {
        Commands::List => {
            coord.start().await?;
            println!("{}", commands::render_queue(&coord.queue_view()));
        }
        Commands::Add { priority, text } => {
            let priority = Priority::new(priority)?;
            let text = text.join(" ");
            let out = coord.submit(priority, &text).await?;
            println!(
                "Added {} (p{priority}, {}): {}",
                out.id,
                out.kind.as_str(),
                text.trim()
            );
            if let Some(link) = out.link {
                println!("  tutorial: {link}");
            }
            if !out.history_synced {
                warn!("reminder saved but its history entry was not");
            }
        }
        Commands::History => {
            coord.start().await?;
            println!("{}", commands::render_history(&coord.history_view()));
        }
        Commands::Undo => {
            println!("{}", commands::handle_undo(&coord).await);
        }
        Commands::Search { query } => {
            let query = query.join(" ");
            let seq = coord.keystroke(&query);
            let names = wait_for_suggestions(&mut events, seq).await?;
            println!("{}", commands::render_suggestions(&query, &names));
        }
        Commands::Shell => {
            run_shell(&cfg, &coord, events).await?;
        }
    }

    coord.shutdown();
    Ok(())
}

/// Stderr logging filtered by `RUST_LOG` or the configured level, plus a
/// daily rolling file when enabled. The returned guard flushes the file
/// writer on drop.
fn init_logging(cfg: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.stride.log_level));

    let (file_layer, guard) = if cfg.stride.log_to_file {
        let log_dir = std::path::Path::new(&config::shellexpand(&cfg.stride.data_dir)).join("logs");
        std::fs::create_dir_all(&log_dir)?;
        let appender = tracing_appender::rolling::daily(&log_dir, "stride.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(guard)
}

/// Build the configured reminder store.
fn build_store(cfg: &Config) -> anyhow::Result<Arc<dyn ReminderStore>> {
    match cfg.remote.backend.as_str() {
        "http" => Ok(Arc::new(HttpStore::from_config(
            &cfg.remote,
            cfg.search.scope,
        )?)),
        "memory" => Ok(Arc::new(MemoryStore::new(
            Catalog::default(),
            cfg.search.scope,
        ))),
        other => anyhow::bail!("unsupported backend: {other}"),
    }
}

/// Wait until the search with sequence `seq` is applied or fails.
async fn wait_for_suggestions(
    events: &mut UnboundedReceiver<SyncEvent>,
    seq: u64,
) -> anyhow::Result<Vec<String>> {
    while let Some(event) = events.recv().await {
        match event {
            SyncEvent::SuggestionsApplied { seq: s, names, .. } if s == seq => return Ok(names),
            SyncEvent::SuggestionsFailed { seq: s, reason } if s == seq => {
                anyhow::bail!("search failed: {reason}")
            }
            _ => {}
        }
    }
    anyhow::bail!("sync session closed before search {seq} finished")
}

async fn run_shell(
    cfg: &Config,
    coord: &SyncCoordinator,
    mut events: UnboundedReceiver<SyncEvent>,
) -> anyhow::Result<()> {
    if let Err(e) = coord.start().await {
        warn!("initial load failed, starting empty: {e}");
    }
    println!("{}: type /help for commands", cfg.stride.name);
    println!("{}", commands::render_queue(&coord.queue_view()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match commands::Command::parse(&line) {
                    Some(commands::Command::Quit) => break,
                    // Remote-bound commands run in the background so the
                    // prompt stays live while they settle.
                    Some(
                        cmd @ (commands::Command::Add(_)
                        | commands::Command::Undo
                        | commands::Command::Refresh),
                    ) => {
                        let coord = coord.clone();
                        tokio::spawn(async move {
                            println!("{}", commands::handle(cmd, &coord).await);
                        });
                    }
                    Some(cmd) => println!("{}", commands::handle(cmd, coord).await),
                    None => {
                        let seq = coord.keystroke(&line);
                        debug!("search {seq}: {:?}", coord.search_phase());
                    }
                }
            }
            Some(event) = events.recv() => match event {
                SyncEvent::SuggestionsApplied { query, names, .. } if !query.is_empty() => {
                    println!("{}", commands::render_suggestions(&query, &names));
                }
                SyncEvent::SuggestionsDiscarded { seq } => debug!("search {seq} superseded"),
                SyncEvent::SuggestionsFailed { reason, .. } => println!("Search failed: {reason}"),
                SyncEvent::CreateRolledBack { id, reason } => {
                    println!("Reminder {id} was not saved: {reason}");
                }
                _ => {}
            },
        }
    }

    info!("shell closed");
    Ok(())
}
