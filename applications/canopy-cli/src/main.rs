//! Canopy - playlist tree shell
use anyhow::Result;
use canopy_cli::commands::{self, HistoryAction};
use canopy_cli::CanopyConfig;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Playlist tree with transactional edits and random playback", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./canopy.toml if present)
    #[arg(short, long, global = true, env = "CANOPY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files and directories to the playlist
    Add {
        /// Files or directories to add
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List playable items in order
    List,
    /// Print the number of playable items
    Count,
    /// Remove a node and everything below it
    Remove {
        /// Item or directory path as listed
        path: String,
    },
    /// Flip whether a node is playable
    Toggle {
        /// Item or directory path as listed
        path: String,
    },
    /// Remove branches without playable items
    Clean,
    /// Pick a random item and record it in the history
    Random {
        /// Skip recently played items
        #[arg(short, long)]
        avoid_recent: bool,
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show or edit the playback history
    History {
        #[command(subcommand)]
        action: Option<HistoryCommand>,
    },
    /// Replace the playlist with the one saved before the last change
    RestoreBackup,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Print entries, the current one marked with '*'
    Show,
    /// Step to the next older entry
    Previous,
    /// Step to the next newer entry
    Next,
    /// Drop entries by index
    Remove {
        /// Indices as printed by `history show`
        #[arg(required = true)]
        indices: Vec<usize>,
    },
    /// Drop all entries
    Clear,
}

impl From<HistoryCommand> for HistoryAction {
    fn from(command: HistoryCommand) -> Self {
        match command {
            HistoryCommand::Show => Self::Show,
            HistoryCommand::Previous => Self::Previous,
            HistoryCommand::Next => Self::Next,
            HistoryCommand::Remove { indices } => Self::Remove(indices),
            HistoryCommand::Clear => Self::Clear,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canopy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CanopyConfig::load(cli.config.as_deref())?;
    tracing::debug!(
        playlist = %config.paths.playlist.display(),
        history = %config.paths.history.display(),
        "Loaded configuration"
    );

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Add { paths } => {
            commands::add(&config, &paths, &mut out)?;
        }
        Commands::List => commands::list(&config, &mut out)?,
        Commands::Count => {
            commands::count(&config, &mut out)?;
        }
        Commands::Remove { path } => commands::remove(&config, &path, &mut out)?,
        Commands::Toggle { path } => {
            commands::toggle(&config, &path, &mut out)?;
        }
        Commands::Clean => {
            commands::clean(&config, &mut out)?;
        }
        Commands::Random { avoid_recent, seed } => {
            commands::random(&config, avoid_recent, seed, &mut out)?;
        }
        Commands::History { action } => {
            let action = action.map_or(HistoryAction::Show, HistoryAction::from);
            commands::history(&config, action, &mut out)?;
        }
        Commands::RestoreBackup => commands::restore_backup(&config, &mut out)?,
    }

    Ok(())
}
