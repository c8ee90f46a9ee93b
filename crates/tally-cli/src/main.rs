mod config;
mod mark_cmd;
mod serve_cmd;
mod status_cmd;
mod transfer_cmd;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use tally_core::ProgressEngine;
use tally_store::store::{DocumentStore, FileStore};

use config::TallyConfig;

#[derive(Parser)]
#[command(name = "tally", about = "Personal study-progress tracker")]
struct Cli {
    /// Path to the progress JSON file (overrides TALLY_DATA_FILE env var)
    #[arg(long, global = true)]
    data_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a tally config file and seed an empty progress document
    Init {
        /// Overwrite an existing config file and progress document
        #[arg(long)]
        force: bool,
    },
    /// Start the HTTP API server
    Serve {
        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Show per-plan progress summaries
    Status,
    /// Mark an item complete (or incomplete with --undo)
    Mark {
        /// Plan name (e.g. systemDesign, dsa, scripts)
        plan: String,
        /// Item identifier within the plan
        item: String,
        /// Group within the plan (required for dsa)
        #[arg(long)]
        group: Option<String>,
        /// Mark the item incomplete instead
        #[arg(long)]
        undo: bool,
    },
    /// Reset all progress across every plan
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Import a progress document, replacing the current one
    Import {
        /// Path to the JSON document to import
        file: String,
    },
    /// Export the current progress document
    Export {
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
}

/// Execute the `tally init` command: write config file and seed document.
async fn cmd_init(cli_data_file: Option<&str>, force: bool) -> anyhow::Result<()> {
    let config_path = config::config_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let resolved = TallyConfig::resolve(cli_data_file);

    let cfg = config::ConfigFile {
        storage: config::StorageSection {
            path: resolved.data_path.display().to_string(),
        },
    };
    config::save_config(&cfg)?;

    if resolved.data_path.exists() && !force {
        anyhow::bail!(
            "progress document already exists at {}\nUse --force to overwrite.",
            resolved.data_path.display()
        );
    }
    if let Some(parent) = resolved.data_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut doc = tally_core::PlanRegistry::standard().seed_document();
    let store = FileStore::new(&resolved.data_path);
    store.save(&mut doc).await?;

    println!("Config written to {}", config_path.display());
    println!("  storage.path = {}", resolved.data_path.display());
    println!();
    println!("Next: run `tally serve` or start marking items with `tally mark`.");

    Ok(())
}

/// Build the engine over the resolved data file.
fn build_engine(cli_data_file: Option<&str>) -> ProgressEngine<FileStore> {
    let resolved = TallyConfig::resolve(cli_data_file);
    ProgressEngine::new(FileStore::new(resolved.data_path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.data_file.as_deref(), force).await?;
        }
        Commands::Serve { bind, port } => {
            let engine = Arc::new(build_engine(cli.data_file.as_deref()));
            serve_cmd::run_serve(engine, &bind, port).await?;
        }
        Commands::Status => {
            let engine = build_engine(cli.data_file.as_deref());
            status_cmd::run_status(&engine).await?;
        }
        Commands::Mark {
            plan,
            item,
            group,
            undo,
        } => {
            let engine = build_engine(cli.data_file.as_deref());
            mark_cmd::run_mark(&engine, &plan, &item, group.as_deref(), !undo).await?;
        }
        Commands::Reset { yes } => {
            let engine = build_engine(cli.data_file.as_deref());
            mark_cmd::run_reset(&engine, yes).await?;
        }
        Commands::Import { file } => {
            let engine = build_engine(cli.data_file.as_deref());
            transfer_cmd::run_import(&engine, &file).await?;
        }
        Commands::Export { output } => {
            let engine = build_engine(cli.data_file.as_deref());
            transfer_cmd::run_export(&engine, output.as_deref()).await?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
