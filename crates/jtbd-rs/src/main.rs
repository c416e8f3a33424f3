//! `jtbd` command-line client for creating and reading job statements.

use anyhow::Context;
use clap::{Parser, Subcommand};
use jtbd_rs::config::JtbdConfig;
use jtbd_rs::core::{CreateOptions, CreationRequest, OwnerId};
use jtbd_rs::{build_pipeline_with_store, init_logging, open_store};
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

/// Command-line options for the JTBD client.
#[derive(Parser)]
#[command(name = "jtbd", version)]
struct Cli {
    /// Config files layered over ~/.jtbd/jtbd.json5, in order
    #[arg(long)]
    config: Vec<PathBuf>,
    /// SQLite database path, overriding store.path
    #[arg(long)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a job statement
    Create {
        /// Owner the statement belongs to
        #[arg(long)]
        owner: OwnerId,
        /// Job statement text
        #[arg(long)]
        statement: String,
        /// Optional situational context
        #[arg(long)]
        context: Option<String>,
        /// Priority from 1 to 5
        #[arg(long, allow_negative_numbers = true)]
        priority: Option<i64>,
        /// Store the record without requesting an embedding
        #[arg(long)]
        no_embedding: bool,
    },
    /// Print a stored job statement
    Show {
        #[arg(long)]
        owner: OwnerId,
        #[arg(long)]
        id: Uuid,
    },
}

/// Entry point for the JTBD CLI.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let cli = Cli::parse();
    let layered = JtbdConfig::load_layered(cli.config.clone()).context("failed to load config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    let mut config = layered.config;
    if let Some(db) = cli.db.as_ref() {
        config.store.path = Some(db.to_string_lossy().to_string());
    }

    let store = open_store(&config)?;
    match cli.command {
        Command::Create {
            owner,
            statement,
            context,
            priority,
            no_embedding,
        } => {
            let pipeline = build_pipeline_with_store(&config, store)?;
            let request = CreationRequest {
                statement,
                context,
                priority,
            };
            let options = CreateOptions {
                generate_embedding: !no_embedding,
            };
            match pipeline.create(owner, &request, options).await {
                Ok(created) => {
                    println!("{}", serde_json::to_string_pretty(&created)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{}", serde_json::to_string_pretty(&err.to_json())?);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Show { owner, id } => match store.get(owner, id)? {
            Some(record) => {
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                info!("job statement not found (owner={owner}, id={id})");
                eprintln!("job statement {id} not found");
                Ok(ExitCode::FAILURE)
            }
        },
    }
}
