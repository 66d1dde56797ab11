// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engram - conversational memory retrieval and ranking.
//!
//! Binary entry point: appends dialog messages, ingests them into the
//! vector store, and answers questions through the memory-aware agent
//! loop.

mod app;
mod health;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use engram_agent::AgentOutcome;
use engram_core::{EngramError, Role};
use engram_storage::queries;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::app::App;

/// Engram - conversational memory retrieval and ranking.
#[derive(Parser, Debug)]
#[command(name = "engram", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a message to a session.
    Add {
        /// Session to append to.
        #[arg(long)]
        session: Uuid,
        /// Display name of the author.
        #[arg(long, default_value = "user")]
        author: String,
        /// Speaker role: user or assistant.
        #[arg(long, value_parser = parse_role, default_value = "user")]
        role: Role,
        /// Message text.
        content: String,
    },
    /// Ingest a session's unprocessed messages into the vector store.
    Ingest {
        /// Session to ingest.
        #[arg(long)]
        session: Uuid,
    },
    /// Ask a question through the memory-aware agent loop.
    Ask {
        /// Session whose memories to draw on.
        #[arg(long)]
        session: Uuid,
        /// The question.
        query: String,
    },
    /// Probe every external service.
    Health,
}

fn parse_role(s: &str) -> Result<Role, String> {
    match s {
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        other => Err(format!("invalid role `{other}`, expected user or assistant")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match engram_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            engram_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("engram: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Commands,
    config: &engram_config::EngramConfig,
) -> Result<ExitCode, EngramError> {
    let app = App::build(config).await?;

    let code = match command {
        Commands::Add {
            session,
            author,
            role,
            content,
        } => {
            let position =
                queries::messages::append_message(&app.db, session, &author, role, &content)
                    .await?;
            println!("appended message at position {position}");
            ExitCode::SUCCESS
        }
        Commands::Ingest { session } => {
            let result = app.ingestor.ingest(session).await?;
            println!(
                "ingested: {} chunks created, {} upserted, {} skipped",
                result.chunks_created, result.chunks_upserted, result.skipped
            );
            ExitCode::SUCCESS
        }
        Commands::Ask { session, query } => match app.agent.run(session, &query).await? {
            AgentOutcome::Answer { content, .. } => {
                println!("{content}");
                ExitCode::SUCCESS
            }
            AgentOutcome::LimitExceeded { conversation } => {
                eprintln!(
                    "engram: no answer within the round limit ({} turns exchanged)",
                    conversation.len()
                );
                ExitCode::FAILURE
            }
        },
        Commands::Health => {
            let results = health::run_checks(app.adapters()).await;
            if health::report(&results) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    };

    app.close().await?;
    Ok(code)
}
