//! # Todo Actors
//!
//! Command-line entry point. Each invocation opens the configured store, runs one
//! request through the [`TodoGateway`](todo_actors::gateway::TodoGateway), prints the
//! wire JSON and flushes on exit.
//!
//! ```bash
//! todo-actors add --email alice@example.com "buy milk"
//! todo-actors items --email alice@example.com
//! todo-actors complete --email alice@example.com 0
//! ```

use clap::Parser;
use todo_actors::cli::{Cli, Command};
use todo_actors::config;
use todo_actors::gateway::AddItemRequest;
use todo_actors::lifecycle::{setup_tracing, TodoSystem};
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let system = TodoSystem::open(&config)
        .await
        .map_err(|e| e.to_string())?;

    // Ctrl-C cancels a request that has not started yet.
    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let span = tracing::info_span!("request");
    let outcome = async {
        match cli.command {
            Command::Items { email } => {
                let items = system
                    .gateway
                    .get_list(&email, &token)
                    .await
                    .map_err(|e| e.to_string())?;
                serde_json::to_string_pretty(&items).map_err(|e| e.to_string())
            }
            Command::Add {
                email,
                description,
                id,
            } => {
                let request = AddItemRequest { description, id };
                system
                    .gateway
                    .add_item(&email, request, &token)
                    .await
                    .map_err(|e| e.to_string())?;
                info!(%email, "Item added");
                Ok("{}".to_string())
            }
            Command::Complete { email, index } => {
                let item = system
                    .gateway
                    .complete_item(&email, index, &token)
                    .await
                    .map_err(|e| e.to_string())?;
                serde_json::to_string_pretty(&item).map_err(|e| e.to_string())
            }
        }
    }
    .instrument(span)
    .await;

    // Flush even when the request failed.
    system.shutdown().await.map_err(|e| e.to_string())?;

    println!("{}", outcome?);
    Ok(())
}
