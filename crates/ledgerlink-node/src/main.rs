//! # ledgerlink node
//!
//! Entry point for the `ledgerlink-node` binary. Parses CLI arguments,
//! initializes logging, opens the SQLite-backed chain and runs one command:
//!
//! - `serve`  - serve the read-only HTTP API
//! - `append` - append one block of transactions
//! - `verify` - validate every stored block
//! - `show`   - print the chain or one block as JSON

mod api;
mod cli;
mod logging;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;

use ledgerlink::store::SqliteStore;
use ledgerlink::{Chain, ChainConfig, ChainError};

use cli::{Commands, LedgerlinkCli};

const DEFAULT_LOG_LEVEL: &str = "ledgerlink=info,ledgerlink_store=info,ledgerlink_node=info,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = LedgerlinkCli::parse();
    logging::init_logging(DEFAULT_LOG_LEVEL, cli.log_format);

    let chain = open_chain(&cli.db).await?;

    match cli.command {
        Commands::Serve(args) => serve(chain, args).await,
        Commands::Append(args) => append(&chain, args).await,
        Commands::Verify => verify(&chain).await,
        Commands::Show(args) => show(&chain, args).await,
    }
}

async fn open_chain(db: &Path) -> Result<Chain<SqliteStore>> {
    let store = SqliteStore::open(db)
        .with_context(|| format!("failed to open database at {}", db.display()))?;

    Chain::open(store, ChainConfig::default())
        .await
        .with_context(|| format!("failed to open chain in {}", db.display()))
}

/// Serves the HTTP API until Ctrl+C or SIGTERM.
async fn serve(chain: Chain<SqliteStore>, args: cli::ServeArgs) -> Result<()> {
    let router = api::create_router(api::AppState {
        chain: Arc::new(chain),
    });

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", args.listen))?;
    tracing::info!(listen = %args.listen, "HTTP API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("ledgerlink-node stopped");
    Ok(())
}

async fn append(chain: &Chain<SqliteStore>, args: cli::AppendArgs) -> Result<()> {
    let block = chain
        .append_transactions(args.transactions)
        .await
        .context("failed to append block")?;

    tracing::info!(index = block.index(), hash = %block.hash(), "block appended");
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(())
}

async fn verify(chain: &Chain<SqliteStore>) -> Result<()> {
    match chain.verify().await {
        Ok(length) => {
            println!("chain valid: {} blocks", length);
            Ok(())
        }
        Err(ChainError::Validation(violation)) => {
            bail!(
                "chain invalid: {} at index {}: {}",
                violation.kind().as_str(),
                violation.position(),
                violation
            )
        }
        Err(e) => Err(e).context("failed to read chain for verification"),
    }
}

async fn show(chain: &Chain<SqliteStore>, args: cli::ShowArgs) -> Result<()> {
    let json = match args.hash {
        Some(hash) => {
            let block = chain
                .get_by_hash(&hash)
                .await?
                .with_context(|| format!("block not found: {}", hash.to_hex()))?;
            serde_json::to_string_pretty(&block)?
        }
        None => serde_json::to_string_pretty(&chain.all().await?)?,
    };

    println!("{}", json);
    Ok(())
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
