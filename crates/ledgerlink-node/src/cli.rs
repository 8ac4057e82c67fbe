//! # CLI Interface
//!
//! Command-line arguments for `ledgerlink-node`, using `clap` derive.
//! Every option that configures the process also reads an environment
//! variable.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ledgerlink::{BlockHash, Transaction};

use crate::logging::LogFormat;

/// Single-node hash-linked ledger.
#[derive(Parser, Debug)]
#[command(
    name = "ledgerlink-node",
    about = "Single-node hash-linked ledger",
    version,
    propagate_version = true
)]
pub struct LedgerlinkCli {
    /// Path to the SQLite database holding the chain.
    ///
    /// Created, with a fresh genesis block, if it does not exist.
    #[arg(long, global = true, env = "LEDGERLINK_DB", default_value = "ledgerlink.db")]
    pub db: PathBuf,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "LEDGERLINK_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the read-only HTTP API until interrupted.
    Serve(ServeArgs),
    /// Append one block carrying the given transactions.
    Append(AppendArgs),
    /// Recompute every digest and link; exit non-zero on a violation.
    Verify,
    /// Print the chain, or a single block, as JSON.
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address the HTTP API listens on.
    #[arg(long, env = "LEDGERLINK_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,
}

#[derive(Parser, Debug)]
pub struct AppendArgs {
    /// A transaction as `FROM:TO:AMOUNT`. Repeat for several.
    #[arg(long = "tx", value_parser = parse_transaction)]
    pub transactions: Vec<Transaction>,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Hex digest of the block to print.
    #[arg(long)]
    pub hash: Option<BlockHash>,
}

/// Parse `FROM:TO:AMOUNT`.
fn parse_transaction(s: &str) -> Result<Transaction, String> {
    let mut parts = s.splitn(3, ':');
    let (from, to, amount) = match (parts.next(), parts.next(), parts.next()) {
        (Some(from), Some(to), Some(amount)) if !from.is_empty() && !to.is_empty() => {
            (from, to, amount)
        }
        _ => return Err(format!("expected FROM:TO:AMOUNT, got `{}`", s)),
    };

    let amount: f64 = amount
        .parse()
        .map_err(|e| format!("invalid amount `{}`: {}", amount, e))?;
    if !amount.is_finite() {
        return Err(format!("amount must be finite, got `{}`", amount));
    }

    Ok(Transaction::new(from, to, amount))
}
