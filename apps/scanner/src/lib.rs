//! # StockScan Scanner Library
//!
//! Turns a stream of scanned tokens into ledger rows, stock changes and
//! catalog updates. The console binary in `main.rs` is a thin wrapper
//! around [`run`]; a GUI would hold a [`Scanner`] directly.
//!
//! ## Module Organization
//! ```text
//! stockscan_lib/
//! ├── lib.rs          ◄─── You are here (startup, console loop)
//! ├── dispatcher.rs   ◄─── Scanner: token classification, confirmation
//! ├── modes/          ◄─── input, output, add, set, remove handlers
//! ├── commands/       ◄─── show, stock, back, rebuild_stock, clear_all, ...
//! ├── events.rs       ◄─── ScanEventSink callbacks
//! ├── config.rs       ◄─── scanner.toml + env overrides
//! └── error.rs        ◄─── AppError
//! ```
//!
//! ## Threads of Control
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  dispatch loop (this task)              enrichment worker (spawned)     │
//! │  ─────────────────────────              ───────────────────────────     │
//! │  stdin line ──► Scanner::dispatch       queue ──► lookup ──► catalog    │
//! │                   │                       ▲                             │
//! │                   ├─ ledger / stock       │                             │
//! │                   ├─ history              │                             │
//! │                   └─ enqueue(sku) ────────┘  (never blocks)             │
//! │                                                                         │
//! │  Nothing else is shared between the two.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod modes;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stockscan_db::{Database, DbConfig};
use stockscan_enrich::EnrichmentWorker;

pub use commands::{CommandOutcome, ConfigOutcome};
pub use config::AppConfig;
pub use dispatcher::{Dispatched, Scanner};
pub use error::{AppError, AppResult, ErrorCode};
pub use events::{ConsoleSink, NoOpSink, ScanEventSink};
pub use modes::ScanOutcome;

/// Runs the console scanner until `exit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load scanner.toml, apply STOCKSCAN_* overrides, validate            │
/// │  2. Open the SQLite database (WAL) and run migrations                   │
/// │  3. Build the product lookup (HTTP if url_template is set)              │
/// │  4. Spawn the enrichment worker                                         │
/// │  5. Read tokens from stdin and dispatch them                            │
/// │  6. Stop the worker (queued lookups are abandoned), close the pool      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> AppResult<()> {
    info!("Starting StockScan");

    let config = AppConfig::load(config_path)?;
    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    let lookup = config.lookup.build_lookup()?;
    let (handle, worker) = EnrichmentWorker::spawn(db.catalog(), lookup);

    let mut scanner = Scanner::new(&config, db.clone(), handle.clone(), Arc::new(ConsoleSink));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let dispatched = scan_loop(&mut scanner, stdin).await?;
    info!(tokens = dispatched, "Scan loop finished");

    drop(scanner);
    if handle.shutdown().await.is_err() {
        info!("Enrichment worker already stopped");
    }
    drop(handle);
    if let Err(e) = worker.await {
        error!(error = %e, "Enrichment worker panicked");
    }

    db.close().await;
    info!("StockScan stopped");
    Ok(())
}

/// Dispatches one token per line until `exit` or end of input.
///
/// Failed tokens are reported and skipped; the loop keeps going. Returns
/// the number of tokens dispatched, not counting the closing `exit`.
pub async fn scan_loop<R>(scanner: &mut Scanner, input: R) -> AppResult<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut stdout = tokio::io::stdout();
    let mut dispatched = 0;

    loop {
        stdout.write_all(scanner.prompt().as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let token = line.trim();
        if token.is_empty() {
            continue;
        }

        match scanner.dispatch(token).await {
            Ok(result) if result.is_exit() => break,
            Ok(_) => dispatched += 1,
            Err(e) => {
                dispatched += 1;
                error!(token = %token, code = %e.code(), error = %e, "Token failed");
                eprintln!("error [{}]: {}", e.code(), e);
            }
        }
    }

    Ok(dispatched)
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they never interleave with the scan prompt.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockscan=trace` - Show trace for stockscan crates only
/// - Default: `info,stockscan=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockscan=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockscan_enrich::NoLookup;

    #[tokio::test]
    async fn test_scan_loop_stops_at_exit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (_worker, handle) = EnrichmentWorker::new(db.catalog(), Arc::new(NoLookup));
        let mut scanner = Scanner::new(&AppConfig::default(), db, handle, Arc::new(NoOpSink));

        let input: &[u8] = b"A\n\n  B  \nexit\nC\n";
        let dispatched = scan_loop(&mut scanner, input).await.unwrap();

        assert_eq!(dispatched, 2);
        assert_eq!(scanner.ledger().count().await.unwrap(), 2);
        assert!(scanner.stock().get("C").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_loop_counts_to_end_of_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (_worker, handle) = EnrichmentWorker::new(db.catalog(), Arc::new(NoLookup));
        let mut scanner = Scanner::new(&AppConfig::default(), db, handle, Arc::new(NoOpSink));

        let input: &[u8] = b"output\nA\nexit";
        assert_eq!(scan_loop(&mut scanner, input).await.unwrap(), 2);

        let input: &[u8] = b"input\nA\n";
        assert_eq!(scan_loop(&mut scanner, input).await.unwrap(), 2);
        assert_eq!(scanner.ledger().count().await.unwrap(), 2);
    }
}
