//! # One-Shot Commands
//!
//! Tokens that act once and leave the active mode in place.
//!
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (routing, outcomes)
//! ├── show.rs         ◄─── show, stock
//! ├── history.rs      ◄─── back (undo)
//! ├── maintenance.rs  ◄─── rebuild_stock, clear_all
//! └── config.rs       ◄─── refresh, show limit tokens
//! ```

mod config;
mod history;
mod maintenance;
mod show;

use stockscan_core::{Command, HistoryEntry, ScanEvent, StockEntry};

use crate::dispatcher::Scanner;
use crate::error::AppResult;

/// Result of a one-shot command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Most recent ledger rows, newest first.
    Shown(Vec<ScanEvent>),
    /// The stock projection, highest quantity first.
    StockListed(Vec<StockEntry>),
    /// The history entry that was reverted, `None` if there was nothing.
    Undone(Option<HistoryEntry>),
    Rebuilt { rows: usize },
    Cleared { scans: u64, stock: u64 },
    Exit,
}

/// Result of a config token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// Forced enrichment queued for this SKU (`None`: nothing scanned yet).
    Refreshed { sku: Option<String> },
    ShowLimitChanged { limit: u32 },
}

impl Scanner {
    pub(crate) async fn run_command(&mut self, command: Command) -> AppResult<CommandOutcome> {
        match command {
            Command::Show => self.show().await,
            Command::Stock => self.stock_listing().await,
            Command::Back => Ok(CommandOutcome::Undone(self.undo().await?)),
            Command::RebuildStock => self.rebuild_stock().await,
            Command::ClearAll => self.clear_all().await,
            Command::Exit => Ok(CommandOutcome::Exit),
        }
    }
}
