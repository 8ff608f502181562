//! `back`: single-step undo.
//!
//! Undoing a scan removes the newest ledger row only. The projection keeps
//! the change until the next `rebuild_stock`.

use tracing::{info, warn};

use stockscan_core::{HistoryEntry, Mode};

use crate::dispatcher::Scanner;
use crate::error::AppResult;

impl Scanner {
    /// Reverts the newest history entry.
    ///
    /// ## Returns
    /// The reverted entry, or `None` when the history is empty.
    ///
    /// ## Errors
    /// Storage faults. The entry is put back so the undo can be retried.
    pub async fn undo(&mut self) -> AppResult<Option<HistoryEntry>> {
        let Some(entry) = self.history.pop() else {
            self.sink.on_info("nothing to undo");
            return Ok(None);
        };

        match entry.clone() {
            HistoryEntry::ScanUndo { sku, kind } => {
                let removed = match self.db.ledger().delete_last().await {
                    Ok(removed) => removed,
                    Err(e) => {
                        self.history.push(entry);
                        return Err(e.into());
                    }
                };

                match removed {
                    Some(row) => {
                        info!(id = row.id, sku = %row.sku, kind = %row.kind, "Scan undone");
                        self.sink.on_info(&format!("undid {} {}", kind, sku));
                    }
                    None => {
                        warn!(sku = %sku, "Undo found an empty ledger");
                        self.sink.on_warning("ledger is already empty");
                    }
                }
            }

            HistoryEntry::ModeUndo { previous } => {
                self.mode = Mode::new(previous);
                info!(mode = %previous, "Mode switch undone");
                self.sink.on_mode_change(previous);
            }
        }

        Ok(Some(entry))
    }
}
