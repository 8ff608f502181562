//! # Scanner (Token Dispatcher)
//!
//! Owns everything the dispatch thread mutates: the active mode, the undo
//! history, the pending confirmation and the handles to the three stores.
//! One token is handled to completion before the next is accepted.
//!
//! ## Dispatch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        dispatch(token)                                  │
//! │                                                                         │
//! │  table.resolve(token)                                                   │
//! │       │                                                                 │
//! │       ├── SwitchMode(kind) ──► history.push(ModeUndo(current))          │
//! │       │                        mode = Mode::new(kind)                   │
//! │       │                        sink.on_mode_change(kind)                │
//! │       │                                                                 │
//! │       ├── Command(cmd) ──────► mode.reset()  (drops Set's pending SKU)  │
//! │       │                        confirm if destructive, else run         │
//! │       │                        sink.on_log_refresh()                    │
//! │       │                                                                 │
//! │       ├── Config(action) ────► mode.reset(), apply, on_log_refresh()    │
//! │       │                                                                 │
//! │       └── None ──────────────► active mode handles the data token       │
//! │                                (modes/*.rs)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Confirmation
//! `rebuild_stock` and `clear_all` arm on the first scan. Scanning the same
//! command again as the very next token runs it; any other token disarms.

use std::sync::Arc;

use tracing::{debug, info, warn};

use stockscan_core::validation::validate_sku;
use stockscan_core::{
    Action, Command, ConfigAction, DispatchTable, History, HistoryEntry, Mode, ModeKind,
};
use stockscan_db::{CatalogRepository, Database, LedgerRepository, StockRepository};
use stockscan_enrich::EnrichHandle;

use crate::commands::{CommandOutcome, ConfigOutcome};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::events::ScanEventSink;
use crate::modes::ScanOutcome;

/// What one dispatched token did.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    ModeSwitched { from: ModeKind, to: ModeKind },
    /// A destructive command was armed and waits for a second scan.
    ConfirmationRequired(Command),
    Command(CommandOutcome),
    Config(ConfigOutcome),
    Scan(ScanOutcome),
}

impl Dispatched {
    /// True when the console loop should stop.
    pub fn is_exit(&self) -> bool {
        matches!(self, Dispatched::Command(CommandOutcome::Exit))
    }
}

/// The scan dispatcher.
pub struct Scanner {
    table: DispatchTable,
    pub(crate) mode: Mode,
    pub(crate) history: History,
    pub(crate) sink: Arc<dyn ScanEventSink>,
    pending_confirm: Option<Command>,
    pub(crate) show_limit: u32,
    pub(crate) last_sku: Option<String>,
    pub(crate) db: Database,
    enrich: EnrichHandle,
}

impl Scanner {
    /// Builds the dispatch table and starts in the configured mode.
    pub fn new(
        config: &AppConfig,
        db: Database,
        enrich: EnrichHandle,
        sink: Arc<dyn ScanEventSink>,
    ) -> Self {
        let table = DispatchTable::new(&config.mappings);
        for token in table.shadowed() {
            warn!(token = %token, "Token mapped more than once, higher priority wins");
        }

        info!(
            tokens = table.len(),
            mode = %config.scanner.initial_mode,
            "Scanner ready"
        );

        Scanner {
            table,
            mode: Mode::new(config.scanner.initial_mode),
            history: History::with_capacity(config.scanner.history_capacity),
            sink,
            pending_confirm: None,
            show_limit: config.scanner.show_limit,
            last_sku: None,
            db,
            enrich,
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Handles one scanned token.
    ///
    /// ## Errors
    /// Only storage faults. Domain problems (nothing in stock, a bad
    /// percentage, an unusable SKU) are reported through the sink and come
    /// back as `Ok`.
    pub async fn dispatch(&mut self, token: &str) -> AppResult<Dispatched> {
        let token = token.trim();
        let armed = self.pending_confirm.take();
        let action = self.table.resolve(token);

        if let Some(command) = armed {
            if action != Some(Action::Command(command)) {
                debug!(command = ?command, "Confirmation cancelled");
                self.sink.on_info("confirmation cancelled");
            }
        }

        match action {
            Some(Action::SwitchMode(kind)) => Ok(self.switch_mode(kind)),

            Some(Action::Command(command)) => {
                self.mode.reset();
                let dispatched = if command.needs_confirmation() && armed != Some(command) {
                    self.pending_confirm = Some(command);
                    self.sink
                        .on_warning(&format!("scan '{}' again to confirm", token));
                    Dispatched::ConfirmationRequired(command)
                } else {
                    Dispatched::Command(self.run_command(command).await?)
                };
                self.sink.on_log_refresh();
                Ok(dispatched)
            }

            Some(Action::Config(action)) => {
                self.mode.reset();
                let outcome = self.apply_config(action);
                self.sink.on_log_refresh();
                Ok(Dispatched::Config(outcome))
            }

            None => Ok(Dispatched::Scan(self.process_code(token).await?)),
        }
    }

    fn switch_mode(&mut self, kind: ModeKind) -> Dispatched {
        let from = self.mode.kind();
        self.history.push(HistoryEntry::ModeUndo { previous: from });
        self.mode = Mode::new(kind);

        info!(from = %from, to = %kind, "Mode switched");
        self.sink.on_mode_change(kind);
        Dispatched::ModeSwitched { from, to: kind }
    }

    fn apply_config(&mut self, action: ConfigAction) -> ConfigOutcome {
        match action {
            ConfigAction::Refresh => self.refresh_last(),
            ConfigAction::ShowLimit(limit) => self.set_show_limit(limit),
        }
    }

    // =========================================================================
    // Enrichment
    // =========================================================================

    /// Queues `sku` for enrichment on behalf of a presentation layer.
    ///
    /// The catalog entry is created first; the worker only fills rows that
    /// exist.
    ///
    /// ## Errors
    /// [`AppError::Enrich`](crate::AppError::Enrich) once the worker is gone.
    pub async fn enrich(&self, sku: &str, force_refresh: bool) -> AppResult<()> {
        let sku = validate_sku(sku)?;
        self.db.catalog().ensure(sku).await?;
        self.enrich.enqueue(sku, force_refresh)?;
        Ok(())
    }

    /// Queues `sku` from inside dispatch. A stopped worker never fails a
    /// scan.
    pub(crate) fn enqueue(&self, sku: &str, force_refresh: bool) {
        if let Err(e) = self.enrich.enqueue(sku, force_refresh) {
            warn!(sku = %sku, error = %e, "Enrichment request dropped");
        }
    }

    // =========================================================================
    // Readers
    // =========================================================================

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Console prompt for the current state.
    pub fn prompt(&self) -> String {
        self.mode.prompt()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Destructive command waiting for its second scan.
    pub fn pending_confirmation(&self) -> Option<Command> {
        self.pending_confirm
    }

    pub fn show_limit(&self) -> u32 {
        self.show_limit
    }

    /// SKU most recently handled in a data mode.
    pub fn last_sku(&self) -> Option<&str> {
        self.last_sku.as_deref()
    }

    pub fn ledger(&self) -> LedgerRepository {
        self.db.ledger()
    }

    pub fn stock(&self) -> StockRepository {
        self.db.stock()
    }

    pub fn catalog(&self) -> CatalogRepository {
        self.db.catalog()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
