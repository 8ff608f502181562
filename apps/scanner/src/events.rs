//! # Presentation Callbacks
//!
//! The scanner never prints anything itself. Whatever renders it (the
//! console loop in `main.rs`, a GUI, a test) implements [`ScanEventSink`]
//! and receives notifications as tokens are dispatched.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Scanner::dispatch(token)                                               │
//! │       │                                                                 │
//! │       ├── mode switched ──────────► on_mode_change("output")            │
//! │       ├── NotInStock / bad % ─────► on_warning("SKU 999 not in stock")  │
//! │       ├── Set step 1, undo, ... ──► on_info("scan a percentage")        │
//! │       └── command / config ───────► on_log_refresh()                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::Write;

use stockscan_core::ModeKind;

/// Receives scanner notifications. Implementations must not block.
pub trait ScanEventSink: Send + Sync {
    /// A mode-switch token (or an undo) changed the active mode.
    fn on_mode_change(&self, mode: ModeKind);

    /// A recoverable problem the operator should see.
    fn on_warning(&self, message: &str);

    /// Progress messages such as the Set mode percent prompt.
    fn on_info(&self, _message: &str) {}

    /// A command or config token ran; views of the ledger may be stale.
    fn on_log_refresh(&self) {}
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ScanEventSink for NoOpSink {
    fn on_mode_change(&self, _mode: ModeKind) {}

    fn on_warning(&self, _message: &str) {}
}

/// Writes notifications to stdout/stderr for the console binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ScanEventSink for ConsoleSink {
    fn on_mode_change(&self, mode: ModeKind) {
        println!("mode: {}", mode);
    }

    fn on_warning(&self, message: &str) {
        eprintln!("warning: {}", message);
    }

    fn on_info(&self, message: &str) {
        println!("{}", message);
    }

    fn on_log_refresh(&self) {
        // prompts are written without a newline; keep them visible
        let _ = std::io::stdout().flush();
    }
}
