//! # Scanner Modes
//!
//! Exactly one mode is active at a time. Modes never end on their own;
//! they are only replaced by scanning another mode-switch token. Switching
//! always starts the new mode with fresh mode-local state.
//!
//! ## Set Mode Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Set mode (two scans)                                │
//! │                                                                         │
//! │   pending = None ──scan SKU──► pending = Some(sku)   "scan a percent"   │
//! │                                                                         │
//! │   pending = Some(sku) ──scan "40%"──► Apply { sku, 40 }, pending = None │
//! │                       ──scan "abc"──► InvalidPercent, pending kept      │
//! │                                                                         │
//! │   Any command/config token at either step bypasses the protocol and    │
//! │   clears `pending` (handled by the dispatcher).                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::stock::Percent;
use crate::validation::{parse_percent, validate_sku};

// =============================================================================
// Mode Kind
// =============================================================================

/// Mode variant without its local state. This is what history records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    /// Each scan receives one unit.
    #[default]
    Input,
    /// Each scan consumes one unit (or the open fraction).
    Output,
    /// Each scan registers the SKU in the catalog.
    Add,
    /// SKU then percent: record a partially used unit.
    Set,
    /// Each scan removes the SKU from the catalog.
    Remove,
}

impl ModeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Input => "input",
            ModeKind::Output => "output",
            ModeKind::Add => "add",
            ModeKind::Set => "set",
            ModeKind::Remove => "remove",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "input" | "in" => Ok(ModeKind::Input),
            "output" | "out" => Ok(ModeKind::Output),
            "add" => Ok(ModeKind::Add),
            "set" => Ok(ModeKind::Set),
            "remove" => Ok(ModeKind::Remove),
            other => Err(ValidationError::InvalidFormat {
                field: "mode".to_string(),
                reason: format!(
                    "unknown mode '{}'. Valid options: input, output, add, set, remove",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// Set Protocol
// =============================================================================

/// Mode-local state of Set mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetProtocol {
    pending: Option<String>,
}

/// What the dispatcher should do after feeding a token to Set mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetStep {
    /// SKU captured; prompt the operator for a percentage.
    AwaitingPercent { sku: String },
    /// Both scans collected; apply the percentage to the SKU.
    Apply { sku: String, pct: Percent },
}

impl SetProtocol {
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Advances the protocol by one data token.
    ///
    /// ## Errors
    /// - step 1: the token is not a valid SKU (pending stays empty)
    /// - step 2: [`CoreError::InvalidPercent`](crate::CoreError::InvalidPercent),
    ///   the pending SKU is kept for a retry
    pub fn advance(&mut self, token: &str) -> CoreResult<SetStep> {
        match self.pending.as_deref() {
            None => {
                let sku = validate_sku(token)?.to_string();
                self.pending = Some(sku.clone());
                Ok(SetStep::AwaitingPercent { sku })
            }
            Some(_) => {
                let pct = parse_percent(token)?;
                let sku = self.pending.take().unwrap_or_default();
                Ok(SetStep::Apply { sku, pct })
            }
        }
    }
}

// =============================================================================
// Mode
// =============================================================================

/// The active mode together with its local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Input,
    Output,
    Add,
    Set(SetProtocol),
    Remove,
}

impl Mode {
    /// A fresh instance of the given variant.
    pub fn new(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Input => Mode::Input,
            ModeKind::Output => Mode::Output,
            ModeKind::Add => Mode::Add,
            ModeKind::Set => Mode::Set(SetProtocol::default()),
            ModeKind::Remove => Mode::Remove,
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Input => ModeKind::Input,
            Mode::Output => ModeKind::Output,
            Mode::Add => ModeKind::Add,
            Mode::Set(_) => ModeKind::Set,
            Mode::Remove => ModeKind::Remove,
        }
    }

    /// Drops any mode-local state.
    pub fn reset(&mut self) {
        if let Mode::Set(protocol) = self {
            protocol.clear();
        }
    }

    /// SKU waiting for a percentage, if Set mode is mid-protocol.
    pub fn pending_sku(&self) -> Option<&str> {
        match self {
            Mode::Set(protocol) => protocol.pending(),
            _ => None,
        }
    }

    /// Prompt shown by console front-ends.
    pub fn prompt(&self) -> String {
        match self.pending_sku() {
            Some(sku) => format!("[set {}] percent: ", sku),
            None => format!("[{}] scan: ", self.kind()),
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::new(ModeKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_mode_kind_parsing() {
        assert_eq!("input".parse::<ModeKind>().unwrap(), ModeKind::Input);
        assert_eq!("OUT".parse::<ModeKind>().unwrap(), ModeKind::Output);
        assert_eq!("set".parse::<ModeKind>().unwrap(), ModeKind::Set);
        assert!("sell".parse::<ModeKind>().is_err());
    }

    #[test]
    fn test_new_mode_has_fresh_state() {
        let mode = Mode::new(ModeKind::Set);
        assert_eq!(mode.kind(), ModeKind::Set);
        assert_eq!(mode.pending_sku(), None);
        assert_eq!(Mode::default().kind(), ModeKind::Input);
    }

    #[test]
    fn test_set_protocol_happy_path() {
        let mut protocol = SetProtocol::default();

        let step = protocol.advance("123").unwrap();
        assert_eq!(
            step,
            SetStep::AwaitingPercent {
                sku: "123".to_string()
            }
        );
        assert_eq!(protocol.pending(), Some("123"));

        let step = protocol.advance("40").unwrap();
        assert_eq!(
            step,
            SetStep::Apply {
                sku: "123".to_string(),
                pct: Percent::clamped(40)
            }
        );
        assert_eq!(protocol.pending(), None);
    }

    #[test]
    fn test_set_protocol_keeps_pending_on_bad_percent() {
        let mut protocol = SetProtocol::default();
        protocol.advance("123").unwrap();

        let err = protocol.advance("not-a-percent").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPercent { .. }));
        assert_eq!(protocol.pending(), Some("123"));

        // retry succeeds against the same SKU
        let step = protocol.advance("75%").unwrap();
        assert!(matches!(step, SetStep::Apply { ref sku, .. } if sku == "123"));
    }

    #[test]
    fn test_set_protocol_rejects_blank_sku() {
        let mut protocol = SetProtocol::default();
        assert!(protocol.advance("   ").is_err());
        assert_eq!(protocol.pending(), None);
    }

    #[test]
    fn test_reset_clears_pending() {
        let mut mode = Mode::new(ModeKind::Set);
        if let Mode::Set(protocol) = &mut mode {
            protocol.advance("123").unwrap();
        }
        assert_eq!(mode.pending_sku(), Some("123"));
        assert_eq!(mode.prompt(), "[set 123] percent: ");

        mode.reset();
        assert_eq!(mode.pending_sku(), None);
        assert_eq!(mode.prompt(), "[set] scan: ");
    }
}
