//! # Dispatch Table
//!
//! Classifies every scanned token before it reaches the active mode.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     token ──► DispatchTable                             │
//! │                                                                         │
//! │   1. mode-switch tokens   "input", "output", "set", ...  SwitchMode     │
//! │   2. command tokens       "show", "back", "clear_all"    Command        │
//! │   3. config tokens        "refresh", ...                 Config         │
//! │   4. anything else        ──► active mode (data token)   None           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three mapping sections come from configuration and are merged once
//! at startup into a single immutable map. A token listed in more than one
//! section resolves to the highest-priority section; the losers are kept in
//! [`DispatchTable::shadowed`] so the caller can log them.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::mode::ModeKind;

// =============================================================================
// Actions
// =============================================================================

/// One-shot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Print the most recent ledger rows.
    Show,
    /// Print the stock projection.
    Stock,
    /// Undo the most recent history entry.
    Back,
    /// Recompute the projection from the ledger (confirmation required).
    RebuildStock,
    /// Purge ledger and projection (confirmation required).
    ClearAll,
    /// Leave the scan loop.
    Exit,
}

impl Command {
    /// Destructive commands must be scanned twice in a row.
    pub const fn needs_confirmation(&self) -> bool {
        matches!(self, Command::RebuildStock | Command::ClearAll)
    }
}

/// Runtime setting tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigAction {
    /// Force-refresh enrichment for the last SKU scanned in data mode.
    Refresh,
    /// Change how many ledger rows `show` prints.
    ShowLimit(u32),
}

/// What a token resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SwitchMode(ModeKind),
    Command(Command),
    Config(ConfigAction),
}

// =============================================================================
// Mappings (configuration shape)
// =============================================================================

/// Token mappings as written in `scanner.toml`.
///
/// ```toml
/// [mappings.modes]
/// input = "input"
/// "MODE-OUT" = "output"
///
/// [mappings.commands]
/// show = "show"
///
/// [mappings.configs]
/// refresh = "refresh"
/// "SHOW-20" = { show_limit = 20 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default = "default_modes")]
    pub modes: BTreeMap<String, ModeKind>,

    #[serde(default = "default_commands")]
    pub commands: BTreeMap<String, Command>,

    #[serde(default = "default_configs")]
    pub configs: BTreeMap<String, ConfigAction>,
}

fn default_modes() -> BTreeMap<String, ModeKind> {
    [
        ModeKind::Input,
        ModeKind::Output,
        ModeKind::Add,
        ModeKind::Set,
        ModeKind::Remove,
    ]
    .into_iter()
    .map(|kind| (kind.as_str().to_string(), kind))
    .collect()
}

fn default_commands() -> BTreeMap<String, Command> {
    [
        ("show", Command::Show),
        ("stock", Command::Stock),
        ("back", Command::Back),
        ("rebuild_stock", Command::RebuildStock),
        ("clear_all", Command::ClearAll),
        ("exit", Command::Exit),
    ]
    .into_iter()
    .map(|(token, command)| (token.to_string(), command))
    .collect()
}

fn default_configs() -> BTreeMap<String, ConfigAction> {
    BTreeMap::from([("refresh".to_string(), ConfigAction::Refresh)])
}

impl Default for Mappings {
    fn default() -> Self {
        Mappings {
            modes: default_modes(),
            commands: default_commands(),
            configs: default_configs(),
        }
    }
}

impl Mappings {
    /// Every configured token, for validation.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.modes
            .keys()
            .chain(self.commands.keys())
            .chain(self.configs.keys())
            .map(String::as_str)
    }
}

// =============================================================================
// Dispatch Table
// =============================================================================

/// Immutable token → action map built once at startup.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    actions: HashMap<String, Action>,
    shadowed: Vec<String>,
}

impl DispatchTable {
    /// Merges the three mapping sections with mode > command > config
    /// priority.
    pub fn new(mappings: &Mappings) -> Self {
        let mut table = DispatchTable::default();

        // lowest priority first; later inserts win
        for (token, config) in &mappings.configs {
            table.insert(token, Action::Config(*config));
        }
        for (token, command) in &mappings.commands {
            table.insert(token, Action::Command(*command));
        }
        for (token, kind) in &mappings.modes {
            table.insert(token, Action::SwitchMode(*kind));
        }

        table
    }

    fn insert(&mut self, token: &str, action: Action) {
        let token = token.trim().to_string();
        if self.actions.insert(token.clone(), action).is_some() {
            self.shadowed.push(token);
        }
    }

    /// Classifies a token. `None` means it is data for the active mode.
    pub fn resolve(&self, token: &str) -> Option<Action> {
        self.actions.get(token.trim()).copied()
    }

    /// True when the token would bypass the active mode.
    pub fn is_reserved(&self, token: &str) -> bool {
        self.resolve(token).is_some()
    }

    /// Tokens that appeared in more than one section.
    pub fn shadowed(&self) -> &[String] {
        &self.shadowed
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
