//! # Stock Projection Rules
//!
//! The per-SKU state machine behind the current-stock projection, plus the
//! ledger replay used to rebuild it.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    StockLevel = (qty, percent)                          │
//! │                                                                         │
//! │   Whole(qty)                 percent == 100                             │
//! │   Fractional(qty, pct)       0 < percent < 100  (one open unit)         │
//! │                                                                         │
//! │   input   ── qty += 1 ─────────────────────────────► same state         │
//! │                                                                         │
//! │   output  Fractional ── percent = 100 ─────────────► Whole(qty)         │
//! │           Whole(q>0) ── qty -= 1 ──────────────────► Whole(q-1)         │
//! │           Whole(0)   ── NotInStock (no mutation)                        │
//! │                                                                         │
//! │   set p   Fractional ── percent = p       (Δ  0) ──► Fractional/Whole   │
//! │           Whole(q>0) ── qty -= 1, pct = p (Δ -1) ──► Fractional         │
//! │           Whole(0)   ── percent = p       (Δ  0) ──► Fractional         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An open fraction is stock that is already unpacked, so `output` always
//! consumes it before touching whole units.
//!
//! ## Rebuild
//! [`replay`] recomputes `qty = count(input) - count(output)` per SKU from
//! the full ledger. Fractional state is not recoverable from counts and is
//! flattened to 100; SKUs that end at `qty <= 0` are dropped.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{EventKind, ProductInfo, ScanEvent};

// =============================================================================
// Percent
// =============================================================================

/// An integer percentage clamped to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Percent(u8);

impl Percent {
    /// No open fraction.
    pub const FULL: Percent = Percent(100);

    /// Clamps any integer into `0..=100`.
    pub fn clamped(value: i64) -> Self {
        Percent(value.clamp(0, 100) as u8)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// True for `0 < pct < 100`.
    #[inline]
    pub const fn is_open_fraction(self) -> bool {
        self.0 > 0 && self.0 < 100
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::FULL
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// Quantity of whole units plus the state of the (at most one) open unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    qty: i64,
    percent: Percent,
}

/// Result of [`StockLevel::apply_output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOutcome {
    pub level: StockLevel,
    /// True when the open fraction was consumed instead of a whole unit.
    pub consumed_fraction: bool,
}

/// Result of [`StockLevel::apply_set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOutcome {
    pub level: StockLevel,
    /// Change in whole units: `-1` when a whole unit was opened, else `0`.
    pub delta: i64,
}

impl StockLevel {
    /// Builds a level, flooring negative quantities at zero.
    pub fn new(qty: i64, percent: Percent) -> Self {
        StockLevel {
            qty: qty.max(0),
            percent,
        }
    }

    /// `qty` whole units, no open fraction.
    pub fn whole(qty: i64) -> Self {
        StockLevel::new(qty, Percent::FULL)
    }

    #[inline]
    pub fn qty(&self) -> i64 {
        self.qty
    }

    #[inline]
    pub fn percent(&self) -> Percent {
        self.percent
    }

    #[inline]
    pub fn has_open_fraction(&self) -> bool {
        self.percent.is_open_fraction()
    }

    /// Receives one whole unit. Never fails.
    pub fn apply_input(current: Option<StockLevel>) -> StockLevel {
        match current {
            Some(level) => StockLevel {
                qty: level.qty + 1,
                ..level
            },
            None => StockLevel::whole(1),
        }
    }

    /// Consumes the open fraction if there is one, otherwise one whole unit.
    ///
    /// ## Errors
    /// [`CoreError::NotInStock`] when there is no entry, or the entry has
    /// `qty == 0` and no open fraction.
    pub fn apply_output(current: Option<StockLevel>, sku: &str) -> CoreResult<OutputOutcome> {
        let not_in_stock = || CoreError::NotInStock {
            sku: sku.to_string(),
        };
        let level = current.ok_or_else(not_in_stock)?;

        if level.has_open_fraction() {
            return Ok(OutputOutcome {
                level: StockLevel {
                    percent: Percent::FULL,
                    ..level
                },
                consumed_fraction: true,
            });
        }

        if level.qty > 0 {
            return Ok(OutputOutcome {
                level: StockLevel {
                    qty: level.qty - 1,
                    ..level
                },
                consumed_fraction: false,
            });
        }

        Err(not_in_stock())
    }

    /// Records the remaining percentage of an opened unit.
    ///
    /// - no entry → `qty = 0, percent = pct`
    /// - open fraction → overwrite its percentage (`Δ 0`)
    /// - whole units → open one of them (`qty -= 1`, `Δ -1`)
    /// - nothing stocked → just record the percentage (`Δ 0`)
    ///
    /// Setting 100% on a level without an open fraction changes nothing,
    /// so repeated `set 100` scans are idempotent.
    pub fn apply_set(current: Option<StockLevel>, pct: Percent) -> SetOutcome {
        let Some(level) = current else {
            return SetOutcome {
                level: StockLevel::new(0, pct),
                delta: 0,
            };
        };

        if level.has_open_fraction() {
            return SetOutcome {
                level: StockLevel {
                    percent: pct,
                    ..level
                },
                delta: 0,
            };
        }

        if pct == Percent::FULL {
            return SetOutcome { level, delta: 0 };
        }

        if level.qty > 0 {
            return SetOutcome {
                level: StockLevel {
                    qty: level.qty - 1,
                    percent: pct,
                },
                delta: -1,
            };
        }

        SetOutcome {
            level: StockLevel {
                percent: pct,
                ..level
            },
            delta: 0,
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.percent == Percent::FULL {
            write!(f, "{}", self.qty)
        } else {
            write!(f, "{} + {}", self.qty, self.percent)
        }
    }
}

/// Ledger `aux` payload for a `set` row: `"<pct>|<delta>"`.
pub fn set_aux(pct: Percent, delta: i64) -> String {
    format!("{}|{}", pct.value(), delta)
}

/// Parses a `set` row payload back into `(pct, delta)`.
pub fn parse_set_aux(aux: &str) -> Option<(Percent, i64)> {
    let (pct, delta) = aux.split_once('|')?;
    let pct: i64 = pct.trim().parse().ok()?;
    let delta: i64 = delta.trim().parse().ok()?;
    Some((Percent::clamped(pct), delta))
}

// =============================================================================
// Rebuild
// =============================================================================

/// One projection row recomputed from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuiltStock {
    pub sku: String,
    pub qty: i64,
    /// Latest snapshot for the SKU, blanks filled from older rows.
    pub snapshot: ProductInfo,
}

#[derive(Default)]
struct Tally {
    inputs: i64,
    outputs: i64,
    snapshot: ProductInfo,
}

/// Replays ledger rows (any order) into whole-unit stock.
///
/// Only `input` and `output` rows count; `set` and `remove` rows
/// contribute nothing but their snapshot. The result is sorted by SKU.
pub fn replay<'a, I>(events: I) -> Vec<RebuiltStock>
where
    I: IntoIterator<Item = &'a ScanEvent>,
{
    let mut ordered: Vec<&ScanEvent> = events.into_iter().collect();
    // newest first so the freshest snapshot wins
    ordered.sort_by(|a, b| b.id.cmp(&a.id));

    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    for event in ordered {
        let tally = tallies.entry(event.sku.as_str()).or_default();
        match event.kind {
            EventKind::Input => tally.inputs += 1,
            EventKind::Output => tally.outputs += 1,
            EventKind::Set | EventKind::Remove => {}
        }
        tally.snapshot.fill_from(&event.snapshot());
    }

    tallies
        .into_iter()
        .filter_map(|(sku, tally)| {
            let qty = tally.inputs - tally.outputs;
            (qty > 0).then(|| RebuiltStock {
                sku: sku.to_string(),
                qty,
                snapshot: tally.snapshot,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(id: i64, sku: &str, kind: EventKind) -> ScanEvent {
        ScanEvent {
            id,
            sku: sku.to_string(),
            kind,
            aux: None,
            product: None,
            brand: None,
            category: None,
            image: None,
            url: None,
            created_at: Utc::now(),
        }
    }

    fn level(qty: i64, pct: i64) -> StockLevel {
        StockLevel::new(qty, Percent::clamped(pct))
    }

    #[test]
    fn test_percent_clamps() {
        assert_eq!(Percent::clamped(-5).value(), 0);
        assert_eq!(Percent::clamped(250).value(), 100);
        assert_eq!(Percent::clamped(42).value(), 42);
        assert!(Percent::clamped(42).is_open_fraction());
        assert!(!Percent::clamped(0).is_open_fraction());
        assert!(!Percent::FULL.is_open_fraction());
    }

    #[test]
    fn test_input_creates_then_increments() {
        let first = StockLevel::apply_input(None);
        assert_eq!(first, level(1, 100));

        let second = StockLevel::apply_input(Some(first));
        assert_eq!(second, level(2, 100));

        // an open fraction survives receiving whole units
        assert_eq!(StockLevel::apply_input(Some(level(0, 30))), level(1, 30));
    }

    #[test]
    fn test_output_without_entry_is_not_in_stock() {
        let err = StockLevel::apply_output(None, "999").unwrap_err();
        assert_eq!(
            err,
            CoreError::NotInStock {
                sku: "999".to_string()
            }
        );
    }

    #[test]
    fn test_output_consumes_fraction_before_whole_units() {
        let outcome = StockLevel::apply_output(Some(level(2, 40)), "123").unwrap();
        assert!(outcome.consumed_fraction);
        assert_eq!(outcome.level, level(2, 100));

        let outcome = StockLevel::apply_output(Some(outcome.level), "123").unwrap();
        assert!(!outcome.consumed_fraction);
        assert_eq!(outcome.level, level(1, 100));
    }

    #[test]
    fn test_output_fails_only_when_exhausted() {
        assert!(StockLevel::apply_output(Some(level(0, 100)), "x").is_err());
        // percent 0 is not an open fraction
        assert!(StockLevel::apply_output(Some(level(0, 0)), "x").is_err());
        assert!(StockLevel::apply_output(Some(level(0, 1)), "x").is_ok());
        assert!(StockLevel::apply_output(Some(level(1, 100)), "x").is_ok());
    }

    #[test]
    fn test_set_without_entry() {
        let outcome = StockLevel::apply_set(None, Percent::clamped(40));
        assert_eq!(outcome.level, level(0, 40));
        assert_eq!(outcome.delta, 0);
    }

    #[test]
    fn test_set_opens_a_whole_unit() {
        let outcome = StockLevel::apply_set(Some(level(1, 100)), Percent::clamped(40));
        assert_eq!(outcome.level, level(0, 40));
        assert_eq!(outcome.delta, -1);
        assert_eq!(set_aux(Percent::clamped(40), outcome.delta), "40|-1");
    }

    #[test]
    fn test_set_replaces_open_fraction() {
        let outcome = StockLevel::apply_set(Some(level(3, 60)), Percent::clamped(25));
        assert_eq!(outcome.level, level(3, 25));
        assert_eq!(outcome.delta, 0);
    }

    #[test]
    fn test_set_full_closes_fraction_and_is_idempotent() {
        let first = StockLevel::apply_set(Some(level(2, 60)), Percent::FULL);
        assert_eq!(first.level, level(2, 100));
        assert_eq!(first.delta, 0);

        let again = StockLevel::apply_set(Some(first.level), Percent::FULL);
        assert_eq!(again.level, first.level);
        assert_eq!(again.delta, 0);
    }

    #[test]
    fn test_set_on_empty_whole_just_records_percent() {
        let outcome = StockLevel::apply_set(Some(level(0, 100)), Percent::clamped(10));
        assert_eq!(outcome.level, level(0, 10));
        assert_eq!(outcome.delta, 0);
    }

    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        // deterministic pseudo-random walk over all three operations
        let mut current: Option<StockLevel> = None;
        let mut seed: u64 = 0x5eed;
        for _ in 0..2_000 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let op = (seed >> 33) % 3;
            let pct = ((seed >> 40) % 140) as i64 - 20;
            current = match op {
                0 => Some(StockLevel::apply_input(current)),
                1 => match StockLevel::apply_output(current, "sku") {
                    Ok(outcome) => Some(outcome.level),
                    Err(_) => current,
                },
                _ => Some(StockLevel::apply_set(current, Percent::clamped(pct)).level),
            };
            let level = current.unwrap();
            assert!(level.qty() >= 0);
            assert!(level.percent().value() <= 100);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(level(3, 100).to_string(), "3");
        assert_eq!(level(0, 40).to_string(), "0 + 40%");
    }

    #[test]
    fn test_parse_set_aux() {
        assert_eq!(parse_set_aux("40|-1"), Some((Percent::clamped(40), -1)));
        assert_eq!(parse_set_aux("100|0"), Some((Percent::FULL, 0)));
        assert_eq!(parse_set_aux("garbage"), None);
    }

    #[test]
    fn test_replay_counts_inputs_minus_outputs() {
        let events = vec![
            event(1, "X", EventKind::Input),
            event(2, "X", EventKind::Input),
            event(3, "X", EventKind::Input),
            event(4, "X", EventKind::Output),
            event(5, "Y", EventKind::Input),
            event(6, "Y", EventKind::Output),
            event(7, "Z", EventKind::Output),
            event(8, "X", EventKind::Set),
        ];

        let rebuilt = replay(&events);

        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt[0].sku, "X");
        assert_eq!(rebuilt[0].qty, 2);
    }

    #[test]
    fn test_replay_prefers_newest_snapshot() {
        let mut old = event(1, "A", EventKind::Input);
        old.product = Some("Old name".to_string());
        old.brand = Some("Acme".to_string());
        let mut new = event(2, "A", EventKind::Input);
        new.product = Some("New name".to_string());

        let rebuilt = replay(&[old, new]);

        assert_eq!(rebuilt[0].snapshot.product.as_deref(), Some("New name"));
        assert_eq!(rebuilt[0].snapshot.brand.as_deref(), Some("Acme"));
        assert_eq!(rebuilt[0].qty, 2);
    }
}
