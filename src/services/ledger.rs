//! Position Ledger
//!
//! Single source of truth for instrument id → position, plus the last-seen
//! tick price per symbol (used as the best-known underlying price when
//! re-pricing option Greeks). State lives entirely in process memory and is
//! lost on restart.
//!
//! Locking contract: every mutation of position state, regardless of key,
//! serializes through the single `mutation` gate. The per-shard locking of
//! the underlying map is not enough on its own, since the engine's fill and
//! price-tick paths read and write multiple entries as one logical step.
//! Reads (`list_all`, `get`, the summary path) take point-in-time snapshots
//! and are not linearized against in-flight mutations.

use crate::types::{AssetClass, Position};
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// In-memory position ledger.
pub struct PositionLedger {
    /// Positions keyed by canonical instrument id.
    positions: DashMap<String, Position>,
    /// Last tick price per symbol.
    prices: DashMap<String, f64>,
    /// Whole-ledger mutation gate (see module docs).
    mutation: Mutex<()>,
}

impl PositionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            positions: DashMap::new(),
            prices: DashMap::new(),
            mutation: Mutex::new(()),
        }
    }

    /// Acquire the whole-ledger mutation gate.
    ///
    /// A poisoned gate is recovered with `into_inner`: the guarded maps are
    /// individually consistent, the gate only orders writers.
    pub(crate) fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        self.mutation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Entry handle for create-or-update. Callers must hold the mutation
    /// gate; the entry API guarantees two racing creators for a brand-new
    /// key still resolve to one record.
    pub(crate) fn entry(&self, id: String) -> Entry<'_, String, Position> {
        self.positions.entry(id)
    }

    /// Mutable handle to an existing position. Callers must hold the
    /// mutation gate.
    pub(crate) fn get_mut(&self, id: &str) -> Option<RefMut<'_, String, Position>> {
        self.positions.get_mut(id)
    }

    /// Get a snapshot of a single position.
    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of all positions, ordered by (asset class, symbol, id).
    pub fn list_all(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self
            .positions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        positions.sort_by(|a, b| {
            (a.asset_class, &a.symbol, &a.id).cmp(&(b.asset_class, &b.symbol, &b.id))
        });

        positions
    }

    /// Snapshot of the positions in one asset class, same ordering.
    pub fn list_by_asset_class(&self, asset_class: AssetClass) -> Vec<Position> {
        let mut positions: Vec<Position> = self
            .positions
            .iter()
            .filter(|entry| entry.value().asset_class == asset_class)
            .map(|entry| entry.value().clone())
            .collect();

        positions.sort_by(|a, b| (&a.symbol, &a.id).cmp(&(&b.symbol, &b.id)));

        positions
    }

    /// Number of positions in the ledger.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the ledger holds no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Record the latest tick price for a symbol.
    pub fn record_price(&self, symbol: &str, price: f64) {
        self.prices.insert(symbol.to_string(), price);
    }

    /// Last tick price seen for a symbol, if any.
    pub fn last_price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).map(|entry| *entry.value())
    }

    /// Discard all positions and cached prices. Not reversible.
    pub fn clear(&self) {
        let _gate = self.lock_mutations();
        self.positions.clear();
        self.prices.clear();
        info!("Position ledger cleared");
    }
}

impl Default for PositionLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionDetail;

    fn stock_position(id: &str, symbol: &str) -> Position {
        Position::new(id.to_string(), symbol.to_string(), PositionDetail::Stock)
    }

    #[test]
    fn test_list_all_ordering() {
        let ledger = PositionLedger::new();
        ledger
            .entry("MSFT".to_string())
            .or_insert_with(|| stock_position("MSFT", "MSFT"));
        ledger
            .entry("AAPL".to_string())
            .or_insert_with(|| stock_position("AAPL", "AAPL"));

        let all = ledger.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].symbol, "AAPL");
        assert_eq!(all[1].symbol, "MSFT");
    }

    #[test]
    fn test_clear_discards_prices() {
        let ledger = PositionLedger::new();
        ledger
            .entry("AAPL".to_string())
            .or_insert_with(|| stock_position("AAPL", "AAPL"));
        ledger.record_price("AAPL", 150.0);

        ledger.clear();

        assert!(ledger.is_empty());
        assert_eq!(ledger.last_price("AAPL"), None);
    }

    #[test]
    fn test_last_price_tracks_latest() {
        let ledger = PositionLedger::new();
        assert_eq!(ledger.last_price("SPY"), None);

        ledger.record_price("SPY", 430.0);
        ledger.record_price("SPY", 431.5);

        assert_eq!(ledger.last_price("SPY"), Some(431.5));
    }
}
