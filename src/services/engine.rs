//! Risk Engine
//!
//! The facade the rest of the platform talks to. Fills and price ticks come
//! in, position state is mutated under the ledger's single mutation gate,
//! and change events go out on a broadcast channel:
//!
//! fill → validate → ledger mutation (cost basis, realized P&L, Greeks)
//!      → position event → portfolio summary event
//!
//! tick → record price → re-value affected positions → position events
//!      → one portfolio summary event
//!
//! Event delivery is fire-and-forget; a slow or absent subscriber never
//! blocks fill or tick processing.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::services::greeks::GreeksEngine;
use crate::services::ledger::PositionLedger;
use crate::services::portfolio::PortfolioAggregator;
use crate::types::{
    AssetClass, EngineEvent, Fill, OptionType, PortfolioSummary, Position, PositionDetail, Side,
};

/// Risk engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid fill: {0}")]
    InvalidFill(String),

    #[error("Invalid side: {0}")]
    InvalidSide(String),
}

/// Position tracking and risk aggregation engine.
pub struct RiskEngine {
    config: EngineConfig,
    ledger: PositionLedger,
    greeks_engine: GreeksEngine,
    events_tx: broadcast::Sender<EngineEvent>,
}

impl RiskEngine {
    /// Create a new engine with default configuration.
    pub fn new() -> (Arc<Self>, broadcast::Receiver<EngineEvent>) {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> (Arc<Self>, broadcast::Receiver<EngineEvent>) {
        let (events_tx, events_rx) = broadcast::channel(config.event_channel_capacity);
        let engine = Arc::new(Self {
            greeks_engine: GreeksEngine::new(config.risk_free_rate),
            ledger: PositionLedger::new(),
            config,
            events_tx,
        });
        (engine, events_rx)
    }

    /// Subscribe to engine change events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events_tx.subscribe()
    }

    /// The underlying ledger (read-only snapshots).
    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    /// The pricing engine, for callers that need theoretical prices or
    /// implied volatility outside the fill path.
    pub fn greeks_engine(&self) -> &GreeksEngine {
        &self.greeks_engine
    }

    // ==========================================================================
    // Fill Processing
    // ==========================================================================

    /// Apply a fill to the ledger.
    ///
    /// Validation happens before any mutation: a rejected fill leaves the
    /// ledger untouched. A validated fill fully applies (quantity, cost
    /// basis or realized P&L, fill history, Greeks) and triggers exactly
    /// one position event followed by one portfolio event.
    pub fn process_fill(&self, fill: Fill) -> Result<Position, EngineError> {
        if fill.quantity <= 0.0 {
            return Err(EngineError::InvalidFill(format!(
                "fill {} quantity must be positive, got {}",
                fill.id, fill.quantity
            )));
        }

        // Option fills must carry the full contract key.
        let option_fields = match fill.asset_class {
            AssetClass::Option => match (fill.option_type, fill.strike, fill.expiration) {
                (Some(option_type), Some(strike), Some(expiration)) => {
                    Some((option_type, strike, expiration))
                }
                _ => {
                    return Err(EngineError::InvalidFill(format!(
                        "option fill {} missing strike, expiration, or option type",
                        fill.id
                    )));
                }
            },
            _ => None,
        };

        let id = fill.instrument_id();
        let now = chrono::Utc::now().timestamp_millis();

        let snapshot = {
            let _gate = self.ledger.lock_mutations();

            let mut entry = self
                .ledger
                .entry(id.clone())
                .or_insert_with(|| self.create_position(&id, &fill, option_fields));
            let position = entry.value_mut();

            match fill.side {
                Side::Buy => {
                    let new_quantity = position.quantity + fill.quantity;
                    position.avg_cost_basis = if new_quantity == 0.0 {
                        0.0
                    } else {
                        (position.quantity * position.avg_cost_basis
                            + fill.quantity * fill.price)
                            / new_quantity
                    };
                    position.quantity = new_quantity;
                }
                Side::Sell => {
                    // The same formula applies when the sell opens or grows a
                    // short; the average then reflects only prior buys.
                    position.realized_pnl +=
                        (fill.price - position.avg_cost_basis) * fill.quantity - fill.commission;
                    position.quantity -= fill.quantity;
                    if position.quantity == 0.0 {
                        position.avg_cost_basis = 0.0;
                    }
                }
            }

            position.current_price = fill.price;
            position.fills.push(fill.clone());
            position.updated_at = now;

            if let Some(underlying) = position.underlying_symbol() {
                // Best-known underlying price: last tick, else the fill price.
                let underlying_price =
                    self.ledger.last_price(underlying).unwrap_or(fill.price);
                self.recompute_greeks(position, underlying_price);
            }

            position.clone()
        };

        debug!(
            "Applied fill {}: {} {} {} @ {} -> position {} qty {}",
            fill.id, fill.side, fill.quantity, fill.symbol, fill.price, id, snapshot.quantity
        );

        self.emit(EngineEvent::PositionChanged {
            position: snapshot.clone(),
            timestamp: now,
        });
        self.emit_portfolio_changed();

        Ok(snapshot)
    }

    /// Build a fresh position with asset-class defaults for the first fill
    /// that maps to this instrument id.
    fn create_position(
        &self,
        id: &str,
        fill: &Fill,
        option_fields: Option<(OptionType, f64, i64)>,
    ) -> Position {
        let detail = match option_fields {
            Some((option_type, strike, expiration)) => PositionDetail::Option {
                option_type,
                strike,
                expiration,
                underlying_symbol: fill.symbol.clone(),
                implied_volatility: self.config.default_implied_volatility,
                multiplier: self.config.option_multiplier,
                greeks: Default::default(),
            },
            None => match fill.asset_class {
                AssetClass::Future => PositionDetail::Future {
                    contract_size: self.config.future_contract_size,
                    expiration: fill.expiration,
                    margin_required: self.config.future_margin_per_contract,
                },
                _ => PositionDetail::Stock,
            },
        };

        Position::new(id.to_string(), fill.symbol.clone(), detail)
    }

    // ==========================================================================
    // Price Updates
    // ==========================================================================

    /// Apply a price tick to every position priced off `symbol`.
    ///
    /// A position's own price follows ticks for its own symbol; option
    /// Greeks follow ticks for the underlying symbol. The affected set is
    /// snapshotted up front, so positions created mid-tick are picked up by
    /// the next tick instead.
    pub fn update_price(&self, symbol: &str, price: f64) {
        self.ledger.record_price(symbol, price);

        let affected: Vec<String> = self
            .ledger
            .list_all()
            .into_iter()
            .filter(|p| p.symbol == symbol || p.underlying_symbol() == Some(symbol))
            .map(|p| p.id)
            .collect();

        if affected.is_empty() {
            return;
        }

        let now = chrono::Utc::now().timestamp_millis();
        let mut changed = Vec::with_capacity(affected.len());

        {
            let _gate = self.ledger.lock_mutations();

            for id in &affected {
                if let Some(mut entry) = self.ledger.get_mut(id) {
                    let position = entry.value_mut();

                    if position.symbol == symbol {
                        position.current_price = price;
                    }
                    if position.underlying_symbol() == Some(symbol) {
                        self.recompute_greeks(position, price);
                    }
                    position.updated_at = now;

                    changed.push(position.clone());
                }
            }
        }

        debug!(
            "Price update {} @ {} touched {} position(s)",
            symbol,
            price,
            changed.len()
        );

        for position in changed {
            self.emit(EngineEvent::PositionChanged {
                position,
                timestamp: now,
            });
        }
        self.emit_portfolio_changed();
    }

    /// Recompute an option position's Greeks against an underlying price.
    fn recompute_greeks(&self, position: &mut Position, underlying_price: f64) {
        let now = chrono::Utc::now().timestamp_millis();
        let time_years = position.time_to_expiry_years(now).unwrap_or(0.0);

        if let PositionDetail::Option {
            option_type,
            strike,
            implied_volatility,
            ref mut greeks,
            ..
        } = position.detail
        {
            *greeks = self.greeks_engine.calculate_greeks(
                underlying_price,
                strike,
                time_years,
                implied_volatility,
                option_type,
            );
        }
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    /// Snapshot of all positions, ordered by (asset class, symbol).
    pub fn all_positions(&self) -> Vec<Position> {
        self.ledger.list_all()
    }

    /// Snapshot of the positions in one asset class.
    pub fn positions_by_asset_class(&self, asset_class: AssetClass) -> Vec<Position> {
        self.ledger.list_by_asset_class(asset_class)
    }

    /// Current portfolio summary.
    pub fn portfolio_summary(&self) -> PortfolioSummary {
        PortfolioAggregator::summarize(&self.ledger.list_all())
    }

    /// Discard all positions and cached prices. Administrative reset, not
    /// part of normal trading flow.
    pub fn clear_all(&self) {
        self.ledger.clear();
        info!("Risk engine state cleared");
        self.emit_portfolio_changed();
    }

    // ==========================================================================
    // Event Emission
    // ==========================================================================

    /// Broadcast an event (ignore errors if no receivers).
    fn emit(&self, event: EngineEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Recompute the summary from the current snapshot and broadcast it.
    fn emit_portfolio_changed(&self) {
        let summary = self.portfolio_summary();
        let timestamp = summary.last_updated;
        self.emit(EngineEvent::PortfolioChanged { summary, timestamp });
    }
}
