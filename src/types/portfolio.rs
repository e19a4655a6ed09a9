//! Portfolio Summary Types
//!
//! Read-only rollups over the current ledger snapshot: one summary per
//! asset class present, plus portfolio-wide totals and, when any option
//! position exists, a net Greeks exposure.

use serde::{Deserialize, Serialize};

use super::fill::AssetClass;

/// Net Greeks exposure across option positions.
///
/// Each field is a quantity-weighted sum (Σ greekᵢ · quantityᵢ) so the
/// numbers reflect net directional exposure, not a per-contract average.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreeksSummary {
    pub total_delta: f64,
    pub total_gamma: f64,
    pub total_theta: f64,
    pub total_vega: f64,
    pub total_rho: f64,
}

/// Rollup for a single asset class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClassSummary {
    /// Asset class this summary covers
    pub asset_class: AssetClass,
    /// Sum of position market values
    pub market_value: f64,
    /// Realized plus unrealized P&L
    pub total_pnl: f64,
    /// Paper P&L on open quantities
    pub unrealized_pnl: f64,
    /// P&L locked in by reducing trades
    pub realized_pnl: f64,
    /// Number of positions in this class
    pub position_count: u32,
    /// Share of the total portfolio market value (0 when the total is 0)
    pub percent_of_portfolio: f64,
    /// Total notional exposure (futures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_notional_value: Option<f64>,
    /// Net Greeks exposure (options only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeks: Option<GreeksSummary>,
}

/// Portfolio-wide rollup over the current ledger snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// Sum of all position market values
    pub total_market_value: f64,
    /// Realized plus unrealized P&L across all positions
    pub total_pnl: f64,
    /// Realized P&L across all positions
    pub realized_pnl: f64,
    /// Unrealized P&L across all positions
    pub unrealized_pnl: f64,
    /// Number of positions in the ledger
    pub total_positions: u32,
    /// Per-asset-class breakdown, ordered by asset class
    pub asset_classes: Vec<AssetClassSummary>,
    /// Net Greeks exposure, present only if any option position exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeks: Option<GreeksSummary>,
    /// When the summary was computed (ms)
    pub last_updated: i64,
}

impl PortfolioSummary {
    /// Summary of an empty ledger: zero totals, no breakdown, no Greeks.
    pub fn empty(now_ms: i64) -> Self {
        Self {
            total_market_value: 0.0,
            total_pnl: 0.0,
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            total_positions: 0,
            asset_classes: Vec::new(),
            greeks: None,
            last_updated: now_ms,
        }
    }
}
