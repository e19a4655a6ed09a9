//! Position Types
//!
//! A position is the net holding in one instrument (or one option
//! contract), with accumulated cost basis, realized P&L, and the full fill
//! history that produced it. Variant-specific state (option Greeks, future
//! contract terms) lives in a tagged payload so aggregation can match on
//! the asset class exhaustively.

use serde::{Deserialize, Serialize};

use super::fill::{AssetClass, Fill, OptionType};

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Greeks for an option position.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Greeks {
    /// Price sensitivity to underlying price change (dV/dS)
    pub delta: f64,
    /// Rate of change of delta (d²V/dS²)
    pub gamma: f64,
    /// Time decay per day (dV/dt)
    pub theta: f64,
    /// Sensitivity to a 1% volatility change (dV/dσ)
    pub vega: f64,
    /// Sensitivity to a 1% interest rate change (dV/dr)
    pub rho: f64,
}

impl Greeks {
    /// Create new Greeks.
    pub fn new(delta: f64, gamma: f64, theta: f64, vega: f64, rho: f64) -> Self {
        Self { delta, gamma, theta, vega, rho }
    }
}

/// Position side (long or short), derived from the signed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "long"),
            PositionSide::Short => write!(f, "short"),
        }
    }
}

/// Variant-specific payload for a position, tagged by asset class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionDetail {
    /// Plain equity holding, no extra state
    Stock,
    /// Futures contract terms
    #[serde(rename_all = "camelCase")]
    Future {
        /// Units of the underlying per contract
        contract_size: f64,
        /// Expiration date in ms, when known
        #[serde(skip_serializing_if = "Option::is_none")]
        expiration: Option<i64>,
        /// Margin placeholder per contract
        margin_required: f64,
    },
    /// Option contract terms and current sensitivities
    #[serde(rename_all = "camelCase")]
    Option {
        option_type: OptionType,
        strike: f64,
        /// Expiration date (ms)
        expiration: i64,
        /// Symbol whose price drives the Greeks
        underlying_symbol: String,
        /// Implied volatility as a decimal (0.30 = 30%)
        implied_volatility: f64,
        /// Contract multiplier (usually 100 for equity options)
        multiplier: u32,
        /// Current Greeks
        greeks: Greeks,
    },
}

impl PositionDetail {
    /// Asset class this payload belongs to.
    pub fn asset_class(&self) -> AssetClass {
        match self {
            PositionDetail::Stock => AssetClass::Stock,
            PositionDetail::Future { .. } => AssetClass::Future,
            PositionDetail::Option { .. } => AssetClass::Option,
        }
    }
}

/// The net holding in one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Canonical instrument id (ledger key)
    pub id: String,
    /// Instrument symbol (for options, the underlying symbol)
    pub symbol: String,
    /// Asset class, always matching the detail variant
    pub asset_class: AssetClass,
    /// Signed quantity: positive = long, negative = short
    pub quantity: f64,
    /// Volume-weighted average cost of the open quantity
    pub avg_cost_basis: f64,
    /// Latest known market price for this instrument
    pub current_price: f64,
    /// P&L locked in by reducing trades
    pub realized_pnl: f64,
    /// Append-only fill history
    pub fills: Vec<Fill>,
    /// Variant-specific state
    pub detail: PositionDetail,
    /// When the position was created (ms)
    pub created_at: i64,
    /// When the position was last updated (ms)
    pub updated_at: i64,
}

impl Position {
    /// Create an empty position for an instrument. State accrues via fills.
    pub fn new(id: String, symbol: String, detail: PositionDetail) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            symbol,
            asset_class: detail.asset_class(),
            quantity: 0.0,
            avg_cost_basis: 0.0,
            current_price: 0.0,
            realized_pnl: 0.0,
            fills: Vec::new(),
            detail,
            created_at: now,
            updated_at: now,
        }
    }

    /// Long or short, from the sign of the quantity. Flat counts as long.
    pub fn side(&self) -> PositionSide {
        if self.quantity >= 0.0 {
            PositionSide::Long
        } else {
            PositionSide::Short
        }
    }

    /// Paper P&L on the open quantity at the current price.
    pub fn unrealized_pnl(&self) -> f64 {
        (self.current_price - self.avg_cost_basis) * self.quantity
    }

    /// Absolute market value of the open quantity.
    pub fn market_value(&self) -> f64 {
        self.current_price * self.quantity.abs()
    }

    /// Realized plus unrealized P&L.
    pub fn total_pnl(&self) -> f64 {
        self.realized_pnl + self.unrealized_pnl()
    }

    /// Notional exposure. For futures this scales by the contract size.
    pub fn notional_value(&self) -> f64 {
        match self.detail {
            PositionDetail::Future { contract_size, .. } => {
                self.quantity.abs() * self.current_price * contract_size
            }
            _ => self.quantity.abs() * self.current_price,
        }
    }

    /// Check whether the position is flat (zero quantity).
    pub fn is_flat(&self) -> bool {
        self.quantity == 0.0
    }

    /// Symbol whose price ticks drive this position's Greeks (options only).
    pub fn underlying_symbol(&self) -> Option<&str> {
        match &self.detail {
            PositionDetail::Option { underlying_symbol, .. } => Some(underlying_symbol),
            _ => None,
        }
    }

    /// Current Greeks (options only).
    pub fn greeks(&self) -> Option<Greeks> {
        match self.detail {
            PositionDetail::Option { greeks, .. } => Some(greeks),
            _ => None,
        }
    }

    /// Intrinsic value per unit at the given underlying price (options only).
    pub fn intrinsic_value(&self, underlying_price: f64) -> Option<f64> {
        match self.detail {
            PositionDetail::Option { option_type, strike, .. } => Some(match option_type {
                OptionType::Call => (underlying_price - strike).max(0.0),
                OptionType::Put => (strike - underlying_price).max(0.0),
            }),
            _ => None,
        }
    }

    /// Check if the option is in the money at the given underlying price.
    pub fn is_itm(&self, underlying_price: f64) -> Option<bool> {
        self.intrinsic_value(underlying_price).map(|v| v > 0.0)
    }

    /// Years until expiration as of `now_ms`, floored at zero (options only).
    pub fn time_to_expiry_years(&self, now_ms: i64) -> Option<f64> {
        match self.detail {
            PositionDetail::Option { expiration, .. } => {
                let diff_ms = (expiration - now_ms).max(0) as f64;
                Some(diff_ms / MS_PER_DAY / 365.0)
            }
            _ => None,
        }
    }
}
