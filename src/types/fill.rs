//! Fill Types
//!
//! A fill is an immutable record of a single executed trade. Fills are the
//! only input that mutates position state; everything else (P&L, summaries,
//! Greeks) is derived from the accumulated fills and the latest prices.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Asset class for a tradable instrument.
///
/// Declaration order defines the display/sort order of ledger snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Equities
    Stock,
    /// Futures contracts
    Future,
    /// Options contracts
    Option,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Stock => write!(f, "stock"),
            AssetClass::Future => write!(f, "future"),
            AssetClass::Option => write!(f, "option"),
        }
    }
}

/// Fill side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for Side {
    type Err = crate::services::EngineError;

    /// Parse a raw side string from a transport layer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(crate::services::EngineError::InvalidSide(other.to_string())),
        }
    }
}

/// Option type (Call or Put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Right to buy at strike price
    Call,
    /// Right to sell at strike price
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// A single executed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    /// Unique fill ID
    pub id: String,
    /// When the fill occurred (ms)
    pub timestamp: i64,
    /// Instrument symbol (for options, the underlying symbol)
    pub symbol: String,
    /// Asset class
    pub asset_class: AssetClass,
    /// Buy or sell
    pub side: Side,
    /// Quantity filled (unsigned magnitude)
    pub quantity: f64,
    /// Execution price per unit
    pub price: f64,
    /// Commission charged for this fill
    pub commission: f64,
    /// Strike price (options only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    /// Expiration date in ms (options and futures)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    /// Call or put (options only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,
}

impl Fill {
    /// Create a new stock or future fill.
    pub fn new(
        symbol: impl Into<String>,
        asset_class: AssetClass,
        side: Side,
        quantity: f64,
        price: f64,
        commission: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            symbol: symbol.into(),
            asset_class,
            side,
            quantity,
            price,
            commission,
            strike: None,
            expiration: None,
            option_type: None,
        }
    }

    /// Create a new option fill.
    pub fn option(
        symbol: impl Into<String>,
        option_type: OptionType,
        strike: f64,
        expiration: i64,
        side: Side,
        quantity: f64,
        price: f64,
        commission: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            symbol: symbol.into(),
            asset_class: AssetClass::Option,
            side,
            quantity,
            price,
            commission,
            strike: Some(strike),
            expiration: Some(expiration),
            option_type: Some(option_type),
        }
    }

    /// Canonical instrument id this fill maps to in the ledger.
    ///
    /// Stocks and futures are keyed by symbol. Options are keyed by an
    /// OCC-style contract id (e.g. "AAPL240119C00150000") so that distinct
    /// contracts on the same underlying resolve to distinct positions.
    pub fn instrument_id(&self) -> String {
        match (self.asset_class, self.option_type, self.strike, self.expiration) {
            (AssetClass::Option, Some(option_type), Some(strike), Some(expiration)) => {
                let datetime = chrono::DateTime::from_timestamp_millis(expiration)
                    .unwrap_or_else(chrono::Utc::now);
                let date_str = datetime.format("%y%m%d").to_string();
                let type_char = match option_type {
                    OptionType::Call => "C",
                    OptionType::Put => "P",
                };
                let strike_str = format!("{:08}", (strike * 1000.0) as u64);
                format!("{}{}{}{}", self.symbol, date_str, type_char, strike_str)
            }
            _ => self.symbol.clone(),
        }
    }
}
