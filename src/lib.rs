//! Wraith - Real-time position tracking and portfolio risk aggregation engine
//!
//! Ingests fills and price ticks, maintains per-instrument positions
//! (quantity, cost basis, realized/unrealized P&L), computes option Greeks
//! with closed-form Black-Scholes, and rolls everything up into portfolio-
//! and asset-class-level summaries. Changes are pushed out on a broadcast
//! channel for a transport layer to deliver; the engine never blocks on
//! delivery.
//!
//! All state is in process memory and is lost on restart. Mutations
//! serialize through a single whole-ledger critical section; reads operate
//! on point-in-time snapshots.

pub mod config;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use services::{
    EngineError, GreeksEngine, GreeksError, PortfolioAggregator, PositionLedger, RiskEngine,
};
pub use types::*;
