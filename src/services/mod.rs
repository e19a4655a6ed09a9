pub mod engine;
pub mod greeks;
pub mod ledger;
pub mod portfolio;

pub use engine::{EngineError, RiskEngine};
pub use greeks::{GreeksEngine, GreeksError};
pub use ledger::PositionLedger;
pub use portfolio::PortfolioAggregator;
