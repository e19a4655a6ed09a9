//! Engine Events
//!
//! Outbound change notifications pushed on the engine's broadcast channel.
//! A transport layer subscribes and forwards these to its own clients; the
//! engine never waits on delivery.

use serde::Serialize;

use super::portfolio::PortfolioSummary;
use super::position::Position;

/// Change notification emitted after a committed mutation.
///
/// Within one logical update the position event always precedes the
/// ensuing portfolio event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A position was created or updated
    PositionChanged {
        position: Position,
        timestamp: i64,
    },
    /// The portfolio summary was recomputed
    PortfolioChanged {
        summary: PortfolioSummary,
        timestamp: i64,
    },
}
