//! Portfolio Aggregator
//!
//! Read-only projection from a ledger snapshot to a portfolio summary:
//! global totals, a per-asset-class breakdown, and quantity-weighted net
//! Greeks when option positions are present. Holds no state of its own.

use std::collections::BTreeMap;

use crate::types::{
    AssetClass, AssetClassSummary, GreeksSummary, PortfolioSummary, Position, PositionDetail,
};

/// Stateless rollup over position snapshots.
pub struct PortfolioAggregator;

impl PortfolioAggregator {
    /// Compute the portfolio summary for a snapshot of positions.
    pub fn summarize(positions: &[Position]) -> PortfolioSummary {
        let now = chrono::Utc::now().timestamp_millis();

        if positions.is_empty() {
            return PortfolioSummary::empty(now);
        }

        let total_market_value: f64 = positions.iter().map(|p| p.market_value()).sum();

        let mut groups: BTreeMap<AssetClass, Vec<&Position>> = BTreeMap::new();
        for position in positions {
            groups.entry(position.asset_class).or_default().push(position);
        }

        let asset_classes: Vec<AssetClassSummary> = groups
            .iter()
            .map(|(&asset_class, group)| {
                Self::summarize_class(asset_class, group, total_market_value)
            })
            .collect();

        let realized_pnl: f64 = positions.iter().map(|p| p.realized_pnl).sum();
        let unrealized_pnl: f64 = positions.iter().map(|p| p.unrealized_pnl()).sum();

        PortfolioSummary {
            total_market_value,
            total_pnl: realized_pnl + unrealized_pnl,
            realized_pnl,
            unrealized_pnl,
            total_positions: positions.len() as u32,
            asset_classes,
            greeks: Self::weighted_greeks(positions),
            last_updated: now,
        }
    }

    /// Rollup for one asset class. The percent denominator is the global
    /// portfolio market value, 0-guarded for an empty portfolio.
    fn summarize_class(
        asset_class: AssetClass,
        group: &[&Position],
        total_market_value: f64,
    ) -> AssetClassSummary {
        let market_value: f64 = group.iter().map(|p| p.market_value()).sum();
        let realized_pnl: f64 = group.iter().map(|p| p.realized_pnl).sum();
        let unrealized_pnl: f64 = group.iter().map(|p| p.unrealized_pnl()).sum();

        let percent_of_portfolio = if total_market_value > 0.0 {
            market_value / total_market_value * 100.0
        } else {
            0.0
        };

        let total_notional_value = match asset_class {
            AssetClass::Future => Some(group.iter().map(|p| p.notional_value()).sum()),
            _ => None,
        };

        let greeks = match asset_class {
            AssetClass::Option => Self::weighted_greeks(group.iter().copied()),
            _ => None,
        };

        AssetClassSummary {
            asset_class,
            market_value,
            total_pnl: realized_pnl + unrealized_pnl,
            unrealized_pnl,
            realized_pnl,
            position_count: group.len() as u32,
            percent_of_portfolio,
            total_notional_value,
            greeks,
        }
    }

    /// Quantity-weighted Greeks over the option positions in a snapshot.
    /// Returns `None` when no option position exists.
    fn weighted_greeks<'a>(
        positions: impl IntoIterator<Item = &'a Position>,
    ) -> Option<GreeksSummary> {
        let mut summary = GreeksSummary::default();
        let mut any_options = false;

        for position in positions {
            if let PositionDetail::Option { greeks, .. } = position.detail {
                any_options = true;
                summary.total_delta += greeks.delta * position.quantity;
                summary.total_gamma += greeks.gamma * position.quantity;
                summary.total_theta += greeks.theta * position.quantity;
                summary.total_vega += greeks.vega * position.quantity;
                summary.total_rho += greeks.rho * position.quantity;
            }
        }

        any_options.then_some(summary)
    }
}
