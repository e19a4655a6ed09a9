use std::env;

/// Engine configuration.
///
/// All values have sensible defaults; `from_env` lets a deployment override
/// them without recompiling. The future contract terms are illustrative
/// placeholders, not market-sourced contract data.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Assumed risk-free interest rate (annual, as decimal).
    pub risk_free_rate: f64,
    /// Implied volatility assigned to newly created option positions.
    pub default_implied_volatility: f64,
    /// Contract multiplier for newly created option positions.
    pub option_multiplier: u32,
    /// Contract size for newly created future positions.
    pub future_contract_size: f64,
    /// Margin placeholder per future contract.
    pub future_margin_per_contract: f64,
    /// Capacity of the outbound event broadcast channel.
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            default_implied_volatility: 0.30,
            option_multiplier: 100,
            future_contract_size: 50.0,
            future_margin_per_contract: 5_000.0,
            event_channel_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            risk_free_rate: env::var("RISK_FREE_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.risk_free_rate),
            default_implied_volatility: env::var("DEFAULT_IMPLIED_VOLATILITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_implied_volatility),
            option_multiplier: env::var("OPTION_MULTIPLIER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.option_multiplier),
            future_contract_size: env::var("FUTURE_CONTRACT_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.future_contract_size),
            future_margin_per_contract: env::var("FUTURE_MARGIN_PER_CONTRACT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.future_margin_per_contract),
            event_channel_capacity: env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.event_channel_capacity),
        }
    }
}
