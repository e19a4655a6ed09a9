//! Greeks Engine
//!
//! Closed-form risk sensitivities for European options:
//! - Black-Scholes pricing
//! - Greeks calculation (Delta, Gamma, Theta, Vega, Rho)
//! - Implied volatility (Newton-Raphson with bisection fallback)
//!
//! Greek recomputation is a steady-state path inside the engine, so
//! `calculate_greeks` clamps degenerate inputs (expired contracts, zero
//! volatility) instead of erroring; input validation lives on the pricing
//! and implied-volatility surface where callers supply market data.

use crate::types::{Greeks, OptionType};
use std::f64::consts::{E, PI};
use thiserror::Error;
use tracing::debug;

/// Minimum time-to-expiration in years. Expired or same-instant contracts
/// are priced at this horizon so the d1/d2 terms stay finite.
const MIN_TIME_TO_EXPIRY_YEARS: f64 = 1e-5;

/// Minimum volatility. Keeps the σ√T denominator away from zero.
const MIN_VOLATILITY: f64 = 1e-4;

/// Greeks engine errors.
#[derive(Debug, Error)]
pub enum GreeksError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IV convergence failed after {0} iterations")]
    IvConvergenceFailed(u32),
}

/// Stateless Black-Scholes calculator.
///
/// Side-effect-pure: output depends only on the arguments and the
/// configured risk-free rate.
pub struct GreeksEngine {
    /// Risk-free interest rate (annual, as decimal)
    risk_free_rate: f64,
}

impl GreeksEngine {
    /// Create a new Greeks engine with the given risk-free rate.
    pub fn new(risk_free_rate: f64) -> Self {
        Self { risk_free_rate }
    }

    /// The configured risk-free rate.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    // ========== Black-Scholes Helpers ==========

    /// Calculate d1 parameter for Black-Scholes.
    fn d1(&self, spot: f64, strike: f64, time: f64, volatility: f64) -> f64 {
        let r = self.risk_free_rate;
        (f64::ln(spot / strike) + (r + volatility.powi(2) / 2.0) * time) / (volatility * time.sqrt())
    }

    /// Calculate d2 parameter for Black-Scholes.
    fn d2(&self, d1: f64, volatility: f64, time: f64) -> f64 {
        d1 - volatility * time.sqrt()
    }

    /// Standard normal cumulative distribution function.
    fn norm_cdf(&self, x: f64) -> f64 {
        // Approximation using error function
        0.5 * (1.0 + erf(x / 2.0_f64.sqrt()))
    }

    /// Standard normal probability density function.
    fn norm_pdf(&self, x: f64) -> f64 {
        E.powf(-x.powi(2) / 2.0) / (2.0 * PI).sqrt()
    }

    // ========== Greeks ==========

    /// Calculate all Greeks for a European option.
    ///
    /// Time and volatility are clamped to small positive minimums so that
    /// expired or zero-vol contracts yield finite sensitivities; a
    /// non-positive spot or strike yields flat zero Greeks.
    pub fn calculate_greeks(
        &self,
        spot: f64,
        strike: f64,
        time_years: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Greeks {
        if spot <= 0.0 || strike <= 0.0 {
            return Greeks::default();
        }

        let time = time_years.max(MIN_TIME_TO_EXPIRY_YEARS);
        let volatility = volatility.max(MIN_VOLATILITY);

        let d1 = self.d1(spot, strike, time, volatility);
        let d2 = self.d2(d1, volatility, time);
        let r = self.risk_free_rate;
        let discount = E.powf(-r * time);
        let sqrt_t = time.sqrt();

        // Delta
        let delta = match option_type {
            OptionType::Call => self.norm_cdf(d1),
            OptionType::Put => self.norm_cdf(d1) - 1.0,
        };

        // Gamma (same for calls and puts)
        let gamma = self.norm_pdf(d1) / (spot * volatility * sqrt_t);

        // Theta (per day)
        let theta = match option_type {
            OptionType::Call => {
                let term1 = -(spot * self.norm_pdf(d1) * volatility) / (2.0 * sqrt_t);
                let term2 = r * strike * discount * self.norm_cdf(d2);
                (term1 - term2) / 365.0
            }
            OptionType::Put => {
                let term1 = -(spot * self.norm_pdf(d1) * volatility) / (2.0 * sqrt_t);
                let term2 = r * strike * discount * self.norm_cdf(-d2);
                (term1 + term2) / 365.0
            }
        };

        // Vega (for 1% change in volatility)
        let vega = spot * sqrt_t * self.norm_pdf(d1) / 100.0;

        // Rho (for 1% change in interest rate)
        let rho = match option_type {
            OptionType::Call => strike * time * discount * self.norm_cdf(d2) / 100.0,
            OptionType::Put => -strike * time * discount * self.norm_cdf(-d2) / 100.0,
        };

        Greeks::new(delta, gamma, theta, vega, rho)
    }

    // ========== Black-Scholes Pricing ==========

    /// Calculate the Black-Scholes price for a European option.
    pub fn black_scholes_price(
        &self,
        spot: f64,
        strike: f64,
        time_years: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Result<f64, GreeksError> {
        if spot <= 0.0 || strike <= 0.0 || time_years <= 0.0 || volatility <= 0.0 {
            return Err(GreeksError::InvalidInput(
                "All inputs must be positive".to_string(),
            ));
        }

        let d1 = self.d1(spot, strike, time_years, volatility);
        let d2 = self.d2(d1, volatility, time_years);
        let r = self.risk_free_rate;
        let discount = E.powf(-r * time_years);

        let price = match option_type {
            OptionType::Call => {
                spot * self.norm_cdf(d1) - strike * discount * self.norm_cdf(d2)
            }
            OptionType::Put => {
                strike * discount * self.norm_cdf(-d2) - spot * self.norm_cdf(-d1)
            }
        };

        Ok(price.max(0.0))
    }

    // ========== Implied Volatility ==========

    /// Calculate implied volatility from a market price using
    /// Newton-Raphson, falling back to bisection when vega collapses.
    pub fn implied_volatility(
        &self,
        market_price: f64,
        spot: f64,
        strike: f64,
        time_years: f64,
        option_type: OptionType,
    ) -> Result<f64, GreeksError> {
        if market_price <= 0.0 || spot <= 0.0 || strike <= 0.0 || time_years <= 0.0 {
            return Err(GreeksError::InvalidInput(
                "All inputs must be positive".to_string(),
            ));
        }

        let max_iterations = 100;
        let tolerance = 1e-6;
        let mut vol = 0.2; // Initial guess: 20%

        for i in 0..max_iterations {
            let price = self.black_scholes_price(spot, strike, time_years, vol, option_type)?;
            let diff = price - market_price;

            if diff.abs() < tolerance {
                debug!(
                    "IV converged after {} iterations: {:.4}%",
                    i + 1,
                    vol * 100.0
                );
                return Ok(vol);
            }

            // Newton-Raphson step on vega
            let d1 = self.d1(spot, strike, time_years, vol);
            let vega = spot * time_years.sqrt() * self.norm_pdf(d1);

            if vega.abs() < 1e-10 {
                // Vega too small, use bisection fallback
                break;
            }

            vol -= diff / vega;

            // Keep volatility in reasonable bounds
            vol = vol.max(0.001).min(5.0);
        }

        self.implied_volatility_bisection(market_price, spot, strike, time_years, option_type)
    }

    /// Calculate implied volatility using bisection (fallback).
    fn implied_volatility_bisection(
        &self,
        market_price: f64,
        spot: f64,
        strike: f64,
        time_years: f64,
        option_type: OptionType,
    ) -> Result<f64, GreeksError> {
        let max_iterations = 200;
        let tolerance = 1e-6;
        let mut low = 0.001;
        let mut high = 5.0;

        for _ in 0..max_iterations {
            let mid = (low + high) / 2.0;
            let price = self.black_scholes_price(spot, strike, time_years, mid, option_type)?;
            let diff = price - market_price;

            if diff.abs() < tolerance {
                return Ok(mid);
            }

            if diff > 0.0 {
                high = mid;
            } else {
                low = mid;
            }
        }

        Err(GreeksError::IvConvergenceFailed(max_iterations))
    }
}

/// Error function approximation for normal CDF.
fn erf(x: f64) -> f64 {
    // Horner form approximation
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * E.powf(-x * x);

    sign * y
}
