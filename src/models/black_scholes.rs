use crate::state::ModelParams;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Generalized Black-Scholes-Merton with continuous cost of carry b.
///
/// c = S e^{(b-r)T} Phi(d1) - X e^{-rT} Phi(d2)
/// p = X e^{-rT} Phi(-d2) - S e^{(b-r)T} Phi(-d1)
///
/// with d2 = d1 - sigma*sqrt(T). All scenario constants come from ModelParams.
#[derive(Debug, Clone)]
pub struct BlackScholesCarry {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholesCarry {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    #[inline]
    pub fn cdf(&self, x: f64) -> f64 {
        self.normal.cdf(x)
    }

    #[inline]
    pub fn pdf(&self, x: f64) -> f64 {
        self.normal.pdf(x)
    }

    /// European call at `spot`. A zero spot prices to zero without taking ln(0).
    #[inline]
    pub fn call(&self, params: &ModelParams, spot: f64) -> f64 {
        if spot <= 0.0 {
            return 0.0;
        }
        let d1 = params.d1(spot);
        let d2 = d1 - params.sigma_sqrt_t;
        spot * params.carry_discount * self.cdf(d1)
            - params.strike * params.rate_discount * self.cdf(d2)
    }

    /// European put at `spot`. A zero spot is worth the discounted strike.
    #[inline]
    pub fn put(&self, params: &ModelParams, spot: f64) -> f64 {
        if spot <= 0.0 {
            return params.strike * params.rate_discount;
        }
        let d1 = params.d1(spot);
        let d2 = d1 - params.sigma_sqrt_t;
        params.strike * params.rate_discount * self.cdf(-d2)
            - spot * params.carry_discount * self.cdf(-d1)
    }
}

impl Default for BlackScholesCarry {
    fn default() -> Self {
        Self::new()
    }
}
