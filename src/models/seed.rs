use crate::errors::{PricingError, PricingResult};
use crate::state::RootPair;

/// Starting points for the critical-price iterations, built from the
/// perpetual (T -> inf) boundaries and decayed towards the strike:
///
/// S_inf(call) = X / (1 - 1/q2_inf)      S_inf(put) = X / (1 - 1/q1_inf)
/// h2 = -(bT + 2 sigma sqrt(T)) X / (S_inf(call) - X)
/// h1 =  (bT - 2 sigma sqrt(T)) X / (X - S_inf(put))
/// seed(call) = X + (S_inf(call) - X)(1 - e^{h2})
/// seed(put)  = S_inf(put) + (X - S_inf(put)) e^{h1}
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SeedPrices {
    pub call: f64,
    pub put: f64,
}

pub fn seed_prices(
    perpetual: &RootPair,
    carry: f64,
    ttl_years: f64,
    sigma: f64,
    strike: f64,
) -> PricingResult<SeedPrices> {
    Ok(SeedPrices {
        call: call_seed(perpetual, carry, ttl_years, sigma, strike)?,
        put: put_seed(perpetual, carry, ttl_years, sigma, strike)?,
    })
}

pub fn call_seed(
    perpetual: &RootPair,
    carry: f64,
    ttl_years: f64,
    sigma: f64,
    strike: f64,
) -> PricingResult<f64> {
    // q2_inf <= 1 means no finite perpetual call boundary (b >= r).
    if perpetual.q2 <= 1.0 {
        return Err(PricingError::domain(format!(
            "perpetual call root q2={} gives no finite call boundary",
            perpetual.q2
        )));
    }
    let s_inf = strike / (1.0 - 1.0 / perpetual.q2);
    let h2 = -(carry * ttl_years + 2.0 * sigma * ttl_years.sqrt()) * strike / (s_inf - strike);
    let seed = strike + (s_inf - strike) * (1.0 - h2.exp());
    finite_seed("call", seed)
}

pub fn put_seed(
    perpetual: &RootPair,
    carry: f64,
    ttl_years: f64,
    sigma: f64,
    strike: f64,
) -> PricingResult<f64> {
    if perpetual.q1 >= 0.0 {
        return Err(PricingError::domain(format!(
            "perpetual put root q1={} must be negative",
            perpetual.q1
        )));
    }
    let s_inf = strike / (1.0 - 1.0 / perpetual.q1);
    let h1 = (carry * ttl_years - 2.0 * sigma * ttl_years.sqrt()) * strike / (strike - s_inf);
    let seed = s_inf + (strike - s_inf) * h1.exp();
    finite_seed("put", seed)
}

fn finite_seed(side: &str, seed: f64) -> PricingResult<f64> {
    if seed.is_finite() && seed > 0.0 {
        Ok(seed)
    } else {
        Err(PricingError::domain(format!("degenerate {side} seed {seed}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roots::quadratic_roots;
    use crate::state::Maturity;

    #[test]
    fn test_reference_seeds() {
        let perpetual = quadratic_roots(-0.04, 0.08, Maturity::Perpetual, 0.2).unwrap();
        let seeds = seed_prices(&perpetual, -0.04, 0.25, 0.2, 100.0).unwrap();
        assert!((seeds.call - 114.48248537668209).abs() < 1e-8, "call seed {}", seeds.call);
        assert!((seeds.put - 82.85234099075284).abs() < 1e-8, "put seed {}", seeds.put);
    }

    #[test]
    fn test_seeds_bracket_strike() {
        let perpetual = quadratic_roots(-0.04, 0.08, Maturity::Perpetual, 0.4).unwrap();
        let seeds = seed_prices(&perpetual, -0.04, 0.25, 0.4, 100.0).unwrap();
        assert!(seeds.call > 100.0);
        assert!(seeds.put < 100.0 && seeds.put > 0.0);
    }

    #[test]
    fn test_unit_call_root_is_domain_error() {
        // b == r makes q2_inf exactly 1
        let perpetual = RootPair { q1: -4.0, q2: 1.0 };
        assert!(matches!(
            call_seed(&perpetual, 0.08, 0.25, 0.2, 100.0),
            Err(PricingError::Domain(_))
        ));
        assert!(put_seed(&perpetual, 0.08, 0.25, 0.2, 100.0).is_ok());
    }
}
