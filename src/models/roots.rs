use crate::errors::{PricingError, PricingResult};
use crate::state::{Maturity, RootPair};

/// Roots of the characteristic quadratic of the reduced pricing PDE:
///
/// q^2 + (N - 1) q - M/K = 0
///
/// N = 2b/sigma^2, M = 2r/sigma^2, K = 1 - e^{-rT}.
///
/// For `Maturity::Perpetual` K is the analytic limit 1; exp(-r*inf) is never
/// evaluated.
pub fn quadratic_roots(
    carry: f64,
    rate: f64,
    maturity: Maturity,
    sigma: f64,
) -> PricingResult<RootPair> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PricingError::domain(format!(
            "volatility must be positive, got {sigma}"
        )));
    }

    let sigma_sq = sigma * sigma;
    let n = 2.0 * carry / sigma_sq;
    let m = 2.0 * rate / sigma_sq;
    let k = match maturity {
        Maturity::Finite(t) => {
            if !t.is_finite() || t <= 0.0 {
                return Err(PricingError::domain(format!(
                    "time to maturity must be positive, got {t}"
                )));
            }
            1.0 - (-rate * t).exp()
        }
        Maturity::Perpetual => 1.0,
    };

    if k == 0.0 || !k.is_finite() {
        return Err(PricingError::domain(format!(
            "degenerate discount factor K={k} (rate={rate})"
        )));
    }

    let b = n - 1.0;
    let c = -m / k;
    let disc = b * b - 4.0 * c;
    if !disc.is_finite() || disc < 0.0 {
        return Err(PricingError::domain(format!(
            "negative discriminant {disc} (N={n}, M={m}, K={k})"
        )));
    }

    let root = disc.sqrt();
    Ok(RootPair {
        q1: (-b - root) / 2.0,
        q2: (-b + root) / 2.0,
    })
}
