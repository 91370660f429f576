use crate::errors::PricingResult;
use crate::models::black_scholes::BlackScholesCarry;
use crate::models::critical::{self, BoundaryStep, SolverSettings, Solved};
use crate::models::QuadraticApproximation;
use crate::state::{ExerciseBoundary, ModelParams, PriceQuote, RootPair};

/// American put under the quadratic approximation. Mirror of the call with
/// q1 < 0 and Phi(-d1):
///
/// X - S** = p(S**) - (1 - e^{(b-r)T} Phi(-d1(S**))) S**/q1
///
/// Above S** the price is p(S) + A1 (S/S**)^q1 with
/// A1 = -(S**/q1)(1 - e^{(b-r)T} Phi(-d1(S**))). At or below S** it is X - S.
pub struct AmericanPut {
    bs: BlackScholesCarry,
}

impl AmericanPut {
    pub fn new() -> Self {
        Self {
            bs: BlackScholesCarry::new(),
        }
    }

    fn step(&self, params: &ModelParams, q1: f64, s: f64) -> BoundaryStep {
        let x = params.strike;
        let d1 = params.d1(s);
        let n_minus_d1 = self.bs.cdf(-d1);
        let european = self.bs.put(params, s);

        let rhs = european - (1.0 - params.carry_discount * n_minus_d1) * s / q1;
        let lhs = x - s;

        // d(RHS)/dS
        let slope = -params.carry_discount * n_minus_d1 * (1.0 - 1.0 / q1)
            - (1.0 + params.carry_discount * self.bs.pdf(d1) / params.sigma_sqrt_t) / q1;

        BoundaryStep {
            error: (lhs - rhs).abs() / x,
            next: (x + slope * s - rhs) / (1.0 + slope),
        }
    }
}

impl Default for AmericanPut {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadraticApproximation for AmericanPut {
    #[inline]
    fn name(&self) -> &'static str {
        "put"
    }

    fn critical_price(
        &self,
        params: &ModelParams,
        roots: &RootPair,
        seed: f64,
        settings: &SolverSettings,
    ) -> PricingResult<Solved> {
        critical::iterate(self.name(), seed, settings, |s| self.step(params, roots.q1, s))
    }

    fn quote(
        &self,
        params: &ModelParams,
        roots: &RootPair,
        boundary: ExerciseBoundary,
        spot: f64,
    ) -> PriceQuote {
        let european = self.bs.put(params, spot);

        let american = match boundary {
            ExerciseBoundary::Never => european,
            ExerciseBoundary::Critical(critical) if spot > critical => {
                let n_minus_d1 = self.bs.cdf(-params.d1(critical));
                let a1 = -(critical / roots.q1) * (1.0 - params.carry_discount * n_minus_d1);
                european + a1 * (spot / critical).powf(roots.q1)
            }
            ExerciseBoundary::Critical(_) => params.strike - spot,
        };

        PriceQuote { european, american }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roots::quadratic_roots;
    use crate::state::{Maturity, MarketScenario};

    const STRIKE: f64 = 100.0;
    const CARRY: f64 = -0.04;

    fn solve(t: f64, r: f64, sigma: f64, seed: f64) -> (ModelParams, RootPair, f64, u32) {
        let params = ModelParams::new(STRIKE, CARRY, &MarketScenario::new(t, r, sigma));
        let roots = quadratic_roots(CARRY, r, Maturity::Finite(t), sigma).unwrap();
        let solved = AmericanPut::new()
            .critical_price(&params, &roots, seed, &SolverSettings::default())
            .unwrap();
        (params, roots, solved.price, solved.iterations)
    }

    #[test]
    fn test_reference_critical_price() {
        let (_, _, critical, iterations) = solve(0.25, 0.08, 0.2, 82.85234099075284);
        assert!((critical - 62.1415).abs() < 5e-3, "critical put price {critical}");
        assert!(iterations < 10, "took {iterations} iterations");
    }

    #[test]
    fn test_reference_quotes() {
        let model = AmericanPut::new();
        let (params, roots, critical, _) = solve(0.25, 0.08, 0.4, 69.37605968728776);
        let boundary = ExerciseBoundary::Critical(critical);

        let q = model.quote(&params, &roots, boundary, 120.0);
        assert!((q.european - 2.294301).abs() < 1e-5);
        assert!((q.american - 2.29675).abs() < 1e-3);

        let exercised = model.quote(&params, &roots, boundary, 40.0);
        assert_eq!(exercised.american, 60.0);
    }

    #[test]
    fn test_continuity_at_boundary() {
        let model = AmericanPut::new();
        for &(t, r, sigma, seed) in &[
            (0.25, 0.08, 0.2, 82.85234099075284),
            (0.25, 0.12, 0.2, 83.46048231366468),
            (0.25, 0.08, 0.4, 69.37605968728776),
            (0.5, 0.08, 0.2, 77.28501309245698),
        ] {
            let (params, roots, critical, _) = solve(t, r, sigma, seed);
            let boundary = ExerciseBoundary::Critical(critical);
            let at = model.quote(&params, &roots, boundary, critical);
            let above = model.quote(&params, &roots, boundary, critical * (1.0 + 1e-12));
            assert!((above.american - at.american).abs() < 1e-3);
        }
    }

    #[test]
    fn test_dominance_and_monotonicity() {
        let model = AmericanPut::new();
        let (params, roots, critical, _) = solve(0.5, 0.08, 0.2, 77.28501309245698);
        let boundary = ExerciseBoundary::Critical(critical);
        let mut prev = f64::INFINITY;
        for i in 0..400 {
            let spot = i as f64 * 0.5;
            let q = model.quote(&params, &roots, boundary, spot);
            assert!(q.american >= q.european - 1e-12, "premium negative at S={spot}");
            assert!(q.american >= (STRIKE - spot).max(0.0) - 1e-9, "below intrinsic at S={spot}");
            assert!(q.american <= prev + 1e-9, "not monotone at S={spot}");
            prev = q.american;
        }
    }

    #[test]
    fn test_zero_spot_is_exercised() {
        let model = AmericanPut::new();
        let (params, roots, critical, _) = solve(0.25, 0.08, 0.2, 82.85234099075284);
        let q = model.quote(&params, &roots, ExerciseBoundary::Critical(critical), 0.0);
        assert_eq!(q.american, STRIKE);
    }
}
