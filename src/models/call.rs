use crate::errors::PricingResult;
use crate::models::black_scholes::BlackScholesCarry;
use crate::models::critical::{self, BoundaryStep, SolverSettings, Solved};
use crate::models::QuadraticApproximation;
use crate::state::{ExerciseBoundary, ModelParams, PriceQuote, RootPair};

/// American call under the quadratic approximation.
///
/// Boundary condition at the critical price S*:
///
/// S* - X = c(S*) + (1 - e^{(b-r)T} Phi(d1(S*))) S*/q2
///
/// Below S* the price is c(S) + A2 (S/S*)^q2 with
/// A2 = (S*/q2)(1 - e^{(b-r)T} Phi(d1(S*))). At or above S* it is S - X.
pub struct AmericanCall {
    bs: BlackScholesCarry,
}

impl AmericanCall {
    pub fn new() -> Self {
        Self {
            bs: BlackScholesCarry::new(),
        }
    }

    /// Boundary residual and Newton-style update at guess `s`.
    fn step(&self, params: &ModelParams, q2: f64, s: f64) -> BoundaryStep {
        let x = params.strike;
        let d1 = params.d1(s);
        let nd1 = self.bs.cdf(d1);
        let european = self.bs.call(params, s);

        let rhs = european + (1.0 - params.carry_discount * nd1) * s / q2;
        let lhs = s - x;

        // d(RHS)/dS
        let slope = params.carry_discount * nd1 * (1.0 - 1.0 / q2)
            + (1.0 - params.carry_discount * self.bs.pdf(d1) / params.sigma_sqrt_t) / q2;

        BoundaryStep {
            error: (lhs - rhs).abs() / x,
            next: (x + rhs - slope * s) / (1.0 - slope),
        }
    }
}

impl Default for AmericanCall {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadraticApproximation for AmericanCall {
    #[inline]
    fn name(&self) -> &'static str {
        "call"
    }

    fn critical_price(
        &self,
        params: &ModelParams,
        roots: &RootPair,
        seed: f64,
        settings: &SolverSettings,
    ) -> PricingResult<Solved> {
        critical::iterate(self.name(), seed, settings, |s| self.step(params, roots.q2, s))
    }

    fn quote(
        &self,
        params: &ModelParams,
        roots: &RootPair,
        boundary: ExerciseBoundary,
        spot: f64,
    ) -> PriceQuote {
        let european = self.bs.call(params, spot);

        let american = match boundary {
            ExerciseBoundary::Never => european,
            ExerciseBoundary::Critical(critical) if spot < critical => {
                let nd1 = self.bs.cdf(params.d1(critical));
                let a2 = (critical / roots.q2) * (1.0 - params.carry_discount * nd1);
                european + a2 * (spot / critical).powf(roots.q2)
            }
            ExerciseBoundary::Critical(_) => spot - params.strike,
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

    fn solve(t: f64, r: f64, sigma: f64, seed: f64) -> (ModelParams, RootPair, f64) {
        let params = ModelParams::new(STRIKE, CARRY, &MarketScenario::new(t, r, sigma));
        let roots = quadratic_roots(CARRY, r, Maturity::Finite(t), sigma).unwrap();
        let solved = AmericanCall::new()
            .critical_price(&params, &roots, seed, &SolverSettings::default())
            .unwrap();
        (params, roots, solved.price)
    }

    #[test]
    fn test_reference_critical_price() {
        let (_, _, critical) = solve(0.25, 0.08, 0.2, 114.48248537668209);
        assert!((critical - 114.544).abs() < 5e-3, "critical call price {critical}");
    }

    #[test]
    fn test_reference_quotes() {
        let model = AmericanCall::new();
        let (params, roots, critical) = solve(0.25, 0.08, 0.2, 114.48248537668209);
        let boundary = ExerciseBoundary::Critical(critical);

        let atm = model.quote(&params, &roots, boundary, 100.0);
        assert!((atm.european - 3.421109).abs() < 1e-5);
        assert!((atm.american - 3.5249).abs() < 1e-3);

        let deep = model.quote(&params, &roots, boundary, 120.0);
        assert_eq!(deep.american, 20.0);
    }

    #[test]
    fn test_continuity_at_boundary() {
        let model = AmericanCall::new();
        for &(t, r, sigma, seed) in &[
            (0.25, 0.08, 0.2, 114.48248537668209),
            (0.25, 0.12, 0.2, 114.02890601908709),
            (0.25, 0.08, 0.4, 132.29431255018352),
            (0.5, 0.08, 0.2, 118.18289052355985),
        ] {
            let (params, roots, critical) = solve(t, r, sigma, seed);
            let boundary = ExerciseBoundary::Critical(critical);
            let below = model.quote(&params, &roots, boundary, critical * (1.0 - 1e-12));
            let at = model.quote(&params, &roots, boundary, critical);
            assert!(
                (below.american - at.american).abs() < 1e-3,
                "jump of {} at S*={critical}",
                (below.american - at.american).abs()
            );
        }
    }

    #[test]
    fn test_tie_takes_intrinsic_branch() {
        let model = AmericanCall::new();
        let (params, roots, critical) = solve(0.5, 0.08, 0.2, 118.18289052355985);
        let at = model.quote(&params, &roots, ExerciseBoundary::Critical(critical), critical);
        assert_eq!(at.american, critical - STRIKE);
    }

    #[test]
    fn test_dominance_and_monotonicity() {
        let model = AmericanCall::new();
        let (params, roots, critical) = solve(0.25, 0.08, 0.4, 132.29431255018352);
        let boundary = ExerciseBoundary::Critical(critical);
        let mut prev = f64::NEG_INFINITY;
        for i in 0..400 {
            let spot = i as f64 * 0.5;
            let q = model.quote(&params, &roots, boundary, spot);
            assert!(q.american >= q.european - 1e-12, "premium negative at S={spot}");
            assert!(q.american >= (spot - STRIKE).max(0.0) - 1e-9, "below intrinsic at S={spot}");
            assert!(q.american >= prev - 1e-9, "not monotone at S={spot}");
            prev = q.american;
        }
    }

    #[test]
    fn test_never_boundary_is_european() {
        let model = AmericanCall::new();
        let params = ModelParams::new(STRIKE, 0.1, &MarketScenario::new(0.5, 0.05, 0.25));
        let roots = quadratic_roots(0.1, 0.05, Maturity::Finite(0.5), 0.25).unwrap();
        let q = model.quote(&params, &roots, ExerciseBoundary::Never, 130.0);
        assert_eq!(q.american, q.european);
    }

    #[test]
    fn test_iteration_cap_surfaces_error() {
        let params = ModelParams::new(STRIKE, CARRY, &MarketScenario::new(0.25, 0.08, 0.2));
        let roots = quadratic_roots(CARRY, 0.08, Maturity::Finite(0.25), 0.2).unwrap();
        let settings = SolverSettings { tolerance: 1e-5, max_iterations: 1 };
        let err = AmericanCall::new()
            .critical_price(&params, &roots, 114.48248537668209, &settings)
            .unwrap_err();
        assert!(matches!(err, crate::errors::PricingError::Convergence { side: "call", .. }));
    }
}
