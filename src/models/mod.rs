pub mod black_scholes;
pub mod call;
pub mod critical;
pub mod put;
pub mod roots;
pub mod seed;

use crate::errors::PricingResult;
use crate::models::critical::{SolverSettings, Solved};
use crate::state::{ExerciseBoundary, ModelParams, PriceQuote, RootPair};

/// One exercise side of the quadratic approximation (call or put).
/// Both methods are pure: deterministic output from inputs only.
/// Send + Sync required for use on the rayon pool.
pub trait QuadraticApproximation: Send + Sync {
    fn name(&self) -> &'static str;

    /// Refine `seed` into the critical commodity price for this side.
    fn critical_price(
        &self,
        params: &ModelParams,
        roots: &RootPair,
        seed: f64,
        settings: &SolverSettings,
    ) -> PricingResult<Solved>;

    /// European value and American approximation at `spot`. Never panics.
    fn quote(
        &self,
        params: &ModelParams,
        roots: &RootPair,
        boundary: ExerciseBoundary,
        spot: f64,
    ) -> PriceQuote;
}
