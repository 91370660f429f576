use crate::errors::{PricingError, PricingResult};

/// Default relative tolerance |LHS - RHS| / X for the boundary condition.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Default cap on boundary iterations. Typical solves finish in under 10.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SolverSettings {
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// One evaluation of the boundary condition at the current guess.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryStep {
    /// |LHS - RHS| / X
    pub error: f64,
    /// Next guess from the Newton-style update.
    pub next: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solved {
    pub price: f64,
    pub iterations: u32,
}

/// Fixed-point loop shared by both exercise sides.
///
/// `step` evaluates the boundary condition at a guess and proposes the next
/// one. The guess is returned as soon as its error is within tolerance; a
/// guess that leaves (0, inf) or a cap overrun is a `Convergence` error.
pub fn iterate<F>(
    side: &'static str,
    seed: f64,
    settings: &SolverSettings,
    mut step: F,
) -> PricingResult<Solved>
where
    F: FnMut(f64) -> BoundaryStep,
{
    let mut current = seed;
    let mut last_error = f64::INFINITY;

    for iteration in 1..=settings.max_iterations {
        let BoundaryStep { error, next } = step(current);

        if !error.is_finite() {
            return Err(PricingError::Convergence {
                side,
                iterations: iteration,
                last_error: error,
            });
        }
        if error <= settings.tolerance {
            return Ok(Solved {
                price: current,
                iterations: iteration,
            });
        }
        if !next.is_finite() || next <= 0.0 {
            return Err(PricingError::Convergence {
                side,
                iterations: iteration,
                last_error: error,
            });
        }

        last_error = error;
        current = next;
    }

    Err(PricingError::Convergence {
        side,
        iterations: settings.max_iterations,
        last_error,
    })
}
