use crate::errors::{PricingError, PricingResult};
use portable_atomic::{AtomicU64, Ordering};
use smallvec::SmallVec;

// ── Inputs ──

/// One (maturity, rate, volatility) scenario. Carry and strike are shared
/// across the batch and live on `PricingInput`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarketScenario {
    pub time_to_maturity: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
}

impl MarketScenario {
    pub fn new(time_to_maturity: f64, risk_free_rate: f64, volatility: f64) -> Self {
        Self {
            time_to_maturity,
            risk_free_rate,
            volatility,
        }
    }

    pub fn validate(&self) -> PricingResult<()> {
        if !self.time_to_maturity.is_finite() || self.time_to_maturity <= 0.0 {
            return Err(PricingError::domain(format!(
                "time to maturity must be positive, got {}",
                self.time_to_maturity
            )));
        }
        if !self.volatility.is_finite() || self.volatility <= 0.0 {
            return Err(PricingError::domain(format!(
                "volatility must be positive, got {}",
                self.volatility
            )));
        }
        if !self.risk_free_rate.is_finite() || self.risk_free_rate <= 0.0 {
            return Err(PricingError::domain(format!(
                "risk-free rate must be positive, got {}",
                self.risk_free_rate
            )));
        }
        Ok(())
    }
}

/// The batch handed to the runner: `{strike, carryCost, scenarios[], spots[]}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricingInput {
    pub strike: f64,
    pub carry_cost: f64,
    pub scenarios: Vec<MarketScenario>,
    pub spots: Vec<f64>,
}

impl PricingInput {
    /// Batch-level checks. Scenario-level checks run per scenario in the runner.
    pub fn validate(&self) -> PricingResult<()> {
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(PricingError::domain(format!(
                "strike must be positive, got {}",
                self.strike
            )));
        }
        if !self.carry_cost.is_finite() {
            return Err(PricingError::domain("carry cost must be finite"));
        }
        if self.scenarios.is_empty() {
            return Err(PricingError::domain("no scenarios supplied"));
        }
        if self.spots.is_empty() {
            return Err(PricingError::domain("no spot prices supplied"));
        }
        if let Some(bad) = self.spots.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(PricingError::domain(format!(
                "spot prices must be non-negative, got {bad}"
            )));
        }
        Ok(())
    }
}

// ── Model quantities ──

/// Horizon passed to the characteristic quadratic. `Perpetual` is the
/// analytic T → ∞ limit, where K = 1 exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Maturity {
    Finite(f64),
    Perpetual,
}

/// Roots of q² + (N − 1)q − M/K = 0, with q1 < 0 < q2.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RootPair {
    pub q1: f64,
    pub q2: f64,
}

/// Spot price at which immediate exercise becomes optimal.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(tag = "kind", content = "price", rename_all = "lowercase")]
pub enum ExerciseBoundary {
    Critical(f64),
    /// Early exercise is never optimal (calls with carry ≥ rate).
    Never,
}

impl ExerciseBoundary {
    pub fn price(&self) -> Option<f64> {
        match self {
            Self::Critical(p) => Some(*p),
            Self::Never => None,
        }
    }
}

/// Per-scenario constants shared by every formula. Built once per scenario,
/// the spot loop only adds ln(S/X).
#[derive(Debug, Clone, Copy)]
pub struct ModelParams {
    pub strike: f64,
    pub carry: f64,
    pub rate: f64,
    pub sigma: f64,
    pub ttl_years: f64,
    // Precomputed
    pub sqrt_t: f64,
    pub sigma_sqrt_t: f64,
    pub half_sigma_sq: f64,
    /// e^{(b − r)T}
    pub carry_discount: f64,
    /// e^{−rT}
    pub rate_discount: f64,
}

impl ModelParams {
    #[inline]
    pub fn new(strike: f64, carry: f64, scenario: &MarketScenario) -> Self {
        let ttl_years = scenario.time_to_maturity;
        let rate = scenario.risk_free_rate;
        let sigma = scenario.volatility;
        let sqrt_t = ttl_years.sqrt();
        Self {
            strike,
            carry,
            rate,
            sigma,
            ttl_years,
            sqrt_t,
            sigma_sqrt_t: sigma * sqrt_t,
            half_sigma_sq: 0.5 * sigma * sigma,
            carry_discount: ((carry - rate) * ttl_years).exp(),
            rate_discount: (-rate * ttl_years).exp(),
        }
    }

    /// d1 = (ln(S/X) + (b + σ²/2)T) / (σ√T)
    #[inline]
    pub fn d1(&self, spot: f64) -> f64 {
        ((spot / self.strike).ln() + (self.carry + self.half_sigma_sq) * self.ttl_years)
            / self.sigma_sqrt_t
    }
}

// ── Outputs ──

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PriceQuote {
    pub european: f64,
    pub american: f64,
}

/// One presentation row, every price rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ResultRow {
    pub scenario: usize,
    pub spot: f64,
    pub european_call: f64,
    pub american_call: f64,
    pub european_put: f64,
    pub american_put: f64,
}

impl ResultRow {
    pub fn from_quotes(scenario: usize, spot: f64, call: PriceQuote, put: PriceQuote) -> Self {
        Self {
            scenario,
            spot,
            european_call: round2(call.european),
            american_call: round2(call.american),
            european_put: round2(put.european),
            american_put: round2(put.american),
        }
    }
}

/// Round half away from zero to 2 decimal places.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Boundaries solved for one scenario, reused across its spot loop.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ScenarioBoundaries {
    pub roots: RootPair,
    pub call: ExerciseBoundary,
    pub put: ExerciseBoundary,
    pub call_iterations: u32,
    pub put_iterations: u32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ScenarioReport {
    pub index: usize,
    pub scenario: MarketScenario,
    pub boundaries: ScenarioBoundaries,
    pub rows: SmallVec<[ResultRow; 8]>,
}

#[derive(Debug)]
pub struct ScenarioFailure {
    pub index: usize,
    pub scenario: MarketScenario,
    pub error: PricingError,
}

impl serde::Serialize for ScenarioFailure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ScenarioFailure", 3)?;
        s.serialize_field("index", &self.index)?;
        s.serialize_field("scenario", &self.scenario)?;
        s.serialize_field("error", &self.error.to_string())?;
        s.end()
    }
}

/// Result of a batch. Reports and failures are each kept in input order.
#[derive(Debug, Default, serde::Serialize)]
pub struct RunOutput {
    pub reports: Vec<ScenarioReport>,
    pub failures: Vec<ScenarioFailure>,
}

impl RunOutput {
    /// Rows in scenario-major, spot-minor order.
    pub fn rows(&self) -> impl Iterator<Item = &ResultRow> + '_ {
        self.reports.iter().flat_map(|r| r.rows.iter())
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ── Counters (lock-free, shared with the rayon pool) ──

#[derive(Debug, Default)]
pub struct RunCounters {
    pub scenarios_priced: AtomicU64,
    pub scenarios_failed: AtomicU64,
    pub solver_iterations: AtomicU64,
    pub rows_emitted: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CounterSnapshot {
    pub scenarios_priced: u64,
    pub scenarios_failed: u64,
    pub solver_iterations: u64,
    pub rows_emitted: u64,
}

impl RunCounters {
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            scenarios_priced: self.scenarios_priced.load(Ordering::Relaxed),
            scenarios_failed: self.scenarios_failed.load(Ordering::Relaxed),
            solver_iterations: self.solver_iterations.load(Ordering::Relaxed),
            rows_emitted: self.rows_emitted.load(Ordering::Relaxed),
        }
    }
}
