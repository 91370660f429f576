use crate::errors::PricingResult;
use crate::models::call::AmericanCall;
use crate::models::critical::SolverSettings;
use crate::models::put::AmericanPut;
use crate::models::roots::quadratic_roots;
use crate::models::seed;
use crate::models::QuadraticApproximation;
use crate::state::*;
use portable_atomic::Ordering;
use rayon::prelude::*;
use smallvec::SmallVec;

/// Prices a batch of scenarios over a shared spot grid.
///
/// Per scenario: perpetual roots -> seeds -> finite roots -> both critical
/// prices (solved once) -> one row per spot. Scenarios share nothing, so a
/// failing scenario only removes its own rows.
pub struct ScenarioRunner {
    call: AmericanCall,
    put: AmericanPut,
    settings: SolverSettings,
    pub counters: RunCounters,
}

impl ScenarioRunner {
    pub fn new(settings: SolverSettings) -> Self {
        Self {
            call: AmericanCall::new(),
            put: AmericanPut::new(),
            settings,
            counters: RunCounters::default(),
        }
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Sequential batch, scenario-major then spot order.
    pub fn run(&self, input: &PricingInput) -> RunOutput {
        let outcomes: Vec<_> = input
            .scenarios
            .iter()
            .enumerate()
            .map(|(index, scenario)| self.price_scenario(index, scenario, input))
            .collect();
        self.collect(outcomes)
    }

    /// Same output as `run`, scenarios spread over the rayon pool.
    pub fn run_parallel(&self, input: &PricingInput) -> RunOutput {
        let outcomes: Vec<_> = input
            .scenarios
            .par_iter()
            .enumerate()
            .map(|(index, scenario)| self.price_scenario(index, scenario, input))
            .collect();
        self.collect(outcomes)
    }

    fn collect(&self, outcomes: Vec<Result<ScenarioReport, ScenarioFailure>>) -> RunOutput {
        let mut output = RunOutput::default();
        for outcome in outcomes {
            match outcome {
                Ok(report) => output.reports.push(report),
                Err(failure) => output.failures.push(failure),
            }
        }

        let snap = self.counters.snapshot();
        tracing::info!(
            priced = snap.scenarios_priced,
            failed = snap.scenarios_failed,
            iterations = snap.solver_iterations,
            rows = snap.rows_emitted,
            "batch complete"
        );
        output
    }

    /// Solve one scenario and price every spot. Errors are tagged with the
    /// scenario so the caller can report them without aborting the batch.
    pub fn price_scenario(
        &self,
        index: usize,
        scenario: &MarketScenario,
        input: &PricingInput,
    ) -> Result<ScenarioReport, ScenarioFailure> {
        let solved = scenario
            .validate()
            .and_then(|_| self.solve_boundaries(scenario, input.carry_cost, input.strike));

        let boundaries = match solved {
            Ok(b) => b,
            Err(error) => {
                self.counters.scenarios_failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    scenario = index,
                    maturity = scenario.time_to_maturity,
                    rate = scenario.risk_free_rate,
                    sigma = scenario.volatility,
                    error = %error,
                    "scenario failed"
                );
                return Err(ScenarioFailure {
                    index,
                    scenario: *scenario,
                    error,
                });
            }
        };

        let params = ModelParams::new(input.strike, input.carry_cost, scenario);
        let rows: SmallVec<[ResultRow; 8]> = input
            .spots
            .iter()
            .map(|&spot| {
                let call = self.call.quote(&params, &boundaries.roots, boundaries.call, spot);
                let put = self.put.quote(&params, &boundaries.roots, boundaries.put, spot);
                ResultRow::from_quotes(index, spot, call, put)
            })
            .collect();

        self.counters.scenarios_priced.fetch_add(1, Ordering::Relaxed);
        self.counters
            .rows_emitted
            .fetch_add(rows.len() as u64, Ordering::Relaxed);

        Ok(ScenarioReport {
            index,
            scenario: *scenario,
            boundaries,
            rows,
        })
    }

    /// Critical prices for one scenario. The call is skipped when b >= r,
    /// where early exercise of the call is never optimal.
    pub fn solve_boundaries(
        &self,
        scenario: &MarketScenario,
        carry: f64,
        strike: f64,
    ) -> PricingResult<ScenarioBoundaries> {
        let t = scenario.time_to_maturity;
        let r = scenario.risk_free_rate;
        let sigma = scenario.volatility;

        let perpetual = quadratic_roots(carry, r, Maturity::Perpetual, sigma)?;
        let roots = quadratic_roots(carry, r, Maturity::Finite(t), sigma)?;
        let params = ModelParams::new(strike, carry, scenario);

        let (call, call_iterations, put_seed) = if carry >= r {
            let put_seed = seed::put_seed(&perpetual, carry, t, sigma, strike)?;
            (ExerciseBoundary::Never, 0, put_seed)
        } else {
            let seeds = seed::seed_prices(&perpetual, carry, t, sigma, strike)?;
            let solved = self.call.critical_price(&params, &roots, seeds.call, &self.settings)?;
            (ExerciseBoundary::Critical(solved.price), solved.iterations, seeds.put)
        };

        let solved = self.put.critical_price(&params, &roots, put_seed, &self.settings)?;
        let put = ExerciseBoundary::Critical(solved.price);

        self.counters
            .solver_iterations
            .fetch_add(u64::from(call_iterations + solved.iterations), Ordering::Relaxed);

        tracing::debug!(
            maturity = t,
            rate = r,
            sigma = sigma,
            call = ?call.price(),
            put = solved.price,
            call_iterations,
            put_iterations = solved.iterations,
            "boundaries solved"
        );

        Ok(ScenarioBoundaries {
            roots,
            call,
            put,
            call_iterations,
            put_iterations: solved.iterations,
        })
    }
}
