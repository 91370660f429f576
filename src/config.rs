use crate::errors::{PricingError, PricingResult};
use crate::models::critical::{SolverSettings, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::report::OutputFormat;
use crate::state::{MarketScenario, PricingInput};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input: PricingInput,
    pub solver: SolverSettings,
    pub parallel: bool,
    pub output_format: OutputFormat,
    pub output_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> PricingResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Unset keys fall back to the
    /// reference batch (X=100, b=-0.04, four scenarios, five spots).
    pub fn from_lookup<F>(lookup: F) -> PricingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let strike = parse_f64("BAW_STRIKE", &var_or("BAW_STRIKE", "100"))?;
        let carry_cost = parse_f64("BAW_CARRY_COST", &var_or("BAW_CARRY_COST", "-0.04"))?;
        let maturities = parse_list("BAW_MATURITIES", &var_or("BAW_MATURITIES", "0.25,0.25,0.25,0.5"))?;
        let rates = parse_list("BAW_RATES", &var_or("BAW_RATES", "0.08,0.12,0.08,0.08"))?;
        let volatilities = parse_list("BAW_VOLATILITIES", &var_or("BAW_VOLATILITIES", "0.2,0.2,0.4,0.2"))?;
        let spots = parse_list("BAW_SPOTS", &var_or("BAW_SPOTS", "80,90,100,110,120"))?;

        if maturities.len() != rates.len() || maturities.len() != volatilities.len() {
            return Err(PricingError::Config(format!(
                "scenario lists differ in length: {} maturities, {} rates, {} volatilities",
                maturities.len(),
                rates.len(),
                volatilities.len()
            )));
        }

        let scenarios = maturities
            .iter()
            .zip(&rates)
            .zip(&volatilities)
            .map(|((&t, &r), &sigma)| MarketScenario::new(t, r, sigma))
            .collect();

        let tolerance = parse_f64("BAW_TOLERANCE", &var_or("BAW_TOLERANCE", &DEFAULT_TOLERANCE.to_string()))?;
        if tolerance.is_nan() || tolerance <= 0.0 {
            return Err(PricingError::Config(format!("BAW_TOLERANCE must be positive, got {tolerance}")));
        }

        let max_iterations = var_or("BAW_MAX_ITERATIONS", &DEFAULT_MAX_ITERATIONS.to_string())
            .trim()
            .parse::<u32>()
            .map_err(|e| PricingError::Config(format!("BAW_MAX_ITERATIONS: {e}")))?;
        if max_iterations == 0 {
            return Err(PricingError::Config("BAW_MAX_ITERATIONS must be at least 1".into()));
        }

        let parallel = var_or("BAW_PARALLEL", "false")
            .trim()
            .parse::<bool>()
            .map_err(|e| PricingError::Config(format!("BAW_PARALLEL: {e}")))?;

        let output_format = var_or("BAW_OUTPUT_FORMAT", "text").parse::<OutputFormat>()?;

        Ok(Self {
            input: PricingInput {
                strike,
                carry_cost,
                scenarios,
                spots,
            },
            solver: SolverSettings {
                tolerance,
                max_iterations,
            },
            parallel,
            output_format,
            output_path: lookup("BAW_OUTPUT_PATH").filter(|s| !s.is_empty()).map(PathBuf::from),
            data_dir: lookup("BAW_DATA_DIR").filter(|s| !s.is_empty()).map(PathBuf::from),
        })
    }
}

fn parse_f64(key: &str, raw: &str) -> PricingResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| PricingError::Config(format!("{key}: {e} ({raw:?})")))
}

fn parse_list(key: &str, raw: &str) -> PricingResult<Vec<f64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_f64(key, s))
        .collect()
}
