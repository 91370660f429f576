/// Error types for the pricing engine.
/// Numeric failures are per-scenario and never abort a batch:
/// - `Domain` for inputs the formulas cannot accept
/// - `Convergence` when a critical-price solve hits its iteration cap
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("domain error: {0}")]
    Domain(String),

    #[error("critical {side} price did not converge after {iterations} iterations (relative error {last_error:e})")]
    Convergence {
        side: &'static str,
        iterations: u32,
        last_error: f64,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PricingError {
    pub fn domain(msg: impl Into<String>) -> Self {
        PricingError::Domain(msg.into())
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for PricingError {
    fn from(e: csv::Error) -> Self {
        PricingError::Serialization(e.to_string())
    }
}

impl From<rusqlite::Error> for PricingError {
    fn from(e: rusqlite::Error) -> Self {
        PricingError::Database(e.to_string())
    }
}

impl From<std::io::Error> for PricingError {
    fn from(e: std::io::Error) -> Self {
        PricingError::Io(e.to_string())
    }
}

pub type PricingResult<T> = Result<T, PricingError>;
