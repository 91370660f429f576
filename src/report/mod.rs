pub mod csv_out;
pub mod json;
pub mod latex;
pub mod table;

use crate::errors::{PricingError, PricingResult};
use crate::state::RunOutput;
use std::str::FromStr;

/// Column captions shared by every tabular format.
pub const HEADERS: [&str; 5] = [
    "Commodity Price S",
    "European c(S, T)",
    "American C(S, T)",
    "European p(S, T)",
    "American P(S, T)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Latex,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "table" => Ok(Self::Text),
            "latex" | "tex" => Ok(Self::Latex),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(PricingError::Config(format!("unknown output format: {other}"))),
        }
    }
}

/// Dispatch the result rows to the requested formatter.
pub fn render(format: OutputFormat, output: &RunOutput) -> PricingResult<String> {
    match format {
        OutputFormat::Text => Ok(table::render_table(output)),
        OutputFormat::Latex => Ok(latex::render_latex(output)),
        OutputFormat::Csv => csv_out::render_csv(output),
        OutputFormat::Json => json::render_json(output),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("LaTeX".parse::<OutputFormat>().unwrap(), OutputFormat::Latex);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!(" csv ".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
