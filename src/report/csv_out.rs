use crate::errors::{PricingError, PricingResult};
use crate::state::RunOutput;

/// One CSV record per row, header taken from the row fields.
pub fn render_csv(output: &RunOutput) -> PricingResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in output.rows() {
        wtr.serialize(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| PricingError::Io(format!("csv flush: {e}")))?;
    String::from_utf8(bytes).map_err(|e| PricingError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_output;

    #[test]
    fn test_csv_records() {
        let csv = render_csv(&sample_output()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "scenario,spot,european_call,american_call,european_put,american_put"
        );
        assert_eq!(lines[1], "0,100.0,3.42,3.52,4.4,4.4");
        assert_eq!(lines.len(), 3);
    }
}
