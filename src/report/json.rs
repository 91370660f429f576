use crate::errors::PricingResult;
use crate::state::RunOutput;

/// Full run document: reports with boundaries and rows, plus failures.
pub fn render_json(output: &RunOutput) -> PricingResult<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_output;

    #[test]
    fn test_json_document() {
        let text = render_json(&sample_output()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let report = &value["reports"][0];
        assert_eq!(report["boundaries"]["call"]["kind"], "critical");
        assert_eq!(report["boundaries"]["call"]["price"], 114.54);
        assert_eq!(report["rows"][1]["american_call"], 20.0);

        let failure = &value["failures"][0];
        assert_eq!(failure["index"], 1);
        assert!(failure["error"].as_str().unwrap().starts_with("domain error"));
    }
}
