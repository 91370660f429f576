use crate::report::HEADERS;
use crate::state::RunOutput;

/// booktabs `tabular` with every scenario stacked in one table.
pub fn render_latex(output: &RunOutput) -> String {
    let mut out = String::from("\\begin{tabular}{rrrrr}\n\\toprule\n");
    out.push_str(&HEADERS.join(" & "));
    out.push_str(" \\\\\n\\midrule\n");

    for row in output.rows() {
        out.push_str(&format!(
            "{} & {:.2} & {:.2} & {:.2} & {:.2} \\\\\n",
            row.spot, row.european_call, row.american_call, row.european_put, row.american_put
        ));
    }

    out.push_str("\\bottomrule\n\\end{tabular}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_output;

    #[test]
    fn test_latex_layout() {
        let tex = render_latex(&sample_output());
        let lines: Vec<&str> = tex.lines().collect();
        assert_eq!(lines[0], "\\begin{tabular}{rrrrr}");
        assert_eq!(lines[1], "\\toprule");
        assert!(lines[2].starts_with("Commodity Price S & European c(S, T)"));
        assert_eq!(lines[4], "100 & 3.42 & 3.52 & 4.40 & 4.40 \\\\");
        assert_eq!(lines[5], "120 & 18.62 & 20.00 & 0.18 & 0.18 \\\\");
        assert_eq!(lines.last(), Some(&"\\end{tabular}"));
    }
}
