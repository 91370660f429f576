use crate::report::HEADERS;
use crate::state::RunOutput;
use tabled::{builder::Builder, Table};

/// Plain-text table, one block per scenario in input order.
pub fn render_table(output: &RunOutput) -> String {
    if output.reports.is_empty() {
        return "(no rows)\n".to_string();
    }

    let mut out = String::new();
    for report in &output.reports {
        let s = &report.scenario;
        out.push_str(&format!(
            "Scenario {}: T={} r={} sigma={}\n",
            report.index + 1,
            s.time_to_maturity,
            s.risk_free_rate,
            s.volatility
        ));

        let mut builder = Builder::default();
        builder.push_record(HEADERS);
        for row in &report.rows {
            builder.push_record([
                format!("{}", row.spot),
                format!("{:.2}", row.european_call),
                format!("{:.2}", row.american_call),
                format!("{:.2}", row.european_put),
                format!("{:.2}", row.american_put),
            ]);
        }
        let table = Table::from(builder);
        out.push_str(&table.to_string());
        out.push('\n');
    }
    out
}
