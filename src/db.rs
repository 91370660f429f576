use crate::errors::{PricingError, PricingResult};
use crate::models::critical::SolverSettings;
use crate::state::{PricingInput, RunOutput};
use rusqlite::Connection;
use std::path::Path;

pub fn init_db(data_dir: &Path) -> PricingResult<Connection> {
    std::fs::create_dir_all(data_dir).map_err(|e| PricingError::Database(format!("create dir: {e}")))?;
    let db_path = data_dir.join("quadratic_american.db");
    let conn = Connection::open(&db_path)?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    apply_schema(&conn)?;

    tracing::info!("database initialized at {}", db_path.display());
    Ok(conn)
}

pub fn apply_schema(conn: &Connection) -> PricingResult<()> {
    let schema = include_str!("../migrations/001_init.sql");
    conn.execute_batch(schema)?;
    Ok(())
}

/// Write one batch (inputs, per-scenario outcome, rows) in a single
/// transaction. Returns the new run id.
pub fn persist_run(
    conn: &mut Connection,
    input: &PricingInput,
    settings: &SolverSettings,
    output: &RunOutput,
) -> PricingResult<String> {
    let run_id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO runs (id, created_at, strike, carry_cost, tolerance, max_iterations)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            run_id,
            created_at,
            input.strike,
            input.carry_cost,
            settings.tolerance,
            settings.max_iterations
        ],
    )?;

    for report in &output.reports {
        let s = &report.scenario;
        let b = &report.boundaries;
        tx.execute(
            "INSERT INTO scenarios (run_id, scenario_index, time_to_maturity, risk_free_rate, volatility,
                                    call_critical, put_critical, call_iterations, put_iterations, status, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'ok', NULL)",
            rusqlite::params![
                run_id,
                report.index as i64,
                s.time_to_maturity,
                s.risk_free_rate,
                s.volatility,
                b.call.price(),
                b.put.price(),
                b.call_iterations,
                b.put_iterations
            ],
        )?;

        for row in &report.rows {
            tx.execute(
                "INSERT INTO result_rows (run_id, scenario_index, spot, european_call, american_call, european_put, american_put)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    run_id,
                    row.scenario as i64,
                    row.spot,
                    row.european_call,
                    row.american_call,
                    row.european_put,
                    row.american_put
                ],
            )?;
        }
    }

    for failure in &output.failures {
        let s = &failure.scenario;
        tx.execute(
            "INSERT INTO scenarios (run_id, scenario_index, time_to_maturity, risk_free_rate, volatility, status, error)
             VALUES (?1, ?2, ?3, ?4, ?5, 'failed', ?6)",
            rusqlite::params![
                run_id,
                failure.index as i64,
                s.time_to_maturity,
                s.risk_free_rate,
                s.volatility,
                failure.error.to_string()
            ],
        )?;
    }

    tx.commit()?;
    tracing::info!(run_id = %run_id, rows = output.rows().count(), "run persisted");
    Ok(run_id)
}
