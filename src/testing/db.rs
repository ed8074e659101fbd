//! SQLite database for scenario run history
//!
//! Stores every run with its scenarios and checks so pass rates can be
//! tracked across runs. Uses WAL mode for concurrent reads during writes.

use rusqlite::{Connection, Result, params};
use std::path::Path;
use tracing::debug;

use super::report::RunReport;

/// Database wrapper for run history
pub struct ResultDatabase {
    conn: Connection,
}

impl ResultDatabase {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for concurrent reads during writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                started_at TEXT NOT NULL,
                duration_secs REAL NOT NULL,
                scenario_count INTEGER NOT NULL,
                failed_count INTEGER NOT NULL,
                step_count INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS scenarios (
                id INTEGER PRIMARY KEY,
                run_id TEXT REFERENCES runs(id),
                name TEXT NOT NULL,
                passed INTEGER NOT NULL,
                started_at TEXT,
                duration_secs REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS checks (
                id INTEGER PRIMARY KEY,
                scenario_id INTEGER REFERENCES scenarios(id),
                phase TEXT NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                error TEXT,
                output TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_scenarios_run ON scenarios(run_id);
            CREATE INDEX IF NOT EXISTS idx_scenarios_name ON scenarios(name);
            CREATE INDEX IF NOT EXISTS idx_checks_scenario ON checks(scenario_id);
            "#,
        )?;
        Ok(())
    }

    /// Insert a run with all of its scenarios and checks
    pub fn insert_run(&mut self, report: &RunReport) -> Result<String> {
        let summary = report.summary();
        let run_id = report.run_id.to_string();
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"INSERT INTO runs
               (id, started_at, duration_secs, scenario_count, failed_count, step_count)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                run_id,
                report.started_at.to_rfc3339(),
                report.duration_secs,
                summary.scenarios as i64,
                summary.failed as i64,
                summary.steps as i64,
            ],
        )?;

        for scenario in &report.scenarios {
            tx.execute(
                r#"INSERT INTO scenarios (run_id, name, passed, started_at, duration_secs)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![
                    run_id,
                    scenario.name(),
                    scenario.passed(),
                    scenario.started_at().map(|t| t.to_rfc3339()),
                    scenario.duration_secs(),
                ],
            )?;
            let scenario_id = tx.last_insert_rowid();

            let mut stmt = tx.prepare(
                r#"INSERT INTO checks (scenario_id, phase, position, name, error, output)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            )?;
            for (position, (phase, check)) in scenario.checks().enumerate() {
                stmt.execute(params![
                    scenario_id,
                    phase.as_str(),
                    position as i64,
                    check.name,
                    check.error,
                    check.output,
                ])?;
            }
        }

        tx.commit()?;
        debug!("Stored run {} ({} scenarios)", run_id, summary.scenarios);
        Ok(run_id)
    }

    /// Get run count
    pub fn run_count(&self) -> Result<u64> {
        self.conn.query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))
    }

    /// Get scenario count across all runs
    pub fn scenario_count(&self) -> Result<u64> {
        self.conn.query_row("SELECT COUNT(*) FROM scenarios", [], |row| row.get(0))
    }

    /// Most recent results for a scenario, newest first
    pub fn scenario_history(&self, name: &str, limit: u32) -> Result<Vec<ScenarioRecord>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT s.id, s.run_id, s.name, s.passed, s.duration_secs,
                      (SELECT COUNT(*) FROM checks c WHERE c.scenario_id = s.id),
                      r.started_at
               FROM scenarios s JOIN runs r ON r.id = s.run_id
               WHERE s.name = ?1
               ORDER BY r.started_at DESC, s.id DESC
               LIMIT ?2"#,
        )?;

        let rows = stmt.query_map(params![name, limit], |row| {
            Ok(ScenarioRecord {
                id: row.get(0)?,
                run_id: row.get(1)?,
                name: row.get(2)?,
                passed: row.get(3)?,
                duration_secs: row.get(4)?,
                check_count: row.get(5)?,
                run_started_at: row.get(6)?,
            })
        })?;

        rows.collect()
    }

    /// Stored checks for one scenario row, in recorded order
    pub fn get_checks(&self, scenario_id: i64) -> Result<Vec<CheckRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT phase, name, error, output FROM checks WHERE scenario_id = ?1 ORDER BY position",
        )?;

        let rows = stmt.query_map(params![scenario_id], |row| {
            Ok(CheckRow {
                phase: row.get(0)?,
                name: row.get(1)?,
                error: row.get(2)?,
                output: row.get(3)?,
            })
        })?;

        rows.collect()
    }

    /// Fraction of recorded runs in which the scenario passed
    pub fn pass_rate(&self, name: &str) -> Result<Option<f64>> {
        self.conn.query_row(
            "SELECT AVG(passed) FROM scenarios WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
    }

    /// Pass rate and recent runs for one scenario, with the failing checks
    /// of each failed run
    pub fn format_history(&self, name: &str, limit: u32) -> Result<String> {
        let history = self.scenario_history(name, limit)?;
        if history.is_empty() {
            return Ok(format!("No stored results for '{}'\n", name));
        }

        let mut out = format!("History for '{}'\n", name);
        if let Some(rate) = self.pass_rate(name)? {
            out.push_str(&format!("Pass rate: {:.1}% over {} stored runs\n\n", rate * 100.0, self.run_total(name)?));
        }

        for record in &history {
            out.push_str(&format!(
                "  {}  {}  {} checks  {:.4}s\n",
                record.run_started_at,
                if record.passed { "PASS" } else { "FAIL" },
                record.check_count,
                record.duration_secs
            ));
            if record.passed {
                continue;
            }
            for check in self.get_checks(record.id)? {
                if let Some(error) = check.error.as_deref().filter(|e| !e.is_empty()) {
                    let first_line = error.lines().next().unwrap_or_default();
                    out.push_str(&format!("    {} {}: {}\n", check.phase, check.name, first_line));
                }
            }
        }
        Ok(out)
    }

    fn run_total(&self, name: &str) -> Result<u64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM scenarios WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
    }
}

/// A row from the scenarios table
#[derive(Debug, Clone)]
pub struct ScenarioRecord {
    pub id: i64,
    pub run_id: String,
    pub name: String,
    pub passed: bool,
    pub duration_secs: f64,
    pub check_count: u32,
    pub run_started_at: String,
}

/// A row from the checks table
#[derive(Debug, Clone)]
pub struct CheckRow {
    pub phase: String,
    pub name: String,
    pub error: Option<String>,
    pub output: String,
}
