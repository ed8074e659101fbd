//! Run reports: summary counts, JSON export and console output

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use super::result::ScenarioResult;
use crate::constants::REPORT_NAME_WIDTH;

/// Counts for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scenarios: usize,
    pub passed: usize,
    pub failed: usize,
    pub steps: usize,
}

/// Results of one registry run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub scenarios: Vec<ScenarioResult>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a RunReport,
    summary: RunSummary,
    passed: bool,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>, duration_secs: f64, scenarios: Vec<ScenarioResult>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            duration_secs,
            scenarios,
        }
    }

    pub fn summary(&self) -> RunSummary {
        let passed = self.scenarios.iter().filter(|s| s.passed()).count();
        RunSummary {
            scenarios: self.scenarios.len(),
            passed,
            failed: self.scenarios.len() - passed,
            steps: self.scenarios.iter().map(ScenarioResult::step_count).sum(),
        }
    }

    /// True iff every scenario passed
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(ScenarioResult::passed)
    }

    /// Process exit code for the run
    pub fn exit_code(&self) -> i32 {
        if self.passed() { 0 } else { 1 }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&JsonReport {
            report: self,
            summary: self.summary(),
            passed: self.passed(),
        })
    }

    /// Write report to JSON file
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Print per-scenario results and the closing summary line
pub fn print_report(report: &RunReport, verbose: bool) {
    print!("{}", render_report(report, verbose));
}

/// Console text for a run: one line per scenario, failure details and the
/// closing summary
pub fn render_report(report: &RunReport, verbose: bool) -> String {
    let mut out = String::new();
    out.push_str("Scenarios\n");
    out.push_str("=========\n\n");

    for scenario in &report.scenarios {
        render_scenario(&mut out, scenario, verbose);
    }

    let summary = report.summary();
    let _ = writeln!(
        out,
        "\n{} steps, {} scenarios in {:.4} seconds\n",
        summary.steps, summary.scenarios, report.duration_secs
    );
    if report.passed() {
        out.push_str("ok\n");
    } else {
        let _ = writeln!(out, "FAILED ({} of {} scenarios)", summary.failed, summary.scenarios);
    }
    out
}

// Writing into a String cannot fail
fn render_scenario(out: &mut String, scenario: &ScenarioResult, verbose: bool) {
    let name = scenario.name();
    let dots = ".".repeat(REPORT_NAME_WIDTH.saturating_sub(name.len()).max(1));

    if scenario.passed() {
        let _ = writeln!(out, "  {} {} PASS ({} steps)", name, dots, scenario.step_count());
        return;
    }

    let _ = writeln!(out, "  {} {} FAIL", name, dots);
    for (phase, check) in scenario.failures() {
        let error = check.error.as_deref().unwrap_or_default();
        if verbose {
            let _ = writeln!(out, "    {} {}: {}", phase, check.name, error);
            for line in check.output.lines() {
                let _ = writeln!(out, "      | {}", line);
            }
        } else {
            let first_line = error.lines().next().unwrap_or_default();
            let _ = writeln!(out, "    {} {}: {}", phase, check.name, first_line);
        }
    }
}
