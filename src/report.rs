use std::fmt;
use std::time::Instant;

use chrono::Utc;

/// Timestamped stdout line. All ingest diagnostics go through here.
pub fn log_line(msg: &str) {
    println!("[{}] {}", Utc::now().format("%Y-%m-%dT%H:%M:%SZ"), msg);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct RunError {
    pub year: Option<i32>,
    pub context: String,
    pub message: String,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} {}: {}", self.context, year, self.message),
            None => write!(f, "{}: {}", self.context, self.message),
        }
    }
}

/// Accumulator threaded through every orchestrator stage. Errors are
/// collected here instead of aborting the loop; only a run that wrote
/// zero rows maps to a failing exit status.
#[derive(Debug)]
pub struct RunReport {
    pub script: &'static str,
    pub started_at: String,
    started: Instant,
    pub call_budget: u32,
    pub calls_made: u32,
    pub rows_written: usize,
    pub batches_failed: usize,
    pub failed_batch_rows: usize,
    pub years_requested: usize,
    pub years_processed: usize,
    pub errors: Vec<RunError>,
    pub checks: Vec<CheckOutcome>,
}

impl RunReport {
    pub fn new(script: &'static str, call_budget: u32, years_requested: usize) -> Self {
        Self {
            script,
            started_at: Utc::now().to_rfc3339(),
            started: Instant::now(),
            call_budget,
            calls_made: 0,
            rows_written: 0,
            batches_failed: 0,
            failed_batch_rows: 0,
            years_requested,
            years_processed: 0,
            errors: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Checked before each year's fetch. A year whose calls would push the
    /// counter past the budget is not processed at all.
    pub fn budget_allows(&self, calls: u32) -> bool {
        self.calls_made + calls <= self.call_budget
    }

    pub fn count_call(&mut self) {
        self.calls_made += 1;
    }

    pub fn add_rows(&mut self, n: usize) {
        self.rows_written += n;
    }

    pub fn year_done(&mut self) {
        self.years_processed += 1;
    }

    pub fn record_error(&mut self, year: Option<i32>, context: &str, message: impl ToString) {
        let err = RunError {
            year,
            context: context.to_string(),
            message: message.to_string(),
        };
        log_line(&format!("error: {err}"));
        self.errors.push(err);
    }

    /// A failed batch keeps its row count visible instead of vanishing.
    pub fn record_failed_batch(
        &mut self,
        year: Option<i32>,
        context: &str,
        rows: usize,
        message: impl ToString,
    ) {
        self.batches_failed += 1;
        self.failed_batch_rows += rows;
        self.record_error(year, context, format!("batch of {rows} rows: {}", message.to_string()));
    }

    pub fn check(&mut self, name: &str, status: CheckStatus, detail: String) {
        log_line(&format!("check {}: {} ({})", name, status.as_str(), detail));
        self.checks.push(CheckOutcome {
            name: name.to_string(),
            status,
            detail,
        });
    }

    pub fn complete(&self) -> bool {
        self.years_processed == self.years_requested
    }

    pub fn exit_code(&self) -> i32 {
        if self.rows_written > 0 { 0 } else { 1 }
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn print_summary(&self) {
        log_line(&format!(
            "{} finished in {:.1}s",
            self.script,
            self.started.elapsed().as_secs_f64()
        ));
        log_line(&format!("rows written: {}", self.rows_written));
        log_line(&format!("api calls: {}/{}", self.calls_made, self.call_budget));
        log_line(&format!(
            "years processed: {}/{}",
            self.years_processed, self.years_requested
        ));
        if self.batches_failed > 0 {
            log_line(&format!(
                "failed batches: {} ({} rows not written)",
                self.batches_failed, self.failed_batch_rows
            ));
        }
        log_line(&format!("errors: {}", self.errors.len()));
        for err in self.errors.iter().take(8) {
            log_line(&format!("  - {err}"));
        }
        if !self.complete() {
            log_line("run incomplete: call budget exhausted before the final year");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_stops_before_overrun() {
        let mut report = RunReport::new("test_ingest", 5, 8);
        for _year in 2017..=2024 {
            if !report.budget_allows(1) {
                break;
            }
            report.count_call();
            report.add_rows(10);
            report.year_done();
        }
        assert_eq!(report.calls_made, 5);
        assert_eq!(report.years_processed, 5);
        assert!(!report.complete());
        assert!(report.errors.is_empty());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn multi_call_year_is_skipped_whole() {
        // 3 calls per year, budget 7: two full years fit, the third would
        // exceed the budget and must not be partially fetched.
        let mut report = RunReport::new("test_ingest", 7, 3);
        for _year in 0..3 {
            if !report.budget_allows(3) {
                break;
            }
            for _ in 0..3 {
                report.count_call();
            }
            report.year_done();
        }
        assert_eq!(report.calls_made, 6);
        assert_eq!(report.years_processed, 2);
    }

    #[test]
    fn zero_rows_is_a_failing_exit() {
        let mut report = RunReport::new("test_ingest", 5, 1);
        report.record_error(Some(2024), "fetch roster", "http 500");
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn failed_batch_rows_stay_visible() {
        let mut report = RunReport::new("test_ingest", 5, 1);
        report.record_failed_batch(Some(2023), "write games", 42, "disk full");
        assert_eq!(report.batches_failed, 1);
        assert_eq!(report.failed_batch_rows, 42);
        assert_eq!(report.errors.len(), 1);
    }
}
