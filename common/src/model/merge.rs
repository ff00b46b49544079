use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Whether a batch queues messages as drafts or sends them immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    Draft,
    Send,
}

impl DeliveryMode {
    pub fn from_draft_flag(draft: bool) -> Self {
        if draft { Self::Draft } else { Self::Send }
    }
}

/// Inclusive, 1-based row range as entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Every row of a dataset with `len` rows.
    pub fn full(len: usize) -> Self {
        Self { start: 1, end: len }
    }

    /// Zero-based, half-open indices, or `None` when the range is empty,
    /// reversed, or reaches past the last of `len` rows.
    pub fn to_indices(&self, len: usize) -> Option<Range<usize>> {
        if self.start == 0 || self.start > self.end || self.end > len {
            return None;
        }
        Some(self.start - 1..self.end)
    }
}

/// Result of attempting one row. `row` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub row: usize,
    pub to: String,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn success(row: usize, to: impl Into<String>) -> Self {
        Self {
            row,
            to: to.into(),
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(row: usize, to: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            row,
            to: to.into(),
            succeeded: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregated outcome of a completed batch; `failures` keeps row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub success_count: usize,
    pub failures: Vec<DispatchOutcome>,
}

impl BatchReport {
    pub fn record(&mut self, outcome: DispatchOutcome) {
        self.attempted += 1;
        if outcome.succeeded {
            self.success_count += 1;
        } else {
            self.failures.push(outcome);
        }
    }

    pub fn is_fully_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// Operator-facing summary, itemizing failures when there are any.
    pub fn summary(&self) -> String {
        if self.is_fully_successful() {
            return format!("Successfully processed all {} emails!", self.success_count);
        }
        let mut msg = format!(
            "Processed {} successfully, but {} failed.\n\nFailures:\n",
            self.success_count,
            self.failures.len()
        );
        for failure in &self.failures {
            msg.push_str(&format!(
                "- Row {} ({}): {}\n",
                failure.row,
                failure.to,
                failure.error.as_deref().unwrap_or_default()
            ));
        }
        msg
    }
}

/// Progress after one row has been attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchProgress {
    pub processed: usize,
    pub total: usize,
    pub percent: u32,
    pub message: String,
}

impl DispatchProgress {
    pub fn new(processed: usize, total: usize, to: &str, succeeded: bool) -> Self {
        let percent = if total > 0 {
            ((processed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        let prefix = if succeeded { "Processed" } else { "FAILED" };
        Self {
            processed,
            total,
            percent,
            message: format!("{prefix} {processed}/{total}: {to}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_validated_against_length() {
        assert_eq!(RowRange::new(1, 3).to_indices(3), Some(0..3));
        assert_eq!(RowRange::new(2, 2).to_indices(3), Some(1..2));
        assert_eq!(RowRange::new(0, 2).to_indices(3), None);
        assert_eq!(RowRange::new(3, 2).to_indices(3), None);
        assert_eq!(RowRange::new(1, 4).to_indices(3), None);
        assert_eq!(RowRange::full(0).to_indices(0), None);
    }

    #[test]
    fn summary_lists_failures_in_order() {
        let mut report = BatchReport::default();
        report.record(DispatchOutcome::success(1, "a@x.com"));
        report.record(DispatchOutcome::failure(2, "Unknown/Empty", "bad address"));
        report.record(DispatchOutcome::failure(3, "c@x", "rejected"));

        assert_eq!(report.attempted, 3);
        assert_eq!(report.success_count, 1);
        assert!(!report.is_fully_successful());
        let summary = report.summary();
        assert!(summary.starts_with("Processed 1 successfully, but 2 failed."));
        let row2 = summary.find("- Row 2 (Unknown/Empty): bad address").unwrap();
        let row3 = summary.find("- Row 3 (c@x): rejected").unwrap();
        assert!(row2 < row3);
    }

    #[test]
    fn clean_batch_summary() {
        let mut report = BatchReport::default();
        report.record(DispatchOutcome::success(1, "a@x.com"));
        assert_eq!(report.summary(), "Successfully processed all 1 emails!");
    }

    #[test]
    fn progress_percent_and_prefix() {
        let p = DispatchProgress::new(2, 3, "b@x.com", true);
        assert_eq!(p.percent, 67);
        assert_eq!(p.message, "Processed 2/3: b@x.com");

        let p = DispatchProgress::new(3, 3, "c@x.com", false);
        assert_eq!(p.percent, 100);
        assert_eq!(p.message, "FAILED 3/3: c@x.com");
    }
}
