//! Dormant account reactivation detection.

use chrono::Duration;

use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const INACTIVITY_DAYS: i64 = 90;
const BURST_COUNT: usize = 3;
const BURST_WINDOW_DAYS: i64 = 7;

/// Flags a burst of activity following a long period of account inactivity.
pub struct DormantAccountRule;

impl Default for DormantAccountRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for DormantAccountRule {
    fn rule_name(&self) -> &'static str {
        "Dormant"
    }

    fn description(&self) -> &'static str {
        "Detects a burst of transactions after a long period of inactivity"
    }

    fn evaluate(&self, transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
        let mut sorted: Vec<&Transaction> = transactions.iter().filter(|t| t.date.is_some()).collect();
        sorted.sort_by_key(|t| t.date.unwrap());

        let mut alerts = Vec::new();
        let gap_threshold = Duration::days(INACTIVITY_DAYS);
        let burst_window = Duration::days(BURST_WINDOW_DAYS);

        for window in sorted.windows(2) {
            let prev = window[0];
            let next = window[1];
            let gap = next.date.unwrap() - prev.date.unwrap();
            if gap < gap_threshold {
                continue;
            }

            let burst_start = next.date.unwrap();
            let burst_end = burst_start + burst_window;
            let burst: Vec<&&Transaction> = sorted
                .iter()
                .filter(|t| {
                    let d = t.date.unwrap();
                    d >= burst_start && d <= burst_end
                })
                .collect();

            if burst.len() < BURST_COUNT {
                continue;
            }

            let total: rust_decimal::Decimal = burst.iter().map(|t| t.amount).sum();
            alerts.push(Alert::new(
                self.rule_name(),
                AlertSeverity::Medium,
                format!(
                    "{} days of inactivity since {} followed by a burst of {} transactions totaling {} starting {}",
                    gap.num_days(),
                    prev.date.unwrap().date_naive(),
                    burst.len(),
                    total,
                    burst_start.date_naive()
                ),
                burst.iter().map(|t| t.index).collect(),
                AlertType::DormantAccount,
            ));
        }

        alerts
    }
}
