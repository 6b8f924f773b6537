//! Structuring / smurfing detection.

use chrono::Duration;
use rust_decimal::Decimal;

use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const LOWER_BOUND: i64 = 8000;
const UPPER_BOUND: i64 = 10000;
const WINDOW_DAYS: i64 = 7;
const MIN_TRANSACTIONS: usize = 3;

/// Flags clusters of just-below-threshold transactions within a short window.
pub struct StructuringRule;

impl Default for StructuringRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for StructuringRule {
    fn rule_name(&self) -> &'static str {
        "Structuring"
    }

    fn description(&self) -> &'static str {
        "Detects clusters of transactions just below the reporting threshold"
    }

    fn evaluate(&self, transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
        let lower = Decimal::from(LOWER_BOUND);
        let upper = Decimal::from(UPPER_BOUND);

        let mut candidates: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.date.is_some() && t.amount >= lower && t.amount < upper)
            .collect();
        candidates.sort_by_key(|t| t.date.unwrap());

        let mut alerts = Vec::new();
        let mut emitted_clusters: Vec<std::collections::BTreeSet<usize>> = Vec::new();

        for (i, anchor) in candidates.iter().enumerate() {
            let anchor_date = anchor.date.unwrap();
            let window_end = anchor_date + Duration::days(WINDOW_DAYS);
            let cluster: Vec<&&Transaction> = candidates[i..]
                .iter()
                .take_while(|t| t.date.unwrap() <= window_end)
                .collect();

            if cluster.len() < MIN_TRANSACTIONS {
                continue;
            }
            let sum: Decimal = cluster.iter().map(|t| t.amount).sum();
            if sum <= upper {
                continue;
            }

            let indices: std::collections::BTreeSet<usize> =
                cluster.iter().map(|t| t.index).collect();

            let is_subset_of_existing = emitted_clusters
                .iter()
                .any(|existing| indices.is_subset(existing));
            if is_subset_of_existing {
                continue;
            }

            let amounts: Vec<String> = cluster.iter().map(|t| t.amount.to_string()).collect();
            let first_date = cluster.first().unwrap().date.unwrap();
            let last_date = cluster.last().unwrap().date.unwrap();

            alerts.push(Alert::new(
                self.rule_name(),
                AlertSeverity::High,
                format!(
                    "{} transactions totaling {} between {} and {} (amounts: {})",
                    cluster.len(),
                    sum,
                    first_date.date_naive(),
                    last_date.date_naive(),
                    amounts.join(", ")
                ),
                indices.iter().copied().collect(),
                AlertType::Structuring,
            ));
            emitted_clusters.push(indices);
        }

        alerts
    }
}
