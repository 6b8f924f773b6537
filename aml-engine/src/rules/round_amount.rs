//! Round-number amount pattern detection.

use rust_decimal::Decimal;

use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const DIVISORS: [i64; 2] = [1000, 500];
const RATIO_THRESHOLD: f64 = 0.60;
const MIN_FOR_RATIO: usize = 3;
const MIN_CONSECUTIVE: usize = 3;

fn is_round(amount: Decimal) -> bool {
    let abs = amount.abs();
    if abs.is_zero() {
        return false;
    }
    DIVISORS
        .iter()
        .any(|d| (abs % Decimal::from(*d)).is_zero())
}

/// Flags customers whose transactions are disproportionately round amounts,
/// and any run of 3+ consecutive round-amount transactions.
pub struct RoundAmountRule;

impl Default for RoundAmountRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for RoundAmountRule {
    fn rule_name(&self) -> &'static str {
        "RoundAmount"
    }

    fn description(&self) -> &'static str {
        "Detects a disproportionate share of round-number transaction amounts"
    }

    fn evaluate(&self, transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if transactions.is_empty() {
            return alerts;
        }

        let round_indices: Vec<usize> = transactions
            .iter()
            .filter(|t| is_round(t.amount))
            .map(|t| t.index)
            .collect();

        if transactions.len() >= MIN_FOR_RATIO {
            let ratio = round_indices.len() as f64 / transactions.len() as f64;
            if ratio > RATIO_THRESHOLD {
                alerts.push(Alert::new(
                    self.rule_name(),
                    AlertSeverity::Medium,
                    format!(
                        "{} of {} transactions ({:.1}%) are round amounts",
                        round_indices.len(),
                        transactions.len(),
                        ratio * 100.0
                    ),
                    round_indices.clone(),
                    AlertType::RoundAmount,
                ));
            }
        }

        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sorted.sort_by_key(|t| t.date);

        let mut run: Vec<usize> = Vec::new();
        for t in &sorted {
            if is_round(t.amount) {
                run.push(t.index);
            } else {
                if run.len() >= MIN_CONSECUTIVE {
                    alerts.push(consecutive_alert(self.rule_name(), &run));
                }
                run.clear();
            }
        }
        if run.len() >= MIN_CONSECUTIVE {
            alerts.push(consecutive_alert(self.rule_name(), &run));
        }

        alerts
    }
}

fn consecutive_alert(rule_name: &str, indices: &[usize]) -> Alert {
    Alert::new(
        rule_name,
        AlertSeverity::Medium,
        format!(
            "{} consecutive round-amount transactions in sequence",
            indices.len()
        ),
        indices.to_vec(),
        AlertType::RoundAmount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(index: usize, amount: i64, day: u32) -> Transaction {
        Transaction {
            index,
            date: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            amount: Decimal::from(amount),
            ..Default::default()
        }
    }

    #[test]
    fn flags_high_ratio_of_round_amounts() {
        let txs = vec![tx(0, 1000, 1), tx(1, 2000, 2), tx(2, 1500, 3), tx(3, 777, 4)];
        let alerts = RoundAmountRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.iter().any(|a| a.description.contains("round amounts")));
    }

    #[test]
    fn flags_consecutive_round_run() {
        let txs: Vec<Transaction> = (0..8).map(|i| tx(i, 5000, i as u32 + 1)).collect();
        let alerts = RoundAmountRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts
            .iter()
            .any(|a| a.description.contains("consecutive")));
    }

    #[test]
    fn ignores_non_round_amounts() {
        let txs = vec![tx(0, 1234, 1), tx(1, 5678, 2), tx(2, 9101, 3)];
        let alerts = RoundAmountRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }
}
