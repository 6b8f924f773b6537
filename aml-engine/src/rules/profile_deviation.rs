//! Deviation from a customer's own baseline amount and frequency.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const AMOUNT_MULTIPLIER: f64 = 3.0;

/// Flags transactions or months that deviate sharply from the customer's
/// own historical average. Per design decision, the baseline mean is
/// self-inclusive of the transaction being evaluated.
pub struct ProfileDeviationRule;

impl Default for ProfileDeviationRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for ProfileDeviationRule {
    fn rule_name(&self) -> &'static str {
        "ProfileDeviation"
    }

    fn description(&self) -> &'static str {
        "Detects transactions or months that deviate from the customer's own baseline"
    }

    fn evaluate(&self, transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if transactions.is_empty() {
            return alerts;
        }

        let mean_amount: Decimal =
            transactions.iter().map(|t| t.amount.abs()).sum::<Decimal>()
                / Decimal::from(transactions.len());
        let amount_limit = mean_amount * Decimal::try_from(AMOUNT_MULTIPLIER).unwrap();

        for t in transactions {
            if t.amount.abs() > amount_limit {
                alerts.push(Alert::new(
                    self.rule_name(),
                    AlertSeverity::Medium,
                    format!(
                        "Amount {} exceeds {}x the customer's average of {}",
                        t.amount, AMOUNT_MULTIPLIER, mean_amount
                    ),
                    vec![t.index],
                    AlertType::ProfileDeviation,
                ));
            }
        }

        let mut by_month: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for t in transactions {
            if let Some(date) = t.date {
                by_month
                    .entry(date.format("%Y-%m").to_string())
                    .or_default()
                    .push(t.index);
            }
        }

        if by_month.len() >= 2 {
            let total_count: usize = by_month.values().map(Vec::len).sum();
            let mean_count = total_count as f64 / by_month.len() as f64;
            let count_limit = mean_count * AMOUNT_MULTIPLIER;

            for (month, indices) in &by_month {
                if indices.len() as f64 > count_limit {
                    alerts.push(Alert::new(
                        self.rule_name(),
                        AlertSeverity::Medium,
                        format!(
                            "{} transactions in {} exceeds {:.1}x the monthly average of {:.1}",
                            indices.len(),
                            month,
                            AMOUNT_MULTIPLIER,
                            mean_count
                        ),
                        indices.clone(),
                        AlertType::ProfileDeviation,
                    ));
                }
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(index: usize, amount: i64, month: u32) -> Transaction {
        Transaction {
            index,
            date: Some(Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap()),
            amount: Decimal::from(amount),
            ..Default::default()
        }
    }

    #[test]
    fn flags_large_outlier_amount() {
        let txs = vec![tx(0, 100, 1), tx(1, 120, 1), tx(2, 50000, 1)];
        let alerts = ProfileDeviationRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.iter().any(|a| a.description.contains("Amount")));
    }

    #[test]
    fn ignores_uniform_amounts() {
        let txs = vec![tx(0, 100, 1), tx(1, 110, 1), tx(2, 105, 1)];
        let alerts = ProfileDeviationRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }
}
