//! Large single-transaction detection.

use rust_decimal::Decimal;

use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const LARGE_TRANSACTION_THRESHOLD: i64 = 10000;

/// Flags any single transaction at or above the reporting threshold.
pub struct ThresholdRule;

impl Default for ThresholdRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for ThresholdRule {
    fn rule_name(&self) -> &'static str {
        "Threshold"
    }

    fn description(&self) -> &'static str {
        "Detects individual transactions at or above the reporting threshold"
    }

    fn evaluate(&self, transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
        let threshold = Decimal::from(LARGE_TRANSACTION_THRESHOLD);
        transactions
            .iter()
            .filter(|t| t.amount >= threshold)
            .map(|t| {
                Alert::new(
                    self.rule_name(),
                    AlertSeverity::Medium,
                    format!(
                        "Transaction of {} on {} from {} to {}",
                        t.amount,
                        t.date.map(|d| d.date_naive().to_string()).unwrap_or_else(|| "unknown date".into()),
                        t.sender,
                        t.receiver
                    ),
                    vec![t.index],
                    AlertType::Threshold,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(index: usize, amount: i64) -> Transaction {
        Transaction {
            index,
            amount: Decimal::from(amount),
            ..Default::default()
        }
    }

    #[test]
    fn flags_at_exact_threshold() {
        let txs = vec![tx(0, 10000)];
        let alerts = ThresholdRule::default().evaluate(&txs, &AnalysisContext::default());
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn ignores_below_threshold() {
        let txs = vec![tx(0, 9999)];
        let alerts = ThresholdRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn ignores_large_negative_amount() {
        let txs = vec![tx(0, -15000)];
        let alerts = ThresholdRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }
}
