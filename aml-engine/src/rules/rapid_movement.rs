//! Rapid fund movement: near-equal in/out pairs within a short window.

use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::rules::direction::{classify, Direction};
use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const MIN_AMOUNT: i64 = 5000;
const WINDOW_HOURS: i64 = 48;
const TOLERANCE: f64 = 0.20;

/// Flags pairs of incoming/outgoing transactions of near-equal amount within
/// 48 hours of each other — funds passed straight through the account.
pub struct RapidMovementRule;

impl Default for RapidMovementRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for RapidMovementRule {
    fn rule_name(&self) -> &'static str {
        "RapidMovement"
    }

    fn description(&self) -> &'static str {
        "Detects near-equal incoming and outgoing transactions within 48 hours"
    }

    fn evaluate(&self, transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
        let min_amount = Decimal::from(MIN_AMOUNT);
        let mut events: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.date.is_some() && t.amount.abs() >= min_amount)
            .collect();
        events.sort_by_key(|t| t.date.unwrap());

        let mut alerts = Vec::new();
        let mut flagged_pairs: HashSet<(usize, usize)> = HashSet::new();
        let window = Duration::hours(WINDOW_HOURS);

        for (i, a) in events.iter().enumerate() {
            for b in events.iter().skip(i + 1) {
                let a_date = a.date.unwrap();
                let b_date = b.date.unwrap();
                if b_date - a_date > window {
                    break;
                }
                let dir_a = classify(a);
                let dir_b = classify(b);
                if dir_a == dir_b {
                    continue;
                }

                let pair_key = (a.index.min(b.index), a.index.max(b.index));
                if flagged_pairs.contains(&pair_key) {
                    continue;
                }

                let (in_tx, out_tx, label) = if dir_a == Direction::In {
                    (a, b, "received then sent")
                } else {
                    (b, a, "sent then received")
                };

                let in_amount = in_tx.amount.abs();
                let out_amount = out_tx.amount.abs();
                if in_amount.is_zero() {
                    continue;
                }
                let variance = (in_amount - out_amount).abs().to_f64().unwrap_or(f64::MAX)
                    / in_amount.to_f64().unwrap_or(1.0);
                if variance > TOLERANCE {
                    continue;
                }

                flagged_pairs.insert(pair_key);

                alerts.push(Alert::new(
                    self.rule_name(),
                    AlertSeverity::High,
                    format!(
                        "Funds {} within {}h: {} at {} and {} at {} (variance {:.1}%)",
                        label,
                        WINDOW_HOURS,
                        in_tx.amount,
                        in_tx.date.unwrap(),
                        out_tx.amount,
                        out_tx.date.unwrap(),
                        variance * 100.0
                    ),
                    vec![in_tx.index, out_tx.index],
                    AlertType::RapidMovement,
                ));
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(index: usize, amount: i64, hour: u32, ty: &str) -> Transaction {
        Transaction {
            index,
            date: Some(Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()),
            amount: Decimal::from(amount),
            transaction_type: ty.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn flags_near_equal_in_out_pair() {
        let txs = vec![tx(0, 20000, 0, "credit"), tx(1, 19800, 6, "debit")];
        let alerts = RapidMovementRule::default().evaluate(&txs, &AnalysisContext::default());
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn ignores_pair_outside_window() {
        let txs = vec![
            tx(0, 20000, 0, "credit"),
            Transaction {
                index: 1,
                date: Some(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap()),
                amount: Decimal::from(19800),
                transaction_type: "debit".into(),
                ..Default::default()
            },
        ];
        let alerts = RapidMovementRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn ignores_same_direction_pair() {
        let txs = vec![tx(0, 20000, 0, "credit"), tx(1, 19800, 6, "credit")];
        let alerts = RapidMovementRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn variance_is_measured_against_the_in_leg() {
        // in=5000, out=6200: 1200/5000 = 24% against the in-leg, over the 20%
        // tolerance, so this must NOT alert even though 1200/6200 = 19.35%.
        let txs = vec![tx(0, 5000, 0, "credit"), tx(1, 6200, 6, "debit")];
        let alerts = RapidMovementRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }
}
