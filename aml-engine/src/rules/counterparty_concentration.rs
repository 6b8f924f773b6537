//! Fan-in / fan-out counterparty concentration detection.

use chrono::Duration;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const WINDOW_DAYS: i64 = 14;
const UNIQUE_MIN: usize = 5;
const AGGREGATE_THRESHOLD: i64 = 15000;
const MAX_NAMES_LISTED: usize = 10;

/// Flags windows where a customer transacts with many unique counterparties
/// (fan-in on senders, fan-out on receivers) for a large aggregate amount.
pub struct CounterpartyConcentrationRule;

impl Default for CounterpartyConcentrationRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for CounterpartyConcentrationRule {
    fn rule_name(&self) -> &'static str {
        "CounterpartyConcentration"
    }

    fn description(&self) -> &'static str {
        "Detects fan-in or fan-out concentration across many counterparties"
    }

    fn evaluate(&self, transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if let Some(alert) = scan_direction(
            self.rule_name(),
            transactions,
            |t| &t.sender,
            "fan-in",
        ) {
            alerts.push(alert);
        }
        if let Some(alert) = scan_direction(
            self.rule_name(),
            transactions,
            |t| &t.receiver,
            "fan-out",
        ) {
            alerts.push(alert);
        }
        alerts
    }
}

fn scan_direction<'a, F>(
    rule_name: &str,
    transactions: &'a [Transaction],
    counterparty: F,
    label: &str,
) -> Option<Alert>
where
    F: Fn(&'a Transaction) -> &'a str,
{
    let mut sorted: Vec<&Transaction> = transactions.iter().filter(|t| t.date.is_some()).collect();
    sorted.sort_by_key(|t| t.date.unwrap());
    let window = Duration::days(WINDOW_DAYS);

    for (i, anchor) in sorted.iter().enumerate() {
        let anchor_date = anchor.date.unwrap();
        let window_end = anchor_date + window;
        let group: Vec<&&Transaction> = sorted[i..]
            .iter()
            .take_while(|t| t.date.unwrap() <= window_end)
            .collect();

        let mut names: BTreeSet<String> = BTreeSet::new();
        let mut total = Decimal::ZERO;
        for t in &group {
            let name = counterparty(t).trim().to_lowercase();
            if !name.is_empty() {
                names.insert(name);
            }
            total += t.amount.abs();
        }

        if names.len() < UNIQUE_MIN || total <= Decimal::from(AGGREGATE_THRESHOLD) {
            continue;
        }

        let last_date = group.last().unwrap().date.unwrap();
        let listed: Vec<&String> = names.iter().take(MAX_NAMES_LISTED).collect();
        let listed_str = listed
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        return Some(Alert::new(
            rule_name,
            AlertSeverity::High,
            format!(
                "{} concentration: {} unique counterparties between {} and {} totaling {} (e.g. {})",
                label,
                names.len(),
                anchor_date.date_naive(),
                last_date.date_naive(),
                total,
                listed_str
            ),
            group.iter().map(|t| t.index).collect(),
            AlertType::CounterpartyConcentration,
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(index: usize, sender: &str, amount: i64, day: u32) -> Transaction {
        Transaction {
            index,
            date: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            amount: Decimal::from(amount),
            sender: sender.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn flags_fan_in_with_many_unique_senders() {
        let txs: Vec<Transaction> = (0..8)
            .map(|i| tx(i, &format!("Sender {}", i), 4000, i as u32 + 1))
            .collect();
        let alerts = CounterpartyConcentrationRule::default()
            .evaluate(&txs, &AnalysisContext::default());
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn ignores_few_unique_senders() {
        let txs: Vec<Transaction> = (0..8)
            .map(|i| tx(i, "Same Sender", 4000, i as u32 + 1))
            .collect();
        let alerts = CounterpartyConcentrationRule::default()
            .evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }
}
