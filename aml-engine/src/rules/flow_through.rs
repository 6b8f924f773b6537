//! Flow-through / layering detection: funds pass through in near-equal
//! amounts over non-overlapping 30-day tiles.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::rules::direction::{classify, Direction};
use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const WINDOW_DAYS: i64 = 30;
const MIN_AMOUNT: i64 = 10000;
const MAX_VARIANCE: f64 = 0.10;

/// Flags 30-day tiles where incoming and outgoing totals are large and
/// nearly equal — money moved through the account rather than settling.
pub struct FlowThroughRule;

impl Default for FlowThroughRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for FlowThroughRule {
    fn rule_name(&self) -> &'static str {
        "FlowThrough"
    }

    fn description(&self) -> &'static str {
        "Detects near-equal incoming and outgoing totals within a 30-day window"
    }

    fn evaluate(&self, transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
        let mut sorted: Vec<&Transaction> = transactions.iter().filter(|t| t.date.is_some()).collect();
        sorted.sort_by_key(|t| t.date.unwrap());
        if sorted.is_empty() {
            return Vec::new();
        }

        let mut alerts = Vec::new();
        let first_date = sorted[0].date.unwrap();
        let last_date = sorted.last().unwrap().date.unwrap();
        let window = Duration::days(WINDOW_DAYS);

        let mut window_start = first_date;
        while window_start <= last_date {
            let window_end = window_start + window;
            let tile: Vec<&&Transaction> = sorted
                .iter()
                .filter(|t| {
                    let d = t.date.unwrap();
                    d >= window_start && d < window_end
                })
                .collect();

            if let Some(alert) = evaluate_tile(self.rule_name(), &tile, window_start, window_end) {
                alerts.push(alert);
            }

            window_start = window_end;
        }

        alerts
    }
}

fn evaluate_tile(
    rule_name: &str,
    tile: &[&&Transaction],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Option<Alert> {
    if tile.len() < 2 {
        return None;
    }

    let mut total_in = Decimal::ZERO;
    let mut total_out = Decimal::ZERO;
    for t in tile {
        match classify(t) {
            Direction::In => total_in += t.amount.abs(),
            Direction::Out => total_out += t.amount.abs(),
        }
    }

    if total_in.is_zero() || total_out.is_zero() {
        return None;
    }

    let larger = total_in.max(total_out);
    if larger < Decimal::from(MIN_AMOUNT) {
        return None;
    }

    let variance =
        (total_in - total_out).abs().to_f64().unwrap_or(f64::MAX) / larger.to_f64().unwrap_or(1.0);
    if variance > MAX_VARIANCE {
        return None;
    }

    Some(Alert::new(
        rule_name,
        AlertSeverity::High,
        format!(
            "Flow-through between {} and {}: in {} vs out {} (variance {:.1}%)",
            window_start.date_naive(),
            window_end.date_naive(),
            total_in,
            total_out,
            variance * 100.0
        ),
        tile.iter().map(|t| t.index).collect(),
        AlertType::FlowThrough,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(index: usize, amount: i64, day: u32, ty: &str) -> Transaction {
        Transaction {
            index,
            date: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            amount: Decimal::from(amount),
            transaction_type: ty.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn flags_near_equal_in_and_out_totals() {
        let txs = vec![
            tx(0, 17000, 1, "credit"),
            tx(1, 17000, 2, "credit"),
            tx(2, 16000, 3, "debit"),
            tx(3, 17000, 4, "debit"),
            tx(4, 1000, 5, "debit"),
        ];
        let alerts = FlowThroughRule::default().evaluate(&txs, &AnalysisContext::default());
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn ignores_single_transaction_window() {
        let txs = vec![tx(0, 50000, 1, "credit")];
        let alerts = FlowThroughRule::default().evaluate(&txs, &AnalysisContext::default());
        assert!(alerts.is_empty());
    }
}
