//! Aggregate statistics over a customer's transaction history.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::rules::{bic_country, iban_country};
use crate::types::{HighRiskCountry, PatternData, Transaction};

/// Computes per-customer aggregate statistics, independent of the alert
/// engine.
#[derive(Debug, Default)]
pub struct PatternAnalyzer;

impl PatternAnalyzer {
    /// Construct a new analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Compute `PatternData` for `transactions`, using `high_risk_countries`
    /// to measure exposure.
    pub fn analyze(
        &self,
        transactions: &[Transaction],
        high_risk_countries: &[HighRiskCountry],
    ) -> PatternData {
        let mut data = PatternData::default();
        if transactions.is_empty() {
            return data;
        }

        for t in transactions {
            if let Some(date) = t.date {
                *data
                    .by_month
                    .entry(date.format("%Y-%m").to_string())
                    .or_insert(Decimal::ZERO) += t.amount;
            }
            let ty = t.transaction_type.trim();
            if !ty.is_empty() {
                *data.by_type.entry(ty.to_string()).or_insert(Decimal::ZERO) += t.amount;
            }
            let currency = t.currency.trim();
            if !currency.is_empty() {
                *data
                    .by_currency
                    .entry(currency.to_string())
                    .or_insert(Decimal::ZERO) += t.amount;
            }
        }

        let round_count = transactions
            .iter()
            .filter(|t| is_round(t.amount))
            .count();
        data.round_amount_ratio =
            round4(round_count as f64 / transactions.len() as f64);

        let total: Decimal = transactions.iter().map(|t| t.amount).sum();
        data.avg_transaction_size =
            (total / Decimal::from(transactions.len())).round_dp(2);

        let registry: std::collections::HashSet<String> = high_risk_countries
            .iter()
            .map(|c| c.country_code.to_uppercase())
            .collect();
        let exposed = transactions
            .iter()
            .filter(|t| {
                iban_country(&t.iban)
                    .map(|c| registry.contains(&c))
                    .unwrap_or(false)
                    || bic_country(&t.bic)
                        .map(|c| registry.contains(&c))
                        .unwrap_or(false)
            })
            .count();
        data.high_risk_country_exposure = round4(exposed as f64 / transactions.len() as f64);

        data
    }
}

fn is_round(amount: Decimal) -> bool {
    let abs = amount.abs();
    if abs.is_zero() {
        return false;
    }
    [1000, 500]
        .iter()
        .any(|d| (abs % Decimal::from(*d)).is_zero())
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(amount: i64, month: u32) -> Transaction {
        Transaction {
            date: Some(Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap()),
            amount: Decimal::from(amount),
            ..Default::default()
        }
    }

    #[test]
    fn empty_input_yields_zeroed_pattern() {
        let data = PatternAnalyzer::new().analyze(&[], &[]);
        assert_eq!(data.avg_transaction_size, Decimal::ZERO);
        assert_eq!(data.round_amount_ratio, 0.0);
    }

    #[test]
    fn computes_monthly_sums_and_average() {
        let txs = vec![tx(1000, 1), tx(2000, 1), tx(500, 2)];
        let data = PatternAnalyzer::new().analyze(&txs, &[]);
        assert_eq!(data.by_month.get("2024-01"), Some(&Decimal::from(3000)));
        assert_eq!(data.avg_transaction_size, Decimal::new(116667, 2));
    }
}
