//! High-risk country exposure detection, via IBAN and BIC country codes.

use std::collections::HashMap;

use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

/// Extracts the IBAN country code (first two characters, if alphabetic).
pub(crate) fn iban_country(iban: &str) -> Option<String> {
    let prefix: String = iban.chars().take(2).collect();
    if prefix.len() == 2 && prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(prefix.to_uppercase())
    } else {
        None
    }
}

/// Extracts the BIC country code (characters at positions 4-5, if alphabetic).
pub(crate) fn bic_country(bic: &str) -> Option<String> {
    let chars: Vec<char> = bic.chars().collect();
    if chars.len() >= 6 && chars[4].is_ascii_alphabetic() && chars[5].is_ascii_alphabetic() {
        Some(format!("{}{}", chars[4], chars[5]).to_uppercase())
    } else {
        None
    }
}

/// Flags transactions whose IBAN or BIC country appears in the high-risk registry.
pub struct HighRiskCountryRule;

impl Default for HighRiskCountryRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for HighRiskCountryRule {
    fn rule_name(&self) -> &'static str {
        "HighRiskCountry"
    }

    fn description(&self) -> &'static str {
        "Detects transactions touching a blacklisted or greylisted country"
    }

    fn evaluate(&self, transactions: &[Transaction], context: &AnalysisContext) -> Vec<Alert> {
        if context.high_risk_countries.is_empty() {
            return Vec::new();
        }

        let registry: HashMap<String, &crate::types::HighRiskCountry> = context
            .high_risk_countries
            .iter()
            .map(|c| (c.country_code.to_uppercase(), c))
            .collect();

        let mut alerts = Vec::new();
        for t in transactions {
            if let Some(code) = iban_country(&t.iban) {
                if let Some(entry) = registry.get(&code) {
                    alerts.push(make_alert(self.rule_name(), t, "IBAN", &code, entry));
                }
            }
            if let Some(code) = bic_country(&t.bic) {
                if let Some(entry) = registry.get(&code) {
                    alerts.push(make_alert(self.rule_name(), t, "BIC", &code, entry));
                }
            }
        }
        alerts
    }
}

fn make_alert(
    rule_name: &str,
    t: &Transaction,
    field: &str,
    code: &str,
    entry: &crate::types::HighRiskCountry,
) -> Alert {
    let severity = if entry.is_blacklist() {
        AlertSeverity::High
    } else {
        AlertSeverity::Medium
    };
    Alert::new(
        rule_name,
        severity,
        format!(
            "{} country {} ({}) is {} for transaction of {}",
            field, code, entry.country_name, entry.risk_level, t.amount
        ),
        vec![t.index],
        AlertType::HighRiskCountry,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HighRiskCountry;
    use rust_decimal::Decimal;

    fn ctx() -> AnalysisContext {
        AnalysisContext {
            watchlist: vec![],
            high_risk_countries: vec![
                HighRiskCountry {
                    country_code: "IR".into(),
                    country_name: "Iran".into(),
                    risk_level: "Blacklist".into(),
                },
                HighRiskCountry {
                    country_code: "BY".into(),
                    country_name: "Belarus".into(),
                    risk_level: "Greylist".into(),
                },
            ],
        }
    }

    #[test]
    fn flags_blacklisted_iban_as_high() {
        let txs = vec![Transaction {
            index: 0,
            iban: "IR123456789".into(),
            amount: Decimal::from(100),
            ..Default::default()
        }];
        let alerts = HighRiskCountryRule::default().evaluate(&txs, &ctx());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
    }

    #[test]
    fn flags_greylisted_bic_as_medium() {
        let txs = vec![Transaction {
            index: 0,
            bic: "AAAABYBB".into(),
            amount: Decimal::from(100),
            ..Default::default()
        }];
        let alerts = HighRiskCountryRule::default().evaluate(&txs, &ctx());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Medium);
    }

    #[test]
    fn both_iban_and_bic_hits_produce_two_alerts() {
        let txs = vec![Transaction {
            index: 0,
            iban: "IR123456789".into(),
            bic: "AAAABYBB".into(),
            amount: Decimal::from(100),
            ..Default::default()
        }];
        let alerts = HighRiskCountryRule::default().evaluate(&txs, &ctx());
        assert_eq!(alerts.len(), 2);
    }
}
