//! Watchlist fuzzy-name matching, scoped to a single customer's transactions.

use std::collections::HashMap;

use crate::fuzzy::token_sort_ratio;
use crate::rules::AmlRule;
use crate::types::{Alert, AlertSeverity, AlertType, AnalysisContext, Transaction};

const HIGH_THRESHOLD: u8 = 85;
const MEDIUM_THRESHOLD: u8 = 70;

/// Flags sender/receiver names that fuzzy-match a watchlist entry.
pub struct WatchlistRule;

impl Default for WatchlistRule {
    fn default() -> Self {
        Self
    }
}

impl AmlRule for WatchlistRule {
    fn rule_name(&self) -> &'static str {
        "Watchlist"
    }

    fn description(&self) -> &'static str {
        "Detects sender or receiver names fuzzy-matching the watchlist"
    }

    fn evaluate(&self, transactions: &[Transaction], context: &AnalysisContext) -> Vec<Alert> {
        if context.watchlist.is_empty() {
            return Vec::new();
        }

        // (entity_lower, watchlist_lower) -> alert position in `alerts`.
        let mut staged: HashMap<(String, String), usize> = HashMap::new();
        let mut alerts: Vec<Alert> = Vec::new();

        let mut check = |name: &str, field: &str, index: usize, alerts: &mut Vec<Alert>| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return;
            }
            let entity_lower = trimmed.to_lowercase();
            for entry in &context.watchlist {
                let score = token_sort_ratio(trimmed, &entry.name);
                if score < MEDIUM_THRESHOLD {
                    continue;
                }
                let wl_lower = entry.name.to_lowercase();
                let key = (entity_lower.clone(), wl_lower.clone());
                if let Some(&pos) = staged.get(&key) {
                    if !alerts[pos].affected_transaction_indices.contains(&index) {
                        alerts[pos].affected_transaction_indices.push(index);
                    }
                    continue;
                }
                let severity = if score >= HIGH_THRESHOLD {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                };
                let alert = Alert::new(
                    self.rule_name(),
                    severity,
                    format!(
                        "{} '{}' matches watchlist entry '{}' (score {})",
                        field, trimmed, entry.name, score
                    ),
                    vec![index],
                    AlertType::WatchlistMatch,
                );
                staged.insert(key, alerts.len());
                alerts.push(alert);
            }
        };

        for t in transactions {
            check(&t.sender, "Sender", t.index, &mut alerts);
            check(&t.receiver, "Receiver", t.index, &mut alerts);
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WatchlistEntry;

    fn ctx() -> AnalysisContext {
        AnalysisContext {
            watchlist: vec![WatchlistEntry {
                name: "Volkov Enterprises".into(),
                entry_type: None,
                notes: None,
            }],
            high_risk_countries: vec![],
        }
    }

    #[test]
    fn high_confidence_match_is_high_severity() {
        let txs = vec![Transaction {
            index: 0,
            sender: "Volkov Enterprises LLC".into(),
            ..Default::default()
        }];
        let alerts = WatchlistRule::default().evaluate(&txs, &ctx());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
    }

    #[test]
    fn repeat_match_extends_existing_alert_rather_than_duplicating() {
        let txs = vec![
            Transaction {
                index: 0,
                sender: "Volkov Enterprises LLC".into(),
                ..Default::default()
            },
            Transaction {
                index: 1,
                sender: "Volkov Enterprises LLC".into(),
                ..Default::default()
            },
        ];
        let alerts = WatchlistRule::default().evaluate(&txs, &ctx());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].affected_transaction_indices, vec![0, 1]);
    }

    #[test]
    fn unrelated_name_is_not_flagged() {
        let txs = vec![Transaction {
            index: 0,
            sender: "Clean Customer BV".into(),
            ..Default::default()
        }];
        let alerts = WatchlistRule::default().evaluate(&txs, &ctx());
        assert!(alerts.is_empty());
    }
}
