//! Orchestrates the ten rules: fixed order, fault isolation, severity sort.

use std::panic::{self, AssertUnwindSafe};

use crate::rules::{default_rules, AmlRule};
use crate::types::{Alert, AnalysisContext, Transaction};

/// Runs every registered rule against a customer's transactions and returns
/// a single, severity-ordered alert list. A rule that panics is logged and
/// skipped — it never suppresses the rules around it.
pub struct AnalysisEngine {
    rules: Vec<Box<dyn AmlRule>>,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl AnalysisEngine {
    /// Construct an engine with the default ten rules in registration order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an engine with a custom rule set (registration order is
    /// evaluation order).
    pub fn with_rules(rules: Vec<Box<dyn AmlRule>>) -> Self {
        Self { rules }
    }

    /// Evaluate every rule against `transactions`, returning alerts ordered
    /// by severity (HIGH, then MEDIUM, then LOW), ties broken by rule
    /// registration order.
    pub fn analyze(&self, transactions: &[Transaction], context: &AnalysisContext) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for rule in &self.rules {
            let rule_name = rule.rule_name();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(transactions, context)));
            match outcome {
                Ok(mut rule_alerts) => alerts.append(&mut rule_alerts),
                Err(payload) => {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic payload".to_string());
                    tracing::error!(rule = rule_name, reason = %reason, "rule evaluation failed, continuing");
                }
            }
        }

        alerts.sort_by_key(|a| a.severity.rank());
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlertSeverity;
    use rust_decimal::Decimal;

    struct AlwaysPanics;
    impl AmlRule for AlwaysPanics {
        fn rule_name(&self) -> &'static str {
            "AlwaysPanics"
        }
        fn description(&self) -> &'static str {
            "test rule that always panics"
        }
        fn evaluate(&self, _transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
            panic!("boom");
        }
    }

    struct AlwaysLow;
    impl AmlRule for AlwaysLow {
        fn rule_name(&self) -> &'static str {
            "AlwaysLow"
        }
        fn description(&self) -> &'static str {
            "test rule that always alerts low"
        }
        fn evaluate(&self, _transactions: &[Transaction], _context: &AnalysisContext) -> Vec<Alert> {
            vec![Alert::new(
                self.rule_name(),
                AlertSeverity::Low,
                "test",
                vec![0],
                crate::types::AlertType::Threshold,
            )]
        }
    }

    #[test]
    fn a_panicking_rule_does_not_suppress_other_rules() {
        let engine = AnalysisEngine::with_rules(vec![Box::new(AlwaysPanics), Box::new(AlwaysLow)]);
        let txs = vec![Transaction {
            index: 0,
            amount: Decimal::from(100),
            ..Default::default()
        }];
        let alerts = engine.analyze(&txs, &AnalysisContext::default());
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn alerts_are_sorted_by_severity() {
        let engine = AnalysisEngine::new();
        let txs = vec![Transaction {
            index: 0,
            amount: Decimal::from(10000),
            ..Default::default()
        }];
        let alerts = engine.analyze(&txs, &AnalysisContext::default());
        let ranks: Vec<u8> = alerts.iter().map(|a| a.severity.rank()).collect();
        let mut sorted_ranks = ranks.clone();
        sorted_ranks.sort();
        assert_eq!(ranks, sorted_ranks);
    }
}
