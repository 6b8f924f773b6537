//! Weighted risk scoring: first alert per category wins, capped at 100.

use crate::types::{Alert, AlertSeverity, AlertType, RiskAssessment, RiskLevel};

const SCORE_CAP: u32 = 100;

/// Maps an alert to the weight-category key it contributes to.
fn weight_key(alert: &Alert) -> &'static str {
    match (alert.alert_type, alert.severity) {
        (AlertType::Structuring, _) => "structuring",
        (AlertType::HighRiskCountry, AlertSeverity::High) => "high_risk_country_blacklist",
        (AlertType::HighRiskCountry, _) => "high_risk_country_greylist",
        (AlertType::WatchlistMatch, AlertSeverity::High) => "watchlist_high",
        (AlertType::WatchlistMatch, _) => "watchlist_medium",
        (AlertType::Threshold, _) => "threshold",
        (AlertType::RapidMovement, _) => "rapid_movement",
        (AlertType::RoundAmount, _) => "round_amount",
        (AlertType::DormantAccount, _) => "dormant",
        (AlertType::CounterpartyConcentration, _) => "counterparty",
        (AlertType::ProfileDeviation, _) => "profile_deviation",
        (AlertType::FlowThrough, _) => "flow_through",
    }
}

fn weight_for(key: &str) -> u32 {
    match key {
        "structuring" => 30,
        "high_risk_country_blacklist" => 20,
        "high_risk_country_greylist" => 10,
        "watchlist_high" => 25,
        "watchlist_medium" => 10,
        "threshold" => 5,
        "rapid_movement" => 20,
        "round_amount" => 10,
        "dormant" => 15,
        "counterparty" => 20,
        "profile_deviation" => 10,
        "flow_through" => 25,
        _ => 0,
    }
}

/// Produces a capped, weighted risk score from an alert list.
#[derive(Debug, Default)]
pub struct RiskScorer;

impl RiskScorer {
    /// Construct a new scorer.
    pub fn new() -> Self {
        Self
    }

    /// Score `alerts`, in the order the engine produced them. Each weight
    /// category contributes at most once, counted on its first occurrence.
    pub fn score(&self, alerts: &[Alert]) -> RiskAssessment {
        let mut triggered: std::collections::HashSet<&'static str> = std::collections::HashSet::new();
        let mut total: u32 = 0;
        let mut contributing_factors = Vec::new();

        for alert in alerts {
            let key = weight_key(alert);
            if !triggered.insert(key) {
                continue;
            }
            let weight = weight_for(key);
            total += weight;
            contributing_factors.push(format!(
                "{} ({:?}): +{} points",
                alert.rule_name, alert.severity, weight
            ));
        }

        let capped = total.min(SCORE_CAP) as u8;
        RiskAssessment {
            overall_score: capped,
            risk_level: RiskLevel::from(capped),
            contributing_factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Alert;

    fn alert(alert_type: AlertType, severity: AlertSeverity) -> Alert {
        Alert::new("Rule", severity, "test", vec![0], alert_type)
    }

    #[test]
    fn score_caps_at_100() {
        let alerts = vec![
            alert(AlertType::Structuring, AlertSeverity::High),
            alert(AlertType::FlowThrough, AlertSeverity::High),
            alert(AlertType::WatchlistMatch, AlertSeverity::High),
            alert(AlertType::RapidMovement, AlertSeverity::High),
            alert(AlertType::CounterpartyConcentration, AlertSeverity::High),
            alert(AlertType::DormantAccount, AlertSeverity::Medium),
        ];
        let assessment = RiskScorer::new().score(&alerts);
        assert_eq!(assessment.overall_score, 100);
        assert_eq!(assessment.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn duplicate_category_contributes_once() {
        let alerts = vec![
            alert(AlertType::Threshold, AlertSeverity::Medium),
            alert(AlertType::Threshold, AlertSeverity::Medium),
        ];
        let assessment = RiskScorer::new().score(&alerts);
        assert_eq!(assessment.overall_score, 5);
        assert_eq!(assessment.contributing_factors.len(), 1);
    }

    #[test]
    fn no_alerts_is_low_risk() {
        let assessment = RiskScorer::new().score(&[]);
        assert_eq!(assessment.overall_score, 0);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
    }
}
