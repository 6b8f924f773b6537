//! The rule trait and the ten detection rules.

mod counterparty_concentration;
mod direction;
mod dormant;
mod flow_through;
mod high_risk_country;
mod profile_deviation;
mod rapid_movement;
mod round_amount;
mod structuring;
mod threshold;
mod watchlist;

pub use counterparty_concentration::CounterpartyConcentrationRule;
pub use dormant::DormantAccountRule;
pub use flow_through::FlowThroughRule;
pub use high_risk_country::HighRiskCountryRule;
pub(crate) use high_risk_country::{bic_country, iban_country};
pub use profile_deviation::ProfileDeviationRule;
pub use rapid_movement::RapidMovementRule;
pub use round_amount::RoundAmountRule;
pub use structuring::StructuringRule;
pub use threshold::ThresholdRule;
pub use watchlist::WatchlistRule;

use crate::types::{Alert, AnalysisContext, Transaction};

/// A single AML detection heuristic.
///
/// Implementations MUST tolerate empty input, missing optional fields, and
/// unparseable dates by returning an empty alert list rather than panicking
/// where avoidable — but the engine also catches panics, so a rule that can't
/// reasonably guard against a corner case is still fault-isolated from its
/// neighbours.
pub trait AmlRule: Send + Sync {
    /// Stable identifier used in `Alert::rule_name` and scorer lookups.
    fn rule_name(&self) -> &'static str;

    /// One-line human description of what this rule detects.
    fn description(&self) -> &'static str;

    /// Evaluate this rule against a customer's transactions.
    fn evaluate(&self, transactions: &[Transaction], context: &AnalysisContext) -> Vec<Alert>;
}

/// Build the ten rules in the exact order the engine must run them.
pub fn default_rules() -> Vec<Box<dyn AmlRule>> {
    vec![
        Box::new(StructuringRule::default()),
        Box::new(ThresholdRule::default()),
        Box::new(HighRiskCountryRule::default()),
        Box::new(WatchlistRule::default()),
        Box::new(RapidMovementRule::default()),
        Box::new(RoundAmountRule::default()),
        Box::new(DormantAccountRule::default()),
        Box::new(CounterpartyConcentrationRule::default()),
        Box::new(ProfileDeviationRule::default()),
        Box::new(FlowThroughRule::default()),
    ]
}
