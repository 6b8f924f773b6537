//! Core types shared by every rule, the engine, the scorer, and the analyzers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single transaction row belonging to one customer (BCN).
///
/// `index` is the position of this row within the per-customer view the
/// engine was invoked with — alerts reference these positions, not any
/// global row number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Position within the per-customer view passed to the engine.
    pub index: usize,
    /// Transaction date. `None` when the source value failed to parse.
    pub date: Option<DateTime<Utc>>,
    /// Transaction amount. Defaults to zero when the source value failed to parse.
    pub amount: Decimal,
    /// Sending party name.
    pub sender: String,
    /// Receiving party name.
    pub receiver: String,
    /// Sender or counterparty IBAN, if present.
    pub iban: String,
    /// Sender or counterparty BIC, if present.
    pub bic: String,
    /// ISO-ish currency code; defaults to "EUR" when absent.
    pub currency: String,
    /// Free-text description.
    pub description: String,
    /// Classification hint (credit/debit/transfer_out/...), if present.
    pub transaction_type: String,
    /// Business Contact Number this transaction belongs to.
    pub business_contact_number: String,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            index: 0,
            date: None,
            amount: Decimal::ZERO,
            sender: String::new(),
            receiver: String::new(),
            iban: String::new(),
            bic: String::new(),
            currency: "EUR".to_string(),
            description: String::new(),
            transaction_type: String::new(),
            business_contact_number: String::new(),
        }
    }
}

/// A high-risk country registry row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighRiskCountry {
    /// Two-letter, upper-cased country code.
    pub country_code: String,
    /// Human-readable country name.
    pub country_name: String,
    /// Risk classification, e.g. "Blacklist" or "Greylist".
    pub risk_level: String,
}

impl HighRiskCountry {
    /// True when `risk_level` case-insensitively contains "blacklist".
    pub fn is_blacklist(&self) -> bool {
        self.risk_level.to_lowercase().contains("blacklist")
    }
}

/// A single watchlist name entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    /// The watchlisted name.
    pub name: String,
    /// Optional entity type (person/organization/vessel/...).
    pub entry_type: Option<String>,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

/// Reference data visible to every rule during an `evaluate` call.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    /// Watchlist names to fuzzy-match against.
    pub watchlist: Vec<WatchlistEntry>,
    /// High-risk country registry.
    pub high_risk_countries: Vec<HighRiskCountry>,
}

/// Alert severity. Ordered HIGH < MEDIUM < LOW for sorting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    /// Highest priority.
    High,
    /// Medium priority.
    Medium,
    /// Lowest priority.
    Low,
}

impl AlertSeverity {
    /// Sort rank: HIGH=0, MEDIUM=1, LOW=2. Mirrors the engine's severity
    /// ordering table; any value outside this closed enum would fall back to
    /// 99, but `AlertSeverity` has no such variant.
    pub fn rank(self) -> u8 {
        match self {
            AlertSeverity::High => 0,
            AlertSeverity::Medium => 1,
            AlertSeverity::Low => 2,
        }
    }
}

/// The rule family that produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Structuring / smurfing.
    Structuring,
    /// Single large transaction.
    Threshold,
    /// IBAN/BIC country in the high-risk registry.
    HighRiskCountry,
    /// Fuzzy match against the watchlist.
    WatchlistMatch,
    /// Near-equal in/out pair within a short window.
    RapidMovement,
    /// Round-number amount pattern.
    RoundAmount,
    /// Reactivation after a long dormancy.
    DormantAccount,
    /// Fan-in / fan-out counterparty concentration.
    CounterpartyConcentration,
    /// Deviation from the customer's own baseline.
    ProfileDeviation,
    /// Flow-through / layering.
    FlowThrough,
}

/// One finding produced by a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Opaque unique identifier.
    pub id: Uuid,
    /// Name of the rule that produced this alert.
    pub rule_name: String,
    /// Severity, used for both display and risk weighting.
    pub severity: AlertSeverity,
    /// Human-readable explanation.
    pub description: String,
    /// Positions (within the per-customer view) this alert concerns.
    pub affected_transaction_indices: Vec<usize>,
    /// Machine-readable classification, used by the risk scorer.
    pub alert_type: AlertType,
}

impl Alert {
    /// Construct a new alert with a fresh id.
    pub fn new(
        rule_name: impl Into<String>,
        severity: AlertSeverity,
        description: impl Into<String>,
        affected_transaction_indices: Vec<usize>,
        alert_type: AlertType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            rule_name: rule_name.into(),
            severity,
            description: description.into(),
            affected_transaction_indices,
            alert_type,
        }
    }
}

/// Qualitative risk level derived from a capped numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// 0..=25
    Low,
    /// 26..=50
    Medium,
    /// 51..=75
    High,
    /// 76..=100
    Critical,
}

impl From<u8> for RiskLevel {
    fn from(score: u8) -> Self {
        match score {
            0..=25 => RiskLevel::Low,
            26..=50 => RiskLevel::Medium,
            51..=75 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

/// Final weighted risk assessment for a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Capped 0-100 score.
    pub overall_score: u8,
    /// Qualitative bucket derived from `overall_score`.
    pub risk_level: RiskLevel,
    /// One line per weight category that contributed, in triggering order.
    pub contributing_factors: Vec<String>,
}

/// Aggregate statistics over a customer's transaction history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternData {
    /// Amount summed by "YYYY-MM".
    pub by_month: std::collections::BTreeMap<String, Decimal>,
    /// Amount summed by transaction type.
    pub by_type: std::collections::BTreeMap<String, Decimal>,
    /// Amount summed by currency code.
    pub by_currency: std::collections::BTreeMap<String, Decimal>,
    /// Share of transactions with a round amount, in `[0,1]`.
    pub round_amount_ratio: f64,
    /// Arithmetic mean transaction size.
    pub avg_transaction_size: Decimal,
    /// Share of transactions touching a high-risk country, in `[0,1]`.
    pub high_risk_country_exposure: f64,
}

/// One fuzzy match between an observed name and a watchlist entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistMatch {
    /// The observed (transaction-derived) entity name.
    pub matched_entity: String,
    /// The watchlist entry name it matched.
    pub watchlist_entry: String,
    /// Similarity score, 0-100.
    pub match_score: u8,
    /// Which field the entity came from.
    pub match_field: String,
    /// Transaction indices where this entity appears.
    pub transaction_indices: Vec<usize>,
}
