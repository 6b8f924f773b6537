//! HTTP request/response DTOs.

use aml_engine::{Alert, PatternData, RiskAssessment, Transaction, WatchlistMatch};
use serde::Serialize;

/// Returned by every `/upload/*` endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// "ok" on success.
    pub status: String,
    /// Number of rows ingested.
    pub record_count: usize,
    /// Non-fatal issues encountered while parsing (missing columns,
    /// unparseable dates, coerced amounts).
    pub warnings: Vec<String>,
}

/// Returned by `GET /upload/status`.
#[derive(Debug, Serialize, Default)]
pub struct UploadStatus {
    /// Whether a transactions table has been uploaded.
    pub transactions: bool,
    /// Whether a watchlist has been uploaded.
    pub watchlist: bool,
    /// Whether a high-risk country registry has been uploaded.
    pub high_risk_countries: bool,
    /// Whether work instructions have been uploaded.
    pub work_instructions: bool,
}

/// One row of `GET /customer/search`.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    /// Business Contact Number.
    pub bcn: String,
    /// Display name (first transaction's sender for this BCN).
    pub name: String,
    /// Number of transactions on file for this BCN.
    pub transaction_count: usize,
}

/// A transaction projected for display, with the rule names of every alert
/// that references it.
#[derive(Debug, Serialize)]
pub struct FlaggedTransaction {
    /// The underlying transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// Distinct rule names whose alerts cover this transaction's index.
    pub flags: Vec<String>,
}

/// Full per-customer response for `GET /customer/{bcn}/overview`.
#[derive(Debug, Serialize)]
pub struct CustomerOverview {
    /// The requested BCN.
    pub business_contact_number: String,
    /// Display name, taken from the first transaction's sender field.
    pub customer_name: Option<String>,
    /// Weighted risk assessment.
    pub risk_assessment: RiskAssessment,
    /// Transactions with per-row rule flags.
    pub transactions: Vec<FlaggedTransaction>,
    /// Raw alert list, severity-ordered.
    pub alerts: Vec<Alert>,
    /// Aggregate statistics.
    pub patterns: PatternData,
    /// Fuzzy watchlist hits against this customer's senders/receivers.
    pub watchlist_matches: Vec<WatchlistMatch>,
    /// Display-only work instructions for this BCN (or all, if the table
    /// carries no BCN column or no rows match).
    pub work_instructions: Vec<String>,
}

/// Uniform JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    pub details: Option<serde_json::Value>,
}

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the process can respond at all.
    pub status: String,
    /// Crate version.
    pub version: String,
}
