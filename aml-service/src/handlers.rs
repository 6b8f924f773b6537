//! Route handlers: ingestion, search, and per-customer analysis.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use aml_engine::{AnalysisContext, AnalysisEngine, PatternAnalyzer, RiskScorer, WatchlistMatcher};
use serde::Deserialize;

use crate::errors::{ServiceError, ServiceResult};
use crate::ingestion;
use crate::models::{
    CustomerOverview, FlaggedTransaction, HealthResponse, SearchResult, UploadResponse, UploadStatus,
};
use crate::store::ReferenceStore;

/// Shared, cheaply-cloneable application state.
pub struct AppState {
    /// In-memory reference tables.
    pub store: Arc<ReferenceStore>,
    /// Rule engine. Stateless — safe to share across concurrent requests.
    pub engine: AnalysisEngine,
    /// Risk scorer.
    pub scorer: RiskScorer,
    /// Pattern analyzer.
    pub pattern_analyzer: PatternAnalyzer,
    /// Standalone watchlist matcher.
    pub watchlist_matcher: WatchlistMatcher,
}

impl AppState {
    /// Construct fresh state with an empty reference store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(ReferenceStore::new()),
            engine: AnalysisEngine::new(),
            scorer: RiskScorer::new(),
            pattern_analyzer: PatternAnalyzer::new(),
            watchlist_matcher: WatchlistMatcher::new(),
        }
    }
}

/// `GET /health`
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    filename: String,
}

fn validate_extension(filename: &str) -> ServiceResult<()> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "unsupported file type for '{filename}': only .xlsx and .xls are accepted"
        )))
    }
}

/// `POST /upload/transactions`
pub async fn upload_transactions(
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ServiceResult<HttpResponse> {
    validate_extension(&query.filename)?;
    let parsed = ingestion::parse_transactions(&body)?;
    let count = parsed.rows.len();
    state.store.set_transactions(parsed.rows);
    Ok(HttpResponse::Ok().json(UploadResponse {
        status: "ok".to_string(),
        record_count: count,
        warnings: parsed.warnings,
    }))
}

/// `POST /upload/watchlist`
pub async fn upload_watchlist(
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ServiceResult<HttpResponse> {
    validate_extension(&query.filename)?;
    let parsed = ingestion::parse_watchlist(&body)?;
    let count = parsed.rows.len();
    state.store.set_watchlist(parsed.rows);
    Ok(HttpResponse::Ok().json(UploadResponse {
        status: "ok".to_string(),
        record_count: count,
        warnings: parsed.warnings,
    }))
}

/// `POST /upload/high-risk-countries`
pub async fn upload_high_risk_countries(
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ServiceResult<HttpResponse> {
    validate_extension(&query.filename)?;
    let parsed = ingestion::parse_high_risk_countries(&body)?;
    let count = parsed.rows.len();
    state.store.set_high_risk_countries(parsed.rows);
    Ok(HttpResponse::Ok().json(UploadResponse {
        status: "ok".to_string(),
        record_count: count,
        warnings: parsed.warnings,
    }))
}

/// `POST /upload/work-instructions`
pub async fn upload_work_instructions(
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ServiceResult<HttpResponse> {
    validate_extension(&query.filename)?;
    let parsed = ingestion::parse_work_instructions(&body)?;
    let count = parsed.rows.len();
    state.store.set_work_instructions(parsed.rows);
    Ok(HttpResponse::Ok().json(UploadResponse {
        status: "ok".to_string(),
        record_count: count,
        warnings: parsed.warnings,
    }))
}

/// `DELETE /upload/clear`
pub async fn clear_upload(state: web::Data<AppState>) -> HttpResponse {
    state.store.clear();
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// `GET /upload/status`
pub async fn upload_status(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.store.snapshot();
    HttpResponse::Ok().json(UploadStatus {
        transactions: !snapshot.transactions.is_empty(),
        watchlist: !snapshot.watchlist.is_empty(),
        high_risk_countries: !snapshot.high_risk_countries.is_empty(),
        work_instructions: !snapshot.work_instructions.is_empty(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// `GET /customer/search?q=...`
pub async fn search_customers(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    let snapshot = state.store.snapshot();
    let term = query.q.trim().to_lowercase();
    if term.is_empty() {
        return HttpResponse::Ok().json(Vec::<SearchResult>::new());
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum MatchTier {
        Prefix,
        BcnSubstring,
        SenderSubstring,
    }

    #[derive(Clone)]
    struct Group {
        bcn: String,
        name: String,
        count: usize,
        tier: MatchTier,
    }

    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for t in &snapshot.transactions {
        let bcn_lower = t.business_contact_number.to_lowercase();
        let sender_lower = t.sender.to_lowercase();
        let tier = if bcn_lower.starts_with(&term) {
            Some(MatchTier::Prefix)
        } else if bcn_lower.contains(&term) {
            Some(MatchTier::BcnSubstring)
        } else if sender_lower.contains(&term) {
            Some(MatchTier::SenderSubstring)
        } else {
            None
        };
        let Some(tier) = tier else {
            continue;
        };
        let entry = groups.entry(t.business_contact_number.clone()).or_insert_with(|| Group {
            bcn: t.business_contact_number.clone(),
            name: t.sender.clone(),
            count: 0,
            tier,
        });
        entry.count += 1;
        entry.tier = entry.tier.min(tier);
    }

    let mut results: Vec<Group> = groups.into_values().collect();
    results.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.bcn.cmp(&b.bcn)));

    let payload: Vec<SearchResult> = results
        .into_iter()
        .map(|g| SearchResult {
            bcn: g.bcn,
            name: g.name,
            transaction_count: g.count,
        })
        .collect();

    HttpResponse::Ok().json(payload)
}

fn customer_transactions(
    snapshot: &crate::store::ReferenceTables,
    bcn: &str,
) -> Vec<aml_engine::Transaction> {
    snapshot
        .transactions
        .iter()
        .filter(|t| t.business_contact_number == bcn)
        .enumerate()
        .map(|(index, t)| aml_engine::Transaction {
            index,
            ..t.clone()
        })
        .collect()
}

/// `GET /customer/{bcn}/overview`
pub async fn customer_overview(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let bcn = path.into_inner();
    let snapshot = state.store.snapshot();
    let transactions = customer_transactions(&snapshot, &bcn);
    if transactions.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "no transactions found for business contact number '{bcn}'"
        )));
    }

    let context = AnalysisContext {
        watchlist: snapshot.watchlist.clone(),
        high_risk_countries: snapshot.high_risk_countries.clone(),
    };

    let alerts = state.engine.analyze(&transactions, &context);
    let risk_assessment = state.scorer.score(&alerts);
    let patterns = state
        .pattern_analyzer
        .analyze(&transactions, &snapshot.high_risk_countries);

    let mut entity_indices: HashMap<String, Vec<usize>> = HashMap::new();
    let mut entities: Vec<(String, String)> = Vec::new();
    for t in &transactions {
        if !t.sender.trim().is_empty() {
            entities.push((t.sender.clone(), "sender".to_string()));
            entity_indices
                .entry(t.sender.trim().to_lowercase())
                .or_default()
                .push(t.index);
        }
        if !t.receiver.trim().is_empty() {
            entities.push((t.receiver.clone(), "receiver".to_string()));
            entity_indices
                .entry(t.receiver.trim().to_lowercase())
                .or_default()
                .push(t.index);
        }
    }
    let watchlist_matches =
        state
            .watchlist_matcher
            .match_entities(&entities, &snapshot.watchlist, &entity_indices);

    let mut index_flags: HashMap<usize, Vec<String>> = HashMap::new();
    for alert in &alerts {
        for &idx in &alert.affected_transaction_indices {
            let flags = index_flags.entry(idx).or_default();
            if !flags.contains(&alert.rule_name) {
                flags.push(alert.rule_name.clone());
            }
        }
    }

    let flagged_transactions: Vec<FlaggedTransaction> = transactions
        .iter()
        .map(|t| FlaggedTransaction {
            transaction: t.clone(),
            flags: index_flags.get(&t.index).cloned().unwrap_or_default(),
        })
        .collect();

    let customer_name = transactions.first().map(|t| t.sender.clone());

    let matching_instructions: Vec<String> = snapshot
        .work_instructions
        .iter()
        .filter(|wi| wi.business_contact_number.as_deref() == Some(bcn.as_str()))
        .map(|wi| wi.instruction.clone())
        .collect();
    let work_instructions = if matching_instructions.is_empty() {
        snapshot
            .work_instructions
            .iter()
            .map(|wi| wi.instruction.clone())
            .collect()
    } else {
        matching_instructions
    };

    Ok(HttpResponse::Ok().json(CustomerOverview {
        business_contact_number: bcn,
        customer_name,
        risk_assessment,
        transactions: flagged_transactions,
        alerts,
        patterns,
        watchlist_matches,
        work_instructions,
    }))
}

/// `GET /analysis/{bcn}/alerts`
pub async fn customer_alerts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let bcn = path.into_inner();
    let snapshot = state.store.snapshot();
    let transactions = customer_transactions(&snapshot, &bcn);
    if transactions.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "no transactions found for business contact number '{bcn}'"
        )));
    }
    let context = AnalysisContext {
        watchlist: snapshot.watchlist.clone(),
        high_risk_countries: snapshot.high_risk_countries.clone(),
    };
    let alerts = state.engine.analyze(&transactions, &context);
    Ok(HttpResponse::Ok().json(alerts))
}

/// `GET /analysis/{bcn}/risk-breakdown`
pub async fn customer_risk_breakdown(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let bcn = path.into_inner();
    let snapshot = state.store.snapshot();
    let transactions = customer_transactions(&snapshot, &bcn);
    if transactions.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "no transactions found for business contact number '{bcn}'"
        )));
    }
    let context = AnalysisContext {
        watchlist: snapshot.watchlist.clone(),
        high_risk_countries: snapshot.high_risk_countries.clone(),
    };
    let alerts = state.engine.analyze(&transactions, &context);
    let assessment = state.scorer.score(&alerts);
    Ok(HttpResponse::Ok().json(assessment))
}
