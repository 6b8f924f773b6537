//! End-to-end tests driving the HTTP surface directly against an in-process
//! service, mirroring the shipped sample-data scenarios.

use actix_web::{test, web, App};
use aml_engine::{HighRiskCountry, Transaction, WatchlistEntry};
use aml_service::handlers;
use handlers::AppState;

fn tx(
    index: usize,
    day: u32,
    amount: i64,
    sender: &str,
    receiver: &str,
    bcn: &str,
) -> Transaction {
    use chrono::TimeZone;
    Transaction {
        index,
        date: Some(chrono::Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
        amount: rust_decimal::Decimal::from(amount),
        sender: sender.to_string(),
        receiver: receiver.to_string(),
        iban: String::new(),
        bic: String::new(),
        currency: "EUR".to_string(),
        description: String::new(),
        transaction_type: String::new(),
        business_contact_number: bcn.to_string(),
    }
}

#[actix_web::test]
async fn clean_customer_has_zero_alerts_and_low_risk() {
    let state = web::Data::new(AppState::new());
    state.store.set_transactions(vec![tx(0, 1, 100, "Clean Customer BV", "Someone Else", "BCN-005")]);

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/customer/{bcn}/overview", web::get().to(handlers::customer_overview)),
    )
    .await;

    let req = test::TestRequest::get().uri("/customer/BCN-005/overview").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["alerts"].as_array().unwrap().len(), 0);
    assert_eq!(body["risk_assessment"]["risk_level"], "LOW");
}

#[actix_web::test]
async fn unknown_bcn_returns_404() {
    let state = web::Data::new(AppState::new());
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/customer/{bcn}/overview", web::get().to(handlers::customer_overview)),
    )
    .await;

    let req = test::TestRequest::get().uri("/customer/NOPE/overview").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn threshold_transaction_is_flagged_and_scored() {
    let state = web::Data::new(AppState::new());
    state
        .store
        .set_transactions(vec![tx(0, 1, 25000, "Jan de Vries", "Someone", "BCN-001")]);

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/analysis/{bcn}/alerts", web::get().to(handlers::customer_alerts))
            .route(
                "/analysis/{bcn}/risk-breakdown",
                web::get().to(handlers::customer_risk_breakdown),
            ),
    )
    .await;

    let req = test::TestRequest::get().uri("/analysis/BCN-001/alerts").to_request();
    let alerts: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert!(alerts.iter().any(|a| a["rule_name"] == "Threshold"));

    let req = test::TestRequest::get().uri("/analysis/BCN-001/risk-breakdown").to_request();
    let assessment: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(assessment["overall_score"].as_u64().unwrap() > 0);
}

#[actix_web::test]
async fn watchlist_upload_drives_high_severity_match() {
    let state = web::Data::new(AppState::new());
    state.store.set_transactions(vec![tx(
        0,
        1,
        500,
        "Volkov Enterprises LLC",
        "Someone",
        "BCN-003",
    )]);
    state.store.set_watchlist(vec![WatchlistEntry {
        name: "Volkov Enterprises".to_string(),
        entry_type: None,
        notes: None,
    }]);

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/analysis/{bcn}/alerts", web::get().to(handlers::customer_alerts)),
    )
    .await;

    let req = test::TestRequest::get().uri("/analysis/BCN-003/alerts").to_request();
    let alerts: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert!(alerts.iter().any(|a| a["rule_name"] == "Watchlist" && a["severity"] == "HIGH"));
}

#[actix_web::test]
async fn high_risk_country_iban_is_flagged() {
    let state = web::Data::new(AppState::new());
    let mut txs = vec![tx(0, 1, 1000, "Maria Petrova", "Someone", "BCN-002")];
    txs[0].iban = "IR330190000000000000000000".to_string();
    state.store.set_transactions(txs);
    state.store.set_high_risk_countries(vec![HighRiskCountry {
        country_code: "IR".to_string(),
        country_name: "Iran".to_string(),
        risk_level: "Blacklist".to_string(),
    }]);

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/analysis/{bcn}/alerts", web::get().to(handlers::customer_alerts)),
    )
    .await;

    let req = test::TestRequest::get().uri("/analysis/BCN-002/alerts").to_request();
    let alerts: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert!(alerts
        .iter()
        .any(|a| a["rule_name"] == "HighRiskCountry" && a["severity"] == "HIGH"));
}
