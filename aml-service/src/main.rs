//! AML analysis HTTP service.

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::info;

use aml_service::config::Config;
use aml_service::handlers::{self, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("aml_service=debug,actix_web=info")
        .init();

    info!("Starting AML analysis service...");

    let config = Config::from_env().expect("failed to load configuration");
    info!("Server will listen on {}:{}", config.server.host, config.server.port);

    let state = web::Data::new(AppState::new());
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .route("/health", web::get().to(handlers::health_check))
            .service(
                web::scope("/api/v1")
                    .route("/upload/transactions", web::post().to(handlers::upload_transactions))
                    .route("/upload/watchlist", web::post().to(handlers::upload_watchlist))
                    .route(
                        "/upload/high-risk-countries",
                        web::post().to(handlers::upload_high_risk_countries),
                    )
                    .route(
                        "/upload/work-instructions",
                        web::post().to(handlers::upload_work_instructions),
                    )
                    .route("/upload/status", web::get().to(handlers::upload_status))
                    .route("/upload/clear", web::delete().to(handlers::clear_upload))
                    .route("/customer/search", web::get().to(handlers::search_customers))
                    .route(
                        "/customer/{bcn}/overview",
                        web::get().to(handlers::customer_overview),
                    )
                    .route(
                        "/analysis/{bcn}/alerts",
                        web::get().to(handlers::customer_alerts),
                    )
                    .route(
                        "/analysis/{bcn}/risk-breakdown",
                        web::get().to(handlers::customer_risk_breakdown),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
