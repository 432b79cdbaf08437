//! Loan management REST backend: token-authenticated users own loan records
//! and operate on them through a uniform validate, authorize, persist
//! pipeline. The store and the signing secret are constructed once and
//! passed in as state; nothing reads ambient globals.

pub mod auth;
pub mod calc;
pub mod config;
pub mod db;
pub mod errors;
pub mod loan_handlers;
pub mod models;
pub mod user_handlers;
pub mod validate;

use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::{ApiError, FieldError};

/// Shared per-process state, handed to actix as app data.
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
}

/// Register the API routes. The binary and the integration tests both go
/// through here so they exercise the same app.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|_err, _req| {
        ApiError::Validation(vec![FieldError::new("body", "Invalid JSON payload")]).into()
    });

    cfg.app_data(json_config)
        .service(
            web::scope("/api/users")
                .service(user_handlers::register)
                .service(user_handlers::login),
        )
        .service(
            web::scope("/api/loans")
                .wrap(HttpAuthentication::with_fn(auth::validator))
                .service(loan_handlers::calculate)
                .service(loan_handlers::create_loan)
                .service(loan_handlers::get_loans)
                .service(loan_handlers::get_loan)
                .service(loan_handlers::update_loan)
                .service(loan_handlers::update_loan_status)
                .service(loan_handlers::delete_loan),
        );
}
