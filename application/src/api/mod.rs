//! REST API definitions.

pub mod application;
pub mod contract;
pub mod quote;

use axum::{
    routing::{get, post},
    Router,
};

use crate::Error;

pub use self::{
    application::Application, contract::Contract, quote::Quote,
};

/// Assembles the [`Router`] serving the REST API.
///
/// The [`Service`] is expected to be provided as an [`Extension`] layer.
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/contracts", post(contract::create))
        .route("/contracts/:id", get(contract::by_id))
        .route("/contracts/:id/application", get(contract::application))
        .route("/contracts/:id/analysis", post(contract::analyze))
        .route("/contracts/:id/document", post(contract::generate))
        .route("/contracts/:id/submission", post(contract::submit))
        .route(
            "/contracts/:id/scholar-approval",
            post(contract::scholar_approve),
        )
        .route(
            "/contracts/:id/financial-approval",
            post(contract::financial_approve),
        )
        .route("/contracts/:id/acceptance", post(contract::accept))
        .route("/contracts/:id/negotiation", post(contract::negotiate))
        .route("/quotes", post(quote::request))
        .route("/quotes/:id", get(quote::by_id))
        .route("/quotes/:id/dispatch", post(quote::send))
        .route("/quotes/:id/view", post(quote::view))
        .route("/quotes/:id/response", post(quote::respond))
        .route("/quotes/:id/acceptance", post(quote::accept))
        .route("/quotes/:id/rejection", post(quote::reject))
        .route("/quotes/:id/messages", post(quote::add_message))
}

/// Creates a validation [`Error`] for the provided request `field`.
pub(crate) fn invalid_field(field: &str) -> Error {
    Error {
        code: "VALIDATION_ERROR",
        status_code: http::StatusCode::BAD_REQUEST,
        message: format!("`{field}` is invalid"),
        backtrace: None,
    }
}
