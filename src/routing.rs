//! Application router configuration.

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::{
    AppState, endpoints, expense::create_expense_endpoint, income::create_income_endpoint,
    invoices::get_invoices_endpoint,
};

/// The most bytes a request body may contain. Axum's 2 MiB default is too
/// small for scanned PDF documents.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_welcome))
        .route(endpoints::INCOME, post(create_income_endpoint))
        .route(endpoints::EXPENSES, post(create_expense_endpoint))
        .route(endpoints::INVOICES, get(get_invoices_endpoint))
        .fallback(get_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The body of the welcome response.
#[derive(Debug, Serialize)]
struct WelcomeBody {
    message: &'static str,
}

/// The liveness/welcome response for the root route.
async fn get_welcome() -> Response {
    Json(WelcomeBody {
        message: "Welcome to the Invoice API",
    })
    .into_response()
}

/// The JSON 404 response for unknown routes.
async fn get_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(crate::ErrorBody::new("Not Found")),
    )
        .into_response()
}

// Keep the fallback in sync with how Error::NotFound renders.
#[cfg(test)]
mod not_found_consistency_tests {
    use axum::response::IntoResponse;

    use crate::{Error, routing::get_not_found};

    #[tokio::test]
    async fn fallback_matches_not_found_error_response() {
        let fallback = get_not_found().await;
        let error = Error::NotFound.into_response();

        assert_eq!(fallback.status(), error.status());

        let fallback_body = axum::body::to_bytes(fallback.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_body = axum::body::to_bytes(error.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(fallback_body, error_body);
    }
}
