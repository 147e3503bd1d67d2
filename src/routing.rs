//! Application router configuration and the CORS policy for the browser client.

use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, Error,
    auth::{create_session_endpoint, delete_session_endpoint},
    endpoints,
    error::ErrorBody,
    record::{
        create_record_endpoint, delete_record_endpoint, edit_record_endpoint,
        list_records_endpoint,
    },
    summary::{daily_summary_endpoint, monthly_summary_endpoint, running_totals_endpoint},
};

/// The text returned by the health check route.
pub const HEALTH_CHECK_TEXT: &str = "Expense tracker API is running";

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_health_check))
        .route(
            endpoints::SESSION,
            post(create_session_endpoint).delete(delete_session_endpoint),
        )
        .route(
            endpoints::RECORDS,
            get(list_records_endpoint).post(create_record_endpoint),
        )
        .route(
            endpoints::RECORD,
            put(edit_record_endpoint).delete(delete_record_endpoint),
        )
        .route(endpoints::DAILY_SUMMARY, get(daily_summary_endpoint))
        .route(endpoints::MONTHLY_SUMMARY, get(monthly_summary_endpoint))
        .route(endpoints::RUNNING_TOTALS, get(running_totals_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Allow the browser client served from `allowed_origin` to call the API with cookies.
///
/// # Errors
/// Returns [Error::InvalidOrigin] if `allowed_origin` is not a valid header value.
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer, Error> {
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .map_err(|_| Error::InvalidOrigin(allowed_origin.to_owned()))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

async fn get_health_check() -> &'static str {
    HEALTH_CHECK_TEXT
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            message: "Route not found.".to_owned(),
        }),
    )
        .into_response()
}
