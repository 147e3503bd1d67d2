//! An expense tracker that stores financial records per owner and summarises
//! them by day, by month and by category.
//!
//! This library provides the JSON REST API served by the `server` binary, the
//! aggregation functions the summaries are built from, and a client side
//! access layer that keeps working from a local cache when the API is
//! unreachable.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

pub mod access;
pub mod aggregation;
mod app_state;
mod auth;
mod database_id;
mod db;
pub mod endpoints;
mod error;
mod logging;
pub mod record;
mod routing;
pub mod summary;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use aggregation::{CurrencyFormat, DigitGrouping};
pub use app_state::{AppState, create_cookie_key};
pub use auth::{NewSession, Principal};
pub use database_id::{DatabaseId, RecordId};
pub use db::initialize as initialize_db;
pub use error::{Error, ErrorBody};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::{HEALTH_CHECK_TEXT, build_router, cors_layer};
pub use timezone::local_today;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
