use std::{env, fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use expense_tracker::{
    AppState, CurrencyFormat, DigitGrouping, build_router, cors_layer, graceful_shutdown,
    local_today, logging_middleware,
};

/// The REST API server for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3001)]
    port: u16,

    /// The canonical name of the timezone used to decide what "today" is, e.g. "Asia/Kolkata".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The origin the browser client is served from.
    #[arg(long, default_value = "http://localhost:5173")]
    allowed_origin: String,

    /// The currency symbol shown in summaries.
    #[arg(long, default_value = "₹")]
    currency_symbol: String,

    /// How the digits of amounts are grouped in summaries.
    #[arg(long, value_enum, default_value_t = DigitGrouping::Indian)]
    digit_grouping: DigitGrouping,

    /// Mark the session cookie `Secure`. Set this when clients reach the API
    /// over HTTPS, e.g. through a TLS terminating proxy.
    #[arg(long)]
    secure_cookies: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        exit(1);
    };

    if let Err(error) = local_today(&args.timezone) {
        tracing::error!("{error}");
        exit(1);
    }

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let currency = CurrencyFormat::new(&args.currency_symbol, args.digit_grouping);
    let state = match AppState::new(conn, &secret, &args.timezone, currency) {
        Ok(state) => state.with_secure_cookies(args.secure_cookies),
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            exit(1);
        }
    };

    let cors = match cors_layer(&args.allowed_origin) {
        Ok(cors) => cors,
        Err(error) => {
            tracing::error!("{error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors);
    let router = add_tracing_layer(router);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let stdout_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(filter::LevelFilter::INFO.into()));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let debug_log = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => Some(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        ),
        Err(error) => {
            eprintln!("Could not open debug.log, logging to stdout only: {error}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
