//! Single-use access code referendum backend.
//!
//! Each eligible participant holds one opaque code. A code may be redeemed
//! exactly once, for one choice, while the configured voting window is open.
//! Operators behind Basic auth can read a live tally of the roster.
//!
//! # Layout
//! - [`window`] classifies an instant against the voting window.
//! - [`store`] is the durable roster; [`store::PgVoterStore`] redeems with a
//!   single conditional `UPDATE ... WHERE used = FALSE`.
//! - [`redeem`] validates submissions and performs the transition.
//! - [`tally`] summarizes one roster read.
//! - [`auth`] guards the results view.
//!
//! # Configuration
//!
//! | variable | default |
//! |---|---|
//! | `DATABASE_URL` | required |
//! | `VOTE_START`, `VOTE_END` | required, RFC 3339 |
//! | `ADMIN_USER`, `ADMIN_PASS` | empty, admin view disabled |
//! | `PORT` | `8080` |
//! | `PG_MAX_CONNS`, `PG_MIN_CONNS` | `20`, `1` |
//! | `REDEEM_TIMEOUT_MS` | `5000` |
//! | `RUN_MIGRATIONS` | unset; `1` creates the `voters` table |
//!
//! Logging is controlled through `RUST_LOG`, e.g. `RUST_LOG=referendum=info,tower_http=info`.

use std::{sync::Arc, time::Duration};

use http::{Method, header::CONTENT_TYPE};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod redeem;
pub mod routes;
pub mod state;
pub mod store;
pub mod tally;
pub mod window;

use config::Config;
use state::AppState;
use store::PgVoterStore;

pub fn init_tracing() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!(
        "Voting window {} .. {}",
        config.window.start().to_rfc3339(),
        config.window.end().to_rfc3339()
    );

    info!("Connecting to database...");
    let pool = db::create_pool(&config).await?;

    if config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let state = AppState::from_config(Arc::new(PgVoterStore::new(pool.clone())), &config);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = routes::create_routes(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
