use crate::config::Config;
use crate::error::Result;
use crate::handlers::{
    check_token, get_usage, health_check, readiness_check, reset_token, AppState, SharedState,
};
use crate::middleware::{logging_middleware, rate_limit_middleware};
use crate::rate_limiter::RateLimiter;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the router around fresh state
pub fn create_app(config: &Config) -> Result<Router> {
    let state: SharedState = Arc::new(AppState::from_config(config)?);
    Ok(router(state))
}

/// Build the router around existing state
pub fn router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/limit/:token", get(get_usage).delete(reset_token))
        .route("/limit/:token/check", post(check_token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(logging_middleware)),
        )
}

pub struct Server {
    state: SharedState,
    bind_addr: SocketAddr,
}

impl Server {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            state: Arc::new(AppState::from_config(config)?),
            bind_addr: config.bind_addr,
        })
    }

    pub async fn run(self) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;

        tracing::info!("EcoGym server listening on {}", listener.local_addr()?);
        tracing::info!("Health check available at /health");
        tracing::info!("Readiness check available at /ready");

        let purge = spawn_purge_task(self.state.rate_limiter.clone());
        let app = router(self.state);

        // Run server with graceful shutdown
        let served = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        purge.abort();
        served
    }
}

/// Periodically drop expired limiter entries so idle tokens free their slots.
fn spawn_purge_task(rate_limiter: RateLimiter) -> JoinHandle<()> {
    let period = rate_limiter.options().interval;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match rate_limiter.purge_expired() {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Purged expired rate limit tokens"),
                Err(err) => tracing::warn!(error = %err, "Failed to purge rate limit tokens"),
            }
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
