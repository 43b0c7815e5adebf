//! Backend entry-point: wires page endpoints, session auth, and OpenAPI docs.

mod server;

use std::net::SocketAddr;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use mockable::{DefaultEnv, Env};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use backend::outbound::persistence::{DbPool, PoolOptions, run_pending_migrations};
use server::ServerConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let env = DefaultEnv::new();
    let settings = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&settings.key),
        "session key ready"
    );

    let bind_addr: SocketAddr = env
        .string("BIND_ADDR")
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
        .parse()
        .map_err(std::io::Error::other)?;
    let upload_dir = env
        .string("UPLOAD_DIR")
        .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_owned());

    let mut config = ServerConfig::new(settings, bind_addr).with_upload_dir(upload_dir);

    if let Some(database_url) = env.string("DATABASE_URL") {
        run_pending_migrations(&database_url)
            .await
            .map_err(std::io::Error::other)?;
        let pool = DbPool::connect(&database_url, PoolOptions::default())
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(make_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %bind_addr, "starting server");
    let server = server::create_server(health_state, config)?;
    server.await
}

#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<actix_web_prom::PrometheusMetrics> {
    PrometheusMetricsBuilder::new("furniture_market")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))
}
