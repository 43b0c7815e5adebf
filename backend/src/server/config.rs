//! Configuration handed to `create_server`.

use backend::inbound::http::session_config::SessionSettings;
use backend::outbound::persistence::DbPool;
use std::net::SocketAddr;
use std::path::PathBuf;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Everything `create_server` needs to assemble the application.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) upload_dir: PathBuf,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Start from validated session settings and a bind address.
    ///
    /// Images land under `uploads` in the working directory unless
    /// [`Self::with_upload_dir`] overrides it.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            upload_dir: PathBuf::from("uploads"),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Back accounts and listings with Postgres.
    ///
    /// Without a pool the server keeps everything in process memory, which
    /// only suits development.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Store uploaded listing images under the given directory.
    #[must_use]
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    #[cfg(feature = "metrics")]
    /// Export request metrics through the given Prometheus recorder.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use rstest::rstest;
    use std::path::Path;

    fn config() -> ServerConfig {
        let session = SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        };
        ServerConfig::new(session, "127.0.0.1:0".parse().expect("socket address"))
    }

    #[rstest]
    fn defaults_leave_the_pool_unset() {
        let config = config();
        assert!(config.db_pool.is_none());
        assert_eq!(config.upload_dir, Path::new("uploads"));
        assert_eq!(config.bind_addr.port(), 0);
    }

    #[rstest]
    fn upload_dir_override_sticks() {
        let config = config().with_upload_dir("/srv/furniture/uploads");
        assert_eq!(config.upload_dir, Path::new("/srv/furniture/uploads"));
    }
}
