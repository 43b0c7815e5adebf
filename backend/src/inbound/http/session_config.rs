//! Environment-driven session cookie configuration.
//!
//! Release builds must spell out every toggle and mount a key file; debug
//! builds fall back to safe defaults with a warning so local development
//! works without secrets in place.

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::warn;
use zeroize::Zeroize;

const ENV_COOKIE_SECURE: &str = "SESSION_COOKIE_SECURE";
const ENV_SAMESITE: &str = "SESSION_SAMESITE";
const ENV_ALLOW_EPHEMERAL: &str = "SESSION_ALLOW_EPHEMERAL";
const ENV_KEY_FILE: &str = "SESSION_KEY_FILE";

const DEFAULT_KEY_FILE: &str = "/var/run/secrets/session_key";
/// Release builds refuse key files shorter than this.
const RELEASE_KEY_MIN_BYTES: usize = 64;
const BOOL_VALUES: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_VALUES: &str = "Strict|Lax|None";
const FINGERPRINT_BYTES: usize = 8;

/// Build mode steering how strictly configuration is validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or invalid toggles fall back to defaults with a warning.
    Debug,
    /// Every toggle must be present and valid.
    Release,
}

impl BuildMode {
    /// Pick the mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn lenient(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing key for the cookie session store.
    pub key: Key,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// `SameSite` policy for the session cookie.
    pub same_site: SameSite,
}

/// Failures while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is absent.
    #[error("{name} must be set in release builds")]
    MissingEnv { name: &'static str },
    /// A variable is present but unparseable.
    #[error("{name}='{value}' is unusable; expected one of {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {}: {}", path.display(), source)]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than release builds accept.
    #[error(
        "session key at {} is {} bytes; release builds need at least {}",
        path.display(),
        length,
        min_len
    )]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` cookies are dropped by browsers unless `Secure` is set.
    #[error("SESSION_SAMESITE=None also needs SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Generated keys would invalidate every session on restart.
    #[error("release builds refuse generated session keys; mount SESSION_KEY_FILE")]
    EphemeralNotAllowed,
}

/// Assemble session settings from environment variables.
///
/// Reads `SESSION_COOKIE_SECURE`, `SESSION_SAMESITE`,
/// `SESSION_ALLOW_EPHEMERAL` and `SESSION_KEY_FILE` (default
/// `/var/run/secrets/session_key`). Key bytes are zeroized once the
/// signing key has been derived.
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let reader = SessionEnv { env, mode };
    let cookie_secure = reader.cookie_secure()?;
    let same_site = reader.same_site(cookie_secure)?;
    let ephemeral_ok = reader.allow_ephemeral()?;
    let key = reader.signing_key(ephemeral_ok)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Truncated SHA-256 of the signing key, logged at startup so operators can
/// tell which key a process booted with without exposing key material.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use backend::inbound::http::session_config::key_fingerprint;
///
/// let fingerprint = key_fingerprint(&Key::generate());
/// assert_eq!(fingerprint.len(), 16);
/// assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.signing());
    let digest = hasher.finalize();
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

/// Environment reader bound to a build mode.
struct SessionEnv<'e, E: Env> {
    env: &'e E,
    mode: BuildMode,
}

impl<E: Env> SessionEnv<'_, E> {
    /// Debug builds log and take the fallback; release builds refuse to start.
    fn debug_fallback<T>(
        &self,
        fallback: T,
        error: SessionConfigError,
        warn_fn: impl FnOnce(),
    ) -> Result<T, SessionConfigError> {
        if self.mode.lenient() {
            warn_fn();
            Ok(fallback)
        } else {
            Err(error)
        }
    }

    fn flag(&self, name: &'static str, default_value: bool) -> Result<bool, SessionConfigError> {
        let Some(value) = self.env.string(name) else {
            return self.debug_fallback(
                default_value,
                SessionConfigError::MissingEnv { name },
                || warn!(%name, default_value, "session toggle not set; using the default"),
            );
        };
        match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => self.debug_fallback(
                default_value,
                SessionConfigError::InvalidEnv {
                    name,
                    value: value.clone(),
                    expected: BOOL_VALUES,
                },
                || warn!(%name, %value, "unparseable session toggle; using the default"),
            ),
        }
    }

    fn cookie_secure(&self) -> Result<bool, SessionConfigError> {
        self.flag(ENV_COOKIE_SECURE, true)
    }

    fn allow_ephemeral(&self) -> Result<bool, SessionConfigError> {
        match self.flag(ENV_ALLOW_EPHEMERAL, false)? {
            true if !self.mode.lenient() => Err(SessionConfigError::EphemeralNotAllowed),
            flag => Ok(flag),
        }
    }

    fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let Some(value) = self.env.string(ENV_SAMESITE) else {
            return self.debug_fallback(
                SameSite::Lax,
                SessionConfigError::MissingEnv { name: ENV_SAMESITE },
                || warn!("SESSION_SAMESITE not set; staying with Lax"),
            );
        };
        match value.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" => {
                self.debug_fallback((), SessionConfigError::InsecureSameSiteNone, || {
                    warn!(
                        "SESSION_SAMESITE=None without SESSION_COOKIE_SECURE=1; \
                         browsers may drop the cookie"
                    );
                })?;
                Ok(SameSite::None)
            }
            _ => self.debug_fallback(
                SameSite::Lax,
                SessionConfigError::InvalidEnv {
                    name: ENV_SAMESITE,
                    value: value.clone(),
                    expected: SAMESITE_VALUES,
                },
                || warn!(%value, "unrecognised SESSION_SAMESITE; staying with Lax"),
            ),
        }
    }

    fn signing_key(&self, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
        let path = PathBuf::from(
            self.env
                .string(ENV_KEY_FILE)
                .unwrap_or_else(|| DEFAULT_KEY_FILE.to_owned()),
        );
        let mut bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) if self.mode.lenient() || allow_ephemeral => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "session key unreadable; generating a throwaway key (dev only)"
                );
                return Ok(Key::generate());
            }
            Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
        };
        if !self.mode.lenient() && bytes.len() < RELEASE_KEY_MIN_BYTES {
            let length = bytes.len();
            bytes.zeroize();
            return Err(SessionConfigError::KeyTooShort {
                path,
                length,
                min_len: RELEASE_KEY_MIN_BYTES,
            });
        }
        let key = Key::derive_from(&bytes);
        bytes.zeroize();
        Ok(key)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
