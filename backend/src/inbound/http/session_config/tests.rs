//! Unit tests for session cookie configuration.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp key file should be created");
    std::fs::write(file.path(), vec![b'a'; len]).expect("key bytes should be written");
    file
}

fn path_str(file: &NamedTempFile) -> String {
    file.path()
        .to_str()
        .expect("temp path should be UTF-8")
        .to_string()
}

fn mock_env(vars: &[(&str, String)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_vars(key_path: String) -> Vec<(&'static str, String)> {
    vec![
        (ENV_KEY_FILE, key_path),
        (ENV_COOKIE_SECURE, "1".to_string()),
        (ENV_SAMESITE, "Strict".to_string()),
        (ENV_ALLOW_EPHEMERAL, "0".to_string()),
    ]
}

fn config_error(result: Result<SessionSettings, SessionConfigError>) -> SessionConfigError {
    match result {
        Ok(_) => panic!("settings unexpectedly parsed"),
        Err(error) => error,
    }
}

#[rstest]
#[case(ENV_COOKIE_SECURE)]
#[case(ENV_SAMESITE)]
#[case(ENV_ALLOW_EPHEMERAL)]
fn release_requires_every_toggle(#[case] missing: &'static str) {
    let key = key_file(RELEASE_KEY_MIN_BYTES);
    let mut vars = release_vars(path_str(&key));
    vars.retain(|(name, _)| *name != missing);
    let env = mock_env(&vars);

    let error = config_error(session_settings_from_env(&env, BuildMode::Release));
    match error {
        SessionConfigError::MissingEnv { name } => assert_eq!(name, missing),
        other => panic!("expected MissingEnv, got {other}"),
    }
}

#[rstest]
#[case("maybe")]
#[case("")]
fn release_rejects_malformed_booleans(#[case] value: &str) {
    let key = key_file(RELEASE_KEY_MIN_BYTES);
    let mut vars = release_vars(path_str(&key));
    vars.push((ENV_COOKIE_SECURE, value.to_string()));
    let env = mock_env(&vars);

    let error = config_error(session_settings_from_env(&env, BuildMode::Release));
    assert!(matches!(
        error,
        SessionConfigError::InvalidEnv {
            name: ENV_COOKIE_SECURE,
            ..
        }
    ));
}

#[rstest]
fn release_rejects_ephemeral_keys() {
    let key = key_file(RELEASE_KEY_MIN_BYTES);
    let mut vars = release_vars(path_str(&key));
    vars.push((ENV_ALLOW_EPHEMERAL, "1".to_string()));
    let env = mock_env(&vars);

    let error = config_error(session_settings_from_env(&env, BuildMode::Release));
    assert!(matches!(error, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_requires_a_readable_key_file() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let absent = dir.path().join("absent");
    let vars = release_vars(absent.to_str().expect("UTF-8 path").to_string());
    let env = mock_env(&vars);

    let error = config_error(session_settings_from_env(&env, BuildMode::Release));
    assert!(matches!(error, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn release_rejects_short_keys() {
    let key = key_file(32);
    let env = mock_env(&release_vars(path_str(&key)));

    let error = config_error(session_settings_from_env(&env, BuildMode::Release));
    assert!(matches!(
        error,
        SessionConfigError::KeyTooShort { length: 32, .. }
    ));
}

#[rstest]
fn release_rejects_insecure_same_site_none() {
    let key = key_file(RELEASE_KEY_MIN_BYTES);
    let mut vars = release_vars(path_str(&key));
    vars.push((ENV_COOKIE_SECURE, "0".to_string()));
    vars.push((ENV_SAMESITE, "None".to_string()));
    let env = mock_env(&vars);

    let error = config_error(session_settings_from_env(&env, BuildMode::Release));
    assert!(matches!(error, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_accepts_explicit_settings() {
    let key = key_file(RELEASE_KEY_MIN_BYTES);
    let env = mock_env(&release_vars(path_str(&key)));

    let settings = session_settings_from_env(&env, BuildMode::Release)
        .expect("explicit settings should parse");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
fn debug_runs_with_no_configuration() {
    let env = mock_env(&[]);

    let settings = session_settings_from_env(&env, BuildMode::Debug)
        .expect("debug defaults should succeed");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_falls_back_on_invalid_same_site() {
    let key = key_file(RELEASE_KEY_MIN_BYTES);
    let mut vars = release_vars(path_str(&key));
    vars.push((ENV_SAMESITE, "sideways".to_string()));
    let env = mock_env(&vars);

    let settings = session_settings_from_env(&env, BuildMode::Debug)
        .expect("debug should fall back to the default policy");
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn fingerprints_are_stable_lowercase_hex() {
    let key = Key::derive_from(&[b'a'; 64]);

    let first = key_fingerprint(&key);
    let second = key_fingerprint(&key);

    assert_eq!(first, second);
    assert_eq!(first.len(), 16);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(first, first.to_lowercase());
}

#[rstest]
fn distinct_keys_have_distinct_fingerprints() {
    let first = key_fingerprint(&Key::derive_from(&[b'a'; 64]));
    let second = key_fingerprint(&Key::derive_from(&[b'b'; 64]));

    assert_ne!(first, second);
}
