//! Test plan for the `ayf-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use ayf_config::{load, AppConfig, AuthSettings, RemoteConfig, StorageSettings};

const ENV_VARS_TO_RESET: &[&str] = &[
    "AYF_CONFIG",
    "AYF__AUTH__ADMIN_EMAIL_DOMAIN",
    "AYF__REMOTE__ANON_KEY",
    "AYF__REMOTE__REQUEST_TIMEOUT_SECONDS",
    "AYF__REMOTE__SERVICE_ROLE_KEY",
    "AYF__REMOTE__URL",
    "AYF__STORAGE__AVATAR_BUCKET",
    "AYF__STORAGE__DOCUMENT_BUCKET",
    "AYF__STORAGE__IMAGE_BUCKET",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.remote.url, defaults.remote.url);
    assert_eq!(config.remote.anon_key, defaults.remote.anon_key);
    assert_eq!(
        config.remote.request_timeout_seconds,
        defaults.remote.request_timeout_seconds
    );
    assert_eq!(
        config.auth.admin_email_domain,
        defaults.auth.admin_email_domain
    );
    assert_eq!(config.storage.image_bucket, defaults.storage.image_bucket);
    assert_eq!(
        config.storage.document_bucket,
        defaults.storage.document_bucket
    );
    assert_eq!(config.storage.avatar_bucket, defaults.storage.avatar_bucket);
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "ayf.toml",
        r#"
        [remote]
        url = "https://first.example.co"
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/ayf.toml",
        r#"
        [remote]
        url = "https://second.example.co"
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.remote.url, "https://first.example.co");
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "ayf.toml",
        r#"
        [remote]
        anon_key = "public-anon-key"

        [storage]
        image_bucket = "media"
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.remote.anon_key, "public-anon-key");
    assert_eq!(config.remote.url, defaults.remote.url);
    assert_eq!(config.storage.image_bucket, "media");
    assert_eq!(
        config.storage.document_bucket,
        defaults.storage.document_bucket
    );
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "ayf.toml",
        r#"
        [remote]
        url = "https://from-file.example.co"
        "#,
    );

    ctx.set_var("AYF__REMOTE__URL", "https://from-env.example.co");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.remote.url, "https://from-env.example.co");
}

#[test]
#[serial]
fn load_reads_service_role_key_from_env() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    ctx.set_var("AYF__REMOTE__SERVICE_ROLE_KEY", "service-role-secret");

    let config = load().expect("configuration load should read the service key");
    assert_eq!(
        config.remote.service_role_key.as_deref(),
        Some("service-role-secret")
    );
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "ayf.toml",
        r#"
        [remote]
        request_timeout_seconds = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration")
            || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn auth_settings_default_to_fellowship_domain() {
    let defaults = AuthSettings::default();
    assert_eq!(defaults.admin_email_domain, "gwarinpaayf.org");
}

#[test]
fn remote_config_defaults_to_local_stack() {
    let defaults = RemoteConfig::default();
    assert_eq!(defaults.url, "http://127.0.0.1:54321");
    assert!(defaults.service_role_key.is_none());
}

#[test]
fn storage_settings_default_bucket_names() {
    let defaults = StorageSettings::default();
    assert_eq!(defaults.image_bucket, "images");
    assert_eq!(defaults.document_bucket, "documents");
    assert_eq!(defaults.avatar_bucket, "avatars");
}
