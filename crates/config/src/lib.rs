use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "ayf.toml",
    "config/ayf.toml",
    "crates/config/ayf.toml",
    "../ayf.toml",
    "../config/ayf.toml",
    "../crates/config/ayf.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub auth: AuthSettings,
    pub storage: StorageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            auth: AuthSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

/// Connection settings for the hosted backend project.
///
/// ```
/// use ayf_config::RemoteConfig;
///
/// let remote = RemoteConfig::default();
/// assert_eq!(remote.url, "http://127.0.0.1:54321");
/// assert_eq!(remote.request_timeout_seconds, 30);
/// assert!(remote.service_role_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "RemoteConfig::default_url")]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    /// Privileged key for the auth admin API. Only the operator console
    /// should ever carry this.
    #[serde(default)]
    pub service_role_key: Option<String>,
    #[serde(default = "RemoteConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl RemoteConfig {
    fn default_url() -> String {
        "http://127.0.0.1:54321".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            anon_key: String::new(),
            service_role_key: None,
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Accounts under this email domain are treated as administrators even
    /// without a role claim in their metadata.
    #[serde(default = "AuthSettings::default_admin_email_domain")]
    pub admin_email_domain: String,
}

impl AuthSettings {
    fn default_admin_email_domain() -> String {
        "gwarinpaayf.org".to_string()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            admin_email_domain: Self::default_admin_email_domain(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "StorageSettings::default_image_bucket")]
    pub image_bucket: String,
    #[serde(default = "StorageSettings::default_document_bucket")]
    pub document_bucket: String,
    #[serde(default = "StorageSettings::default_avatar_bucket")]
    pub avatar_bucket: String,
}

impl StorageSettings {
    fn default_image_bucket() -> String {
        "images".to_string()
    }

    fn default_document_bucket() -> String {
        "documents".to_string()
    }

    fn default_avatar_bucket() -> String {
        "avatars".to_string()
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            image_bucket: Self::default_image_bucket(),
            document_bucket: Self::default_document_bucket(),
            avatar_bucket: Self::default_avatar_bucket(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use ayf_config::load;
///
/// std::env::remove_var("AYF_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.storage.image_bucket.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("remote.url", defaults.remote.url.clone())
        .unwrap()
        .set_default("remote.anon_key", defaults.remote.anon_key.clone())
        .unwrap()
        .set_default(
            "remote.request_timeout_seconds",
            i64::try_from(defaults.remote.request_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "auth.admin_email_domain",
            defaults.auth.admin_email_domain.clone(),
        )
        .unwrap()
        .set_default("storage.image_bucket", defaults.storage.image_bucket.clone())
        .unwrap()
        .set_default(
            "storage.document_bucket",
            defaults.storage.document_bucket.clone(),
        )
        .unwrap()
        .set_default(
            "storage.avatar_bucket",
            defaults.storage.avatar_bucket.clone(),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("AYF").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("AYF_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via AYF_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(url = %config.remote.url, "loaded portal configuration");
    Ok(config)
}
