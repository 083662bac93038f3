//! Configuration for Telegram API access and the export run
//!
//! Values come from an optional config.yml, overridden by environment
//! variables.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default constants (used when config.yml does not set them)
pub const CONFIG_FILE: &str = "config.yml";
pub const SESSION_FILE: &str = "session";
pub const LOCK_FILE: &str = "session.lock";
pub const OUTPUT_FILE: &str = "views.txt";
pub const LINK_HOST: &str = "t.me";
pub const DEFAULT_PAGE_LIMIT: i32 = 100;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 100;
pub const DEFAULT_TIMEOUT_RETRY_MS: u64 = 1000;

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    telegram: Option<TelegramConfig>,
    fetch: Option<FetchConfig>,
    output: Option<OutputConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramConfig {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    api_id: Option<String>,
    api_hash: Option<String>,
    phone: Option<String>,
    session: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct FetchConfig {
    page_limit: Option<i32>,
    request_delay_ms: Option<u64>,
    timeout_retry_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputConfig {
    path: Option<PathBuf>,
    link_host: Option<String>,
}

/// Deserialize a value that can be either a string or a number
fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub phone: String,
    pub api_id: i32,
    pub api_hash: String,
    pub session_file: PathBuf,
    pub lock_file: PathBuf,
    pub output_file: PathBuf,
    pub link_host: String,
    pub page_limit: i32,
    pub request_delay: Duration,
    pub timeout_retry: Duration,
}

impl Config {
    /// Load `path` (if it exists), then apply environment overrides.
    ///
    /// `.env` is not read here; the binary loads it before logging starts.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = match fs::read_to_string(path.as_ref()) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {}",
                    path.as_ref().display(),
                    e
                )))
            }
        };

        Self::from_sources(content.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build a config from YAML text and an environment lookup.
    ///
    /// Environment variables take precedence over YAML values.
    pub fn from_sources<F>(yaml: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let yaml: YamlConfig = match yaml {
            Some(text) if !text.trim().is_empty() => serde_yaml::from_str(text)
                .map_err(|e| Error::Config(format!("failed to parse config file: {}", e)))?,
            _ => YamlConfig::default(),
        };

        let telegram = yaml.telegram.unwrap_or_default();
        let fetch = yaml.fetch.unwrap_or_default();
        let output = yaml.output.unwrap_or_default();

        let lookup = |keys: &[&str]| {
            keys.iter()
                .find_map(|&key| env(key).filter(|v| !v.trim().is_empty()))
        };

        let phone = lookup(&["PHONE", "TELEGRAM_PHONE"])
            .or(telegram.phone)
            .unwrap_or_default();
        let api_id_raw = lookup(&["APP_ID", "TELEGRAM_API_ID"]).or(telegram.api_id);
        let api_hash = lookup(&["APP_HASH", "TELEGRAM_API_HASH"])
            .or(telegram.api_hash)
            .unwrap_or_default();

        let api_id = match api_id_raw {
            Some(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| Error::Config(format!("api_id must be a number, got {:?}", raw)))?,
            None => 0,
        };

        let session_file = telegram
            .session
            .unwrap_or_else(|| PathBuf::from(SESSION_FILE));
        let page_limit = fetch.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page_limit <= 0 {
            return Err(Error::Config(format!(
                "fetch.page_limit must be positive, got {}",
                page_limit
            )));
        }

        Ok(Self {
            phone: phone.trim().to_string(),
            api_id,
            api_hash: api_hash.trim().to_string(),
            lock_file: lock_file_for(&session_file),
            session_file,
            output_file: output.path.unwrap_or_else(|| PathBuf::from(OUTPUT_FILE)),
            link_host: output.link_host.unwrap_or_else(|| LINK_HOST.to_string()),
            page_limit,
            request_delay: Duration::from_millis(
                fetch.request_delay_ms.unwrap_or(DEFAULT_REQUEST_DELAY_MS),
            ),
            timeout_retry: Duration::from_millis(
                fetch.timeout_retry_ms.unwrap_or(DEFAULT_TIMEOUT_RETRY_MS),
            ),
        })
    }

    /// Check that everything needed to talk to Telegram is present.
    pub fn validate(&self) -> Result<()> {
        if self.phone.is_empty() {
            return Err(Error::Config(
                "please provide your phone number as \"PHONE\" environment variable".to_string(),
            ));
        }
        if self.api_id == 0 || self.api_hash.is_empty() {
            return Err(Error::Config(
                "set APP_ID and APP_HASH (from https://my.telegram.org) in the environment or config.yml"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// `session` -> `session.lock`, `foo.session` -> `foo.session.lock`
fn lock_file_for(session_file: &Path) -> PathBuf {
    let mut name = session_file.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
