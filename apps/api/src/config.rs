use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Connection details for the optional S3/MinIO export bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub rasterizer_url: String,
    /// Remote store. `None` runs the service local-only.
    pub database_url: Option<String>,
    pub local_store_path: PathBuf,
    pub export_dir: PathBuf,
    /// Exports go to S3 when set, otherwise to `export_dir`.
    pub s3: Option<S3Config>,
    pub autosave_interval: Duration,
    /// `None` means unbounded undo history.
    pub history_limit: Option<usize>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3 = match optional_env("S3_BUCKET") {
            Some(bucket) => Some(S3Config {
                bucket,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            None => None,
        };

        let autosave_secs: u64 = parse_env("AUTOSAVE_INTERVAL_SECS", 30)?;
        let history_limit: usize = parse_env("HISTORY_LIMIT", 200)?;

        Ok(Config {
            rasterizer_url: require_env("RASTERIZER_URL")?,
            database_url: optional_env("DATABASE_URL"),
            local_store_path: optional_env("LOCAL_STORE_PATH")
                .unwrap_or_else(|| "data/resumes.json".to_string())
                .into(),
            export_dir: optional_env("EXPORT_DIR")
                .unwrap_or_else(|| "exports".to_string())
                .into(),
            s3,
            autosave_interval: Duration::from_secs(autosave_secs.max(1)),
            history_limit: (history_limit > 0).then_some(history_limit),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
