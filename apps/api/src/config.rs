use std::path::PathBuf;

use anyhow::{Context, Result};

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Application configuration loaded from environment variables.
/// Everything is optional; the completion API key may also be entered at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub extraction_api_url: String,
    pub extraction_api_key: Option<String>,
    /// Directory that receives the per-request temporary copy of each upload.
    pub upload_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            openai_api_key: optional_env(OPENAI_API_KEY_VAR),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_BASE_URL.to_string()),
            extraction_api_url: std::env::var("EXTRACTION_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            extraction_api_key: optional_env("EXTRACTION_API_KEY"),
            upload_dir: std::env::var("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
        })
    }
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
