use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            api_url: env::var("PORTAL_API_URL").context("PORTAL_API_URL must be set")?,
            data_dir: env::var("PORTAL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".member-portal")),
        })
    }
}
