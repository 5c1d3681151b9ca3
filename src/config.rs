use anyhow::{Context, Result};
use serde::Deserialize;

/// Service configuration, loaded from `STOCKLY_*` environment variables on
/// top of typed defaults. `api_key` has no default: without it the `/pdf`
/// routes refuse every request.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub api_key: Option<String>,
    pub allowed_origins: Vec<String>,
    pub chromium_path: String,
    pub render_timeout_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("port", 3000)?
            .set_default(
                "allowed_origins",
                vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3000".to_string(),
                ],
            )?
            .set_default("chromium_path", "chromium")?
            .set_default("render_timeout_seconds", 30)?
            .add_source(
                config::Environment::with_prefix("STOCKLY")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins"),
            )
            .build()
            .context("failed to read configuration")?;

        settings
            .try_deserialize()
            .context("invalid configuration value")
    }
}
