//! CLI settings: optional config file, `.env`, then `SOLRQ__*` environment
//! variables (highest precedence).
//!
//! ```toml
//! [logging]
//! level = "debug"
//! json = false
//!
//! [compiler]
//! default_rows = 25
//!
//! [compiler.fields.Product]
//! title = "title_t"
//! ```

use anyhow::Context;
use serde::Deserialize;
use solrq_query::CompilerConfig;
use std::path::Path;

const ENV_PREFIX: &str = "SOLRQ";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_CONFIG_NAME: &str = "solrq";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub compiler: CompilerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the solrq crates when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; otherwise `solrq.{toml,json,yaml}`
    /// in the working directory is used when present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings: Settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        settings
            .compiler
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

        Ok(settings)
    }
}
