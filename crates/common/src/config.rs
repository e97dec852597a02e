use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "GraphConfig::default_max_contribution_edges")]
    pub max_contribution_edges: usize,
    #[serde(default = "GraphConfig::default_max_actor_actor_edges")]
    pub max_actor_actor_edges: usize,
    #[serde(default)]
    pub max_repo_repo_edges: Option<usize>,
    #[serde(default = "GraphConfig::default_harmonic_ratio")]
    pub harmonic_ratio: f64,
}

impl GraphConfig {
    const fn default_max_contribution_edges() -> usize {
        500_000
    }

    const fn default_max_actor_actor_edges() -> usize {
        500_000
    }

    const fn default_harmonic_ratio() -> f64 {
        0.01
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_contribution_edges: Self::default_max_contribution_edges(),
            max_actor_actor_edges: Self::default_max_actor_actor_edges(),
            max_repo_repo_edges: None,
            harmonic_ratio: Self::default_harmonic_ratio(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub input_path: Option<String>,
    #[serde(default = "IngestConfig::default_chunk_size")]
    pub chunk_size: usize,
}

impl IngestConfig {
    const fn default_chunk_size() -> usize {
        10_000
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            chunk_size: Self::default_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}
