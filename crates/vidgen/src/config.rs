//! Layered configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (include_str! from vidgen.toml)
//! 2. `~/.config/vidgen/vidgen.toml`
//! 3. `./vidgen.toml`
//! 4. An explicit file, when given
//! 5. Environment variables prefixed `VIDGEN__` (e.g. `VIDGEN__API__BASE_URL`)

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};
use vidgen_error::{ConfigError, VidgenError, VidgenResult};
use vidgen_pipeline::{Generators, Pipeline, PipelineConfig};
use vidgen_providers::GenerationClient;
use vidgen_storage::AssetStore;

const DEFAULT_CONFIG: &str = include_str!("../../../vidgen.toml");

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Where assets are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store directory; the platform data directory when unset
    pub path: Option<PathBuf>,
}

/// Generation service location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL of the service
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Prompts used when a command is given none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Default script prompt
    pub script: String,
    /// Default image prompt
    pub image: String,
}

/// Top-level vidgen configuration.
///
/// # Example
///
/// ```no_run
/// use vidgen::VidgenConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = VidgenConfig::load()?;
/// println!("Generation service: {}", config.api.base_url);
/// println!("Assets in: {}", config.storage_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VidgenConfig {
    /// Asset storage
    pub storage: StorageConfig,
    /// Generation service
    pub api: ApiConfig,
    /// Models and keys per stage
    pub pipeline: PipelineConfig,
    /// Default prompts
    pub prompts: PromptConfig,
}

fn build_error(e: config::ConfigError) -> VidgenError {
    ConfigError::new(format!("Failed to build configuration: {}", e)).into()
}

fn parse_error(e: config::ConfigError) -> VidgenError {
    ConfigError::new(format!("Failed to parse configuration: {}", e)).into()
}

impl VidgenConfig {
    /// Load one file on its own, without defaults or environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> VidgenResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                VidgenError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(parse_error)
    }

    /// Load the bundled defaults only.
    pub fn bundled() -> VidgenResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .map_err(build_error)?
            .try_deserialize()
            .map_err(parse_error)
    }

    /// Load every layer. User files are optional and skipped if absent.
    pub fn load() -> VidgenResult<Self> {
        Self::load_from(None)
    }

    /// Load every layer, plus `explicit` (required) above the user files.
    #[instrument]
    pub fn load_from(explicit: Option<&Path>) -> VidgenResult<Self> {
        debug!("Loading configuration: env > explicit > current dir > home dir > bundled");

        let mut builder = Self::layered();
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix("VIDGEN").separator("__"))
            .build()
            .map_err(build_error)?
            .try_deserialize()
            .map_err(parse_error)
    }

    fn layered() -> ConfigBuilder<DefaultState> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/vidgen/vidgen.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder.add_source(File::with_name("vidgen").required(false))
    }

    /// Resolved store directory.
    pub fn storage_path(&self) -> PathBuf {
        self.storage.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("vidgen"))
                .unwrap_or_else(|| PathBuf::from(".vidgen"))
        })
    }

    /// Build a pipeline over `store` that talks to the configured service.
    pub fn build_pipeline(&self, store: Arc<dyn AssetStore>) -> Pipeline {
        let client = GenerationClient::new(&self.api.base_url);
        Pipeline::new(store, Generators::from_client(client), self.pipeline.clone())
    }
}
