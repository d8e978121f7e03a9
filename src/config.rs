use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub tmdb: TmdbConfig,

    pub fetch: FetchConfig,

    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// Environment variable holding the API key. The key itself never lives
    /// in the config file.
    pub api_key_env: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key_env: "TMDB_API_KEY".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Bounded parallelism for the batch fetcher (default: 10)
    pub workers: usize,

    /// Movie ids fetched when the command line supplies none.
    pub movie_ids: Vec<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: crate::constants::fetch::DEFAULT_WORKERS,
            movie_ids: vec![
                0, 299534, 19995, 140607, 299536, 597, 135397, 420818, 24428, 168259, 99861,
                284054, 12445, 181808, 330457, 351286, 109445, 321612, 260513,
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub raw_path: String,

    pub cleaned_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_path: "data/raw/movies_data.csv".to_string(),
            cleaned_path: "data/cleaned/movies_data_cleaned.csv".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("cinetab").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".cinetab").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.workers == 0 {
            anyhow::bail!("Fetch worker count must be > 0");
        }

        if self.data.raw_path.is_empty() || self.data.cleaned_path.is_empty() {
            anyhow::bail!("Data paths cannot be empty");
        }

        Ok(())
    }

    /// Resolves the API credential. A missing credential is a configuration
    /// failure: the run aborts before any fetch work begins.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.tmdb.api_key_env).with_context(|| {
            format!(
                "API key not found: set the {} environment variable (a .env file works too)",
                self.tmdb.api_key_env
            )
        })
    }
}
