use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{PipelineError, PipelineResult};
use crate::utils::url::UrlUtils;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

/// Environment variables read without the `EPG_MERGE_` prefix
const UNPREFIXED_ENV_KEYS: [&str; 6] = [
    "BASE_URL",
    "BASE_DIR",
    "MAPPING_FILENAME",
    "EPG_SOURCES_FILENAME",
    "LOCAL_EPG_FILENAME",
    "LOCAL_M3U_FILENAME",
];

/// Runtime configuration for a merge run
///
/// Loaded once in the binary and handed to the pipeline; nothing reads the
/// environment after this point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Public URL the merged EPG is served from; also stamped on the `tv` root
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory relative file names resolve against
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    #[serde(default = "default_mapping_filename")]
    pub mapping_filename: String,
    #[serde(default = "default_epg_sources_filename")]
    pub epg_sources_filename: String,
    #[serde(default = "default_local_epg_filename")]
    pub local_epg_filename: String,
    #[serde(default = "default_local_m3u_filename")]
    pub local_m3u_filename: String,
    /// Value of the `generator-info-name` attribute
    #[serde(default = "default_generator_name")]
    pub generator_name: String,
    /// Total timeout for a single EPG download
    #[serde(default = "default_fetch_timeout", with = "duration_serde::duration")]
    pub fetch_timeout: Duration,
    /// Upper bound on EPG downloads in flight; 1 fetches strictly in order
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BASE_DIR)
}

fn default_mapping_filename() -> String {
    DEFAULT_MAPPING_FILENAME.to_string()
}

fn default_epg_sources_filename() -> String {
    DEFAULT_EPG_SOURCES_FILENAME.to_string()
}

fn default_local_epg_filename() -> String {
    DEFAULT_LOCAL_EPG_FILENAME.to_string()
}

fn default_local_m3u_filename() -> String {
    DEFAULT_LOCAL_M3U_FILENAME.to_string()
}

fn default_generator_name() -> String {
    DEFAULT_GENERATOR_NAME.to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECONDS)
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_dir: default_base_dir(),
            mapping_filename: default_mapping_filename(),
            epg_sources_filename: default_epg_sources_filename(),
            local_epg_filename: default_local_epg_filename(),
            local_m3u_filename: default_local_m3u_filename(),
            generator_name: default_generator_name(),
            fetch_timeout: default_fetch_timeout(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional TOML file and the environment
    ///
    /// A config file that does not exist is skipped. The result is not
    /// validated; callers apply their overrides first and then call
    /// [`Config::validate`].
    pub fn load(config_file: Option<&Path>) -> PipelineResult<Self> {
        Self::figment(config_file)
            .extract()
            .map_err(|e| PipelineError::configuration(e.to_string()))
    }

    /// Layered providers: defaults < TOML file < unprefixed env < `EPG_MERGE_` env
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::raw().only(&UNPREFIXED_ENV_KEYS))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(PipelineError::configuration("base_url must not be empty"));
        }
        let file_names = [
            ("mapping_filename", &self.mapping_filename),
            ("epg_sources_filename", &self.epg_sources_filename),
            ("local_epg_filename", &self.local_epg_filename),
            ("local_m3u_filename", &self.local_m3u_filename),
        ];
        for (field, value) in file_names {
            if value.trim().is_empty() {
                return Err(PipelineError::configuration(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if self.fetch_timeout.is_zero() {
            return Err(PipelineError::configuration("fetch_timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Resolve a configured file name against `base_dir`; absolute paths are kept
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.resolve(&self.mapping_filename)
    }

    pub fn epg_sources_path(&self) -> PathBuf {
        self.resolve(&self.epg_sources_filename)
    }

    pub fn epg_output_path(&self) -> PathBuf {
        self.resolve(&self.local_epg_filename)
    }

    pub fn m3u_output_path(&self) -> PathBuf {
        self.resolve(&self.local_m3u_filename)
    }

    /// Public URL of the merged EPG, written into the playlist header
    pub fn epg_reference_url(&self) -> String {
        let epg_path = self.epg_output_path();
        let file_name = epg_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.local_epg_filename.clone());
        UrlUtils::join_path(&self.base_url, &file_name)
    }

    /// Number of sources fetched at once, never below one
    pub fn fetch_concurrency(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }
}
