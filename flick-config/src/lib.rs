//! Loader for FlickFinder configuration with YAML + environment overlays.
//!
//! Precedence, lowest first: built-in defaults, YAML files (in the order they
//! were added), then `FLICK__`-prefixed environment variables
//! (`FLICK__API__KEY`, `FLICK__SEARCH__TIMEOUT_SECS`, ...). After merging,
//! `${VAR}` placeholders inside string values are expanded from the process
//! environment, so `key: "${FLICKR_API_KEY}"` works in a checked-in file.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "FLICK";
const APP_DIR: &str = "flickfinder";
const FILE_NAME: &str = "flickfinder.yaml";

#[derive(Debug, Default, Deserialize)]
pub struct FlickConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how to reach the photo search REST endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// Static API key; empty means "not configured".
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            scheme: default_scheme(),
            host: default_host(),
            path: default_path(),
        }
    }
}

impl ApiConfig {
    pub fn has_key(&self) -> bool {
        !self.key.trim().is_empty() && !self.key.contains("${")
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_safe_search")]
    pub safe_search: u8,
    /// Degrees added/subtracted around the latitude.
    #[serde(default = "default_half_extent")]
    pub bbox_half_width: f64,
    /// Degrees added/subtracted around the longitude.
    #[serde(default = "default_half_extent")]
    pub bbox_half_height: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            safe_search: default_safe_search(),
            bbox_half_width: default_half_extent(),
            bbox_half_height: default_half_extent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub stderr: bool,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            filter: default_log_filter(),
            stderr: false,
            directory: None,
        }
    }
}

fn default_scheme() -> String {
    "https".into()
}
fn default_host() -> String {
    "api.flickr.com".into()
}
fn default_path() -> String {
    "/services/rest".into()
}
fn default_safe_search() -> u8 {
    1
}
fn default_half_extent() -> f64 {
    1.0
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_log_format() -> String {
    "text".into()
}
fn default_log_filter() -> String {
    "info".into()
}

/// `<config dir>/flickfinder/flickfinder.yaml`, e.g. `~/.config/flickfinder/flickfinder.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct FlickConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    include_env: bool,
}

impl Default for FlickConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FlickConfigLoader {
    /// Start with defaults; `FLICK__` env overrides are applied last in [`load`](Self::load).
    ///
    /// ```
    /// use flick_config::FlickConfigLoader;
    ///
    /// let config = FlickConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str("search:\n  bbox_half_width: 0.5")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.search.bbox_half_width, 0.5);
    /// assert_eq!(config.search.bbox_half_height, 1.0);
    /// assert_eq!(config.api.host, "api.flickr.com");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            include_env: true,
        }
    }

    /// Skip the `FLICK__` environment overlay (tests, reproducible runs).
    pub fn without_env(mut self) -> Self {
        self.include_env = false;
        self
    }

    /// Attach a YAML/TOML/JSON file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is merged only if present.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use flick_config::FlickConfigLoader;
    ///
    /// let cfg = FlickConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str(
    ///         r#"
    /// api:
    ///   key: "abc123"
    /// logging:
    ///   format: json
    ///   stderr: true
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.api.key, "abc123");
    /// assert!(cfg.api.has_key());
    /// assert_eq!(cfg.logging.format, "json");
    /// assert!(cfg.logging.stderr);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use flick_config::FlickConfigLoader;
    ///
    /// temp_env::with_var("DOC_FLICKR_KEY", Some("injected-from-env"), || {
    ///     let config = FlickConfigLoader::new()
    ///         .without_env()
    ///         .with_yaml_str("api:\n  key: \"${DOC_FLICKR_KEY}\"")
    ///         .load()
    ///         .expect("valid configuration");
    ///     assert_eq!(config.api.key, "injected-from-env");
    /// });
    /// ```
    pub fn load(self) -> Result<FlickConfig, ConfigError> {
        let mut builder = self.builder;
        if self.include_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        }
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
