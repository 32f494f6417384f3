use std::{
    fs,
    path::{Path, PathBuf},
};

use chapterskip_model::SkipSettings;

pub mod error;

use error::ConfigLoadError;

use crate::{
    models::{
        Config, ConfigMetadata, PatternSource,
        sources::{
            ENV_CASE_INSENSITIVE, ENV_NOTIFY, ENV_NOTIFY_TIMEOUT, EnvConfig, FileConfig,
        },
    },
    util::parse_bool,
    validation::{ConfigWarnings, apply_guard_rails},
};

const DEFAULT_CONFIG_LOCATIONS: &[&str] = &[
    "chapterskip.toml",
    "config/chapterskip.toml",
    "chapterskip.json",
];

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Result of a successful load: the config plus non-fatal findings.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, then compose defaults, file and process environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose against an explicit environment snapshot and apply guard rails.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        let config = self.compose(env)?;
        let warnings = apply_guard_rails(&config)?;
        Ok(ConfigLoad { config, warnings })
    }

    /// Compose without guard rails; callers validate separately.
    pub fn compose(&self, env: EnvConfig) -> Result<Config, ConfigLoadError> {
        let config_path = self.resolve_config_path(&env)?;

        let mut skip = SkipSettings::default();
        let mut pattern_source = PatternSource::Default;

        if let Some(path) = &config_path {
            let file_config = read_file_config(path)?;
            if file_config.skip.apply_to(&mut skip) {
                pattern_source = PatternSource::File(path.clone());
            }
        }

        if let Some(pattern) = env.match_pattern {
            skip.match_pattern = Some(pattern);
            pattern_source = PatternSource::Env;
        }
        if let Some(raw) = env.case_insensitive {
            skip.case_insensitive = env_bool(ENV_CASE_INSENSITIVE, &raw)?;
        }
        if let Some(raw) = env.notify {
            skip.notification.enabled = env_bool(ENV_NOTIFY, &raw)?;
        }
        if let Some(header) = env.notify_header {
            skip.notification.header = header;
        }
        if let Some(raw) = env.notify_timeout {
            let timeout = humantime::parse_duration(raw.trim()).map_err(|err| {
                ConfigLoadError::InvalidEnv {
                    var: ENV_NOTIFY_TIMEOUT,
                    reason: err.to_string(),
                }
            })?;
            skip.notification.timeout_ms =
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        }

        Ok(Config {
            skip,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
                pattern_source,
            },
        })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        self.read_env_file(false)
    }

    /// Re-read the env file, letting its values replace ones it set earlier.
    pub fn refresh_env_file(&self) -> Result<bool, ConfigLoadError> {
        self.read_env_file(true)
    }

    fn read_env_file(&self, replace: bool) -> Result<bool, ConfigLoadError> {
        let result = match (&self.options.env_file, replace) {
            (Some(path), false) => dotenvy::from_path(path),
            (Some(path), true) => dotenvy::from_path_override(path),
            (None, false) => dotenvy::dotenv().map(|_| ()),
            (None, true) => dotenvy::dotenv_override().map(|_| ()),
        };
        match result {
            Ok(()) => Ok(true),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Explicit path, then `$CHAPTER_SKIP_CONFIG`, then the first default
    /// location that exists. Only the default search tolerates absence.
    fn resolve_config_path(
        &self,
        env: &EnvConfig,
    ) -> Result<Option<PathBuf>, ConfigLoadError> {
        let requested = self
            .options
            .config_path
            .as_ref()
            .or(env.config_path.as_ref());

        if let Some(path) = requested {
            if !path.exists() {
                return Err(ConfigLoadError::MissingConfig { path: path.clone() });
            }
            return Ok(Some(path.clone()));
        }

        Ok(DEFAULT_CONFIG_LOCATIONS
            .iter()
            .map(Path::new)
            .find(|candidate| candidate.exists())
            .map(Path::to_path_buf))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|err| {
            ConfigLoadError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            }
        }),
        _ => toml::from_str(&contents).map_err(|err| ConfigLoadError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

fn env_bool(var: &'static str, raw: &str) -> Result<bool, ConfigLoadError> {
    parse_bool(raw).ok_or_else(|| ConfigLoadError::InvalidEnv {
        var,
        reason: format!("expected a boolean, got '{raw}'"),
    })
}
