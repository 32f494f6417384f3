//! A [`ConfigurationSource`] backed by the loader, re-read on demand.

use chapterskip_core::{ConfigurationSource, InMemoryConfigSource};
use chapterskip_model::{ConfigChanged, SkipSettings};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::{
    loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError},
    models::{Config, ConfigMetadata, sources::EnvConfig},
    validation::{ConfigWarnings, apply_guard_rails},
};

/// Where a reload takes its environment overrides from.
#[derive(Debug, Clone)]
enum EnvSource {
    /// Re-read the env file and the process environment on every reload.
    Process,
    /// A caller-supplied snapshot, replaced through
    /// [`ReloadableConfigSource::set_env`].
    Fixed(EnvConfig),
}

/// Serves loaded settings to a controller and republishes them on
/// [`ReloadableConfigSource::reload`].
///
/// A reload whose pattern fails to compile still publishes the new settings,
/// so the controller drops the old pattern and stays disabled until the file
/// is fixed. A reload that cannot read or parse the file keeps the previous
/// settings.
#[derive(Debug)]
pub struct ReloadableConfigSource {
    loader: ConfigLoader,
    env: Mutex<EnvSource>,
    metadata: Mutex<ConfigMetadata>,
    inner: InMemoryConfigSource,
}

impl ReloadableConfigSource {
    /// Load strictly from the env file and process environment; fails on any
    /// guard-rail error. Reloads read both again.
    pub fn open(loader: ConfigLoader) -> Result<(Self, ConfigWarnings), ConfigLoadError> {
        let ConfigLoad { config, warnings } = loader.load()?;
        Ok((Self::from_parts(loader, EnvSource::Process, config), warnings))
    }

    /// Load against an injected environment snapshot instead of the process.
    pub fn open_with_env(
        loader: ConfigLoader,
        env: EnvConfig,
    ) -> Result<(Self, ConfigWarnings), ConfigLoadError> {
        let ConfigLoad { config, warnings } = loader.load_with_env(env.clone())?;
        Ok((Self::from_parts(loader, EnvSource::Fixed(env), config), warnings))
    }

    fn from_parts(loader: ConfigLoader, env: EnvSource, config: Config) -> Self {
        Self {
            loader,
            env: Mutex::new(env),
            metadata: Mutex::new(config.metadata),
            inner: InMemoryConfigSource::new(config.skip),
        }
    }

    /// Replace the environment snapshot used by later reloads.
    pub fn set_env(&self, env: EnvConfig) {
        *self.env.lock() = EnvSource::Fixed(env);
    }

    fn current_env(&self) -> Result<(EnvConfig, bool), ConfigLoadError> {
        let source = self.env.lock().clone();
        match source {
            EnvSource::Fixed(env) => Ok((env, false)),
            EnvSource::Process => {
                let env_file_loaded = self.loader.refresh_env_file()?;
                Ok((EnvConfig::gather(), env_file_loaded))
            }
        }
    }

    pub fn metadata(&self) -> ConfigMetadata {
        self.metadata.lock().clone()
    }

    pub fn revision(&self) -> u64 {
        self.inner.revision()
    }

    /// Re-read the file and environment and notify subscribers.
    pub fn reload(&self) -> Result<ConfigWarnings, ConfigLoadError> {
        let composed = self.current_env().and_then(|(env, env_file_loaded)| {
            let mut config = self.loader.compose(env)?;
            config.metadata.env_file_loaded = env_file_loaded;
            Ok(config)
        });
        let config = match composed {
            Ok(config) => config,
            Err(err) => {
                warn!(target: "chapterskip::config", error = %err, "reload failed; keeping previous settings");
                return Err(err);
            }
        };

        let checked = apply_guard_rails(&config);
        *self.metadata.lock() = config.metadata.clone();
        let change = self.inner.update(config.skip);

        match checked {
            Ok(warnings) => {
                for warning in warnings.iter() {
                    match &warning.hint {
                        Some(hint) => {
                            warn!(target: "chapterskip::config", message = %warning.message, hint = %hint, "configuration warning")
                        }
                        None => {
                            warn!(target: "chapterskip::config", message = %warning.message, "configuration warning")
                        }
                    }
                }
                info!(target: "chapterskip::config", revision = change.revision, "configuration reloaded");
                Ok(warnings)
            }
            Err(err) => {
                error!(target: "chapterskip::config", revision = change.revision, error = %err, "reloaded configuration has an invalid pattern");
                Err(err.into())
            }
        }
    }

    /// Publish settings directly, bypassing file and environment.
    pub fn replace(&self, settings: SkipSettings) -> ConfigChanged {
        self.inner.update(settings)
    }
}

impl ConfigurationSource for ReloadableConfigSource {
    fn current(&self) -> SkipSettings {
        self.inner.current()
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<ConfigChanged> {
        self.inner.subscribe_changes()
    }
}
