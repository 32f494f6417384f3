//! Configuration library for the chapter skip service.
//!
//! Settings come from built-in defaults, an optional TOML or JSON file, an
//! optional `.env` file and the process environment, in that order of
//! increasing precedence. Loaded settings pass through guard rails that
//! reject patterns which do not compile and warn about ones that would skip
//! far more than intended.
#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod reload;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::{
    Config, ConfigMetadata, PatternSource,
    sources::{EnvConfig, FileConfig},
};
pub use reload::ReloadableConfigSource;
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings, apply_guard_rails};
