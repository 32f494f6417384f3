use std::path::PathBuf;

use chapterskip_model::SkipSettings;

pub mod sources;

/// Where the effective match pattern came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PatternSource {
    #[default]
    Default,
    File(PathBuf),
    Env,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
    pub pattern_source: PatternSource,
}

/// Fully composed configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub skip: SkipSettings,
    pub metadata: ConfigMetadata,
}
