use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkipError {
    #[error("invalid chapter match pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("chapter skip controller is already running")]
    AlreadyRunning,
}

pub type Result<T> = std::result::Result<T, SkipError>;
