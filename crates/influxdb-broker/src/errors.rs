use thiserror::Error;

/// Errors raised while turning raw event text into structured data.
/// Always handled by skipping the offending input, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Token that cannot be read as perfdata.
    #[error("invalid perfdata token {0:?}")]
    NotPerfdata(String),
    /// Log line that matches no known event shape.
    #[error("unrecognized log event line")]
    UnsupportedLine,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
