//! The scheduling core's only fallible public surface: CLI argument
//! parsing. Invariant violations elsewhere are programming errors
//! asserted with `debug_assert!`, not propagated `Result`s.

/// Errors raised while parsing the CLI surface.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cpu_count must be between 1 and 16, got {0}")]
    InvalidCpuCount(String),

    #[error("unrecognized policy flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag {0}")]
    MissingValue(String),

    #[error("invalid numeric value for {flag}: {value}")]
    InvalidNumber { flag: &'static str, value: String },
}
