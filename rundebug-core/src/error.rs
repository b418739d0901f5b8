//! Error types for settings registration and bisect patterns.

use thiserror::Error;

/// Errors raised when registering or configuring settings.
#[derive(Error, Debug)]
pub enum FlagError {
    #[error("invalid setting name {0:?}: names must be non-empty and must not contain ',', '=' or '#'")]
    InvalidName(String),

    /// The same key registered both with and without the internal marker.
    #[error("setting {requested:?} conflicts with registered {registered:?}")]
    Conflict { requested: String, registered: String },

    #[error(transparent)]
    Config(#[from] rundebug_config::ConfigError),
}

/// Errors raised while parsing a bisect directive or rule.
///
/// Lookups never surface these: an unparseable pattern simply forces nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BisectError {
    #[error("empty bisect pattern")]
    Empty,

    #[error("bisect directive {0:?} does not name a setting")]
    MissingSetting(String),

    #[error("invalid bisect term {0:?}")]
    InvalidTerm(String),

    #[error("invalid ordinal range {0:?}")]
    InvalidRange(String),

    #[error("hash suffix {0:?} is longer than 64 bits")]
    SuffixTooLong(String),
}

pub type Result<T> = std::result::Result<T, FlagError>;
