use thiserror::Error;

/// Problems with the contents of an import file or a rule definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: missing required field '{field}'")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: amount '{raw}' is not a number")]
    InvalidAmount { line: usize, raw: String },

    #[error("line {line}: type '{raw}' must be income or expense")]
    InvalidType { line: usize, raw: String },

    #[error("line {line}: date '{raw}' must be YYYY-MM-DD")]
    InvalidDate { line: usize, raw: String },

    #[error("amount for '{0}' is not a finite number")]
    NonFiniteAmount(String),

    #[error("amount bounds must be finite numbers")]
    NonFiniteBound,

    #[error("min amount {min} is greater than max amount {max}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("rule needs at least one of keyword, merchant, min or max")]
    EmptyRule,

    #[error("rule must assign a category or at least one tag")]
    NoAssignment,
}

#[derive(Error, Debug)]
pub enum HqError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Permission denied: role '{role}' cannot {action}")]
    PermissionDenied { role: String, action: &'static str },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HqError>;
