//! Domain error types.

/// Top-level error type for papertrader.
#[derive(Debug, thiserror::Error)]
pub enum PapertraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no historical data for {ticker}")]
    NoData { ticker: String },

    #[error("no historical data for any ticker in the universe")]
    EmptyUniverse,

    #[error("no trading dates between {start} and {end}")]
    NoTradingDates { start: String, end: String },

    #[error("invalid simulation window: start {start} is after end {end}")]
    InvalidWindow { start: String, end: String },

    #[error("decision agent failed: {reason}")]
    Agent { reason: String },

    #[error("data error for {ticker}: {reason}")]
    Data { ticker: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PapertraderError> for std::process::ExitCode {
    fn from(err: &PapertraderError) -> Self {
        let code: u8 = match err {
            PapertraderError::Io(_) | PapertraderError::Json(_) => 1,
            PapertraderError::ConfigParse { .. }
            | PapertraderError::ConfigMissing { .. }
            | PapertraderError::ConfigInvalid { .. } => 2,
            PapertraderError::Agent { .. } => 3,
            PapertraderError::NoData { .. }
            | PapertraderError::EmptyUniverse
            | PapertraderError::NoTradingDates { .. }
            | PapertraderError::InvalidWindow { .. }
            | PapertraderError::Data { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
