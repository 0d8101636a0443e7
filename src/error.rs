// =============================================================================
// Error taxonomy for graph requests
// =============================================================================

use thiserror::Error;

use crate::types::Ticker;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DashError {
    /// Provider call failed, returned malformed data, or the ticker is not
    /// part of the symbol universe.
    #[error("failed to load price history for {ticker}: {reason}")]
    DataFetch { ticker: Ticker, reason: String },

    #[error("unknown indicator: '{0}'")]
    UnknownIndicator(String),

    #[error("invalid argument for {indicator}: {reason}")]
    InvalidArgument { indicator: String, reason: String },

    /// Reserved: the parser falls back to text for any token, so this is
    /// only raised by explicit validation.
    #[error("could not parse argument token '{0}'")]
    ArgumentParse(String),
}

impl DashError {
    pub fn data_fetch(ticker: &Ticker, reason: impl std::fmt::Display) -> Self {
        Self::DataFetch {
            ticker: ticker.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_argument(indicator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            indicator: indicator.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable tag for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataFetch { .. } => "data_fetch",
            Self::UnknownIndicator(_) => "unknown_indicator",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::ArgumentParse(_) => "argument_parse",
        }
    }
}
