#![forbid(unsafe_code)]

use std::path::PathBuf;

use cyclegrid_core::RequestKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Why a dataset could not be produced.
///
/// The engine treats every variant the same way (keep the previous dataset,
/// show the message), so the split exists for logs and tests.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no fixture for {key} in {dir}")]
    MissingFixture { key: RequestKey, dir: PathBuf },

    #[error("base {base} outside the supported range {min}..={max}")]
    BaseOutOfRange { base: i64, min: i64, max: i64 },
}

impl FetchError {
    /// Whether trying the same request again could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FetchError;
    use cyclegrid_core::{AddressingMode, RequestKey};

    #[test]
    fn server_errors_are_transient_client_errors_are_not() {
        let busy = FetchError::Status {
            status: 503,
            url: "http://localhost:8000/cycles?base=4&centered=false".to_string(),
        };
        let rejected = FetchError::Status {
            status: 422,
            url: "http://localhost:8000/cycles?base=0&centered=false".to_string(),
        };
        assert!(busy.is_transient());
        assert!(!rejected.is_transient());
    }

    #[test]
    fn missing_fixture_names_the_request() {
        let error = FetchError::MissingFixture {
            key: RequestKey::new(9, AddressingMode::Centered),
            dir: "fixtures".into(),
        };
        assert_eq!(error.to_string(), "no fixture for base=9 (centered) in fixtures");
        assert!(!error.is_transient());
    }
}
