// src/error.rs
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum SerpxError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export backend '{0}' is not available in this build")]
    DependencyUnavailable(&'static str),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Search API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SerpxError {
    pub fn code_str(&self) -> &'static str {
        match self {
            SerpxError::MalformedInput(_) => "malformed_input",
            SerpxError::Serialization(_) => "serialization_error",
            SerpxError::DependencyUnavailable(_) => "dependency_unavailable",
            SerpxError::InvalidParams(_) => "invalid_params",
            SerpxError::Authentication(_) => "auth_failed",
            SerpxError::HttpRequest(_) | SerpxError::Upstream { .. } => "upstream_error",
            SerpxError::Config(_) => "config_error",
            SerpxError::Io(_) => "io_error",
        }
    }

    /// Whether the failure came from the caller's input rather than the
    /// environment (network, config, build features).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SerpxError::MalformedInput(_) | SerpxError::InvalidParams(_)
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "code": self.code_str(),
            "message": self.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, SerpxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_and_environment_errors_are_told_apart() {
        let err = SerpxError::MalformedInput("invalid JSON".into());
        assert_eq!(err.code_str(), "malformed_input");
        assert!(err.is_input_error());
        assert!(SerpxError::InvalidParams("num".into()).is_input_error());
        assert!(!SerpxError::Config("bad".into()).is_input_error());
    }

    #[test]
    fn error_json_carries_code_and_message() {
        let err = SerpxError::DependencyUnavailable("csv");
        let value = err.to_json();
        assert_eq!(value["code"], "dependency_unavailable");
        assert_eq!(
            value["message"],
            "Export backend 'csv' is not available in this build"
        );
        assert!(!err.is_input_error());
    }
}
