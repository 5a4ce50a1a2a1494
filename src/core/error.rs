use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Received empty webhook payload")]
    EmptyPayload,

    #[error("{0}")]
    InvalidPayload(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

impl BridgeError {
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    pub fn missing(parameter: impl Into<String>) -> Self {
        Self::MissingParameter(parameter.into())
    }

    /// Stable machine-readable code, used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyPayload => "empty_payload",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::UnknownOperation(_) => "unknown_operation",
            Self::UnknownResource(_) => "unknown_resource",
            Self::MissingParameter(_) => "missing_parameter",
            Self::Config(_) => "config_error",
            Self::Upstream(_) => "upstream_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BridgeError::EmptyPayload.to_string(),
            "Received empty webhook payload"
        );
        assert_eq!(
            BridgeError::UnknownOperation("sendFax".to_string()).to_string(),
            "Unknown operation: sendFax"
        );
        assert_eq!(BridgeError::missing("to").code(), "missing_parameter");
    }

    #[test]
    fn test_serde_error_becomes_invalid_payload() {
        let err = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        assert!(matches!(
            BridgeError::from(err),
            BridgeError::InvalidPayload(_)
        ));
    }
}
