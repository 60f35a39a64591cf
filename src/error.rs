use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum PpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No API key configured for the generation service")]
    MissingApiKey,

    #[error("Generation service returned no usable content")]
    EmptyResponse,

    #[error("Failed to decode generation response: {message}")]
    MalformedResponse { message: String },

    #[error("Generation API error (status: {status:?}): {message}")]
    Api {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PpsError {
    pub fn api(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        PpsError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        PpsError::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        PpsError::Precondition(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            PpsError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            PpsError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            PpsError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify the base URL format (e.g., https://example.com).",
            ),
            PpsError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check JSON inputs; run with --verbose for details.",
            ),
            PpsError::MissingApiKey => ErrorPayload::new(
                ErrorCategory::Credential,
                self.to_string(),
                "Set PPS_API_KEY (or pass --api-key) before calling the generation service.",
            ),
            PpsError::EmptyResponse => ErrorPayload::new(
                ErrorCategory::Service,
                self.to_string(),
                "The service returned nothing usable; retry or adjust the inputs.",
            ),
            PpsError::MalformedResponse { message } => ErrorPayload::new(
                ErrorCategory::Service,
                format!("Failed to decode generation response: {message}"),
                "The service returned text that could not be decoded; retry the request.",
            ),
            PpsError::Api { status, message } => ErrorPayload::new(
                ErrorCategory::Service,
                format!("Generation API error (status {:?}): {}", status, message),
                "Check the API key, model availability, and rate limits; retry after waiting.",
            ),
            PpsError::Precondition(msg) => ErrorPayload::new(
                ErrorCategory::Validation,
                msg.to_string(),
                precondition_hint(msg),
            ),
            PpsError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("api key") || lower.contains("pps_api_key") {
                    ErrorPayload::new(
                        ErrorCategory::Credential,
                        msg.to_string(),
                        "Set PPS_API_KEY before running generation commands.",
                    )
                } else if lower.contains("style") || lower.contains("typography") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Run `pps styles` to list the available style and typography ids.",
                    )
                } else if lower.contains("aspect ratio") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use one of: 1:1, 16:9, 9:16, 3:4, 4:3, 2:3, 3:2.",
                    )
                } else if lower.contains("not found") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Verify the file exists; use an absolute path or run from the working directory.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and the config file; run with --verbose for details.",
                    )
                }
            }
        }
    }
}

fn precondition_hint(msg: &str) -> &'static str {
    let lower = msg.to_ascii_lowercase();
    if lower.contains("analysis") {
        "Run the analysis step (or pass --analysis FILE) before generating prompts."
    } else if lower.contains("english prompt") {
        "Only records with an extracted English prompt can be rendered; inspect fullContent."
    } else if lower.contains("reference image") {
        "Pass at least one --image so the render call can condition on the product."
    } else {
        "Complete the missing selection before retrying."
    }
}

impl From<crate::reference::ReferenceImageError> for PpsError {
    fn from(err: crate::reference::ReferenceImageError) -> Self {
        PpsError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PpsError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Credential,
    Network,
    Service,
    Validation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
