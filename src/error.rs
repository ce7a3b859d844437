//! Error types for the ServiceDesk Plus client.
//!
//! This module defines `SdpError`, the unified error type returned by every
//! fallible operation in the crate.
//!
//! # Security
//!
//! The technician key travels in the query string of every call, so
//! transport errors are stripped of their URL before they are wrapped and
//! response excerpts are passed through `sanitize_message()`.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for all client operations.
///
/// A vendor-reported failure (`status` other than `Success`) is *not* an
/// error: it is returned as data in [`OperationResult`](crate::models::OperationResult).
#[derive(Error, Debug)]
pub enum SdpError {
    /// Configuration error - missing or invalid values.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, sanitized and truncated.
        body: String,
    },

    /// The attachment to upload could not be read.
    #[error("failed to read attachment {}: {source}", path.display())]
    Attachment {
        /// Path of the attachment on the local filesystem.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The response body is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The response body parsed, but its element structure is broken.
    #[error("malformed XML response: {0}")]
    MalformedXml(String),

    /// A required element is absent from the response.
    #[error("missing element in response: {0}")]
    MissingElement(String),

    /// A response tree could not be reshaped into records.
    #[error("unexpected response shape: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An epoch timestamp field did not hold a number.
    #[error("invalid epoch timestamp: {value:?}")]
    InvalidTimestamp {
        /// The raw field value.
        value: String,
    },

    /// No technician with the given display name exists.
    #[error("technician not found: {name}")]
    TechnicianNotFound {
        /// The display name that was looked up.
        name: String,
    },

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Connection test failed.
    #[error("connection test failed: {message}")]
    ConnectionTest {
        /// Details about why the connection test failed.
        message: String,
    },
}

impl SdpError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        SdpError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        SdpError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        SdpError::Validation(message.into())
    }

    /// Creates a malformed XML error.
    pub fn malformed(message: impl Into<String>) -> Self {
        SdpError::MalformedXml(message.into())
    }

    /// Creates a missing element error.
    pub fn missing_element(path: impl Into<String>) -> Self {
        SdpError::MissingElement(path.into())
    }

    /// Creates a technician lookup miss.
    pub fn technician_not_found(name: impl Into<String>) -> Self {
        SdpError::TechnicianNotFound { name: name.into() }
    }

    /// Creates a connection test error.
    pub fn connection_test(message: impl Into<String>) -> Self {
        SdpError::ConnectionTest {
            message: message.into(),
        }
    }

    /// Wraps a transport error, dropping the request URL.
    ///
    /// The URL carries `TECHNICIAN_KEY` in its query string.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        SdpError::Http(err.without_url())
    }

    /// Returns true if the failure happened before a response was parsed.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SdpError::Http(_) | SdpError::HttpStatus { .. } | SdpError::Attachment { .. }
        )
    }

    /// Returns true if the response body could not be understood.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            SdpError::Xml(_)
                | SdpError::MalformedXml(_)
                | SdpError::MissingElement(_)
                | SdpError::Serialization(_)
                | SdpError::InvalidTimestamp { .. }
        )
    }

    /// Sanitizes an error message to remove any occurrence of the API key.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to sanitize
    /// * `api_key` - The API key to strip from the message
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the API key replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, api_key: &str) -> String {
        if api_key.is_empty() {
            return message.to_string();
        }
        message.replace(api_key, "[REDACTED]")
    }

    /// Creates a sanitized version of this error's display message.
    #[must_use]
    pub fn sanitized_display(&self, api_key: &str) -> String {
        Self::sanitize_message(&self.to_string(), api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_error() {
        let err = SdpError::missing_env("SDP_API_KEY");
        assert!(err.to_string().contains("SDP_API_KEY"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_validation_error() {
        let err = SdpError::validation("request_id must be numeric");
        assert_eq!(err.to_string(), "validation error: request_id must be numeric");
    }

    #[test]
    fn test_technician_not_found_error() {
        let err = SdpError::technician_not_found("Carol");
        assert_eq!(err.to_string(), "technician not found: Carol");
        assert!(!err.is_transport());
        assert!(!err.is_parse());
    }

    #[test]
    fn test_attachment_error_names_path() {
        let err = SdpError::Attachment {
            path: PathBuf::from("/tmp/missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.txt"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_parse_errors_are_classified() {
        assert!(SdpError::malformed("unclosed element").is_parse());
        assert!(SdpError::missing_element("result").is_parse());
        assert!(SdpError::InvalidTimestamp {
            value: "soon".to_string()
        }
        .is_parse());
    }

    #[test]
    fn test_http_status_is_transport() {
        let err = SdpError::HttpStatus {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream".to_string(),
        };
        assert!(err.is_transport());
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_sanitize_message_removes_api_key() {
        let api_key = "super_secret_key_12345";
        let message = format!("GET /sdpapi/request?TECHNICIAN_KEY={} failed", api_key);
        let sanitized = SdpError::sanitize_message(&message, api_key);
        assert!(!sanitized.contains(api_key));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_key() {
        let message = "Some error message";
        let sanitized = SdpError::sanitize_message(message, "");
        assert_eq!(sanitized, message);
    }

    #[test]
    fn test_sanitized_display() {
        let err = SdpError::connection_test("key abc123 rejected");
        let shown = err.sanitized_display("abc123");
        assert!(shown.contains("connection test failed"));
        assert!(!shown.contains("abc123"));
    }
}
