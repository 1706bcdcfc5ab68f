//! Normalized API errors
//!
//! Every failure coming out of the HTTP pipeline is turned into an [`ApiError`].
//! Callers decide whether and how to display it.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Error returned by a [`Transport`](super::Transport) when no HTTP response was received
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Field-level validation messages in the order the server sent them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    pub fn new(fields: Vec<(String, Vec<String>)>) -> Self {
        Self(fields)
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(field, messages)| {
                let messages = match messages {
                    Value::Array(items) => items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s),
                            Value::Null => None,
                            other => Some(other.to_string()),
                        })
                        .collect(),
                    Value::String(s) => vec![s],
                    _ => Vec::new(),
                };
                (field, messages)
            })
            .collect();
        Self(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, messages)| messages.is_empty())
    }

    /// Messages for a single field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// All messages flattened into one display string, one per line
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .flat_map(|(_, messages)| messages.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Laravel error body: `{ "message": ..., "errors": { field: [..] } }`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Map<String, Value>>,
}

impl ErrorPayload {
    /// Parse a response body, tolerating empty or non-JSON bodies
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn message(&self) -> Option<String> {
        self.message.clone().filter(|m| !m.trim().is_empty())
    }

    pub fn field_errors(&mut self) -> FieldErrors {
        self.errors
            .take()
            .map(FieldErrors::from_map)
            .unwrap_or_default()
    }
}

/// Errors surfaced by the HTTP pipeline
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (network down, timeout, CORS)
    #[error("{0}")]
    Transport(String),

    /// 422 with per-field messages
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    /// 401/419 from the identity check: there is simply no session
    #[error("{message}")]
    Unauthenticated { message: String },

    /// 401/419 from the login endpoint: the credentials were rejected
    #[error("{message}")]
    InvalidCredentials { message: String },

    /// 401/419 from any other endpoint; a full reload has been requested
    #[error("Session expired")]
    SessionExpired,

    /// Any other non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(422),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_)
            | ApiError::Unauthenticated { .. }
            | ApiError::InvalidCredentials { .. }
            | ApiError::SessionExpired
            | ApiError::Decode(_) => None,
        }
    }

    /// Message to show the user.
    ///
    /// Validation failures show every field message, one per line.
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Validation { message, fields } if fields.is_empty() => message.clone(),
            ApiError::Validation { fields, .. } => fields.joined(),
            other => other.to_string(),
        }
    }

    /// Whether this error should ever reach a toast/banner.
    ///
    /// A missing session is expected state, and an expired one is handled by the reload.
    pub fn is_presentable(&self) -> bool {
        !matches!(
            self,
            ApiError::Unauthenticated { .. } | ApiError::SessionExpired
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.0)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_parses_message_and_errors() {
        let mut payload = ErrorPayload::parse(
            r#"{"message":"The given data was invalid.","errors":{"email":["required"],"password":["too short","invalid"]}}"#,
        );

        assert_eq!(
            payload.message(),
            Some("The given data was invalid.".to_string())
        );

        let fields = payload.field_errors();
        assert_eq!(fields.get("email"), Some(&["required".to_string()][..]));
        assert_eq!(fields.joined(), "required\ntoo short\ninvalid");
    }

    #[test]
    fn test_payload_keeps_server_field_order() {
        let mut payload =
            ErrorPayload::parse(r#"{"errors":{"zeta":["z"],"alpha":["a"],"mid":["m"]}}"#);
        assert_eq!(payload.field_errors().joined(), "z\na\nm");
    }

    #[test]
    fn test_payload_tolerates_garbage() {
        let payload = ErrorPayload::parse("<html>Bad Gateway</html>");
        assert!(payload.message().is_none());
        assert!(payload.errors.is_none());

        let payload = ErrorPayload::parse("");
        assert!(payload.message().is_none());
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let payload = ErrorPayload::parse(r#"{"message":"  "}"#);
        assert!(payload.message().is_none());
    }

    #[test]
    fn test_single_string_field_error() {
        let mut payload = ErrorPayload::parse(r#"{"errors":{"email":"taken"}}"#);
        assert_eq!(payload.field_errors().joined(), "taken");
    }

    #[test]
    fn test_validation_display_message_flattens_fields() {
        let err = ApiError::Validation {
            message: "The password field is invalid.".to_string(),
            fields: FieldErrors::new(vec![("password".to_string(), vec!["invalid".to_string()])]),
        };

        assert_eq!(err.display_message(), "invalid");
        assert_eq!(err.to_string(), "The password field is invalid.");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_validation_without_fields_uses_message() {
        let err = ApiError::Validation {
            message: "Unprocessable".to_string(),
            fields: FieldErrors::default(),
        };
        assert_eq!(err.display_message(), "Unprocessable");
    }

    #[test]
    fn test_presentable() {
        assert!(!ApiError::SessionExpired.is_presentable());
        assert!(
            !ApiError::Unauthenticated {
                message: "Unauthenticated.".to_string()
            }
            .is_presentable()
        );
        assert!(
            ApiError::InvalidCredentials {
                message: "These credentials do not match our records.".to_string()
            }
            .is_presentable()
        );
        assert!(ApiError::Transport("Network Error".to_string()).is_presentable());
        assert!(
            ApiError::Status {
                status: 500,
                message: "Server Error".to_string()
            }
            .is_presentable()
        );
    }

    #[test]
    fn test_transport_error_converts() {
        let err: ApiError = TransportError::new("timeout").into();
        assert_eq!(err, ApiError::Transport("timeout".to_string()));
        assert_eq!(err.display_message(), "timeout");
        assert_eq!(err.status(), None);
    }
}
