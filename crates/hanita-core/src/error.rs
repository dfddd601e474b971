//! Error types for hanita-core

use thiserror::Error;

/// Why an inbound payload was dropped before reaching the store
///
/// Rejections are handled where they occur: the payload is logged and
/// discarded, the connection stays open and nothing is sent back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// Payload bytes are not valid UTF-8
    #[error("payload is not valid UTF-8: {0}")]
    Encoding(String),

    /// Payload text is not a single JSON object
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// One or more required keys are absent
    #[error("missing required fields: {}", .missing.join(", "))]
    MissingFields { missing: Vec<&'static str> },

    /// A required key is present but holds the wrong JSON type
    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

impl RejectionReason {
    /// Short machine-friendly label, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "encoding",
            Self::MalformedJson(_) => "malformed_json",
            Self::MissingFields { .. } => "missing_fields",
            Self::InvalidField { .. } => "invalid_field",
        }
    }
}

/// An action string outside the `enter`/`quit` enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action {0:?}, expected \"enter\" or \"quit\"")]
pub struct UnknownAction(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_every_key() {
        let err = RejectionReason::MissingFields {
            missing: vec!["action", "timestamp"],
        };
        assert_eq!(
            err.to_string(),
            "missing required fields: action, timestamp"
        );
        assert_eq!(err.kind(), "missing_fields");
    }

    #[test]
    fn test_unknown_action_message() {
        let err = UnknownAction("leave".to_string());
        assert!(err.to_string().contains("\"leave\""));
    }
}
