use serde::Deserialize;
use thiserror::Error;

/// Every way a single advisory request can fail.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// DNS, connection or timeout failure before a response arrived.
    #[error("Failed to reach the advisory service: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to read the advisory response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// 4xx response carrying the service's own error document.
    #[error("The advisory service rejected the request: {message} (code {code}, type {kind})")]
    Structured {
        message: String,
        code: i64,
        kind: String,
    },

    #[error("The main request failed with status code: {status} and body: {body}")]
    Unstructured { status: u16, body: String },

    /// Success status, but the body is not an advisory document.
    #[error("The advisory service returned a malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

/// `{"Error": {"Message": ..., "Code": ..., "Type": ...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(rename = "Error")]
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Code")]
    pub code: i64,
    #[serde(rename = "Type")]
    pub kind: String,
}

impl From<ErrorEnvelope> for AdvisoryError {
    fn from(envelope: ErrorEnvelope) -> Self {
        AdvisoryError::Structured {
            message: envelope.error.message,
            code: envelope.error.code,
            kind: envelope.error.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_display_mentions_all_fields() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"Error":{"Message":"bad tz","Code":4001,"Type":"validation"}}"#,
        )
        .expect("envelope should parse");

        let msg = AdvisoryError::from(envelope).to_string();
        assert!(msg.contains("bad tz"));
        assert!(msg.contains("4001"));
        assert!(msg.contains("validation"));
    }

    #[test]
    fn unstructured_display_mentions_status_and_body() {
        let err = AdvisoryError::Unstructured {
            status: 502,
            body: "upstream down".into(),
        };

        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream down"));
    }
}
