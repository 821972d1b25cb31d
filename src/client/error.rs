use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed with status {status}: {detail}")]
    Http {
        url: String,
        status: u16,
        detail: String,
    },
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },
    #[error("server rejected the request: {0}")]
    Api(String),
    #[error("could not decode server response: {0}")]
    Decode(String),
    #[error("no work package running with the provided id")]
    NoSuchWorkPackage,
}

/// Response fragments that indicate the credentials themselves are bad.
/// Retrying with the same token cannot succeed, so callers treat these as
/// fatal instead of transient.
const FATAL_MARKERS: [&str; 5] = [
    "invalid_auth",
    "token_revoked",
    "unauthorized",
    "forbidden",
    "account_inactive",
];

impl ClientError {
    /// True when retrying the same request cannot help, typically because
    /// authentication was refused.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Http { status, detail, .. } => {
                matches!(*status, 401 | 403) || contains_fatal_marker(detail)
            }
            Self::Api(message) => contains_fatal_marker(message),
            Self::Transport { .. } | Self::Decode(_) | Self::NoSuchWorkPackage => false,
        }
    }
}

fn contains_fatal_marker(message: &str) -> bool {
    let lowered = message.to_lowercase();
    FATAL_MARKERS.iter().any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_status_codes_are_fatal() {
        let err = ClientError::Http {
            url: "https://eas.example.com:7624/api/graphql".to_string(),
            status: 401,
            detail: "no body".to_string(),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn auth_markers_in_api_errors_are_fatal() {
        assert!(ClientError::Api("token_revoked".to_string()).is_fatal());
        assert!(ClientError::Api("account_inactive: contact support".to_string()).is_fatal());
        assert!(!ClientError::Api("feeder not found".to_string()).is_fatal());
    }

    #[test]
    fn transport_failures_are_transient() {
        let err = ClientError::Transport {
            url: "https://eas.example.com:7624/api/graphql".to_string(),
            detail: "connection refused".to_string(),
        };
        assert!(!err.is_fatal());
    }
}
