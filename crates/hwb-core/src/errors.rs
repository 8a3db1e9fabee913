/// Core error type for the homework bot.
///
/// Adapter crates map their specific errors into this type so the poll loop
/// can decide between "fatal exit" and "log and continue" by matching on
/// [`Error::kind`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("review API responded with status {status}")]
    HttpStatus { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("review API returned invalid json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("review API error: {0}")]
    Api(String),

    #[error("unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("notification error: {0}")]
    Notification(String),
}

/// Coarse classification of [`Error`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Decode,
    Shape,
    Api,
    UnknownStatus,
    Notification,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::HttpStatus { .. } | Error::Transport(_) => ErrorKind::Transport,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Shape(_) => ErrorKind::Shape,
            Error::Api(_) => ErrorKind::Api,
            Error::UnknownStatus(_) => ErrorKind::UnknownStatus,
            Error::Notification(_) => ErrorKind::Notification,
        }
    }

    /// Only configuration errors stop the process; everything else costs one cycle.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_errors_are_fatal() {
        assert!(Error::Config("x".to_string()).is_fatal());
        assert!(!Error::HttpStatus { status: 503 }.is_fatal());
        assert!(!Error::Shape("x".to_string()).is_fatal());
        assert!(!Error::Api("x".to_string()).is_fatal());
        assert!(!Error::UnknownStatus("archived".to_string()).is_fatal());
        assert!(!Error::Notification("x".to_string()).is_fatal());
    }

    #[test]
    fn http_status_and_network_failures_share_transport_kind() {
        assert_eq!(
            Error::HttpStatus { status: 503 }.kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            Error::Transport("connection reset".to_string()).kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn malformed_json_converts_into_decode_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("<html>nope")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!err.is_fatal());
        assert!(err.to_string().starts_with("review API returned invalid json: "));
    }
}
