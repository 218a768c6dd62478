use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientError {
    Config(String),
    Network(String),
    Timeout(String),
    Http { status: u16, message: String },
    Parse(String),
    Serialization(String),
    Storage(String),
}

impl ClientError {
    /// HTTP status of the failed response, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message without the category prefix, suitable for form feedback.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ClientError::Config(message)
            | ClientError::Network(message)
            | ClientError::Timeout(message)
            | ClientError::Http { message, .. }
            | ClientError::Parse(message)
            | ClientError::Serialization(message)
            | ClientError::Storage(message) => message,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Config(message) => write!(formatter, "Config error: {message}"),
            ClientError::Network(message) => write!(formatter, "Network error: {message}"),
            ClientError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            ClientError::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            ClientError::Parse(message) => write!(formatter, "Response error: {message}"),
            ClientError::Serialization(message) => {
                write!(formatter, "Request error: {message}")
            }
            ClientError::Storage(message) => write!(formatter, "Token storage error: {message}"),
        }
    }
}

impl std::error::Error for ClientError {}
