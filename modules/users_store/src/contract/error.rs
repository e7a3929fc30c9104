use thiserror::Error;

/// Faults raised by a remote collection client.
///
/// The cache does not distinguish between variants; they exist so adapters
/// can report what went wrong in logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },
}

impl RemoteError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::Status { status }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }
}
