//! Session error types

use std::fmt;
use wbunit_transport::{RemoteFault, TransportError};

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur over a session lifecycle
#[derive(Debug)]
pub enum SessionError {
    /// The requested Workbench version has no installation root configured
    Config(String),

    /// `initialize` was called while the session is already running
    AlreadyStarted,

    /// A command was issued before `initialize`
    NotInitialized,

    /// The Workbench process could not be spawned
    Spawn(std::io::Error),

    /// The process never reported its server address within the handshake
    /// timeout
    StartupTimeout,

    /// The handshake record was present but could not be parsed
    Handshake(String),

    /// Wire exchange failure or a remote script fault
    Transport(TransportError),

    /// I/O error around the handshake file or teardown
    Io(std::io::Error),
}

impl SessionError {
    /// The remote script fault behind this error, if any.
    pub fn remote_fault(&self) -> Option<&RemoteFault> {
        match self {
            Self::Transport(TransportError::Remote(fault)) => Some(fault),
            _ => None,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::AlreadyStarted => write!(f, "Workbench client already started"),
            Self::NotInitialized => write!(f, "Session not initialized; call initialize() first"),
            Self::Spawn(err) => write!(f, "Failed to spawn Workbench: {}", err),
            Self::StartupTimeout => {
                write!(f, "Workbench did not report its server address in time")
            }
            Self::Handshake(msg) => write!(f, "Invalid handshake record: {}", msg),
            Self::Transport(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
