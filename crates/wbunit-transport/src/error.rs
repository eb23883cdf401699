//! Transport error types and remote fault classification

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Substring that marks an embedded script fault in a response.
pub const EXCEPTION_MARKER: &str = "Exception:";

/// Errors that can occur during a wire exchange
#[derive(Debug)]
pub enum TransportError {
    /// Failed to open a connection to the server
    Connect(std::io::Error),

    /// I/O error while sending or receiving
    Io(std::io::Error),

    /// Exchange exceeded the configured timeout
    Timeout,

    /// Response bytes were not valid UTF-8
    Utf8(std::string::FromUtf8Error),

    /// Script fault reported by the remote side
    Remote(RemoteFault),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(err) => write!(f, "Connection error: {}", err),
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Timeout => write!(f, "Timeout"),
            Self::Utf8(err) => write!(f, "Invalid UTF-8 in response: {}", err),
            Self::Remote(fault) => write!(f, "{}", fault),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<std::string::FromUtf8Error> for TransportError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Utf8(err)
    }
}

/// Kinds of script faults the server embeds in response text.
///
/// Closed set with an explicit fallback: a fault whose kind token is not
/// recognized classifies as [`FaultKind::Runtime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// A script name was referenced before assignment
    UnboundName,

    /// A command received an invalid argument
    CommandArgument,

    /// An attribute or member lookup failed remotely
    MissingMember,

    /// A command ran but reported failure
    CommandFailed,

    /// A command received more arguments than it accepts
    TooManyArguments,

    /// Unrecognized fault kind; carries the full response text
    Runtime,
}

/// A script fault extracted from response text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFault {
    /// Classified fault kind
    pub kind: FaultKind,

    /// Trimmed fault message, or the full response text for
    /// [`FaultKind::Runtime`]
    pub message: String,
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FaultKind::UnboundName => write!(f, "Unbound name: {}", self.message),
            FaultKind::CommandArgument => write!(f, "Command argument error: {}", self.message),
            FaultKind::MissingMember => write!(f, "Missing member: {}", self.message),
            FaultKind::CommandFailed => write!(f, "Command failed: {}", self.message),
            FaultKind::TooManyArguments => write!(f, "Too many arguments: {}", self.message),
            FaultKind::Runtime => write!(f, "Remote fault: {}", self.message),
        }
    }
}

fn fault_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\w*Exception):\s*(\w+.*)").expect("valid fault pattern"))
}

/// Classify response text that carries the exception marker.
///
/// Recognized kind tokens map to their [`FaultKind`] with the trimmed
/// message; an unrecognized token or a response that does not match the
/// expected `<kind>Exception: <message>` shape falls back to
/// [`FaultKind::Runtime`] carrying the original full text.
pub fn classify_fault(response: &str) -> RemoteFault {
    let runtime = || RemoteFault {
        kind: FaultKind::Runtime,
        message: response.to_string(),
    };

    let Some(caps) = fault_pattern().captures(response) else {
        return runtime();
    };

    let kind = match &caps[1] {
        "UnboundNameException" => FaultKind::UnboundName,
        "CommandArgumentException" => FaultKind::CommandArgument,
        "MissingMemberException" => FaultKind::MissingMember,
        "CommandFailedException" => FaultKind::CommandFailed,
        "TooManyArgumentsException" => FaultKind::TooManyArguments,
        _ => return runtime(),
    };

    RemoteFault {
        kind,
        message: caps[2].trim().to_string(),
    }
}
