//! Server address parsed from a handshake `host:port` token

use std::fmt;
use std::str::FromStr;

/// Address of a running aaS scripting server.
///
/// Parsed once from the handshake record and immutable for the lifetime of
/// the client that targets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Host name or IP the server listens on
    pub host: String,

    /// TCP port the server bound at startup
    pub port: u16,
}

impl Address {
    /// Create an address from its parts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let token = s.trim();
        let (host, port) = token
            .rsplit_once(':')
            .ok_or_else(|| AddressParseError::new(format!("missing ':' in {:?}", token)))?;
        if host.is_empty() {
            return Err(AddressParseError::new(format!("empty host in {:?}", token)));
        }
        let port = port
            .parse::<u16>()
            .map_err(|e| AddressParseError::new(format!("bad port in {:?}: {}", token, e)))?;
        Ok(Self::new(host, port))
    }
}

/// Error produced when a `host:port` token cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressParseError(String);

impl AddressParseError {
    fn new(msg: String) -> Self {
        Self(msg)
    }
}

impl fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid server address: {}", self.0)
    }
}

impl std::error::Error for AddressParseError {}
