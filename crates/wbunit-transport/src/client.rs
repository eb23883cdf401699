//! Connection-per-call client for the aaS scripting server

use crate::address::Address;
use crate::error::{EXCEPTION_MARKER, Result, TransportError, classify_fault};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Terminator appended to every outgoing command.
pub const COMMAND_SUFFIX: &str = "<EOF>";

/// Literal response meaning the command succeeded with no return value.
pub const ACK_TOKEN: &str = "<OK>";

/// Upper bound on the bytes read for one response; longer responses are
/// truncated at this cap.
pub const RESPONSE_BUFFER: usize = 1024;

/// Width of the constant marker prefixing every query response.
pub const QUERY_PREFIX_LEN: usize = 13;

/// Reserved scratch variable the query protocol assigns through.
pub const SCRATCH_VARIABLE: &str = "__variable__";

/// Client for one running aaS scripting server.
///
/// Every exchange opens a fresh TCP connection, sends one
/// `<EOF>`-terminated command, reads one bounded response, and drops the
/// connection. No pooling and no cross-call state: the remote side is
/// single-threaded and synchronous, so each call completes fully before
/// the next begins.
pub struct AasClient {
    address: Address,
    timeout: Option<Duration>,
}

impl AasClient {
    /// Create a client targeting `address`. No connection is opened until
    /// the first exchange.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            timeout: None,
        }
    }

    /// Bound each exchange, surfacing [`TransportError::Timeout`] when
    /// exceeded. Default is no bound (OS socket defaults).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The server address this client targets.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Send one script command and classify the response.
    ///
    /// The acknowledgement token and any response free of the exception
    /// marker are returned verbatim; query payloads may contain arbitrary
    /// text, so classification stays permissive. A response carrying the
    /// marker becomes a [`TransportError::Remote`].
    pub async fn exec_command(&self, command: &str) -> Result<String> {
        let data = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(command))
                .await
                .map_err(|_| TransportError::Timeout)??,
            None => self.exchange(command).await?,
        };

        if data != ACK_TOKEN && data.contains(EXCEPTION_MARKER) {
            return Err(TransportError::Remote(classify_fault(&data)));
        }
        Ok(data)
    }

    /// Query the textual value of `variable` in the remote script
    /// environment.
    ///
    /// Two strictly sequential exchanges: assign the variable's repr to the
    /// scratch name, then issue the query directive for it. A failure in
    /// the first propagates before the second is attempted. The result is
    /// the second response with the constant-width protocol prefix
    /// stripped; a shorter response yields the empty string.
    pub async fn query_variable(&self, variable: &str) -> Result<String> {
        self.exec_command(&format!("{SCRATCH_VARIABLE}={variable}.__repr__()"))
            .await?;
        let value = self
            .exec_command(&format!("Query,{SCRATCH_VARIABLE}"))
            .await?;
        Ok(value.get(QUERY_PREFIX_LEN..).unwrap_or("").to_string())
    }

    async fn exchange(&self, command: &str) -> Result<String> {
        let endpoint = (self.address.host.as_str(), self.address.port);
        let mut stream = TcpStream::connect(endpoint)
            .await
            .map_err(TransportError::Connect)?;

        debug!(
            host = %self.address.host,
            port = self.address.port,
            len = command.len(),
            "sending command"
        );

        let payload = format!("{command}{COMMAND_SUFFIX}");
        stream.write_all(payload.as_bytes()).await?;
        stream.flush().await?;

        // Single bounded read, matching the server's one-buffer replies.
        let mut buf = vec![0u8; RESPONSE_BUFFER];
        let n = stream.read(&mut buf).await?;
        buf.truncate(n);

        let data = String::from_utf8(buf)?;
        debug!(len = data.len(), "received response");
        Ok(data)
        // the connection drops here on every exit path
    }
}
