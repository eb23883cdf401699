//! Handshake-file discovery of the server address
//!
//! The spawned process binds an OS-chosen port within the configured range
//! and has no synchronous channel back to the launcher, so it writes
//! `host:port` connection lines to a file once its socket server is ready.
//! File completion is unambiguous (existence plus content), unlike
//! free-form process output, so the launcher polls the file. The record is
//! deleted before every launch so a prior run's address can never be read
//! back, and deleted again on graceful teardown.

use crate::error::{Result, SessionError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use wbunit_transport::Address;

/// Name of the connection-info file the server writes, relative to the
/// working directory.
pub const HANDSHAKE_FILE: &str = "aaS_WbId.txt";

/// Tokens identifying the listening-address line.
const LOOPBACK_TOKENS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Handshake path for a working directory.
pub fn handshake_path(work_dir: &Path) -> PathBuf {
    work_dir.join(HANDSHAKE_FILE)
}

/// Remove a stale record. A missing file is not an error.
pub async fn clear(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "cleared handshake record");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(SessionError::Io(err)),
    }
}

/// Poll the handshake file until the server reports its address.
///
/// Scans the record line by line for a loopback token and parses the line
/// as `host:port`. Bounded by `timeout`: a server that never writes a
/// usable record yields [`SessionError::StartupTimeout`] rather than
/// waiting forever.
pub async fn wait_for_address(
    path: &Path,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<Address> {
    tokio::time::timeout(timeout, poll_for_address(path, poll_interval))
        .await
        .map_err(|_| SessionError::StartupTimeout)?
}

async fn poll_for_address(path: &Path, poll_interval: Duration) -> Result<Address> {
    loop {
        if let Ok(contents) = tokio::fs::read_to_string(path).await {
            if let Some(line) = contents
                .lines()
                .find(|line| LOOPBACK_TOKENS.iter().any(|token| line.contains(token)))
            {
                debug!(line, "handshake record found");
                return line
                    .parse()
                    .map_err(|err: wbunit_transport::AddressParseError| {
                        SessionError::Handshake(err.to_string())
                    });
            }
        }
        tokio::time::sleep(poll_interval).await;
    }
}
