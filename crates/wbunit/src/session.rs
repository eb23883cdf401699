//! Workbench session lifecycle
//!
//! One session owns one spawned Workbench process and one transport client
//! for its lifetime and keeps the two in lockstep: the client exists
//! exactly while the session is running. Commands are strictly sequential;
//! the only concurrency is the coordination between the launcher and the
//! independently running target process.

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::{handshake, launch};
use std::path::Path;
use std::time::Duration;
use tokio::process::Child;
use tracing::{debug, info, warn};
use wbunit_transport::AasClient;

/// How long `finalize` waits for the process to exit after `Exit`.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(10);

/// A full launch → command exchange → save → teardown lifecycle for one
/// Workbench instance.
///
/// The session exclusively owns its working directory's handshake file and
/// the subprocess; two sessions must not share a working directory
/// concurrently, since the stale-record deletion at startup assumes
/// exclusive ownership.
pub struct WbSession {
    config: SessionConfig,
    process: Option<Child>,
    client: Option<AasClient>,
}

impl WbSession {
    /// Create an unstarted session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            process: None,
            client: None,
        }
    }

    /// Whether `initialize` has completed and `finalize` has not run.
    pub fn is_running(&self) -> bool {
        self.client.is_some()
    }

    /// Start Workbench and connect to its scripting server.
    ///
    /// Two distinct phases with distinct failures: spawning the process
    /// ([`SessionError::Spawn`]) and discovering its address through the
    /// handshake file ([`SessionError::StartupTimeout`]). A session that is
    /// already running refuses with [`SessionError::AlreadyStarted`]
    /// without spawning a second process; the installation root for the
    /// configured version is resolved before anything else.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.client.is_some() {
            return Err(SessionError::AlreadyStarted);
        }

        let executable = launch::resolve_executable(self.config.version)?;
        let record = handshake::handshake_path(&self.config.work_dir);
        handshake::clear(&record).await?;

        self.process = Some(launch::spawn_target(&self.config, &executable, &record)?);

        let address = match handshake::wait_for_address(
            &record,
            self.config.poll_interval,
            self.config.handshake_timeout,
        )
        .await
        {
            Ok(address) => address,
            Err(err) => {
                warn!(error = %err, "startup failed; killing Workbench");
                if let Some(mut child) = self.process.take() {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                }
                return Err(err);
            }
        };

        info!(host = %address.host, port = address.port, "Workbench server ready");

        let mut client = AasClient::new(address);
        if let Some(limit) = self.config.exchange_timeout {
            client = client.with_timeout(limit);
        }
        self.client = Some(client);
        Ok(())
    }

    /// Send a script command to Workbench for execution.
    ///
    /// Remote faults propagate as typed errors; they are never swallowed.
    pub async fn exec_command(&self, command: &str) -> Result<String> {
        Ok(self.client()?.exec_command(command).await?)
    }

    /// Query the value of `variable` in the Workbench script environment.
    pub async fn query_variable(&self, variable: &str) -> Result<String> {
        Ok(self.client()?.query_variable(variable).await?)
    }

    /// Save the current project.
    ///
    /// With no path, saves in place — the remote side reports a
    /// command-failed fault if the project has never been saved, since it
    /// has no existing path to overwrite.
    pub async fn save_project(&self, file_path: Option<&str>, overwrite: bool) -> Result<String> {
        self.exec_command(&save_command(file_path, overwrite)).await
    }

    /// Issue the `Exit` directive to the Workbench server.
    pub async fn exit_wb(&self) -> Result<String> {
        self.exec_command("Exit").await
    }

    /// Graceful teardown: save in place, exit, clear the handshake record,
    /// and return the session to a re-initializable state.
    ///
    /// The save step is not special-cased; its failure propagates like any
    /// other command failure and aborts the rest of the sequence.
    pub async fn finalize(&mut self) -> Result<()> {
        self.save_project(None, true).await?;
        self.exit_wb().await?;

        if let Some(mut child) = self.process.take() {
            if tokio::time::timeout(SHUTDOWN_WAIT, child.wait())
                .await
                .is_err()
            {
                warn!("Workbench did not exit within the shutdown wait");
            }
        }
        handshake::clear(&handshake::handshake_path(&self.config.work_dir)).await?;
        self.client = None;
        info!("session finalized");
        Ok(())
    }

    /// Forced, non-graceful teardown.
    ///
    /// Kills the process, parks a best-effort save in a throwaway temp
    /// directory, finalizes, then removes the directory — retrying while
    /// the dying process still holds locks inside it. Teardown failures
    /// collapse into the returned boolean instead of propagating: `false`
    /// when there is no process, or when the kill itself is denied.
    pub async fn terminate(&mut self) -> Result<bool> {
        let Some(child) = self.process.as_mut() else {
            return Ok(false);
        };

        if let Err(err) = child.start_kill() {
            if err.kind() == std::io::ErrorKind::PermissionDenied {
                warn!(error = %err, "kill denied");
                return Ok(false);
            }
            return Err(SessionError::Io(err));
        }
        let _ = child.wait().await;

        let temp_dir = tempfile::tempdir().map_err(SessionError::Io)?;
        let temp_project = temp_dir.path().join("temp.wbpj");

        if let Err(err) = self
            .save_project(Some(&temp_project.to_string_lossy()), true)
            .await
        {
            debug!(error = %err, "save during terminate failed");
        }
        if let Err(err) = self.finalize().await {
            debug!(error = %err, "finalize during terminate failed");
            self.process = None;
            self.client = None;
            let _ = handshake::clear(&handshake::handshake_path(&self.config.work_dir)).await;
        }

        remove_dir_retry(temp_dir.path(), self.config.cleanup_retry_delay).await?;
        info!("session terminated");
        Ok(true)
    }

    fn client(&self) -> Result<&AasClient> {
        self.client.as_ref().ok_or(SessionError::NotInitialized)
    }
}

/// Build the save directive for the remote scripting dialect.
fn save_command(file_path: Option<&str>, overwrite: bool) -> String {
    let flag = if overwrite { "True" } else { "False" };
    match file_path {
        Some(path) => format!(
            "Save(FilePath='{}', Overwrite={flag})",
            escape_script_str(path)
        ),
        None => format!("Save(Overwrite={flag})"),
    }
}

fn escape_script_str(value: &str) -> String {
    value.replace('\\', r"\\").replace('\'', r"\'")
}

/// Remove a directory, retrying while removal fails transiently.
async fn remove_dir_retry(path: &Path, delay: Duration) -> std::io::Result<()> {
    retry_removal(delay, || std::fs::remove_dir_all(path)).await
}

async fn retry_removal<F>(delay: Duration, mut attempt: F) -> std::io::Result<()>
where
    F: FnMut() -> std::io::Result<()>,
{
    loop {
        match attempt() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                debug!(error = %err, "removal failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
