//! Process launch: installation lookup and argument construction

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::info;

/// Environment variable naming the installation root for `version`.
pub fn install_root_var(version: u32) -> String {
    format!("AWP_ROOT{version}")
}

/// Resolve the Workbench executable for the configured version.
///
/// The per-version environment variable must name the installation root;
/// its absence is a configuration error raised before any process is
/// spawned.
pub fn resolve_executable(version: u32) -> Result<PathBuf> {
    let var = install_root_var(version);
    let root = std::env::var_os(&var).ok_or_else(|| {
        SessionError::Config(format!(
            "ANSYS version v{version} is not installed ({var} is unset)"
        ))
    })?;
    Ok(PathBuf::from(root)
        .join("Framework")
        .join("bin")
        .join("Win64")
        .join("runwb2.exe"))
}

/// Spawn the Workbench process pointed at the handshake output path.
///
/// Arguments: interactive (`-I`) or batch (`-s`) mode, the TCP port-search
/// range, and where to write the connection info once the socket server is
/// ready. Output is captured rather than inherited.
pub fn spawn_target(config: &SessionConfig, executable: &Path, handshake: &Path) -> Result<Child> {
    let mode = if config.interactive { "-I" } else { "-s" };
    let (start, end) = config.port_range;

    let mut command = Command::new(executable);
    command
        .arg(mode)
        .arg("-p")
        .arg(format!("[{start}:{end}]"))
        .arg("--server-write-connection-info")
        .arg(handshake)
        .current_dir(&config.work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    info!(
        executable = %executable.display(),
        mode,
        port_range = %format!("[{start}:{end}]"),
        "launching Workbench"
    );
    command.spawn().map_err(SessionError::Spawn)
}
