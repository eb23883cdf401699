//! Session lifecycle tests against a scripted stand-in for the Workbench
//! executable.
//!
//! The stand-in is a shell script installed at the path `initialize`
//! derives from the installation root, so the real spawn, handshake, and
//! teardown phases all run. Each test uses its own version number so the
//! `AWP_ROOT*` variables never collide.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use wbunit::{SessionConfig, SessionError, WbSession};

/// Install a fake `runwb2.exe` under a temp installation root.
fn install_fake_target(root: &Path, script: &str) {
    let bin = root.join("Framework/bin/Win64");
    std::fs::create_dir_all(&bin).unwrap();
    let exe = bin.join("runwb2.exe");
    std::fs::write(&exe, script).unwrap();
    let mut perms = std::fs::metadata(&exe).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&exe, perms).unwrap();
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new().unwrap().block_on(future)
}

#[test]
fn missing_install_root_fails_before_any_spawn() {
    temp_env::with_var_unset("AWP_ROOT990", || {
        block_on(async {
            let work = tempfile::tempdir().unwrap();
            let mut session =
                WbSession::new(SessionConfig::new().with_version(990).with_work_dir(work.path()));

            let err = session.initialize().await.unwrap_err();
            assert!(matches!(err, SessionError::Config(_)), "got {err:?}");
            assert!(!session.is_running());
        });
    });
}

#[test]
fn unspawnable_executable_is_a_spawn_error() {
    let root = tempfile::tempdir().unwrap();
    // Installation root exists but holds no executable.
    temp_env::with_var("AWP_ROOT991", Some(root.path()), || {
        block_on(async {
            let work = tempfile::tempdir().unwrap();
            let mut session =
                WbSession::new(SessionConfig::new().with_version(991).with_work_dir(work.path()));

            let err = session.initialize().await.unwrap_err();
            assert!(matches!(err, SessionError::Spawn(_)), "got {err:?}");
            assert!(!session.is_running());
        });
    });
}

#[test]
fn target_that_never_reports_an_address_times_out() {
    let root = tempfile::tempdir().unwrap();
    install_fake_target(root.path(), "#!/bin/sh\nexit 0\n");

    temp_env::with_var("AWP_ROOT992", Some(root.path()), || {
        block_on(async {
            let work = tempfile::tempdir().unwrap();
            let mut session = WbSession::new(
                SessionConfig::new()
                    .with_version(992)
                    .with_work_dir(work.path())
                    .with_poll_interval(Duration::from_millis(20))
                    .with_handshake_timeout(Duration::from_millis(300)),
            );

            let err = session.initialize().await.unwrap_err();
            assert!(matches!(err, SessionError::StartupTimeout), "got {err:?}");
            assert!(!session.is_running());
        });
    });
}

#[test]
fn handshake_reported_address_brings_the_session_up() {
    let root = tempfile::tempdir().unwrap();
    install_fake_target(
        root.path(),
        "#!/bin/sh\necho \"localhost:9321\" > aaS_WbId.txt\nexec sleep 30\n",
    );

    temp_env::with_var("AWP_ROOT993", Some(root.path()), || {
        block_on(async {
            let work = tempfile::tempdir().unwrap();
            let mut session = WbSession::new(
                SessionConfig::new()
                    .with_version(993)
                    .with_work_dir(work.path())
                    .with_poll_interval(Duration::from_millis(20))
                    .with_handshake_timeout(Duration::from_secs(5))
                    .with_cleanup_retry_delay(Duration::from_millis(10)),
            );

            session.initialize().await.unwrap();
            assert!(session.is_running());

            // A second initialize refuses while running.
            let err = session.initialize().await.unwrap_err();
            assert!(matches!(err, SessionError::AlreadyStarted), "got {err:?}");

            // Forced teardown: no server ever listened, so the save and
            // finalize steps fail best-effort, but the session still comes
            // down and the handshake record is gone.
            assert!(session.terminate().await.unwrap());
            assert!(!session.is_running());
            assert!(!work.path().join("aaS_WbId.txt").exists());
        });
    });
}
