//! Automation harness for driving ANSYS Workbench over its aaS scripting
//! interface
//!
//! Launches `runwb2.exe` as a subprocess, recovers the dynamically assigned
//! server address from the handshake file the process writes once its
//! socket server is ready, then exchanges script commands through the
//! connection-per-call client in `wbunit-transport`. The harness never
//! interprets the script payloads themselves; it owns the lifecycle
//! around them: initialize, execute, save, exit, cleanup.
//!
//! # Usage
//!
//! ```ignore
//! use wbunit::{SessionConfig, WbSession};
//!
//! let mut session = WbSession::new(SessionConfig::default());
//! session.initialize().await?;
//! session
//!     .exec_command(r#"GetTemplate(TemplateName="Static Structural", Solver="ANSYS").CreateSystem()"#)
//!     .await?;
//! session.exec_command("systems=GetAllSystems()").await?;
//! println!("{}", session.query_variable("systems").await?);
//! session.save_project(Some("D:/example.wbpj"), true).await?;
//! session.finalize().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handshake;
pub mod launch;
pub mod session;

// Re-export commonly used types
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::WbSession;
pub use wbunit_transport::{AasClient, Address, FaultKind, RemoteFault, TransportError};
