//! Wire transport for the Workbench aaS scripting server
//!
//! The server accepts one `<EOF>`-terminated script command per TCP
//! connection and answers with up to one buffer of UTF-8 text. This crate
//! owns that exchange: it opens a fresh connection per call, classifies the
//! response as acknowledgement, remote fault, or plain result text, and
//! maps embedded `...Exception:` markers onto a closed fault taxonomy.
//!
//! # Usage
//!
//! ```ignore
//! use wbunit_transport::{AasClient, Address};
//!
//! let client = AasClient::new("localhost:9000".parse::<Address>()?);
//! client.exec_command("systems=GetAllSystems()").await?;
//! println!("{}", client.query_variable("systems").await?);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod client;
pub mod error;

// Re-export commonly used types
pub use address::{Address, AddressParseError};
pub use client::AasClient;
pub use error::{FaultKind, RemoteFault, Result, TransportError};
