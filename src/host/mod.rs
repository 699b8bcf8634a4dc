//! Host process management
//!
//! Spawns the privileged host executable and implements [`HostInvoker`]
//! over JSON-RPC on its stdio.
//!
//! [`HostInvoker`]: crate::bridge::HostInvoker

mod config;
mod process;

pub use config::{HostConfig, HOST_BINARY, MAX_EVENT_CAPACITY};
pub use process::HostProcess;
