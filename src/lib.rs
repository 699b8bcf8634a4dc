//! Media Bridge - typed command bridge for a media downloader
//!
//! The UI side of the downloader talks to a privileged host process that
//! runs the download tool, touches the filesystem and stores settings. This
//! crate is the typed boundary between the two: request and outcome shapes,
//! key-naming normalization, and one async function per host command.

pub mod bridge;
pub mod host;
pub mod models;
pub mod naming;

mod error;

pub use bridge::{CommandBridge, HostInvoker};
pub use error::{Error, Result, TransportError, TransportResult};
pub use host::{HostConfig, HostProcess};
pub use models::{CookieSource, DownloadLog, DownloadOutcome, DownloadRequest, FileFilter, HostEvent, Settings};

/// Install the tracing subscriber, honouring `RUST_LOG`
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "media_bridge=debug".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
