//! Typed wrappers around host commands

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value as JsonValue};

use super::HostInvoker;
use crate::models::{DownloadOutcome, DownloadRequest, FileFilter, Settings};
use crate::naming::to_snake_keys;
use crate::TransportResult;

/// Command names understood by the host process
pub mod commands {
    pub const READ_CLIPBOARD: &str = "read_clipboard";
    pub const SELECT_DIRECTORY: &str = "select_directory";
    pub const SELECT_FILE: &str = "select_file";
    pub const GET_DEFAULT_DOWNLOAD_DIRECTORY: &str = "get_default_download_directory";
    pub const CHECK_YT_DLP_INSTALLED: &str = "check_yt_dlp_installed";
    pub const INSTALL_YT_DLP: &str = "install_yt_dlp";
    pub const OPEN_DIRECTORY: &str = "open_directory";
    pub const EXECUTE_DOWNLOAD: &str = "execute_download";
    pub const SAVE_SETTINGS: &str = "save_settings";
    pub const LOAD_SETTINGS: &str = "load_settings";
}

/// Stateless client for the host's commands
///
/// Every method issues exactly one call. Calls are independent and may run
/// concurrently; ordering between them is up to the host.
#[derive(Debug, Clone)]
pub struct CommandBridge<I> {
    invoker: I,
}

impl<I: HostInvoker> CommandBridge<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    /// Access the underlying transport
    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    async fn call<R: DeserializeOwned>(&self, command: &str, args: JsonValue) -> TransportResult<R> {
        tracing::debug!("Invoking host command: {}", command);
        let reply = self.invoker.invoke(command, args).await?;
        Ok(serde_json::from_value(reply)?)
    }

    /// Current clipboard contents as read by the host
    pub async fn read_clipboard(&self) -> TransportResult<String> {
        self.call(commands::READ_CLIPBOARD, json!({})).await
    }

    /// Let the user choose a directory; `None` when the chooser was cancelled
    pub async fn select_directory(&self, default_path: Option<&str>) -> TransportResult<Option<String>> {
        let mut args = Map::new();
        if let Some(path) = default_path {
            args.insert("defaultPath".to_string(), JsonValue::String(path.to_string()));
        }
        self.call(commands::SELECT_DIRECTORY, JsonValue::Object(args)).await
    }

    /// Let the user choose a cookie file (`.txt` only); `None` when cancelled
    pub async fn select_cookie_file(&self) -> TransportResult<Option<String>> {
        let args = json!({ "filters": [FileFilter::cookie_files()] });
        self.call(commands::SELECT_FILE, args).await
    }

    pub async fn get_default_download_directory(&self) -> TransportResult<String> {
        self.call(commands::GET_DEFAULT_DOWNLOAD_DIRECTORY, json!({})).await
    }

    /// Whether the downloader tool is available to the host
    pub async fn check_downloader_installed(&self) -> TransportResult<bool> {
        self.call(commands::CHECK_YT_DLP_INSTALLED, json!({})).await
    }

    /// Install the downloader tool; may take a while
    pub async fn install_downloader(&self) -> TransportResult<String> {
        self.call(commands::INSTALL_YT_DLP, json!({})).await
    }

    /// Reveal a directory in the platform file manager
    pub async fn open_directory(&self, path: &str) -> TransportResult<()> {
        self.call(commands::OPEN_DIRECTORY, json!({ "path": path })).await
    }

    /// Run a download and wait for its terminal outcome.
    ///
    /// Field names are normalized to snake_case before sending. Download
    /// failures come back as `Ok` with `is_error` set.
    pub async fn execute_download(&self, request: &DownloadRequest) -> TransportResult<DownloadOutcome> {
        let options = to_snake_keys(&serde_json::to_value(request)?);
        self.call(commands::EXECUTE_DOWNLOAD, json!({ "options": options })).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> TransportResult<()> {
        self.call(commands::SAVE_SETTINGS, json!({ "settings": settings }))
            .await
    }

    pub async fn load_settings(&self) -> TransportResult<Settings> {
        self.call(commands::LOAD_SETTINGS, json!({})).await
    }
}
