//! Host process transport
//!
//! Spawns the host executable and talks to it with line-delimited JSON-RPC
//! over stdio. Calls are routed back by id, so any number may be in flight.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::{HostConfig, MAX_EVENT_CAPACITY};
use crate::bridge::HostInvoker;
use crate::models::HostEvent;
use crate::{Result, TransportError, TransportResult};

/// JSON-RPC request (no jsonrpc header)
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    id: u64,
    method: &'a str,
    params: JsonValue,
}

/// Any line the host writes: a response or a notification
#[derive(Debug, Deserialize)]
struct JsonRpcMessage {
    id: Option<u64>,
    result: Option<JsonValue>,
    error: Option<JsonRpcError>,
    method: Option<String>,
    params: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[allow(dead_code)]
    data: Option<JsonValue>,
}

type Waiter = oneshot::Sender<TransportResult<JsonValue>>;

/// Calls awaiting a reply. Once `closed` is set no new call is registered.
#[derive(Default)]
struct PendingCalls {
    waiters: HashMap<u64, Waiter>,
    closed: bool,
}

/// Fail every waiting call and refuse new ones
fn close_pending(pending: &Mutex<PendingCalls>, reason: &str) {
    let mut pending = pending.lock();
    pending.closed = true;
    for (_, waiter) in pending.waiters.drain() {
        let _ = waiter.send(Err(TransportError::Unreachable(reason.to_string())));
    }
}

/// Removes a call's waiter when the call finishes or is dropped
struct WaiterGuard<'a> {
    pending: &'a Mutex<PendingCalls>,
    id: u64,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().waiters.remove(&self.id);
    }
}

/// A running host process
pub struct HostProcess {
    child: tokio::sync::Mutex<Child>,

    /// Writer half; `None` after shutdown
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,

    request_counter: AtomicU64,

    pending: Arc<Mutex<PendingCalls>>,

    events: broadcast::Sender<HostEvent>,

    request_timeout: Option<Duration>,

    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
}

impl HostProcess {
    /// Locate and spawn the host described by `config`
    pub async fn spawn(config: &HostConfig) -> Result<Self> {
        let program = config.resolve_program()?;
        Ok(Self::spawn_program(&program, config).await?)
    }

    /// Spawn a specific executable with the rest of `config`
    pub async fn spawn_program(program: &Path, config: &HostConfig) -> TransportResult<Self> {
        tracing::info!("Spawning host process from: {:?}", program);

        let mut child = tokio::process::Command::new(program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TransportError::Unreachable(format!("Failed to spawn host: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Unreachable("Failed to capture stdin".to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Unreachable("Failed to capture stdout".to_string()))?;

        let pending = Arc::new(Mutex::new(PendingCalls::default()));
        let (events, _) = broadcast::channel(config.event_capacity.clamp(1, MAX_EVENT_CAPACITY));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let pending_clone = pending.clone();
        let events_clone = events.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("Host reader received shutdown signal");
                        break;
                    }
                    line = lines.next_line() => {
                        match line {
                            Ok(Some(line)) => {
                                Self::handle_message(&line, &pending_clone, &events_clone);
                            }
                            Ok(None) => {
                                tracing::info!("Host stdout closed (EOF)");
                                break;
                            }
                            Err(e) => {
                                tracing::error!("Error reading from host stdout: {}", e);
                                break;
                            }
                        }
                    }
                }
            }

            close_pending(&pending_clone, "host process closed its output");
        });

        Ok(Self {
            child: tokio::sync::Mutex::new(child),
            stdin: tokio::sync::Mutex::new(Some(stdin)),
            request_counter: AtomicU64::new(1),
            pending,
            events,
            request_timeout: config.request_timeout(),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
        })
    }

    /// Receive notifications pushed by the host, such as `download-log`
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.events.subscribe()
    }

    fn handle_message(line: &str, pending: &Mutex<PendingCalls>, events: &broadcast::Sender<HostEvent>) {
        let message: JsonRpcMessage = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Failed to parse host message: {} - {}", e, line);
                return;
            }
        };

        match (message.id, message.method) {
            // Reply to one of our calls
            (Some(id), None) => {
                let Some(waiter) = pending.lock().waiters.remove(&id) else {
                    tracing::warn!("Reply for unknown call id {}", id);
                    return;
                };
                let result = match message.error {
                    Some(error) => Err(TransportError::Rejected {
                        code: error.code,
                        message: error.message,
                    }),
                    None => Ok(message.result.unwrap_or(JsonValue::Null)),
                };
                let _ = waiter.send(result);
            }
            (None, Some(method)) => {
                let params = message.params.unwrap_or(JsonValue::Null);
                tracing::debug!("Host event: {}", method);

                // No subscribers is fine
                let _ = events.send(HostEvent::new(method, params));
            }
            (Some(id), Some(method)) => {
                tracing::warn!("Ignoring host-initiated request {} ({})", method, id);
            }
            (None, None) => {
                tracing::warn!("Unknown host message: {}", line);
            }
        }
    }

    async fn write_line(&self, line: &str) -> TransportResult<()> {
        let mut stdin = self.stdin.lock().await;
        let stdin = stdin
            .as_mut()
            .ok_or_else(|| TransportError::Unreachable("Host stdin is closed".to_string()))?;

        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| TransportError::Unreachable(format!("Failed to write to stdin: {}", e)))?;

        stdin
            .flush()
            .await
            .map_err(|e| TransportError::Unreachable(format!("Failed to flush stdin: {}", e)))?;

        Ok(())
    }

    /// Send one call and wait for its reply
    pub async fn call(&self, method: &str, params: JsonValue) -> TransportResult<JsonValue> {
        let id = self.request_counter.fetch_add(1, Ordering::SeqCst);

        let mut json = serde_json::to_string(&JsonRpcRequest { id, method, params })?;
        json.push('\n');

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if pending.closed {
                return Err(TransportError::Unreachable("Host process has exited".to_string()));
            }
            pending.waiters.insert(id, tx);
        }

        // Deregisters the waiter on every exit, including a dropped future
        let _registration = WaiterGuard {
            pending: &self.pending,
            id,
        };

        self.write_line(&json).await?;

        let reply = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, rx)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => rx.await,
        };

        reply.map_err(|_| TransportError::Unreachable("Response channel closed".to_string()))?
    }

    /// Check if the process is still running
    pub async fn is_running(&self) -> bool {
        matches!(self.child.lock().await.try_wait(), Ok(None))
    }

    /// Close stdin, give the host two seconds to exit, then kill it
    pub async fn shutdown(&self) -> Result<()> {
        let shutdown_tx = self.shutdown_tx.lock().take();
        if let Some(tx) = shutdown_tx {
            let _ = tx.send(()).await;
        }

        close_pending(&self.pending, "host process shut down");

        if let Some(mut stdin) = self.stdin.lock().await.take() {
            let _ = stdin.shutdown().await;
        }

        let mut child = self.child.lock().await;
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(2)) => {
                tracing::warn!("Host did not exit gracefully, killing...");
                child.kill().await.ok();
            }
            status = child.wait() => {
                tracing::info!("Host exited with status: {:?}", status);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl HostInvoker for HostProcess {
    async fn invoke(&self, command: &str, args: JsonValue) -> TransportResult<JsonValue> {
        self.call(command, args).await
    }
}
