//! Stdio JSON-RPC transport for MCP servers.
//!
//! Spawns the server as a child process and speaks newline-delimited
//! JSON-RPC 2.0 over its stdin/stdout. A single background reader task
//! owns the stdout half exclusively and correlates responses to pending
//! requests by `id` through oneshot channels. Server-initiated
//! notifications (progress, logging) are logged and dropped.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::error::{McpError, Result};
use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Timeout for a single request/response exchange.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;

/// Child-process stdio transport with request/response correlation.
pub struct StdioTransport {
    writer: Mutex<BufWriter<ChildStdin>>,
    pending: PendingMap,
    next_id: AtomicU64,
    child: Mutex<Child>,
    shutdown: CancellationToken,
}

impl StdioTransport {
    /// Spawn the server process and start the background reader.
    pub fn spawn(
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        debug!("Spawning MCP server: {command} {}", args.join(" "));
        let mut child = Command::new(command)
            .args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::UnexpectedResponse("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::UnexpectedResponse("child stdout unavailable".to_string()))?;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let shutdown = CancellationToken::new();

        tokio::spawn(reader_loop(
            BufReader::new(stdout),
            Arc::clone(&pending),
            shutdown.clone(),
        ));

        Ok(Self {
            writer: Mutex::new(BufWriter::new(stdin)),
            pending,
            next_id: AtomicU64::new(1),
            child: Mutex::new(child),
            shutdown,
        })
    }

    /// Send a request and await its correlated response.
    pub async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let request = JsonRpcRequest::new(id, method, params);
        if let Err(e) = self.write_frame(&serde_json::to_string(&request)?).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        let response = match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(McpError::TransportClosed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(McpError::Timeout);
            }
        };

        if let Some(error) = response.error {
            return Err(McpError::RpcError {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| McpError::UnexpectedResponse("response without result".to_string()))
    }

    /// Send a notification (no response expected).
    pub async fn notify(&self, method: &str, params: Option<serde_json::Value>) -> Result<()> {
        let notification = JsonRpcNotification::new(method, params);
        self.write_frame(&serde_json::to_string(&notification)?)
            .await
    }

    async fn write_frame(&self, frame: &str) -> Result<()> {
        trace!("-> {frame}");
        let mut writer = self.writer.lock().await;
        writer.write_all(frame.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    /// Stop the reader task and kill the child process.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown.cancel();
        let mut child = self.child.lock().await;
        child.kill().await?;
        Ok(())
    }
}

async fn reader_loop(
    reader: BufReader<tokio::process::ChildStdout>,
    pending: PendingMap,
    shutdown: CancellationToken,
) {
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = shutdown.cancelled() => break,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("MCP server closed stdout");
                break;
            }
            Err(e) => {
                warn!("MCP transport read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        trace!("<- {line}");

        let response: JsonRpcResponse = match serde_json::from_str(&line) {
            Ok(response) => response,
            Err(e) => {
                warn!("Unparseable MCP frame ({e}): {line}");
                continue;
            }
        };

        match response.id {
            Some(id) => {
                if let Some(tx) = pending.lock().await.remove(&id) {
                    let _ = tx.send(response);
                } else {
                    // Server-initiated request; this client does not
                    // serve any, so it is dropped.
                    debug!("Dropping frame with unknown id {id}");
                }
            }
            None => {
                // Notification (progress, logging). Nothing to route.
                trace!("Dropping server notification");
            }
        }
    }

    // Fail any requests still waiting when the stream ends.
    pending.lock().await.clear();
}
