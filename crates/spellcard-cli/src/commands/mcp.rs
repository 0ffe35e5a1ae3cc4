use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use serde_json::Value;
use tokio::io::{stdin, stdout, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::select;
use tokio::signal;

use spellcard_lib::{CardStore, Dispatcher, HttpCallbackNotifier, DEFAULT_CALLBACK_TIMEOUT};
use spellcard_mcp::{McpServer, Reply};

use crate::GlobalOptions;

/// Configure tracing to write only to stderr; stdout carries protocol and
/// command output.
pub fn configure_tracing(log_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = if let Some(level) = log_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let subscriber = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(())
}

/// Newline-delimited JSON over stdin/stdout.
pub struct StdioTransport {
    reader: BufReader<tokio::io::Stdin>,
    writer: tokio::io::Stdout,
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(stdin()),
            writer: stdout(),
        }
    }

    /// Read the next non-blank line. Returns Ok(None) on EOF.
    pub async fn read_message(&mut self) -> Result<Option<String>> {
        loop {
            let mut line = String::new();
            let bytes = self
                .reader
                .read_line(&mut line)
                .await
                .context("failed to read line")?;
            if bytes == 0 {
                return Ok(None);
            }
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    // Keep BrokenPipe as an io::Error so the loop can recognise a disconnect.
    fn check_io<T>(res: std::io::Result<T>) -> Result<T> {
        match res {
            Ok(v) => Ok(v),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Client disconnected",
            )
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write_message(&mut self, msg: &Value) -> Result<()> {
        let s = serde_json::to_string(msg)?;

        Self::check_io(self.writer.write_all(s.as_bytes()).await)?;
        Self::check_io(self.writer.write_all(b"\n").await)?;
        Self::check_io(self.writer.flush().await)?;

        Ok(())
    }

    /// Write every frame of `reply`, one per line.
    pub async fn write_reply(&mut self, reply: Reply) -> Result<()> {
        match reply {
            Reply::Single(frame) => self.write_message(&frame).await,
            Reply::Stream(mut frames) => {
                while let Some(frame) = frames.next().await {
                    self.write_message(&frame).await?;
                }
                Ok(())
            }
            Reply::Empty => Ok(()),
        }
    }
}

fn is_broken_pipe(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|ioe| ioe.kind() == std::io::ErrorKind::BrokenPipe)
        .unwrap_or(false)
}

/// Read requests from stdin and answer on stdout until EOF or Ctrl-C.
///
/// Requests are handled one at a time; a streaming call finishes writing all
/// of its frames before the next line is read.
pub async fn run_server_loop(mut transport: StdioTransport, server: McpServer) -> Result<()> {
    tracing::info!("MCP server initialized, waiting for requests...");

    loop {
        select! {
            _ = signal::ctrl_c() => {
                tracing::info!("Received shutdown signal, exiting gracefully");
                break;
            }

            msg = transport.read_message() => {
                match msg {
                    Ok(Some(line)) => {
                        let reply = server.handle_text(&line);
                        if let Err(e) = transport.write_reply(reply).await {
                            if is_broken_pipe(&e) {
                                tracing::info!("Client disconnected (broken pipe)");
                                break;
                            }
                            return Err(e);
                        }
                    }
                    Ok(None) => {
                        tracing::info!("Client disconnected (EOF)");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Transport error: {}", e);
                        return Err(e);
                    }
                }
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Build the server from the global options and serve stdio.
pub async fn run_mcp_server(global: &GlobalOptions) -> Result<()> {
    let registry = global.registry()?;
    let notifier = HttpCallbackNotifier::new(DEFAULT_CALLBACK_TIMEOUT)
        .context("failed to build callback client")?;
    // Streaming never stores cards; the store only satisfies the dispatcher.
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        CardStore::new("cards"),
        Arc::new(notifier),
    );

    run_server_loop(StdioTransport::new(), McpServer::new(dispatcher)).await
}
