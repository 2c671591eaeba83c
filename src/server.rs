//! TCP accept loop, generalized from `services::bf6500_service::BF6500Service`'s
//! `handle_connections_loop`/`handle_connection` (`tokio::spawn` per
//! accepted socket) from HL7/MLLP framing to ASTM ENQ/STX/EOT framing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::constants::{ACK, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, NAK};
use crate::error::Result;
use crate::session::{classify, extract_unit, LinkReply, MessageBundle, MessageFormat, Session};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: String,
    pub port: u16,
    pub message_format: MessageFormat,
    pub timeout: Duration,
    pub capture_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            message_format: MessageFormat::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_dir: None,
        }
    }
}

/// Binds the listener and accepts connections until cancelled. Each
/// accepted connection gets its own `Session` and its own `tokio::spawn`'d
/// task -- one per-connection protocol-engine instance.
pub async fn run(config: ServerConfig, tx: mpsc::Sender<MessageBundle>) -> Result<()> {
    let addr = format!("{}:{}", config.listen, config.port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("ASTM server ready to handle connections on {addr}");
    serve(listener, config, tx).await
}

/// Accepts connections on an already-bound listener until cancelled.
/// Split out from `run` so callers that need the bound ephemeral port
/// (tests, mainly) can bind with port 0 and read it back before serving.
pub async fn serve(listener: TcpListener, config: ServerConfig, tx: mpsc::Sender<MessageBundle>) -> Result<()> {
    let config = Arc::new(config);
    loop {
        let (stream, peer) = listener.accept().await?;
        let config = config.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, config, tx).await {
                log::warn!("connection {peer} ended with error: {e}");
            }
        });
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    config: Arc<ServerConfig>,
    tx: mpsc::Sender<MessageBundle>,
) -> Result<()> {
    log::info!("accepted connection from {peer}");
    let mut session = Session::new(config.message_format);
    let mut buf = Vec::new();
    let mut read_buf = [0u8; 4096];

    loop {
        while let Some(unit) = extract_unit(&mut buf) {
            let event = classify(unit);
            match session.handle_event(event) {
                LinkReply::Ack => stream.write_all(&[ACK]).await?,
                LinkReply::Nak => stream.write_all(&[NAK]).await?,
                LinkReply::None => {}
                LinkReply::Flush(bundle) => {
                    if let Some(dir) = &config.capture_dir {
                        if let Err(e) = crate::capture::write_capture(
                            dir,
                            &bundle.astm_blob,
                            Some(&bundle.header_message),
                        ) {
                            log::warn!("failed to write capture file: {e}");
                        }
                    }
                    if tx.send(bundle).await.is_err() {
                        log::warn!("consumer channel closed, dropping connection {peer}");
                        return Ok(());
                    }
                }
            }
        }

        // Racing the read against the inactivity timer re-arms the timer
        // every iteration: a fresh `sleep` future is built each time round.
        tokio::select! {
            result = stream.read(&mut read_buf) => {
                let n = result?;
                if n == 0 {
                    log::info!("connection {peer} closed by peer");
                    return Ok(());
                }
                buf.extend_from_slice(&read_buf[..n]);
            }
            _ = tokio::time::sleep(config.timeout) => {
                log::info!("connection {peer} timed out after {:?}", config.timeout);
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.capture_dir.is_none());
    }
}
