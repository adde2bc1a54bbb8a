//! Inbound socket listener
//!
//! The automation system opens a plain TCP connection, writes one JSON
//! document, and closes. There is no framing: the document ends at EOF,
//! or at a read timeout for senders that forget to close. Connections
//! are handled one at a time; concurrent arrivals queue at the socket
//! layer, which is plenty at radio event rates.
//!
//! The only fatal error is failing the initial bind after the
//! configured retries. Anything later backs off exponentially and
//! rebinds; a playout gap is better than a dead service.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::ListenerConfig;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// Documents beyond this size stop being read; no legitimate payload
/// comes anywhere near it.
const MAX_DOCUMENT_BYTES: usize = 1 << 20;

pub struct Listener {
    inner: TcpListener,
    config: ListenerConfig,
}

impl Listener {
    /// Binds the configured address, retrying with backoff up to the
    /// configured limit. Exhausting the limit is a startup failure and
    /// the one error the caller should treat as fatal.
    pub async fn bind(config: &ListenerConfig) -> Result<Self> {
        let inner = bind_with_retry(config, Some(config.max_bind_retries.max(1))).await?;
        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// The actual bound address; differs from the configured one when
    /// binding port 0.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Accepts and processes connections forever. Accept failures drop
    /// the socket, back off, and rebind from scratch.
    pub async fn serve(self, mut pipeline: Pipeline) -> Result<()> {
        let Self { inner, config } = self;
        let mut listener = inner;
        info!(addr = %config.bind_addr, "listening for playout events");

        let mut failures: u32 = 0;
        loop {
            match listener.accept().await {
                Ok((mut stream, peer)) => {
                    failures = 0;
                    debug!(%peer, "connection accepted");
                    match read_document(&mut stream, config.read_timeout()).await {
                        Ok(raw) if raw.is_empty() => debug!(%peer, "empty document ignored"),
                        Ok(raw) => pipeline.handle_payload(&raw).await,
                        Err(e) => warn!(%peer, error = %e, "read failed, dropping connection"),
                    }
                }
                Err(e) => {
                    failures += 1;
                    let delay = backoff_delay(
                        config.backoff_base_secs,
                        failures,
                        config.backoff_cap_secs,
                    );
                    warn!(
                        error = %e,
                        attempt = failures,
                        delay_secs = delay.as_secs(),
                        "accept failed, restarting listener"
                    );
                    // release the port before trying to take it again
                    drop(listener);
                    tokio::time::sleep(delay).await;
                    listener = bind_with_retry(&config, None).await?;
                    info!(addr = %config.bind_addr, "listener restarted");
                }
            }
        }
    }
}

async fn bind_with_retry(config: &ListenerConfig, max_attempts: Option<u32>) -> Result<TcpListener> {
    let mut attempt: u32 = 0;
    loop {
        match TcpListener::bind(&config.bind_addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                attempt += 1;
                if let Some(max) = max_attempts {
                    if attempt >= max {
                        error!(addr = %config.bind_addr, error = %e, attempts = attempt, "giving up on bind");
                        return Err(e.into());
                    }
                }
                let delay =
                    backoff_delay(config.backoff_base_secs, attempt, config.backoff_cap_secs);
                warn!(
                    addr = %config.bind_addr,
                    error = %e,
                    attempt,
                    delay_secs = delay.as_secs(),
                    "bind failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// `base * 2^(attempt-1)` seconds, capped, never less than a second.
fn backoff_delay(base_secs: u64, attempt: u32, cap_secs: u64) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let secs = base_secs
        .saturating_mul(1u64 << exp)
        .min(cap_secs.max(1))
        .max(1);
    Duration::from_secs(secs)
}

/// Reads until EOF, the size limit, or a per-read timeout. A stalled
/// sender is treated as having finished its document.
async fn read_document<R>(stream: &mut R, read_timeout: Duration) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match tokio::time::timeout(read_timeout, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.len() > MAX_DOCUMENT_BYTES {
                    warn!(bytes = buf.len(), "document too large, stopping read");
                    break;
                }
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                debug!("read timed out, treating as end of document");
                break;
            }
        }
    }
    Ok(buf)
}
