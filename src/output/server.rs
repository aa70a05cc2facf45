//! TCP fan-out for the rendered cycle output
//!
//! Every connected client receives each cycle's sentence block verbatim.
//! Clients beyond the limit are refused at accept time, and a client that
//! stalls longer than the write timeout or falls behind the broadcast
//! queue is dropped without affecting the others.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub struct OutputServer {
    port: u16,
    max_clients: usize,
    write_timeout: Duration,
    sender: broadcast::Sender<String>,
    clients: Arc<AtomicUsize>,
}

impl OutputServer {
    pub fn new(
        port: u16,
        max_clients: usize,
        write_timeout: Duration,
        sender: broadcast::Sender<String>,
    ) -> Self {
        Self {
            port,
            max_clients,
            write_timeout,
            sender,
            clients: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Accept clients until the task is aborted.
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding output server on {}", addr))?;
        info!("output server listening on {}", addr);

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    continue;
                }
            };
            if self.clients.load(Ordering::SeqCst) >= self.max_clients {
                info!("refusing client {}: limit of {} reached", peer, self.max_clients);
                continue;
            }

            let active = self.clients.fetch_add(1, Ordering::SeqCst) + 1;
            info!("client {} connected ({} active)", peer, active);
            let mut receiver = self.sender.subscribe();
            let clients = self.clients.clone();
            let write_timeout = self.write_timeout;
            tokio::spawn(async move {
                if let Err(e) = serve_client(stream, &mut receiver, write_timeout).await {
                    debug!("client {} dropped: {}", peer, e);
                }
                let remaining = clients.fetch_sub(1, Ordering::SeqCst) - 1;
                info!("client {} disconnected ({} active)", peer, remaining);
            });
        }
    }
}

/// Forward broadcast blocks to one client until it fails or stalls.
async fn serve_client(
    mut stream: TcpStream,
    receiver: &mut broadcast::Receiver<String>,
    write_timeout: Duration,
) -> Result<()> {
    loop {
        match receiver.recv().await {
            Ok(block) => {
                match tokio::time::timeout(write_timeout, stream.write_all(block.as_bytes())).await
                {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(e.into()),
                    Err(_) => anyhow::bail!("write timed out after {:?}", write_timeout),
                }
            }
            // missed blocks are stale by the next cycle anyway
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                debug!("client lagged, skipped {} blocks", missed);
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}
