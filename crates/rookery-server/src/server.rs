//! TCP transport: newline-delimited JSON over persistent connections.
//!
//! Each accepted connection gets a reader task (this function's loop) and a
//! writer task draining the connection's outbound channel. Commands are
//! processed one at a time per connection; a command runs to completion
//! before the next line is read.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info, warn};

use rookery_core::{ClientCommand, ServerMessage};

use crate::config::ServerConfig;
use crate::coordinator::Coordinator;
use crate::session::{ClientHandle, ConnectionId};

/// Accept connections forever, spawning a task per connection.
pub async fn run(config: ServerConfig, coordinator: Arc<Coordinator>) -> std::io::Result<()> {
    config
        .validate()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let coordinator = Arc::clone(&coordinator);
        let max_bytes = config.max_command_bytes;
        tokio::spawn(async move {
            debug!(%peer, "connection accepted");
            serve_connection(stream, max_bytes, coordinator).await;
            debug!(%peer, "connection closed");
        });
    }
}

/// Drive one connection until the peer hangs up or the line codec errors.
async fn serve_connection(stream: TcpStream, max_bytes: usize, coordinator: Arc<Coordinator>) {
    let framed = Framed::new(stream, LinesCodec::new_with_max_length(max_bytes));
    let (mut sink, mut lines) = framed.split();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ServerMessage>();
    let handle = ClientHandle::new(ConnectionId::next(), tx);

    // Writer: drain the outbound channel into the socket. Ends when the
    // handle's last sender is dropped or the peer stops reading.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(err) => {
                    warn!(%err, "failed to encode server message");
                    continue;
                }
            };
            if sink.send(json).await.is_err() {
                break;
            }
        }
    });

    // Reader: one command at a time, in arrival order.
    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, conn = %handle.id(), "line decode failed, closing");
                break;
            }
        };
        match serde_json::from_str::<ClientCommand>(&line) {
            Ok(command) => coordinator.handle_command(&handle, command).await,
            Err(err) => {
                debug!(%err, conn = %handle.id(), "malformed command");
                handle.send(ServerMessage::error("Error: malformed command"));
            }
        }
    }

    coordinator.handle_disconnect(&handle);
    drop(handle);
    let _ = writer.await;
}
