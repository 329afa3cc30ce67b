use crate::infrastructure::error::Result;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// Frame handed to the socket writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Text(String),
    /// Close with this code, then stop writing
    Close(u16),
}

/// Frame delivered by the socket reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text(String),
    /// Socket gone; `None` when no close frame was received
    Closed { code: Option<u16> },
}

/// An open socket, split into channels
#[derive(Debug)]
pub struct Link {
    pub tx: mpsc::UnboundedSender<Outgoing>,
    pub rx: mpsc::UnboundedReceiver<Incoming>,
}

/// Opens relay sockets (trait seam for mocking)
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn open(&self, url: &str) -> Result<Link>;
}

/// tokio-tungstenite client transport
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, url: &str) -> Result<Link> {
        let (ws_stream, _) = connect_async(url).await?;
        tracing::info!("🔌 Connected to relay at {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outgoing>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<Incoming>();

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let result = match frame {
                    Outgoing::Text(text) => write.send(WsMessage::Text(text.into())).await,
                    Outgoing::Close(code) => {
                        let close = CloseFrame {
                            code: CloseCode::from(code),
                            reason: "".into(),
                        };
                        let _ = write.send(WsMessage::Close(Some(close))).await;
                        break;
                    }
                };
                if let Err(e) = result {
                    tracing::error!("Failed to send frame: {}", e);
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut code = None;
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => {
                        if in_tx.send(Incoming::Text(text.to_string())).is_err() {
                            return;
                        }
                    }
                    Ok(WsMessage::Close(frame)) => {
                        code = frame.map(|f| u16::from(f.code));
                        tracing::info!("Relay closed connection ({:?})", code);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
            let _ = in_tx.send(Incoming::Closed { code });
        });

        Ok(Link {
            tx: out_tx,
            rx: in_rx,
        })
    }
}
