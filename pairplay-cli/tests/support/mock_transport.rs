use async_trait::async_trait;
use pairplay_cli::infrastructure::{ClientError, Incoming, Link, Outgoing, Result, Transport};
use pairplay_core::Message;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// How the mock relay answers one connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Accept,
    Refuse,
    /// Never completes; only the connect timeout ends it
    Hang,
}

struct MockState {
    plans: VecDeque<Plan>,
    fallback: Plan,
    attempts: usize,
    urls: Vec<String>,
}

/// Relay stand-in; every accepted socket shows up as a [`ServerEnd`]
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    ends_tx: mpsc::UnboundedSender<ServerEnd>,
}

impl MockTransport {
    /// Attempts follow `plans` in order, then `fallback` forever
    pub fn new(plans: Vec<Plan>, fallback: Plan) -> (Self, mpsc::UnboundedReceiver<ServerEnd>) {
        let (ends_tx, ends_rx) = mpsc::unbounded_channel();
        let transport = Self {
            state: Arc::new(Mutex::new(MockState {
                plans: plans.into(),
                fallback,
                attempts: 0,
                urls: Vec::new(),
            })),
            ends_tx,
        };
        (transport, ends_rx)
    }

    pub fn accepting() -> (Self, mpsc::UnboundedReceiver<ServerEnd>) {
        Self::new(Vec::new(), Plan::Accept)
    }

    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }

    pub fn urls(&self) -> Vec<String> {
        self.state.lock().unwrap().urls.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, url: &str) -> Result<Link> {
        let plan = {
            let mut state = self.state.lock().unwrap();
            state.attempts += 1;
            state.urls.push(url.to_string());
            let fallback = state.fallback;
            state.plans.pop_front().unwrap_or(fallback)
        };

        match plan {
            Plan::Accept => {
                let (out_tx, out_rx) = mpsc::unbounded_channel();
                let (in_tx, in_rx) = mpsc::unbounded_channel();
                let _ = self.ends_tx.send(ServerEnd {
                    to_client: in_tx,
                    from_client: out_rx,
                });
                Ok(Link {
                    tx: out_tx,
                    rx: in_rx,
                })
            }
            Plan::Refuse => Err(ClientError::Transport("connection refused".to_string())),
            Plan::Hang => std::future::pending().await,
        }
    }
}

/// Relay side of one accepted socket
pub struct ServerEnd {
    to_client: mpsc::UnboundedSender<Incoming>,
    from_client: mpsc::UnboundedReceiver<Outgoing>,
}

impl ServerEnd {
    pub fn send(&self, message: &Message) {
        self.send_raw(&message.encode().unwrap());
    }

    pub fn send_raw(&self, text: &str) {
        let _ = self.to_client.send(Incoming::Text(text.to_string()));
    }

    /// Close the socket; `None` means dropped without a close frame
    pub fn close(&self, code: Option<u16>) {
        let _ = self.to_client.send(Incoming::Closed { code });
    }

    /// Next frame the client wrote, waiting if needed
    pub async fn next_frame(&mut self) -> Option<Outgoing> {
        self.from_client.recv().await
    }

    /// Next decoded message the client wrote, skipping close frames
    pub async fn next_message(&mut self) -> Option<Message> {
        while let Some(frame) = self.from_client.recv().await {
            if let Outgoing::Text(text) = frame {
                return Some(Message::decode(&text).unwrap());
            }
        }
        None
    }

    /// Everything written so far, without waiting
    pub fn written(&mut self) -> Vec<Outgoing> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.from_client.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Decoded messages written so far, without waiting
    pub fn written_messages(&mut self) -> Vec<Message> {
        self.written()
            .into_iter()
            .filter_map(|frame| match frame {
                Outgoing::Text(text) => Message::decode(&text).ok(),
                Outgoing::Close(_) => None,
            })
            .collect()
    }
}
