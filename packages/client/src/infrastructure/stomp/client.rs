//! STOMP connection over a WebSocket.
//!
//! One reader task decodes inbound frames and routes MESSAGE frames to their
//! subscription channel; one writer task drains the outbound queue into the
//! socket. When either finishes, the other is aborted and every subscription
//! channel is closed.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use super::error::{Result, StompError};
use super::frame::{Command, Frame, FrameDecoder};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// STOMP connection configuration
#[derive(Debug, Clone)]
pub struct StompConfig {
    /// Value of the CONNECT `host` header
    pub host: String,
    /// Limit for the WebSocket handshake and for the CONNECTED reply
    pub connect_timeout: Duration,
    /// How long DISCONNECT waits for its RECEIPT before closing anyway
    pub disconnect_grace: Duration,
    /// Extra CONNECT headers (login, passcode, ...)
    pub connect_headers: Vec<(String, String)>,
}

impl Default for StompConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            connect_timeout: Duration::from_secs(10),
            disconnect_grace: Duration::from_secs(2),
            connect_headers: Vec::new(),
        }
    }
}

/// State shared between the client handle and its background tasks
#[derive(Default)]
struct Shared {
    subscriptions: Mutex<HashMap<String, mpsc::UnboundedSender<Frame>>>,
    receipts: Mutex<HashMap<String, oneshot::Sender<()>>>,
    open: AtomicBool,
}

/// An active subscription; yields MESSAGE frames in arrival order
pub struct Subscription {
    pub id: String,
    pub destination: String,
    receiver: mpsc::UnboundedReceiver<Frame>,
}

impl Subscription {
    /// Next MESSAGE frame, `None` once the connection has ended
    pub async fn next(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }
}

/// A connected STOMP client
pub struct StompClient {
    config: StompConfig,
    outbound: mpsc::UnboundedSender<Message>,
    shared: Arc<Shared>,
    next_subscription: AtomicU64,
    supervisor: Mutex<Option<JoinHandle<()>>>,
    version: Option<String>,
}

impl StompClient {
    /// Open the WebSocket and complete the STOMP CONNECT handshake
    pub async fn connect(url: &Url, config: StompConfig) -> Result<Self> {
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(StompError::Protocol(format!(
                "URL must use ws:// or wss:// scheme, got: {}",
                url.scheme()
            )));
        }

        info!("Connecting to STOMP broker at {}", url);
        let (ws, _response) = timeout(config.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| StompError::Timeout("WebSocket handshake".to_string()))??;
        let (mut sink, mut stream) = ws.split();

        let mut connect = Frame::new(Command::Connect)
            .header("accept-version", "1.2")
            .header("host", config.host.clone())
            .header("heart-beat", "0,0");
        for (name, value) in &config.connect_headers {
            connect = connect.header(name.clone(), value.clone());
        }
        sink.send(Message::Text(connect.encode_text()?.into())).await?;

        let mut decoder = FrameDecoder::new();
        let connected = timeout(
            config.connect_timeout,
            await_connected(&mut stream, &mut decoder),
        )
        .await
        .map_err(|_| StompError::Timeout("CONNECTED frame".to_string()))??;

        let version = connected.get_header("version").map(str::to_string);
        info!(
            "STOMP session established (version: {})",
            version.as_deref().unwrap_or("unknown")
        );

        let shared = Arc::new(Shared::default());
        shared.open.store(true, Ordering::SeqCst);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        let supervisor = tokio::spawn(supervise(sink, stream, decoder, outbound_rx, shared.clone()));

        Ok(Self {
            config,
            outbound,
            shared,
            next_subscription: AtomicU64::new(0),
            supervisor: Mutex::new(Some(supervisor)),
            version,
        })
    }

    /// Protocol version announced by the broker in CONNECTED
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }

    /// Subscribe to a destination with automatic acknowledgement
    pub async fn subscribe(&self, destination: &str) -> Result<Subscription> {
        if !self.is_open() {
            return Err(StompError::NotConnected);
        }

        let id = format!(
            "sub-{}",
            self.next_subscription.fetch_add(1, Ordering::Relaxed)
        );
        let (tx, rx) = mpsc::unbounded_channel();
        // registered before SUBSCRIBE goes out so the first MESSAGE is not lost
        self.shared
            .subscriptions
            .lock()
            .await
            .insert(id.clone(), tx);

        let frame = Frame::new(Command::Subscribe)
            .header("id", id.clone())
            .header("destination", destination)
            .header("ack", "auto");
        if let Err(e) = self.send_frame(&frame) {
            self.shared.subscriptions.lock().await.remove(&id);
            return Err(e);
        }

        debug!("Subscribed to {} as {}", destination, id);
        Ok(Subscription {
            id,
            destination: destination.to_string(),
            receiver: rx,
        })
    }

    /// Send a frame body to a destination
    pub fn send(
        &self,
        destination: &str,
        content_type: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<()> {
        if !self.is_open() {
            return Err(StompError::NotConnected);
        }
        let frame = Frame::new(Command::Send)
            .header("destination", destination)
            .header("content-type", content_type)
            .body(body);
        self.send_frame(&frame)
    }

    /// Graceful shutdown: DISCONNECT with a receipt, then close the socket.
    ///
    /// A missing RECEIPT is logged, not returned; the socket is closed either way.
    pub async fn disconnect(&self) -> Result<()> {
        if !self.is_open() {
            return Ok(());
        }

        let receipt_id = format!("disconnect-{}", Uuid::new_v4());
        let (tx, rx) = oneshot::channel();
        self.shared
            .receipts
            .lock()
            .await
            .insert(receipt_id.clone(), tx);

        let frame = Frame::new(Command::Disconnect).header("receipt", receipt_id.clone());
        let result = self.send_frame(&frame);
        if result.is_ok() {
            match timeout(self.config.disconnect_grace, rx).await {
                Ok(Ok(())) => debug!("Received receipt {}", receipt_id),
                Ok(Err(_)) => debug!("Connection ended before receipt {}", receipt_id),
                Err(_) => warn!("No receipt for DISCONNECT within {:?}", self.config.disconnect_grace),
            }
        }

        self.shared.open.store(false, Ordering::SeqCst);
        let _ = self.outbound.send(Message::Close(None));

        if let Some(handle) = self.supervisor.lock().await.take()
            && timeout(self.config.disconnect_grace, handle).await.is_err()
        {
            warn!("STOMP tasks did not stop within {:?}", self.config.disconnect_grace);
        }

        info!("Disconnected from STOMP broker");
        result
    }

    fn send_frame(&self, frame: &Frame) -> Result<()> {
        let text = frame.encode_text()?;
        self.outbound
            .send(Message::Text(text.into()))
            .map_err(|_| StompError::NotConnected)
    }
}

/// Read until CONNECTED, failing on ERROR or on any other frame
async fn await_connected(
    stream: &mut SplitStream<WsStream>,
    decoder: &mut FrameDecoder,
) -> Result<Frame> {
    loop {
        if let Some(frame) = decoder.next_frame()? {
            return match frame.command {
                Command::Connected => Ok(frame),
                Command::Error => Err(broker_error(&frame)),
                other => Err(StompError::Protocol(format!(
                    "expected CONNECTED, got {other}"
                ))),
            };
        }

        match stream.next().await {
            Some(Ok(message)) => {
                if !push_message(decoder, message) {
                    return Err(StompError::ConnectionClosed);
                }
            }
            Some(Err(e)) => return Err(e.into()),
            None => return Err(StompError::ConnectionClosed),
        }
    }
}

/// Feed a WebSocket message into the decoder. Returns false on Close.
fn push_message(decoder: &mut FrameDecoder, message: Message) -> bool {
    match message {
        Message::Text(text) => decoder.push(text.as_bytes()),
        Message::Binary(bytes) => decoder.push(&bytes),
        Message::Close(_) => return false,
        // ping/pong is handled by tungstenite
        _ => {}
    }
    true
}

fn broker_error(frame: &Frame) -> StompError {
    StompError::Broker {
        message: frame.get_header("message").unwrap_or("").to_string(),
        body: String::from_utf8_lossy(&frame.body).into_owned(),
    }
}

async fn supervise(
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    decoder: FrameDecoder,
    outbound_rx: mpsc::UnboundedReceiver<Message>,
    shared: Arc<Shared>,
) {
    let mut recv_task = tokio::spawn(read_loop(stream, decoder, shared.clone()));
    let mut send_task = tokio::spawn(write_loop(sink, outbound_rx));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    shared.open.store(false, Ordering::SeqCst);
    // dropping the senders ends every Subscription stream
    shared.subscriptions.lock().await.clear();
    shared.receipts.lock().await.clear();
    debug!("STOMP connection tasks finished");
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    mut decoder: FrameDecoder,
    shared: Arc<Shared>,
) {
    loop {
        loop {
            match decoder.next_frame() {
                Ok(Some(frame)) => {
                    if !dispatch(&shared, frame).await {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Dropping connection after malformed frame: {}", e);
                    return;
                }
            }
        }

        match stream.next().await {
            Some(Ok(message)) => {
                if !push_message(&mut decoder, message) {
                    info!("Broker closed the WebSocket");
                    return;
                }
            }
            Some(Err(e)) => {
                warn!("WebSocket error: {}", e);
                return;
            }
            None => return,
        }
    }
}

/// Route one inbound frame. Returns false when the connection must end.
async fn dispatch(shared: &Shared, frame: Frame) -> bool {
    match frame.command {
        Command::Message => {
            let Some(id) = frame.get_header("subscription").map(str::to_string) else {
                warn!("MESSAGE frame without subscription header");
                return true;
            };
            let mut subscriptions = shared.subscriptions.lock().await;
            match subscriptions.get(&id) {
                Some(sender) => {
                    if sender.send(frame).is_err() {
                        debug!("Subscription {} dropped by receiver", id);
                        subscriptions.remove(&id);
                    }
                }
                None => debug!("MESSAGE for unknown subscription {}", id),
            }
            true
        }
        Command::Receipt => {
            if let Some(id) = frame.get_header("receipt-id")
                && let Some(waiter) = shared.receipts.lock().await.remove(id)
            {
                let _ = waiter.send(());
            }
            true
        }
        Command::Error => {
            error!(
                "Broker sent ERROR: {} {}",
                frame.get_header("message").unwrap_or(""),
                String::from_utf8_lossy(&frame.body)
            );
            false
        }
        other => {
            debug!("Ignoring unexpected {} frame", other);
            true
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = rx.recv().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(e) = sink.send(message).await {
            warn!("Failed to write to WebSocket: {}", e);
            break;
        }
        if closing {
            break;
        }
    }
    let _ = sink.close().await;
}
