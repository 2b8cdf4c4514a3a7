//! Test fixtures for integration tests.
//!
//! `TestBackend` plays both external collaborators on an ephemeral port: the
//! room service HTTP API and a minimal STOMP broker at `/chat`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex as StdMutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use roomchat_client::{
    ClientConfig,
    infrastructure::stomp::{Command, Frame, FrameDecoder},
};
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

struct Subscriber {
    connection: usize,
    id: String,
    destination: String,
    sender: mpsc::UnboundedSender<Message>,
}

#[derive(Default)]
pub struct BackendState {
    rooms: Mutex<HashMap<String, Vec<Value>>>,
    subscribers: Mutex<Vec<Subscriber>>,
    connections: StdMutex<Vec<(usize, mpsc::UnboundedSender<Message>)>>,
    connect_headers: StdMutex<Vec<(String, String)>>,
    next_connection: AtomicUsize,
    next_message: AtomicUsize,
    open_connections: AtomicUsize,
    subscriber_count: AtomicUsize,
    disconnects: AtomicUsize,
    reject_connect: AtomicBool,
}

pub struct TestBackend {
    addr: SocketAddr,
    pub state: Arc<BackendState>,
    handle: JoinHandle<()>,
}

impl TestBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        let app = Router::new()
            .route("/api/v1/rooms", post(create_room))
            .route("/api/v1/rooms/{room_id}", get(get_room))
            .route("/api/v1/rooms/{room_id}/messages", get(get_messages))
            .route("/chat", get(websocket_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test backend");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test backend failed");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> url::Url {
        url::Url::parse(&format!("ws://{}/chat", self.addr)).unwrap()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url(), "/chat").expect("Invalid test config")
    }

    /// Answer the next CONNECT frames with ERROR
    pub fn reject_connections(&self) {
        self.state.reject_connect.store(true, Ordering::SeqCst);
    }

    /// Send a broker ERROR frame on every open connection
    pub fn send_error_to_all(&self, message: &str) {
        let error = Frame::new(Command::Error)
            .header("message", message)
            .body("broker failure");
        let text = error.encode_text().unwrap();
        for (_, sender) in self.state.connections.lock().unwrap().iter() {
            let _ = sender.send(Message::Text(text.clone().into()));
        }
    }

    /// Close every open WebSocket from the server side
    pub fn close_all_connections(&self) {
        for (_, sender) in self.state.connections.lock().unwrap().iter() {
            let _ = sender.send(Message::Close(None));
        }
    }

    /// Headers of the most recent CONNECT frame
    pub fn last_connect_headers(&self) -> Vec<(String, String)> {
        self.state.connect_headers.lock().unwrap().clone()
    }

    pub fn open_connections(&self) -> usize {
        self.state.open_connections.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.state.disconnects.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.subscriber_count.load(Ordering::SeqCst)
    }

    pub async fn add_room(&self, room_id: &str) {
        self.state
            .rooms
            .lock()
            .await
            .insert(room_id.to_string(), Vec::new());
    }

    /// Poll until `check` holds or two seconds pass
    pub async fn wait_until(&self, check: impl Fn(&Self) -> bool) -> bool {
        for _ in 0..200 {
            if check(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn room_json(room_id: &str) -> Value {
    json!({ "id": format!("id-{room_id}"), "roomId": room_id, "messages": [] })
}

async fn create_room(
    State(state): State<Arc<BackendState>>,
    body: String,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut rooms = state.rooms.lock().await;
    if rooms.contains_key(&body) {
        return Err((StatusCode::BAD_REQUEST, "Room already exists!".to_string()));
    }
    rooms.insert(body.clone(), Vec::new());
    Ok(Json(room_json(&body)))
}

async fn get_room(
    State(state): State<Arc<BackendState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if state.rooms.lock().await.contains_key(&room_id) {
        Ok(Json(room_json(&room_id)))
    } else {
        Err((StatusCode::BAD_REQUEST, "Room not found!!".to_string()))
    }
}

/// Last `size` messages of page `page`, counted from the newest, oldest first
async fn get_messages(
    State(state): State<Arc<BackendState>>,
    Path(room_id): Path<String>,
    Query(params): Query<HashMap<String, usize>>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let rooms = state.rooms.lock().await;
    let messages = rooms.get(&room_id).ok_or(StatusCode::BAD_REQUEST)?;
    let size = params.get("size").copied().unwrap_or(20);
    let page = params.get("page").copied().unwrap_or(0);

    let total = messages.len();
    let start = total.saturating_sub((page + 1) * size);
    let end = (start + size).min(total);
    Ok(Json(messages[start..end].to_vec()))
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<BackendState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<BackendState>) {
    let connection = state.next_connection.fetch_add(1, Ordering::SeqCst);
    state.open_connections.fetch_add(1, Ordering::SeqCst);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    state
        .connections
        .lock()
        .unwrap()
        .push((connection, tx.clone()));

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if sender.send(message).await.is_err() || closing {
                break;
            }
        }
    });
    let reply = |frame: Frame| Message::Text(frame.encode_text().unwrap().into());

    let mut decoder = FrameDecoder::new();
    'socket: while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => decoder.push(text.as_bytes()),
            Message::Binary(bytes) => decoder.push(&bytes),
            Message::Close(_) => break,
            _ => continue,
        }

        while let Ok(Some(frame)) = decoder.next_frame() {
            match frame.command {
                Command::Connect | Command::Stomp => {
                    *state.connect_headers.lock().unwrap() = frame.headers.clone();
                    if state.reject_connect.load(Ordering::SeqCst) {
                        let error = Frame::new(Command::Error)
                            .header("message", "Access denied")
                            .body("not allowed");
                        let _ = tx.send(reply(error));
                        break 'socket;
                    }
                    let connected = Frame::new(Command::Connected)
                        .header("version", "1.2")
                        .header("heart-beat", "0,0");
                    let _ = tx.send(reply(connected));
                }
                Command::Subscribe => {
                    state.subscribers.lock().await.push(Subscriber {
                        connection,
                        id: frame.get_header("id").unwrap_or_default().to_string(),
                        destination: frame.get_header("destination").unwrap_or_default().to_string(),
                        sender: tx.clone(),
                    });
                    state.subscriber_count.fetch_add(1, Ordering::SeqCst);
                }
                Command::Send => publish(&state, &frame).await,
                Command::Disconnect => {
                    state.disconnects.fetch_add(1, Ordering::SeqCst);
                    if let Some(receipt) = frame.get_header("receipt") {
                        let receipt = Frame::new(Command::Receipt).header("receipt-id", receipt);
                        let _ = tx.send(reply(receipt));
                    }
                }
                _ => {}
            }
        }
    }

    {
        let mut subscribers = state.subscribers.lock().await;
        let before = subscribers.len();
        subscribers.retain(|s| s.connection != connection);
        state
            .subscriber_count
            .fetch_sub(before - subscribers.len(), Ordering::SeqCst);
    }
    state
        .connections
        .lock()
        .unwrap()
        .retain(|(id, _)| *id != connection);
    drop(tx);
    let _ = tokio::time::timeout(Duration::from_secs(1), send_task).await;
    state.open_connections.fetch_sub(1, Ordering::SeqCst);
}

/// `/app/sendMessage/{roomId}` → store with a timestamp and broadcast to `/topic/room/{roomId}`
async fn publish(state: &BackendState, frame: &Frame) {
    let Some(room_id) = frame
        .get_header("destination")
        .and_then(|d| d.strip_prefix("/app/sendMessage/"))
        .map(str::to_string)
    else {
        return;
    };
    let Ok(mut body) = serde_json::from_slice::<Value>(&frame.body) else {
        return;
    };
    body["timeStamp"] = json!(chrono::Local::now().naive_local().to_string().replace(' ', "T"));

    if let Some(history) = state.rooms.lock().await.get_mut(&room_id) {
        history.push(body.clone());
    }

    let topic = format!("/topic/room/{room_id}");
    let payload = body.to_string();
    for subscriber in state.subscribers.lock().await.iter() {
        if subscriber.destination != topic {
            continue;
        }
        let message_id = state.next_message.fetch_add(1, Ordering::SeqCst);
        let message = Frame::new(Command::Message)
            .header("destination", topic.clone())
            .header("subscription", subscriber.id.clone())
            .header("message-id", message_id.to_string())
            .header("content-type", "application/json")
            .body(payload.clone());
        let _ = subscriber
            .sender
            .send(Message::Text(message.encode_text().unwrap().into()));
    }
}
