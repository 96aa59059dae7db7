//! End-to-end checks against a local WebSocket server.

use std::time::Duration;

use client::{Client, ClientConfig, ClientError, Frame, Notice, Renderer};
use futures_util::{SinkExt, StreamExt};
use protocol::packets::{CellRecord, WorldUpdate, build_add_owned, build_world_update};
use protocol::{Color, Position};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

const WAIT: Duration = Duration::from_secs(5);

struct Probe {
    notices: mpsc::UnboundedSender<Notice>,
}

impl Renderer for Probe {
    fn render(&mut self, _frame: &Frame<'_>) {}

    fn on_notice(&mut self, notice: Notice) {
        let _ = self.notices.send(notice);
    }
}

fn config(url: String) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.connection.url = url;
    config.connection.reconnect_delay_ms = 20;
    config
}

async fn listen() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<tokio::net::TcpStream> {
    let (stream, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_binary(ws: &mut WebSocketStream<tokio::net::TcpStream>) -> Vec<u8> {
    loop {
        match timeout(WAIT, ws.next()).await.unwrap() {
            Some(Ok(Message::Binary(data))) => return data.to_vec(),
            Some(Ok(_)) => continue,
            other => panic!("socket ended: {:?}", other),
        }
    }
}

async fn expect_notice(rx: &mut mpsc::UnboundedReceiver<Notice>, wanted: Notice) {
    loop {
        let notice = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        if notice == wanted {
            return;
        }
    }
}

fn spawn_update(id: u32) -> Vec<u8> {
    let update = WorldUpdate {
        eats: Vec::new(),
        cells: vec![CellRecord {
            id,
            position: Position::new(100.0, 100.0),
            size: 32.0,
            color: Color::new(0, 255, 0),
            flags: 0,
            name: "probe".into(),
        }],
        alive: vec![id],
    };
    build_world_update(&update).finish().to_vec()
}

#[tokio::test]
async fn test_handshake_join_and_reconnect() {
    let (listener, url) = listen().await;
    let mut config = config(url);
    config.player.nickname = Some("probe".into());

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let (handle, commands) = client::channel();
    let task = tokio::spawn(async move {
        let mut client = Client::new(config, Probe { notices: notice_tx });
        client.run(commands).await
    });

    let mut ws = accept(&listener).await;
    assert_eq!(next_binary(&mut ws).await, vec![255, 1, 0, 0, 0]);
    let join = next_binary(&mut ws).await;
    assert_eq!(join[0], 0);
    assert_eq!(join.len(), 1 + 2 * "probe".len());

    // A malformed frame is dropped without closing the connection.
    ws.send(Message::Binary(vec![99u8, 1, 2].into())).await.unwrap();
    ws.send(Message::Binary(build_add_owned(7).finish())).await.unwrap();
    ws.send(Message::Binary(spawn_update(7).into())).await.unwrap();
    expect_notice(&mut notice_rx, Notice::Spawned).await;

    ws.close(None).await.unwrap();
    expect_notice(&mut notice_rx, Notice::Disconnected).await;

    // Fresh connection starts with the handshake again.
    let mut ws = accept(&listener).await;
    assert_eq!(next_binary(&mut ws).await, vec![255, 1, 0, 0, 0]);
    assert_eq!(next_binary(&mut ws).await[0], 0);

    handle.shutdown().unwrap();
    let result = timeout(WAIT, task).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_split_sends_intent_first() {
    let (listener, url) = listen().await;
    let config = config(url);

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let (handle, commands) = client::channel();
    let task = tokio::spawn(async move {
        let mut client = Client::new(config, Probe { notices: notice_tx });
        client.run(commands).await
    });

    let mut ws = accept(&listener).await;
    assert_eq!(next_binary(&mut ws).await[0], 255);
    expect_notice(&mut notice_rx, Notice::Connected).await;

    handle.split().unwrap();
    // Throttled intents may already be in flight; the split must directly
    // follow an intent.
    let mut previous = next_binary(&mut ws).await;
    loop {
        let packet = next_binary(&mut ws).await;
        if packet[0] == 17 {
            assert_eq!(previous[0], 16);
            assert_eq!(previous.len(), 21);
            break;
        }
        previous = packet;
    }

    handle.shutdown().unwrap();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn test_set_region_switches_server() {
    let (first, first_url) = listen().await;
    let (second, second_url) = listen().await;
    let config = config(first_url);

    let (notice_tx, _notice_rx) = mpsc::unbounded_channel();
    let (handle, commands) = client::channel();
    let task = tokio::spawn(async move {
        let mut client = Client::new(config, Probe { notices: notice_tx });
        client.run(commands).await
    });

    let mut ws = accept(&first).await;
    assert_eq!(next_binary(&mut ws).await[0], 255);

    handle.set_region(second_url).unwrap();
    let mut ws = accept(&second).await;
    assert_eq!(next_binary(&mut ws).await, vec![255, 1, 0, 0, 0]);

    handle.shutdown().unwrap();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn test_gives_up_after_attempt_limit() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut config = config(format!("ws://{}", addr));
    config.connection.max_reconnect_attempts = Some(2);

    let (notice_tx, _notice_rx) = mpsc::unbounded_channel();
    let (_handle, commands) = client::channel();
    let mut client = Client::new(config, Probe { notices: notice_tx });
    let result = timeout(WAIT, client.run(commands)).await.unwrap();
    assert!(matches!(result, Err(ClientError::ReconnectLimit(2))));
    assert_eq!(client.url(), format!("ws://{}", addr));
    assert!(client.session().store().is_empty());
}
