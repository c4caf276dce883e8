//! End-to-end relay behaviour over real sockets.

use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{encode, EncodingKey, Header};
use kurbo::Point;
use serde_json::json;
use sketchroom_core::shapes::Rectangle;
use sketchroom_core::{ClientMessage, ServerMessage, Shape, ShapeMutation};
use sketchroom_server::{app, AppState, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn spawn_server(config: Config) -> SocketAddr {
    let cors = config.cors_layer().unwrap();
    let state = Arc::new(AppState::new(&config));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state, cors)).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, room: &str) -> Client {
    let url = format!("ws://{addr}/ws?room={room}");
    let (ws, _) = timeout(WAIT, connect_async(url)).await.unwrap().unwrap();
    ws
}

async fn recv(ws: &mut Client) -> ServerMessage {
    loop {
        let frame = timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return ServerMessage::from_json(text.as_str()).unwrap();
        }
    }
}

async fn send(ws: &mut Client, msg: &ClientMessage) {
    ws.send(Message::Text(msg.to_json().unwrap().into()))
        .await
        .unwrap();
}

/// Connect and consume the `initial-state` / `roster-update` greeting.
async fn join(addr: SocketAddr, room: &str) -> (Client, Vec<Shape>, usize) {
    let mut ws = connect(addr, room).await;
    let ServerMessage::InitialState { shapes, .. } = recv(&mut ws).await else {
        panic!("expected initial-state first");
    };
    let ServerMessage::RosterUpdate { peers } = recv(&mut ws).await else {
        panic!("expected roster-update second");
    };
    (ws, shapes, peers.len())
}

fn add_rect() -> ClientMessage {
    ClientMessage::ShapeMutation {
        mutation: ShapeMutation::Add {
            shape: Shape::Rectangle(Rectangle::new(
                Point::new(0.1, 0.1),
                Point::new(0.3, 0.4),
            )),
        },
    }
}

#[tokio::test]
async fn test_join_greets_and_announces() {
    let addr = spawn_server(Config::default()).await;
    let (mut a, shapes, roster) = join(addr, "lobby").await;
    assert!(shapes.is_empty());
    assert_eq!(roster, 0);

    let (_b, _, roster) = join(addr, "lobby").await;
    assert_eq!(roster, 1);

    let ServerMessage::PeerJoined { peer } = recv(&mut a).await else {
        panic!("expected peer-joined");
    };
    assert!(peer.color.starts_with('#'));
}

#[tokio::test]
async fn test_broadcast_without_echo() {
    let addr = spawn_server(Config::default()).await;
    let (mut a, _, _) = join(addr, "lobby").await;
    let (mut b, _, _) = join(addr, "lobby").await;
    let ServerMessage::PeerJoined { peer: b_peer } = recv(&mut a).await else {
        panic!("expected peer-joined");
    };

    send(&mut a, &add_rect()).await;
    let ServerMessage::ShapeMutation { from, mutation } = recv(&mut b).await else {
        panic!("expected shape-mutation");
    };
    assert!(matches!(mutation, ShapeMutation::Add { .. }));
    assert_ne!(from, b_peer.id);

    // A's next frame is B's cursor, not its own mutation.
    send(&mut b, &ClientMessage::CursorMove { x: 0.25, y: 0.75 }).await;
    assert_eq!(
        recv(&mut a).await,
        ServerMessage::CursorMove {
            peer_id: b_peer.id,
            x: 0.25,
            y: 0.75
        }
    );
}

#[tokio::test]
async fn test_late_joiner_receives_shapes() {
    let addr = spawn_server(Config::default()).await;
    let (mut a, _, _) = join(addr, "lobby").await;
    let (mut b, _, _) = join(addr, "lobby").await;

    send(&mut a, &add_rect()).await;
    send(&mut a, &add_rect()).await;
    for _ in 0..2 {
        assert!(matches!(
            recv(&mut b).await,
            ServerMessage::ShapeMutation { .. }
        ));
    }

    let (_c, shapes, roster) = join(addr, "lobby").await;
    assert_eq!(shapes.len(), 2);
    assert_eq!(roster, 2);
}

#[tokio::test]
async fn test_rooms_do_not_leak() {
    let addr = spawn_server(Config::default()).await;
    let (mut a, _, _) = join(addr, "one").await;
    let (mut b, _, _) = join(addr, "one").await;
    let (_c, _, roster) = join(addr, "two").await;
    assert_eq!(roster, 0);

    send(&mut a, &add_rect()).await;
    assert!(matches!(
        recv(&mut b).await,
        ServerMessage::ShapeMutation { .. }
    ));
    let (_d, shapes, _) = join(addr, "two").await;
    assert!(shapes.is_empty());
}

#[tokio::test]
async fn test_peer_left_on_disconnect() {
    let addr = spawn_server(Config::default()).await;
    let (mut a, _, _) = join(addr, "lobby").await;
    let (mut b, _, _) = join(addr, "lobby").await;
    let ServerMessage::PeerJoined { peer } = recv(&mut a).await else {
        panic!("expected peer-joined");
    };

    b.close(None).await.unwrap();
    assert_eq!(
        recv(&mut a).await,
        ServerMessage::PeerLeft { peer_id: peer.id }
    );
}

#[tokio::test]
async fn test_malformed_frame_gets_error_reply() {
    let addr = spawn_server(Config::default()).await;
    let (mut a, _, _) = join(addr, "lobby").await;
    let (mut b, _, _) = join(addr, "lobby").await;
    let _ = recv(&mut a).await;

    a.send(Message::Text(r#"{"type":"nope"}"#.to_string().into()))
        .await
        .unwrap();
    assert!(matches!(recv(&mut a).await, ServerMessage::Error { .. }));

    // Connection stays usable.
    send(&mut a, &add_rect()).await;
    assert!(matches!(
        recv(&mut b).await,
        ServerMessage::ShapeMutation { .. }
    ));
}

#[tokio::test]
async fn test_missing_room_is_rejected() {
    let addr = spawn_server(Config::default()).await;
    let err = connect_async(format!("ws://{addr}/ws")).await.unwrap_err();
    let status = match err {
        tungstenite::Error::Http(resp) => resp.status(),
        other => panic!("expected an HTTP rejection, got {other:?}"),
    };
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_jwt_admission() {
    let secret = "relay-secret";
    let addr = spawn_server(Config {
        jwt_secret: Some(secret.into()),
        ..Config::default()
    })
    .await;

    let err = connect_async(format!("ws://{addr}/ws?room=lobby"))
        .await
        .unwrap_err();
    let status = match err {
        tungstenite::Error::Http(resp) => resp.status(),
        other => panic!("expected an HTTP rejection, got {other:?}"),
    };
    assert_eq!(status, 401);

    let exp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 600;
    let token = encode(
        &Header::default(),
        &json!({ "userId": 42, "exp": exp }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();
    let mut ws = connect(addr, &format!("lobby&token={token}")).await;
    assert!(matches!(
        recv(&mut ws).await,
        ServerMessage::InitialState { .. }
    ));
}

#[tokio::test]
async fn test_health_reports_counts() {
    let addr = spawn_server(Config::default()).await;
    let (_a, _, _) = join(addr, "lobby").await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut body = String::new();
    timeout(WAIT, stream.read_to_string(&mut body))
        .await
        .unwrap()
        .unwrap();

    assert!(body.starts_with("HTTP/1.1 200"));
    assert!(body.contains("\"status\":\"OK\""));
    assert!(body.contains("\"rooms\":1"));
    assert!(body.contains("\"peers\":1"));
}
