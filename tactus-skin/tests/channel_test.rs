//! ConnectionManager tests against a local WebSocket stub

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::Mutex;
use tactus_skin::{ChannelState, ConnectionManager, ControlChannel, SkinConfig};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Accepts WebSocket connections and records text frames. With
/// `close_immediately` the stub closes each connection right after the
/// handshake, like a device rebooting mid-session.
async fn spawn_ws_stub(received: Arc<Mutex<Vec<String>>>, close_immediately: bool) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let received = received.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                if close_immediately {
                    let _ = ws.close(None).await;
                    return;
                }
                while let Some(Ok(message)) = ws.next().await {
                    if let Message::Text(text) = message {
                        received.lock().push(text);
                    }
                }
            });
        }
    });

    port
}

fn config_for(port: u16) -> SkinConfig {
    let mut config = SkinConfig::default();
    config.device_url = "http://127.0.0.1".to_string();
    config.channel_port = port;
    config.connect_timeout_ms = 2000;
    config
}

async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

#[tokio::test]
async fn test_connect_and_send_delivers_payload() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let port = spawn_ws_stub(received.clone(), false).await;

    let manager = ConnectionManager::new(&config_for(port)).unwrap();
    assert!(manager.connect().await);
    assert_eq!(manager.state(), ChannelState::Connected);

    manager
        .send_text("{\"data\":[0,0,0,0,0,0,1]}".to_string())
        .await
        .unwrap();

    assert!(wait_until(|| !received.lock().is_empty()).await);
    assert_eq!(received.lock()[0], "{\"data\":[0,0,0,0,0,0,1]}");

    manager.disconnect().await;
}

#[tokio::test]
async fn test_connect_twice_is_idempotent() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let port = spawn_ws_stub(received, false).await;

    let manager = ConnectionManager::new(&config_for(port)).unwrap();
    assert!(manager.connect().await);
    assert!(manager.connect().await);
    assert_eq!(manager.state(), ChannelState::Connected);
    manager.disconnect().await;
}

#[tokio::test]
async fn test_connect_timeout_leaves_disconnected() {
    // Bound but never accepted, so the handshake stalls until the
    // manager's own timeout trips.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = config_for(port);
    config.connect_timeout_ms = 200;

    let manager = ConnectionManager::new(&config).unwrap();
    assert!(!manager.connect().await);
    assert_eq!(manager.state(), ChannelState::Disconnected);
    drop(listener);
}

#[tokio::test]
async fn test_connect_refused_leaves_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let manager = ConnectionManager::new(&config_for(port)).unwrap();
    assert!(!manager.connect().await);
    assert_eq!(manager.state(), ChannelState::Disconnected);
}

#[tokio::test]
async fn test_send_before_connect_fails() {
    let manager = ConnectionManager::new(&config_for(9)).unwrap();
    assert!(manager.send_text("{}".to_string()).await.is_err());
    assert_eq!(manager.state(), ChannelState::Disconnected);
}

#[tokio::test]
async fn test_device_close_collapses_state() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let port = spawn_ws_stub(received, true).await;

    let manager = ConnectionManager::new(&config_for(port)).unwrap();
    assert!(manager.connect().await);

    // The background reader notices the close and downgrades the state.
    assert!(wait_until(|| manager.state() == ChannelState::Disconnected).await);
    assert!(manager.send_text("{}".to_string()).await.is_err());
}

#[tokio::test]
async fn test_reconnect_after_device_close() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let port = spawn_ws_stub(received, true).await;

    let manager = ConnectionManager::new(&config_for(port)).unwrap();
    assert!(manager.connect().await);
    assert!(wait_until(|| manager.state() == ChannelState::Disconnected).await);

    // The stub keeps listening, so a fresh attempt succeeds.
    assert!(manager.connect().await);
    manager.disconnect().await;
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let port = spawn_ws_stub(received, false).await;

    let manager = ConnectionManager::new(&config_for(port)).unwrap();
    assert!(manager.connect().await);
    manager.disconnect().await;
    manager.disconnect().await;
    assert_eq!(manager.state(), ChannelState::Disconnected);
}
