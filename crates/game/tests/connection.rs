use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use tankwar::net::{MAX_FRAME_SIZE, SEND_QUEUE_CAPACITY};
use tankwar::{
    Connection, ConnectionState, Envelope, HostListener, InputSnapshot, Message, NetError,
    connect, key,
};

const WAIT: Duration = Duration::from_secs(2);

async fn connected_pair() -> (Connection, Connection) {
    let listener = HostListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().to_string();

    let (host, client) = tokio::join!(listener.accept(), connect(&addr));
    (host.unwrap(), client.unwrap())
}

async fn host_with_raw_peer() -> (Connection, TcpStream) {
    let listener = HostListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr();

    let (host, raw) = tokio::join!(listener.accept(), TcpStream::connect(addr));
    (host.unwrap(), raw.unwrap())
}

async fn recv(connection: &mut Connection) -> Option<Message> {
    timeout(WAIT, connection.recv())
        .await
        .expect("Timed out waiting for a message")
}

#[tokio::test]
async fn test_messages_flow_both_ways() {
    let (mut host, mut client) = connected_pair().await;

    client
        .send(Message::PlayerInput(InputSnapshot::from_codes([
            key::RIGHT,
            key::LEFT,
        ])))
        .unwrap();
    client.send(Message::FireRequest).unwrap();
    host.send(Message::ChatMessage("ready?".into())).unwrap();

    assert_eq!(
        recv(&mut host).await,
        Some(Message::PlayerInput(InputSnapshot::from_codes([37, 39])))
    );
    assert_eq!(recv(&mut host).await, Some(Message::FireRequest));
    assert_eq!(
        recv(&mut client).await,
        Some(Message::ChatMessage("ready?".into()))
    );
}

#[tokio::test]
async fn test_sequence_is_recorded() {
    let (mut host, mut client) = connected_pair().await;

    for i in 0..3 {
        client
            .send(Message::ChatMessage(format!("line {}", i)))
            .unwrap();
    }
    for _ in 0..3 {
        assert!(recv(&mut host).await.is_some());
    }

    let host_stats = host.stats();
    assert_eq!(host_stats.messages_received, 3);
    assert_eq!(host_stats.last_received_sequence, Some(2));
    assert_eq!(client.stats().messages_sent, 3);
    assert_eq!(client.stats().bytes_sent, host_stats.bytes_received + 12);
}

#[tokio::test]
async fn test_malformed_frame_is_skipped() {
    let (mut host, mut raw) = host_with_raw_peer().await;

    let mut garbage = 8u32.to_be_bytes().to_vec();
    garbage.extend_from_slice(&[0xFF; 8]);
    raw.write_all(&garbage).await.unwrap();

    let frame = Envelope::new(0, Message::ChatMessage("after".into()))
        .to_frame()
        .unwrap();
    raw.write_all(&frame).await.unwrap();

    assert_eq!(
        recv(&mut host).await,
        Some(Message::ChatMessage("after".into()))
    );
    assert!(host.is_open());
    assert_eq!(host.stats().malformed_messages, 1);
    assert_eq!(host.stats().messages_received, 1);
}

#[tokio::test]
async fn test_oversized_frame_ends_stream() {
    let (mut host, mut raw) = host_with_raw_peer().await;

    let header = ((MAX_FRAME_SIZE + 1) as u32).to_be_bytes();
    raw.write_all(&header).await.unwrap();

    assert_eq!(recv(&mut host).await, None);
    assert_eq!(host.state(), ConnectionState::PeerClosed);
}

#[tokio::test]
async fn test_peer_close_is_detected() {
    let (mut host, mut client) = connected_pair().await;

    client.close();
    assert_eq!(client.state(), ConnectionState::Closed);

    assert_eq!(recv(&mut host).await, None);
    assert_eq!(host.state(), ConnectionState::PeerClosed);
    assert!(!host.is_open());
    assert!(host.try_recv().is_none());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (mut host, _client) = connected_pair().await;

    host.close();
    host.close();

    assert_eq!(host.state(), ConnectionState::Closed);
    assert!(matches!(
        host.send(Message::FireRequest),
        Err(NetError::Closed)
    ));
    assert!(matches!(
        host.publish(Message::FireRequest),
        Err(NetError::Closed)
    ));
    assert!(host.try_recv().is_none());
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = HostListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().to_string();
    drop(listener);

    assert!(matches!(
        connect(&addr).await,
        Err(NetError::Connect { .. })
    ));
}

#[tokio::test]
async fn test_publish_sends_only_latest() {
    let (mut host, mut client) = connected_pair().await;

    host.publish(Message::ChatMessage("stale".into())).unwrap();
    host.publish(Message::ChatMessage("fresh".into())).unwrap();

    assert_eq!(
        recv(&mut client).await,
        Some(Message::ChatMessage("fresh".into()))
    );
    assert!(
        timeout(Duration::from_millis(200), client.recv())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_full_queue_refuses_without_waiting() {
    let (mut host, _raw) = host_with_raw_peer().await;

    for _ in 0..SEND_QUEUE_CAPACITY {
        host.send(Message::FireRequest).unwrap();
    }
    assert!(matches!(
        host.send(Message::FireRequest),
        Err(NetError::QueueFull)
    ));
    assert_eq!(host.stats().send_failures, 1);
    assert!(host.is_open());
}

#[tokio::test]
async fn test_write_failure_is_counted() {
    let (mut host, raw) = host_with_raw_peer().await;
    drop(raw);

    let mut failures = 0;
    for _ in 0..100 {
        host.send(Message::ChatMessage("anyone there?".into()))
            .unwrap();
        sleep(Duration::from_millis(20)).await;
        failures = host.stats().send_failures;
        if failures > 0 {
            break;
        }
    }

    assert!(failures > 0);
}
