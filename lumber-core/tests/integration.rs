//! Integration tests — full send/ack round-trips against an in-test
//! lumberjack server over a real TCP connection on localhost.

use std::io::Read;
use std::time::Duration;

use flate2::read::ZlibDecoder;
use lumber_core::{Client, ClientConfig, LumberError};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// ── Helpers ──────────────────────────────────────────────────────

/// Spin up a listener on an OS-assigned port and return its address.
async fn ephemeral_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

fn ack_frame(seq: u32) -> [u8; 6] {
    let mut f = [b'2', b'A', 0, 0, 0, 0];
    f[2..6].copy_from_slice(&seq.to_be_bytes());
    f
}

/// Server side: read one complete batch — window frame plus all data
/// frames, inflating the compressed wrapper if present — and return
/// the `(seq, payload)` pairs in arrival order.
async fn read_batch(stream: &mut TcpStream) -> Vec<(u32, Vec<u8>)> {
    let mut header = [0u8; 6];
    stream.read_exact(&mut header).await.unwrap();
    assert_eq!(&header[..2], &[b'2', b'W'], "expected window frame");
    let count = u32::from_be_bytes(header[2..6].try_into().unwrap());

    let mut marker = [0u8; 2];
    stream.read_exact(&mut marker).await.unwrap();

    if marker == [b'2', b'C'] {
        let mut len_bytes = [0u8; 4];
        stream.read_exact(&mut len_bytes).await.unwrap();
        let len = u32::from_be_bytes(len_bytes) as usize;

        let mut compressed = vec![0u8; len];
        stream.read_exact(&mut compressed).await.unwrap();

        let mut inflated = Vec::new();
        ZlibDecoder::new(&compressed[..])
            .read_to_end(&mut inflated)
            .unwrap();
        parse_data_frames(&inflated, count)
    } else {
        assert_eq!(marker, [b'2', b'J'], "expected data frame");
        let mut events = vec![read_data_frame_body(stream).await];
        for _ in 1..count {
            stream.read_exact(&mut marker).await.unwrap();
            assert_eq!(marker, [b'2', b'J']);
            events.push(read_data_frame_body(stream).await);
        }
        events
    }
}

/// Read the seq/len/payload of a data frame whose marker was consumed.
async fn read_data_frame_body(stream: &mut TcpStream) -> (u32, Vec<u8>) {
    let mut fixed = [0u8; 8];
    stream.read_exact(&mut fixed).await.unwrap();
    let seq = u32::from_be_bytes(fixed[..4].try_into().unwrap());
    let len = u32::from_be_bytes(fixed[4..].try_into().unwrap()) as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.unwrap();
    (seq, payload)
}

fn parse_data_frames(mut buf: &[u8], count: u32) -> Vec<(u32, Vec<u8>)> {
    let mut events = Vec::new();
    for _ in 0..count {
        assert_eq!(&buf[..2], &[b'2', b'J']);
        let seq = u32::from_be_bytes(buf[2..6].try_into().unwrap());
        let len = u32::from_be_bytes(buf[6..10].try_into().unwrap()) as usize;
        events.push((seq, buf[10..10 + len].to_vec()));
        buf = &buf[10 + len..];
    }
    assert!(buf.is_empty(), "trailing bytes after declared data frames");
    events
}

fn sample_events(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({"message": format!("event {i}"), "offset": i}))
        .collect()
}

/// Assert the wire pairs match the batch: sequences 0..n with no gaps,
/// payloads decoding back to the original events.
fn assert_batch_matches(pairs: &[(u32, Vec<u8>)], events: &[Value]) {
    assert_eq!(pairs.len(), events.len());
    for (i, ((seq, payload), event)) in pairs.iter().zip(events).enumerate() {
        assert_eq!(*seq, i as u32);
        let decoded: Value = serde_json::from_slice(payload).unwrap();
        assert_eq!(&decoded, event);
    }
}

// ── Send / ack round-trips ───────────────────────────────────────

#[tokio::test]
async fn plain_send_round_trip() {
    let (listener, addr) = ephemeral_listener().await;
    let events = sample_events(5);

    let server_events = events.clone();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let pairs = read_batch(&mut stream).await;
        assert_batch_matches(&pairs, &server_events);
        stream.write_all(&ack_frame(5)).await.unwrap();
    });

    let mut client = Client::dial(&addr, ClientConfig::default()).await.unwrap();
    let acked = client.send_sync(&events).await.unwrap();
    assert_eq!(acked, 5);

    server.await.unwrap();
}

#[tokio::test]
async fn compressed_send_recovers_same_frames() {
    let (listener, addr) = ephemeral_listener().await;
    let events = sample_events(8);

    let server_events = events.clone();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let pairs = read_batch(&mut stream).await;
        assert_batch_matches(&pairs, &server_events);
        stream.write_all(&ack_frame(8)).await.unwrap();
    });

    let config = ClientConfig {
        compression: 6,
        ..ClientConfig::default()
    };
    let mut client = Client::dial(&addr, config).await.unwrap();
    assert_eq!(client.send_sync(&events).await.unwrap(), 8);

    server.await.unwrap();
}

#[tokio::test]
async fn partial_acks_reconcile_to_full_window() {
    let (listener, addr) = ephemeral_listener().await;
    let events = sample_events(10);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_batch(&mut stream).await;
        // Acknowledge in sub-windows, as servers are allowed to.
        for seq in [3, 7, 10] {
            stream.write_all(&ack_frame(seq)).await.unwrap();
        }
    });

    let mut client = Client::dial(&addr, ClientConfig::default()).await.unwrap();
    assert_eq!(client.send_sync(&events).await.unwrap(), 10);

    server.await.unwrap();
}

#[tokio::test]
async fn empty_batch_sends_no_bytes() {
    let (listener, addr) = ephemeral_listener().await;

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut leftover = Vec::new();
        stream.read_to_end(&mut leftover).await.unwrap();
        assert!(leftover.is_empty());
    });

    let mut client = Client::dial(&addr, ClientConfig::default()).await.unwrap();
    let batch: Vec<Value> = Vec::new();
    client.send(&batch).await.unwrap();
    client.shutdown().await.unwrap();

    server.await.unwrap();
}

// ── Failure modes ────────────────────────────────────────────────

#[tokio::test]
async fn overrunning_ack_is_a_protocol_violation() {
    let (listener, addr) = ephemeral_listener().await;
    let events = sample_events(10);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_batch(&mut stream).await;
        stream.write_all(&ack_frame(11)).await.unwrap();
    });

    let mut client = Client::dial(&addr, ClientConfig::default()).await.unwrap();
    let err = client.send_sync(&events).await.unwrap_err();
    assert!(matches!(
        err,
        LumberError::AckOverrun {
            acked: 11,
            expected: 10
        }
    ));

    server.await.unwrap();
}

#[tokio::test]
async fn garbage_ack_header_is_a_protocol_violation() {
    let (listener, addr) = ephemeral_listener().await;

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(&[0xDE, 0xAD, 0, 0, 0, 1]).await.unwrap();
    });

    let mut client = Client::dial(&addr, ClientConfig::default()).await.unwrap();
    assert!(matches!(
        client.receive_ack().await,
        Err(LumberError::InvalidAckHeader {
            version: 0xDE,
            code: 0xAD
        })
    ));

    server.await.unwrap();
}

#[tokio::test]
async fn silent_server_times_out_with_progress() {
    let (listener, addr) = ephemeral_listener().await;
    let events = sample_events(4);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_batch(&mut stream).await;
        // Never ack; keep the socket open until the client gives up.
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).await.unwrap();
    });

    let config = ClientConfig {
        timeout: Duration::from_millis(200),
        ..ClientConfig::default()
    };
    let mut client = Client::dial(&addr, config).await.unwrap();
    let err = client.send_sync(&events).await.unwrap_err();
    match err {
        LumberError::AckInterrupted { acked, source } => {
            assert_eq!(acked, 0);
            assert!(matches!(*source, LumberError::Timeout(_)));
        }
        other => panic!("unexpected error: {other}"),
    }

    client.shutdown().await.unwrap();
    server.await.unwrap();
}

// ── Dial capability ──────────────────────────────────────────────

#[tokio::test]
async fn dial_with_uses_caller_dialer() {
    let (listener, addr) = ephemeral_listener().await;
    let events = sample_events(2);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_batch(&mut stream).await;
        stream.write_all(&ack_frame(2)).await.unwrap();
    });

    let mut client = Client::dial_with(
        |address: &str| TcpStream::connect(address.to_string()),
        &addr,
        ClientConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(client.send_sync(&events).await.unwrap(), 2);

    server.await.unwrap();
}

#[tokio::test]
async fn invalid_config_never_dials() {
    // An address that would hang if connected to — the config check
    // must fire first.
    let config = ClientConfig {
        compression: 10,
        ..ClientConfig::default()
    };
    let err = Client::dial("240.0.0.1:5044", config).await.unwrap_err();
    assert!(matches!(err, LumberError::InvalidCompressionLevel(10)));
}
