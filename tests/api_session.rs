// SPDX-License-Identifier: MIT

//! End-to-end client tests against an in-process fake RouterOS device.
//!
//! Each test binds a listener on a loopback port and scripts the device side
//! of the conversation at the wire level.

use std::time::{Duration, Instant};

use routeros_client::{ClientError, DeviceConfig, RouterOsClient, encode_length};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn write_word(stream: &mut TcpStream, word: &str) {
    stream.write_all(&encode_length(word.len())).await.unwrap();
    stream.write_all(word.as_bytes()).await.unwrap();
}

async fn write_sentence(stream: &mut TcpStream, words: &[&str]) {
    for word in words {
        write_word(stream, word).await;
    }
    stream.write_all(&[0]).await.unwrap();
}

async fn read_word(stream: &mut TcpStream) -> String {
    let first = stream.read_u8().await.unwrap();
    let len = if first & 0x80 == 0 {
        first as usize
    } else if first & 0xC0 == 0x80 {
        let second = stream.read_u8().await.unwrap();
        (((first & 0x3F) as usize) << 8) | second as usize
    } else {
        panic!("test sentences only use short words");
    };
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

async fn read_sentence(stream: &mut TcpStream) -> Vec<String> {
    let mut words = Vec::new();
    loop {
        let word = read_word(stream).await;
        if word.is_empty() {
            break;
        }
        words.push(word);
    }
    words
}

/// Serves the plain (non-challenge) login exchange for user `admin`/`pw`.
async fn serve_plain_login(stream: &mut TcpStream) {
    let opening = read_sentence(stream).await;
    assert_eq!(opening, vec!["/login".to_string()]);
    write_sentence(stream, &["!done"]).await;

    let credentials = read_sentence(stream).await;
    assert_eq!(
        credentials,
        vec![
            "/login".to_string(),
            "=name=admin".to_string(),
            "=password=pw".to_string(),
        ]
    );
    write_sentence(stream, &["!done"]).await;
}

fn test_config(port: u16) -> DeviceConfig {
    let mut config = DeviceConfig::new("fake-device", "127.0.0.1", "admin", "pw");
    config.port = Some(port);
    config.read_timeout_secs = 2;
    config
}

#[tokio::test]
async fn test_plain_login_and_record_parsing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        serve_plain_login(&mut stream).await;

        let command = read_sentence(&mut stream).await;
        assert_eq!(command, vec!["/interface/print".to_string()]);
        write_sentence(&mut stream, &["!re", "=name=ether1", "=running=true"]).await;
        write_sentence(&mut stream, &["!re", "=name=ether2", "=running=false"]).await;
        write_sentence(&mut stream, &["!re", "=name=bridge1", "=type=bridge"]).await;
        write_sentence(&mut stream, &["!done"]).await;
    });

    let mut client = RouterOsClient::connect(&test_config(port)).await.unwrap();
    let records = client.interfaces().await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["name"], "ether1");
    assert_eq!(records[0]["running"], "true");
    assert_eq!(records[2]["type"], "bridge");

    client.close().await.unwrap();
    device.await.unwrap();
}

#[tokio::test]
async fn test_challenge_login_digest() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let opening = read_sentence(&mut stream).await;
        assert_eq!(opening, vec!["/login".to_string()]);
        write_sentence(
            &mut stream,
            &["!done", "=ret=0123456789abcdef0123456789abcdef"],
        )
        .await;

        // MD5(0x00 || "secret" || challenge), prefixed with "00"
        let response = read_sentence(&mut stream).await;
        assert_eq!(
            response,
            vec![
                "/login".to_string(),
                "=name=admin".to_string(),
                "=response=00ebbe7c3df6b3d902bfd1f355c6e63289".to_string(),
            ]
        );
        write_sentence(&mut stream, &["!done"]).await;
    });

    let mut config = test_config(port);
    config.password = "secret".to_string();
    let client = RouterOsClient::connect(&config).await.unwrap();

    client.close().await.unwrap();
    device.await.unwrap();
}

#[tokio::test]
async fn test_rejected_login_surfaces_authentication_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let opening = read_sentence(&mut stream).await;
        assert_eq!(opening, vec!["/login".to_string()]);
        write_sentence(&mut stream, &["!done"]).await;

        let _credentials = read_sentence(&mut stream).await;
        write_sentence(
            &mut stream,
            &["!trap", "=message=invalid user name or password (6)"],
        )
        .await;
        write_sentence(&mut stream, &["!done"]).await;
    });

    let err = RouterOsClient::connect(&test_config(port))
        .await
        .err()
        .expect("login must fail");

    match err {
        ClientError::Authentication { message } => {
            assert!(message.contains("invalid user name or password"));
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
    device.await.unwrap();
}

#[tokio::test]
async fn test_trap_is_device_error_and_session_survives() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        serve_plain_login(&mut stream).await;

        let bad = read_sentence(&mut stream).await;
        assert_eq!(bad[0], "/bogus/print");
        write_sentence(&mut stream, &["!trap", "=message=no such command"]).await;
        write_sentence(&mut stream, &["!done"]).await;

        // same session accepts the next command
        let good = read_sentence(&mut stream).await;
        assert_eq!(good[0], "/ip/address/print");
        write_sentence(&mut stream, &["!re", "=address=10.0.0.1/24"]).await;
        write_sentence(&mut stream, &["!done"]).await;
    });

    let mut client = RouterOsClient::connect(&test_config(port)).await.unwrap();

    let err = client.execute("/bogus/print", &[]).await.unwrap_err();
    match err {
        ClientError::Device { ref message } => assert_eq!(message, "no such command"),
        other => panic!("expected device error, got {other:?}"),
    }
    assert!(!err.is_connection_fatal());

    let records = client.ip_addresses().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["address"], "10.0.0.1/24");

    client.close().await.unwrap();
    device.await.unwrap();
}

#[tokio::test]
async fn test_fatal_poisons_session() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        serve_plain_login(&mut stream).await;

        let _command = read_sentence(&mut stream).await;
        write_sentence(&mut stream, &["!fatal", "session terminated"]).await;
    });

    let mut client = RouterOsClient::connect(&test_config(port)).await.unwrap();

    let err = client.execute("/interface/print", &[]).await.unwrap_err();
    match err {
        ClientError::FatalDevice { ref message } => assert_eq!(message, "session terminated"),
        other => panic!("expected fatal device error, got {other:?}"),
    }

    // every later call fails without touching the wire
    let err = client.execute("/interface/print", &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(_)));

    device.await.unwrap();
}

#[tokio::test]
async fn test_silent_device_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        serve_plain_login(&mut stream).await;

        // swallow the command and go quiet, keeping the socket open
        let _command = read_sentence(&mut stream).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let mut config = test_config(port);
    config.read_timeout_secs = 1;
    let mut client = RouterOsClient::connect(&config).await.unwrap();

    let started = Instant::now();
    let err = client.execute("/interface/print", &[]).await.unwrap_err();

    assert!(matches!(err, ClientError::Timeout(_)));
    // bounded by the configured deadline, not the device's silence
    assert!(started.elapsed() < Duration::from_secs(10));

    device.abort();
}
