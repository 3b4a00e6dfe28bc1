//! Control client against a minimal local HTTP responder

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use wedtest_common::ServerConfig;
use wedtest_e2e::{ControlClient, E2eError};

/// Answer one request per entry in `replies`; yields the request bodies
async fn serve(replies: Vec<&'static str>) -> (ServerConfig, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut bodies = Vec::new();
        for reply in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            bodies.push(read_body(&mut stream).await);

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                reply.len(),
                reply
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        bodies
    });

    let config = ServerConfig {
        base_url: format!("http://127.0.0.1:{}", port),
        ..Default::default()
    };
    (config, handle)
}

async fn read_body(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            let body = &text[end + 4..];
            if body.len() >= length {
                return body[..length].to_string();
            }
        }
    }
}

#[tokio::test]
async fn test_reset_posts_command() {
    let (config, server) = serve(vec!["{}"]).await;
    let client = ControlClient::new(&config).unwrap();
    assert!(client.url().ends_with("/build/ajax/control"));

    client.reset().await.unwrap();

    assert_eq!(server.await.unwrap(), vec!["command=reset".to_string()]);
}

#[tokio::test]
async fn test_fail_on_save_resets_first() {
    let (config, server) = serve(vec!["{}", "{}"]).await;
    let client = ControlClient::new(&config).unwrap();

    client.fail_on_save().await.unwrap();

    assert_eq!(
        server.await.unwrap(),
        vec![
            "command=reset".to_string(),
            "command=fail_on_save&value=1".to_string()
        ]
    );
}

#[tokio::test]
async fn test_non_empty_reply_is_rejected() {
    let (config, server) = serve(vec![r#"{"error": "unknown command"}"#]).await;
    let client = ControlClient::new(&config).unwrap();

    let err = client.reset().await.unwrap_err();

    match err {
        E2eError::ControlRejected { command, reply } => {
            assert_eq!(command, "reset");
            assert!(reply.contains("unknown command"));
        }
        other => panic!("Expected rejection, got {:?}", other),
    }
    server.await.unwrap();
}
