//! Integration tests for the remote chat backend
//!
//! A one-shot HTTP server on localhost stands in for the chat-completion API.

use papyrus_domain::InferenceRequest;
use papyrus_llm::{InferenceBackend, LlmError, RemoteChatBackend, RemoteChatConfig, StaticCredential};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Serve a single canned response; the handle yields the raw request text.
async fn serve_once(status: &'static str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{}/v1", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn backend_for(endpoint: String) -> RemoteChatBackend<StaticCredential> {
    let config = RemoteChatConfig {
        endpoint,
        model: "test-model".to_string(),
        timeout_secs: 5,
        ..RemoteChatConfig::default()
    };
    RemoteChatBackend::new(config, StaticCredential::new("sk-test")).unwrap()
}

fn request() -> InferenceRequest {
    InferenceRequest::new("You extract metadata.", "Paper text here")
}

#[tokio::test]
async fn test_returns_first_choice_content() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"{\"title\":\"A\"}"}},{"message":{"role":"assistant","content":"second"}}]}"#,
    )
    .await;

    let text = backend_for(url).complete(&request()).await.unwrap();
    assert_eq!(text, r#"{"title":"A"}"#);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions"));
    assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
    assert!(raw.contains(r#""model":"test-model""#));
    assert!(raw.contains(r#"{"role":"system","content":"You extract metadata."}"#));
    assert!(raw.contains(r#"{"role":"user","content":"Paper text here"}"#));
}

#[tokio::test]
async fn test_zero_choices_is_invalid_response() {
    let (url, _server) = serve_once("200 OK", r#"{"choices":[]}"#).await;

    let err = backend_for(url).complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(ref msg) if msg.contains("no choices")));
}

#[tokio::test]
async fn test_missing_content_is_invalid_response() {
    let (url, _server) = serve_once("200 OK", r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).await;

    let err = backend_for(url).complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(ref msg) if msg.contains("no message content")));
}

#[tokio::test]
async fn test_http_error_is_surfaced() {
    let (url, _server) = serve_once(
        "401 Unauthorized",
        r#"{"error":{"message":"Incorrect API key provided"}}"#,
    )
    .await;

    let err = backend_for(url).complete(&request()).await.unwrap_err();
    match err {
        LlmError::Communication(msg) => {
            assert!(msg.contains("401"));
            assert!(msg.contains("Incorrect API key"));
        }
        other => panic!("Expected Communication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_is_communication_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend_for(format!("http://{}/v1", addr))
        .complete(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Communication(_)));
}
