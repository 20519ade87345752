use hemisphair::models::{ModelClient, OllamaClient, StreamCallback};
use hemisphair::HemisphairError;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

enum Reply {
    /// 200 with a chunked body, one HTTP chunk per entry
    Stream(Vec<&'static str>),
    /// Plain response with a fixed body
    Status(u16, &'static str),
}

struct Captured {
    head: String,
    body: String,
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.expect("read request");
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.expect("read body");
        assert!(n > 0, "client closed mid-body");
        buf.extend_from_slice(&chunk[..n]);
    }

    Captured {
        head,
        body: String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string(),
    }
}

/// Serve exactly one request on a throwaway port
async fn serve_once(reply: Reply) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");
        let captured = read_request(&mut socket).await;

        match reply {
            Reply::Stream(chunks) => {
                socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                    )
                    .await
                    .expect("write head");
                for piece in chunks {
                    let framed = format!("{:x}\r\n{}\r\n", piece.len(), piece);
                    // The client may hang up once it has seen `done`
                    if socket.write_all(framed.as_bytes()).await.is_err() {
                        break;
                    }
                    let _ = socket.flush().await;
                }
                let _ = socket.write_all(b"0\r\n\r\n").await;
            }
            Reply::Status(code, body) => {
                let response = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    code,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.expect("write response");
            }
        }

        let _ = socket.shutdown().await;
        captured
    });

    (format!("http://{}/api/generate", addr), server)
}

fn recording_callback() -> (StreamCallback, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: StreamCallback = Arc::new(move |fragment: &str| {
        sink.lock().unwrap().push(fragment.to_string());
    });
    (callback, seen)
}

#[tokio::test]
async fn streams_fragments_and_returns_full_text() {
    let (url, server) = serve_once(Reply::Stream(vec![
        "{\"model\":\"llama3\",\"response\":\"He\",\"done\":false}\n",
        "{\"model\":\"llama3\",\"response\":\"llo\",\"done\":false}\n",
        "{\"model\":\"llama3\",\"done\":true}\n",
    ]))
    .await;

    let client = OllamaClient::new(url, None).unwrap();
    let (callback, seen) = recording_callback();

    let text = client.query("llama3", "Say hello", 50, Some(callback)).await.unwrap();

    assert_eq!(text, "Hello");
    assert_eq!(*seen.lock().unwrap(), vec!["He".to_string(), "llo".to_string()]);

    let captured = server.await.expect("server task completes");
    assert!(captured.head.starts_with("POST /api/generate "));
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "model": "llama3",
            "prompt": "Say hello",
            "max_tokens": 50,
            "stream": true
        })
    );
}

#[tokio::test]
async fn skips_blank_lines_and_joins_split_records() {
    let (url, server) = serve_once(Reply::Stream(vec![
        "{\"respo",
        "nse\":\"a\"}\n\n\n{\"response\":\"b\"}\n",
        "\r\n{\"done\":true}\n",
    ]))
    .await;

    let client = OllamaClient::new(url, None).unwrap();
    let (callback, seen) = recording_callback();

    let text = client.query("m", "p", 10, Some(callback)).await.unwrap();

    assert_eq!(text, "ab");
    assert_eq!(seen.lock().unwrap().len(), 2);
    server.await.unwrap();
}

#[tokio::test]
async fn stops_reading_at_done() {
    let (url, server) = serve_once(Reply::Stream(vec![
        "{\"response\":\"x\"}\n{\"done\":true}\nthis is not json\n",
        "{\"response\":\"ignored\"}\n",
    ]))
    .await;

    let client = OllamaClient::new(url, None).unwrap();
    let text = client.query("m", "p", 10, None).await.unwrap();

    assert_eq!(text, "x");
    let _ = server.await;
}

#[tokio::test]
async fn stream_end_without_done_keeps_text() {
    let (url, server) = serve_once(Reply::Stream(vec![
        "{\"response\":\"par\"}\n",
        "{\"response\":\"tial\"}",
    ]))
    .await;

    let client = OllamaClient::new(url, None).unwrap();
    let text = client.query("m", "p", 10, None).await.unwrap();

    assert_eq!(text, "partial");
    server.await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_endpoint_error() {
    let (url, server) = serve_once(Reply::Status(404, "{\"error\":\"model 'nope' not found\"}")).await;

    let client = OllamaClient::new(url, None).unwrap();
    let (callback, seen) = recording_callback();

    let err = client.query("nope", "p", 10, Some(callback)).await.unwrap_err();

    match err {
        HemisphairError::Endpoint { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("model 'nope' not found"));
        }
        other => panic!("expected endpoint error, got {:?}", other),
    }
    assert!(seen.lock().unwrap().is_empty());
    server.await.unwrap();
}

#[tokio::test]
async fn unparseable_line_is_malformed_stream() {
    let (url, server) = serve_once(Reply::Stream(vec![
        "{\"response\":\"ok\"}\n",
        "<html>oops</html>\n",
        "{\"done\":true}\n",
    ]))
    .await;

    let client = OllamaClient::new(url, None).unwrap();
    let (callback, seen) = recording_callback();

    let err = client.query("m", "p", 10, Some(callback)).await.unwrap_err();

    match err {
        HemisphairError::MalformedStream { line, .. } => assert_eq!(line, "<html>oops</html>"),
        other => panic!("expected malformed stream, got {:?}", other),
    }
    // Fragments before the bad line were already shown
    assert_eq!(*seen.lock().unwrap(), vec!["ok".to_string()]);
    let _ = server.await;
}

#[tokio::test]
async fn health_check_hits_tags_endpoint() {
    let (url, server) = serve_once(Reply::Status(200, "{\"models\":[]}")).await;

    let client = OllamaClient::new(url, None).unwrap();
    assert!(client.validate_connection().await.unwrap());

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("GET /api/tags "));
}

#[tokio::test]
async fn unreachable_endpoint() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OllamaClient::new(format!("http://{}/api/generate", addr), None).unwrap();

    assert!(!client.validate_connection().await.unwrap());
    let err = client.query("m", "p", 10, None).await.unwrap_err();
    assert!(matches!(err, HemisphairError::Transport(_)));
}
