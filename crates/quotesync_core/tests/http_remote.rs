use quotesync_core::{HttpRemoteStore, Quote, RemoteError, RemoteStore, SERVER_CATEGORY};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One-shot HTTP/1.1 server answering each connection with the next canned
/// response and recording the raw requests it received.
struct CannedServer {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;
                captured.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });
        Self {
            endpoint: format!("http://{addr}/posts"),
            requests,
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let read = stream.read(&mut buf).await.unwrap();
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..read]);
        let text = String::from_utf8_lossy(&raw);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if raw.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

fn store_for(server: &CannedServer) -> HttpRemoteStore {
    HttpRemoteStore::new(&server.endpoint, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetch_maps_titles_to_server_quotes_and_sends_limit() {
    let server = CannedServer::start(vec![(
        200,
        r#"[{"id": 1, "userId": 1, "title": "first title", "body": "ignored"},
            {"id": 2, "title": "   "},
            {"id": 3, "title": "third title"}]"#,
    )])
    .await;

    let quotes = store_for(&server).fetch_quotes(5).await.unwrap();

    let ids: Vec<_> = quotes.iter().map(|quote| quote.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(quotes[0].text, "first title");
    assert!(quotes
        .iter()
        .all(|quote| quote.synced && quote.category == SERVER_CATEGORY));
    assert!(server.requests()[0].starts_with("GET /posts?_limit=5 HTTP/1.1"));
}

#[tokio::test]
async fn fetch_error_status_is_reported() {
    let server = CannedServer::start(vec![(500, r#"{"error": "boom"}"#)]).await;

    let err = store_for(&server).fetch_quotes(5).await.unwrap_err();

    match err {
        RemoteError::Status { code, message } => {
            assert_eq!(code, 500);
            assert!(message.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn fetch_with_unexpected_body_is_a_decode_error() {
    let server = CannedServer::start(vec![(200, r#"{"not": "an array"}"#)]).await;
    let err = store_for(&server).fetch_quotes(5).await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)));
}

#[tokio::test]
async fn push_posts_title_body_and_user_id() {
    let server = CannedServer::start(vec![(201, r#"{"id": 101}"#)]).await;
    let quote = Quote::new(4, "pushed text", "Zen");

    store_for(&server).push_quote(&quote).await.unwrap();

    let request = &server.requests()[0];
    assert!(request.starts_with("POST /posts HTTP/1.1"));
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"title": "pushed text", "body": "Zen", "userId": 1})
    );
}

#[tokio::test]
async fn push_rejection_is_a_status_error() {
    let server = CannedServer::start(vec![(404, "")]).await;
    let err = store_for(&server)
        .push_quote(&Quote::new(1, "a", "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Status { code: 404, .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store =
        HttpRemoteStore::new(&format!("http://{addr}/posts"), Duration::from_secs(2)).unwrap();
    let err = store.fetch_quotes(5).await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
}
