// tests/common/mod.rs
// Tiny canned-response HTTP server on 127.0.0.1 for provider tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub type Requests = Arc<Mutex<Vec<String>>>;

/// Serve the same response to every connection. Returns the base URL and the
/// raw request heads seen so far.
pub async fn serve(status: &'static str, content_type: &'static str, body: String) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let seen: Requests = Arc::new(Mutex::new(Vec::new()));
    let seen_srv = seen.clone();

    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let body = body.clone();
            let seen = seen_srv.clone();
            tokio::spawn(async move {
                let head = read_head(&mut sock).await;
                seen.lock().unwrap().push(head);
                let resp = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), seen)
}

/// One canned response for a request path.
pub struct Route {
    pub path: &'static str,
    pub status: &'static str,
    pub headers: &'static str,
    pub body: String,
}

/// Like `serve`, but picks the response by request path (query ignored).
/// Unknown paths get a 404.
pub async fn serve_routes(routes: Vec<Route>) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let seen: Requests = Arc::new(Mutex::new(Vec::new()));
    let seen_srv = seen.clone();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let routes = routes.clone();
            let seen = seen_srv.clone();
            tokio::spawn(async move {
                let head = read_head(&mut sock).await;
                let path = head
                    .split_whitespace()
                    .nth(1)
                    .and_then(|target| target.split('?').next())
                    .unwrap_or("")
                    .to_string();
                seen.lock().unwrap().push(head);

                let resp = match routes.iter().find(|r| r.path == path) {
                    Some(r) => format!(
                        "HTTP/1.1 {}\r\n{}content-length: {}\r\nconnection: close\r\n\r\n{}",
                        r.status,
                        r.headers,
                        r.body.len(),
                        r.body
                    ),
                    None => "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".to_string(),
                };
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), seen)
}

/// Accept connections but never answer.
pub async fn serve_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((sock, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                drop(sock);
            });
        }
    });
    format!("http://{addr}")
}

/// A URL nobody is listening on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

async fn read_head(sock: &mut tokio::net::TcpStream) -> String {
    let mut buf = [0u8; 4096];
    let mut head = Vec::new();
    loop {
        match sock.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                head.extend_from_slice(&buf[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}
