//! One-shot HTTP responder for exercising the client against real sockets.

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
    task::JoinHandle,
};

use crate::raw::RawForecastResponse;

pub(crate) const FIXTURE: &str = include_str!("../testdata/sapporo_standard.json");

pub(crate) fn fixture() -> RawForecastResponse {
    serde_json::from_str(FIXTURE).expect("fixture decodes")
}

pub(crate) struct OneShotServer {
    addr: std::net::SocketAddr,
    request: oneshot::Receiver<String>,
    _task: JoinHandle<()>,
}

impl OneShotServer {
    pub(crate) fn base_url(&self) -> String {
        format!("http://{}/v1/forecast", self.addr)
    }

    /// First line of the request the server received, e.g. `GET /v1/forecast?... HTTP/1.1`.
    pub(crate) async fn request_line(self) -> String {
        let head = self.request.await.expect("server saw a request");
        head.lines().next().unwrap_or_default().to_string()
    }
}

/// Accept a single connection and answer it with `status` and `body`.
pub(crate) async fn serve_once(status: u16, body: &'static str) -> OneShotServer {
    serve(status, body, body.len()).await
}

/// Like [`serve_once`], but announce `content_length` bytes and close after `body`.
pub(crate) async fn serve_truncated(
    status: u16,
    body: &'static str,
    content_length: usize,
) -> OneShotServer {
    serve(status, body, content_length).await
}

async fn serve(status: u16, body: &'static str, content_length: usize) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let (tx, rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut buf = vec![0u8; 8192];
        let mut head = Vec::new();
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }
        let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

        let response = format!(
            "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {content_length}\r\nconnection: close\r\n\r\n{body}",
            reason_phrase(status),
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    OneShotServer {
        addr,
        request: rx,
        _task: task,
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
