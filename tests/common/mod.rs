//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use spa_edge::config::EdgeConfig;
use spa_edge::{EdgeServer, Shutdown};

/// One canned answer of the mock origin.
#[derive(Debug, Clone)]
pub struct MockRoute {
    pub path: &'static str,
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: &'static str,
}

impl MockRoute {
    pub fn new(path: &'static str, status: u16, body: &'static str) -> Self {
        Self {
            path,
            status,
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// A request as seen by the mock origin.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct MockOrigin {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockOrigin {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start an S3-like origin on an ephemeral port. Unknown paths get a 404
/// with an XML error body.
pub async fn start_mock_origin(routes: Vec<MockRoute>) -> MockOrigin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let routes = routes.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        serve_one(socket, &routes, &recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockOrigin { addr, requests }
}

async fn serve_one(
    mut socket: TcpStream,
    routes: &[MockRoute],
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    let path = request.target.split('?').next().unwrap_or("/").to_string();
    recorded.lock().unwrap().push(request);

    let route = routes
        .iter()
        .find(|r| r.path == path)
        .cloned()
        .unwrap_or_else(|| {
            MockRoute::new("", 404, "<Error><Code>NoSuchKey</Code></Error>")
                .header("Content-Type", "application/xml")
        });

    let mut response = format!("HTTP/1.1 {} {}\r\n", route.status, reason(route.status));
    for (name, value) in &route.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.body.len(),
        route.body
    ));

    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Read the head and any `Content-Length` body of one request.
async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() - head_end < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        target,
        headers,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// A local port with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Bind the emulator on an ephemeral port and run it until `Shutdown` fires.
///
/// `configure` sees the bound address so tests can point the distribution
/// domain back at the emulator.
pub async fn start_emulator<F>(configure: F) -> (SocketAddr, Shutdown)
where
    F: FnOnce(SocketAddr, &mut EdgeConfig),
{
    let (addr, shutdown, _) = launch(configure, None).await;
    (addr, shutdown)
}

/// Like `start_emulator`, also returning the effective configuration and a
/// sender that pushes replacement configurations into the running server.
pub async fn start_reloadable_emulator<F>(
    configure: F,
) -> (SocketAddr, Shutdown, EdgeConfig, mpsc::UnboundedSender<EdgeConfig>)
where
    F: FnOnce(SocketAddr, &mut EdgeConfig),
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (addr, shutdown, config) = launch(configure, Some(rx)).await;
    (addr, shutdown, config, tx)
}

async fn launch<F>(
    configure: F,
    updates: Option<mpsc::UnboundedReceiver<EdgeConfig>>,
) -> (SocketAddr, Shutdown, EdgeConfig)
where
    F: FnOnce(SocketAddr, &mut EdgeConfig),
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = EdgeConfig::default();
    config.listener.bind_address = addr.to_string();
    configure(addr, &mut config);

    let server = EdgeServer::new(config.clone()).unwrap();
    let shutdown = Shutdown::new();
    let handle = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, updates, handle).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown, config)
}

/// Client that neither follows redirects nor honors proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
