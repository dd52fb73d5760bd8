//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use admin_gate::config::GateConfig;
use admin_gate::http::HttpServer;
use admin_gate::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Start a mock admin panel that echoes the request target as its body.
///
/// Targets ending in `.png` are answered with `Content-Type: image/png`,
/// everything else with `text/plain`. `/bounce/<rest>` answers with a 307 to
/// `http://localhost:<port>/<rest>`, the same server under another host name.
pub async fn start_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]);
                        let target = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();
                        let content_type = if target.ends_with(".png") {
                            "image/png"
                        } else {
                            "text/plain"
                        };

                        let response = match target.strip_prefix("/bounce/") {
                            Some(rest) => format!(
                                "HTTP/1.1 307 Temporary Redirect\r\nLocation: http://localhost:{}/{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                                addr.port(),
                                rest
                            ),
                            None => format!(
                                "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                content_type,
                                target.len(),
                                target
                            ),
                        };
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A running gate and the handles to drive it.
pub struct TestGate {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<GateConfig>,
}

impl TestGate {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGate {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Default config pointed at `upstream`, with metrics off.
pub fn gate_config(upstream: SocketAddr) -> GateConfig {
    let mut config = GateConfig::default();
    config.upstream.address = upstream.to_string();
    config.observability.metrics_enabled = false;
    config
}

pub async fn start_gate(config: GateConfig) -> TestGate {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    TestGate {
        addr,
        shutdown,
        config_tx,
    }
}

/// Send `target` verbatim over a fresh connection and return the raw response.
///
/// HTTP clients resolve dot segments before sending, so paths like
/// `/api/../dashboard` have to be written by hand.
pub async fn raw_get(addr: SocketAddr, target: &str, extra_headers: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {target} HTTP/1.1\r\nHost: {addr}\r\n{extra_headers}Connection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
