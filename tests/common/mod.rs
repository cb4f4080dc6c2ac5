//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tinyhttpd::net::Listener;
use tinyhttpd::{HttpServer, HttpServerBuilder, ServerConfig, Shutdown, TlsContext};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// A server running on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<()>,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop accepting and wait for the accept loop to return.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("accept loop did not stop")
            .unwrap();
    }
}

/// Configuration with static files off, so unmatched paths are plain 404s.
#[allow(dead_code)]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        serve_static_files: false,
        ..ServerConfig::default()
    }
}

/// Build the server from `builder` and serve it on `127.0.0.1:0`.
pub async fn start(builder: HttpServerBuilder) -> TestServer {
    start_with_capacity(builder, 64).await
}

#[allow(dead_code)]
pub async fn start_with_capacity(builder: HttpServerBuilder, max_connections: usize) -> TestServer {
    let server: HttpServer = builder.build().unwrap();
    let listener = Listener::bind("127.0.0.1:0", max_connections).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let task = tokio::spawn(async move { server.serve(listener, signal).await });

    TestServer { addr, shutdown, task }
}

/// Self-signed `localhost` certificate and key under `tests/fixtures`.
#[allow(dead_code)]
pub async fn tls_context() -> TlsContext {
    // Test builds link both the ring and aws-lc rustls providers.
    let _ = rustls::crypto::ring::default_provider().install_default();
    TlsContext::initialize(&fixture("cert.pem"), &fixture("key.pem"))
        .await
        .unwrap()
}

#[allow(dead_code)]
fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A loopback port that was free a moment ago.
#[allow(dead_code)]
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Connect, retrying while the server is still binding.
#[allow(dead_code)]
pub async fn connect_when_ready(addr: SocketAddr) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(addr).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("nothing listening on {addr}");
}

/// HTTPS client that trusts the self-signed fixture certificate.
#[allow(dead_code)]
pub fn tls_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Write `raw` on a fresh connection and read until the server closes it.
#[allow(dead_code)]
pub async fn exchange(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    read_until_closed(&mut stream).await
}

#[allow(dead_code)]
pub async fn read_until_closed(stream: &mut TcpStream) -> String {
    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut received))
        .await
        .expect("server kept the connection open")
        .unwrap();
    String::from_utf8(received).unwrap()
}
