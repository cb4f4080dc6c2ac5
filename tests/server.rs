//! End-to-end tests over real loopback sockets.

mod common;

use std::time::Duration;

use common::{client, exchange, read_until_closed, start, start_with_capacity, test_config};
use tinyhttpd::http::redirect::redirect_routes;
use tinyhttpd::{HttpServer, Method, Request, Response, ServerConfig, Status};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn hello(_: &Request, response: &mut Response) -> Result<(), tinyhttpd::ResponseError> {
    response.set_content_type(tinyhttpd::http::ContentType::Html);
    response.set_body("hello");
    response.complete()
}

#[tokio::test]
async fn test_get_reaches_registered_handler() {
    let server = start(HttpServer::builder(test_config()).route(Method::Get, "/hello", hello)).await;

    let response = client().get(server.url("/hello")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/html");
    assert_eq!(response.headers()["server"], "tinyhttpd");
    assert_eq!(response.text().await.unwrap(), "hello");

    server.stop().await;
}

#[tokio::test]
async fn test_unmatched_path_is_not_found() {
    let server = start(HttpServer::builder(test_config()).route(Method::Get, "/hello", hello)).await;

    let response = client().get(server.url("/elsewhere")).send().await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.headers()["content-type"], "text/html");
    assert_eq!(response.text().await.unwrap(), "Not Found");

    // Method mismatch falls through the same way.
    let response = client().post(server.url("/hello")).send().await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_first_registered_route_wins() {
    let builder = HttpServer::builder(test_config())
        .route(Method::Get, "/a*", |_: &Request, response: &mut Response| {
            response.set_body("H1");
            response.complete()
        })
        .route(Method::Get, "/ab", |_: &Request, response: &mut Response| {
            response.set_body("H2");
            response.complete()
        });
    let server = start(builder).await;

    let body = client().get(server.url("/ab")).send().await.unwrap().text().await.unwrap();
    assert_eq!(body, "H1");
}

#[tokio::test]
async fn test_head_returns_headers_only() {
    let server = start(HttpServer::builder(test_config()).route(Method::Get, "/hello", hello)).await;

    let text = exchange(server.addr, b"HEAD /hello HTTP/1.1\r\nConnection: close\r\n\r\n").await;
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Length: 5\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
    assert!(!text.contains("hello"));
}

#[tokio::test]
async fn test_post_body_reaches_handler_untouched() {
    let builder = HttpServer::builder(test_config()).route(
        Method::Post,
        "/echo",
        |request: &Request, response: &mut Response| {
            response.set_body(request.body().to_vec());
            response.complete()
        },
    );
    let server = start(builder).await;

    let response = client()
        .post(server.url("/echo"))
        .body("first\r\n\r\nsecond")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "first\r\n\r\nsecond");
}

#[tokio::test]
async fn test_pipelined_requests_answered_in_order() {
    let builder = HttpServer::builder(test_config()).route(
        Method::Get,
        "*",
        |request: &Request, response: &mut Response| {
            response.set_body(request.path().to_string());
            response.complete()
        },
    );
    let server = start(builder).await;

    let text = exchange(
        server.addr,
        b"GET /first HTTP/1.1\r\n\r\nGET /second HTTP/1.1\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert_eq!(text.matches("HTTP/1.1 200 OK").count(), 2);
    let first = text.find("\r\n\r\n/first").unwrap();
    let second = text.find("\r\n\r\n/second").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn test_keep_alive_serves_sequential_requests() {
    let server = start(HttpServer::builder(test_config()).route(Method::Get, "/hello", hello)).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let expected = b"HTTP/1.1 200 OK\r\nServer: tinyhttpd\r\nContent-Type: text/html\r\nContent-Length: 5\r\n\r\nhello";

    for _ in 0..3 {
        stream.write_all(b"GET /hello HTTP/1.1\r\n\r\n").await.unwrap();
        let mut received = vec![0; expected.len()];
        tokio::time::timeout(Duration::from_secs(5), stream.read_exact(&mut received))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&received[..], &expected[..]);
    }
}

#[tokio::test]
async fn test_unparseable_request_closes_without_response() {
    let server = start(HttpServer::builder(test_config()).route(Method::Get, "*", hello)).await;

    assert_eq!(exchange(server.addr, b"garbage\r\n\r\n").await, "");
    assert_eq!(exchange(server.addr, b"GET / HTTP/1.0\r\n\r\n").await, "");
    assert_eq!(exchange(server.addr, b"BREW / HTTP/1.1\r\n\r\n").await, "");
}

#[tokio::test]
async fn test_static_fallback_serves_index_html() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("index.html"), "<h1>home</h1>").unwrap();
    std::fs::create_dir(root.path().join("docs")).unwrap();
    std::fs::write(root.path().join("docs").join("index.html"), "<h1>docs</h1>").unwrap();

    let config = ServerConfig {
        static_root: root.path().to_string_lossy().into_owned(),
        ..ServerConfig::default()
    };
    let server = start(HttpServer::builder(config)).await;
    let client = client();

    let response = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/html");
    assert_eq!(response.text().await.unwrap(), "<h1>home</h1>");

    let docs = client.get(server.url("/docs")).send().await.unwrap();
    assert_eq!(docs.text().await.unwrap(), "<h1>docs</h1>");

    let missing = client.get(server.url("/nowhere")).send().await.unwrap();
    assert_eq!(missing.status(), 404);
    assert_eq!(missing.text().await.unwrap(), "Not Found");
}

#[tokio::test]
async fn test_redirect_routes_send_moved_permanently() {
    let builder = HttpServer::builder(test_config()).routes(redirect_routes("example.com".into(), 8443));
    let server = start(builder).await;

    let response = client().get(server.url("/login?next=home")).send().await.unwrap();
    assert_eq!(response.status(), Status::MovedPermanently.code());
    assert_eq!(
        response.headers()["location"],
        "https://example.com:8443/login?next=home"
    );
}

#[tokio::test]
async fn test_connection_limit_defers_accept() {
    let server = start_with_capacity(
        HttpServer::builder(test_config()).route(Method::Get, "/hello", hello),
        1,
    )
    .await;

    let idle = TcpStream::connect(server.addr).await.unwrap();
    // Give the accept loop time to hand the only permit to the idle connection.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut waiting = TcpStream::connect(server.addr).await.unwrap();
    waiting
        .write_all(b"GET /hello HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut byte = [0u8; 1];
    let early = tokio::time::timeout(Duration::from_millis(200), waiting.read(&mut byte)).await;
    assert!(early.is_err(), "second connection was served past the limit");

    drop(idle);
    let text = read_until_closed(&mut waiting).await;
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = start(HttpServer::builder(test_config()).route(Method::Get, "/hello", hello)).await;
    let addr = server.addr;

    let response = client().get(server.url("/hello")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    server.stop().await;
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_build_rejects_redirect_without_tls() {
    let config = ServerConfig {
        server_address: Some("example.com".into()),
        redirect_http_to_https: true,
        ..ServerConfig::default()
    };
    let err = HttpServer::builder(config).build().unwrap_err();
    assert!(err.to_string().starts_with("startup misconfiguration"));
}
