//! End-to-end tests over a real socket
//!
//! Starts `HttpServer(AppService)` on a free port and talks raw HTTP/1.1 to
//! it, checking status lines, headers and bodies produced by the adapter.

use http::Method;
use nsrouter::server::{AppService, HttpServer, ServerHandle};
use nsrouter::{Context, Dispatcher, FilterPosition, Namespace, Router};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

fn start_service(service_fn: impl FnOnce(AppService) -> AppService) -> ServerHandle {
    may::config().set_stack_size(0x8000);

    let ns = Namespace::new("/v1")
        .filter(FilterPosition::AfterExec, |ctx: &mut Context| {
            ctx.output.set_header("x-served-by", "nsrouter".to_string());
        })
        .get("/user/:id", |ctx: &mut Context| {
            let id = ctx.param("id").unwrap_or_default().to_string();
            ctx.write(id);
        })
        .post("/echo", |ctx: &mut Context| {
            let body = ctx.input.body().to_vec();
            ctx.output.set_header("content-type", "application/octet-stream".to_string());
            ctx.write(body);
        });
    let mut router = Router::new();
    router.add_namespace(ns).unwrap();
    router
        .add_namespace(Namespace::new("/").get("/health", |ctx: &mut Context| ctx.write("routed health")))
        .unwrap();

    let service = service_fn(AppService::new(Arc::new(Dispatcher::new(router))));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let handle = HttpServer(service).start(addr).unwrap();
    handle.wait_ready().unwrap();
    handle
}

fn send_request(addr: &SocketAddr, req: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(req.as_bytes()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {e:?}"),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Status, lower-cased headers and body of a raw response.
fn parse_response(resp: &str) -> (u16, Vec<(String, String)>, String) {
    let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
    let mut status = 0;
    let mut headers = Vec::new();
    for line in head.lines() {
        if line.starts_with("HTTP/1.1") {
            status = line.split_whitespace().nth(1).unwrap_or("0").parse().unwrap();
        } else if let Some((name, val)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), val.trim().to_string()));
        }
    }
    (status, headers, body.to_string())
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_routes_over_http() {
    let handle = start_service(|s| s);
    let addr = handle.addr();

    let resp = send_request(&addr, "GET /v1/user/123 HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "123");
    assert_eq!(header(&headers, "x-served-by"), Some("nsrouter"));

    let resp = send_request(
        &addr,
        "POST /v1/echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello",
    );
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "hello");
    assert_eq!(header(&headers, "content-type"), Some("application/octet-stream"));

    handle.stop();
}

#[test]
fn test_not_found_and_method_not_allowed_over_http() {
    let handle = start_service(|s| s);
    let addr = handle.addr();

    let resp = send_request(&addr, "GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 404);
    assert_eq!(header(&headers, "content-type"), Some("application/json"));
    assert!(body.contains("Not Found"));

    let resp = send_request(&addr, "DELETE /v1/user/1 HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, headers, _) = parse_response(&resp);
    assert_eq!(status, 405);
    assert_eq!(header(&headers, "allow"), Some("GET"));

    handle.stop();
}

#[test]
fn test_health_answered_before_routing() {
    let handle = start_service(|s| s);
    let resp = send_request(&handle.addr(), "GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, _, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert!(body.contains("\"status\":\"ok\""));
    handle.stop();

    let handle = start_service(AppService::without_health);
    let resp = send_request(&handle.addr(), "GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, _, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "routed health");
    handle.stop();
}

#[test]
fn test_dispatcher_usable_without_server() {
    // the adapter is optional: the same dispatcher serves plain contexts
    let mut router = Router::new();
    router
        .add_namespace(Namespace::new("/v1").get("/ping", |ctx: &mut Context| ctx.write("pong")))
        .unwrap();
    let dispatcher = Dispatcher::new(router);
    let mut ctx = Context::new(Method::GET, "/v1/ping");
    dispatcher.dispatch(&mut ctx);
    assert_eq!(ctx.output.text(), "pong");
}
