#![allow(non_snake_case)]

use super::*;
use crate::AsyncRuntime;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;

struct Forward(mpsc::Sender<(HttpRequest, GlueResult<HttpResponse>)>);

impl HttpListener for Forward {
    fn on_http_response(&self, request: &HttpRequest, result: GlueResult<HttpResponse>) {
        let _ = self.0.send((request.clone(), result));
    }
}

/// Serve one canned response and hand back the raw request text
fn serve_once(status_line: &'static str, body: &'static str) -> (String, std::thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let raw = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        raw
    });

    (url, server)
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = stream.read(&mut chunk).unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        let text = String::from_utf8_lossy(&buffer).to_string();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).to_string()
}

#[test]
fn ReqwestHttpTransport___post_form___delivers_response_to_listener() {
    let runtime = AsyncRuntime::with_defaults().unwrap();
    let transport = ReqwestHttpTransport::new(runtime.handle(), Duration::from_secs(5)).unwrap();
    let (url, server) = serve_once("200 OK", r#"{"url":"wss://x","self":{"id":"U1"}}"#);
    let (tx, rx) = mpsc::channel();

    transport.request(
        HttpRequest::post(format!("{}/rtm.start", url)).with_form([("token", "tok-123")]),
        Arc::new(Forward(tx)),
    );

    let (request, result) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    let response = result.unwrap();
    assert!(request.url.ends_with("/rtm.start"));
    assert_eq!(response.status, 200);
    assert_eq!(response.text().unwrap(), r#"{"url":"wss://x","self":{"id":"U1"}}"#);

    let raw = server.join().unwrap();
    assert!(raw.starts_with("POST /rtm.start"));
    assert!(raw.ends_with("token=tok-123"));
}

#[test]
fn ReqwestHttpTransport___error_status___is_a_response_not_an_error() {
    let runtime = AsyncRuntime::with_defaults().unwrap();
    let transport = ReqwestHttpTransport::new(runtime.handle(), Duration::from_secs(5)).unwrap();
    let (url, server) = serve_once("503 Service Unavailable", "{}");
    let (tx, rx) = mpsc::channel();

    transport.request(HttpRequest::get(url), Arc::new(Forward(tx)));

    let (_, result) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(result.unwrap().status, 503);
    server.join().unwrap();
}

#[test]
fn ReqwestHttpTransport___refused_connection___reports_transport_error() {
    let runtime = AsyncRuntime::with_defaults().unwrap();
    let transport = ReqwestHttpTransport::new(runtime.handle(), Duration::from_secs(5)).unwrap();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (tx, rx) = mpsc::channel();

    transport.request(
        HttpRequest::get(format!("http://127.0.0.1:{}/", port)),
        Arc::new(Forward(tx)),
    );

    let (_, result) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(result, Err(GlueError::Transport(_))));
}
