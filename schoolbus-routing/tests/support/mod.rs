//! Minimal canned HTTP server for exercising the optimizer over a real
//! socket.
//!
//! Each connection carries one request and is closed after the response,
//! so the server handles connections one at a time on a background thread.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Request target: path plus query string.
    pub target: String,
    /// Request body decoded as UTF-8.
    pub body: String,
}

/// Server answering every request through a handler closure.
#[derive(Debug)]
pub struct CannedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl CannedServer {
    /// Bind to an ephemeral local port and answer with `handler`, which
    /// returns the status code and JSON body.
    pub fn start<H>(handler: H) -> Self
    where
        H: Fn(&RecordedRequest) -> (u16, String) + Send + 'static,
    {
        let listener = bind();
        let base_url = base_url(&listener);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for mut stream in listener.incoming().flatten() {
                let Ok(request) = read_request(&stream) else {
                    continue;
                };
                let (status, body) = handler(&request);
                seen.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(request);
                let _ = write_response(&mut stream, status, &body);
            }
        });
        Self { base_url, requests }
    }

    /// Bind to an ephemeral local port and hold every connection open
    /// without ever answering.
    pub fn silent() -> Self {
        let listener = bind();
        let base_url = base_url(&listener);
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                held.push(stream);
            }
        });
        Self {
            base_url,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Root URL of the server, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests answered so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn bind() -> TcpListener {
    TcpListener::bind("127.0.0.1:0")
        .unwrap_or_else(|err| panic!("failed to bind canned server: {err}"))
}

fn base_url(listener: &TcpListener) -> String {
    let address = listener
        .local_addr()
        .unwrap_or_else(|err| panic!("canned server has no local address: {err}"));
    format!("http://{address}")
}

fn read_request(stream: &TcpStream) -> std::io::Result<RecordedRequest> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body)?;
    Ok(RecordedRequest {
        method,
        target,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    let reason = if status == 200 { "OK" } else { "Error" };
    write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()
}
