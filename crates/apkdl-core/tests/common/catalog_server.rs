//! Minimal HTTP/1.1 server that plays a catalog site for integration tests.
//!
//! Routes are matched on the request path (query string ignored). Every
//! request target is recorded so tests can assert what was fetched. Bodies can
//! be paced out in chunks or stop mid-transfer to exercise slow links.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Send the body `chunk` bytes at a time, sleeping `interval` between writes.
    pub pace: Option<(usize, Duration)>,
    /// Send only this many body bytes, then hold the connection open silently.
    pub stall_after: Option<usize>,
}

impl Route {
    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "text/html; charset=utf-8".into())],
            body: body.as_bytes().to_vec(),
            pace: None,
            stall_after: None,
        }
    }

    pub fn binary(body: Vec<u8>, disposition: Option<&str>) -> Self {
        let mut headers = vec![("Content-Type".into(), "application/octet-stream".into())];
        if let Some(d) = disposition {
            headers.push(("Content-Disposition".into(), d.into()));
        }
        Self {
            status: 200,
            headers,
            body,
            pace: None,
            stall_after: None,
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".into(), location.into())],
            body: b"moved".to_vec(),
            pace: None,
            stall_after: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: b"error page".to_vec(),
            pace: None,
            stall_after: None,
        }
    }

    pub fn trickle(body: Vec<u8>, chunk: usize, interval: Duration) -> Self {
        Self {
            pace: Some((chunk.max(1), interval)),
            ..Self::binary(body, None)
        }
    }

    pub fn stalled(body: Vec<u8>, sent: usize) -> Self {
        Self {
            stall_after: Some(sent),
            ..Self::binary(body, None)
        }
    }
}

pub struct CatalogServer {
    /// Base URL without trailing slash, e.g. "http://127.0.0.1:12345".
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CatalogServer {
    /// Request targets (path and query) seen so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. Unknown paths answer 404. The
/// server runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> CatalogServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> =
        Arc::new(routes.into_iter().map(|(p, r)| (p.to_string(), r)).collect());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &routes, &log));
        }
    });
    CatalogServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, log: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    log.lock().unwrap().push(target.clone());

    let path = target.split('?').next().unwrap_or("/");
    let not_found = Route::status(404);
    let route = routes.get(path).unwrap_or(&not_found);

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    for (name, value) in &route.headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    write_body(&mut stream, route);
}

fn write_body(stream: &mut TcpStream, route: &Route) {
    if let Some(sent) = route.stall_after {
        let _ = stream.write_all(&route.body[..sent.min(route.body.len())]);
        let _ = stream.flush();
        thread::sleep(Duration::from_secs(30));
        return;
    }
    match route.pace {
        Some((chunk, interval)) => {
            for part in route.body.chunks(chunk) {
                if stream.write_all(part).is_err() || stream.flush().is_err() {
                    return;
                }
                thread::sleep(interval);
            }
        }
        None => {
            let _ = stream.write_all(&route.body);
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
