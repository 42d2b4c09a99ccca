//! Local HTTP server capturing requests for tests.

use std::{io::Read, thread, time::Duration};

/// A request received by [`TestServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves `expected` requests with a fixed status, then stops.
pub struct TestServer {
    pub url: String,
    handle: thread::JoinHandle<Vec<CapturedRequest>>,
}

impl TestServer {
    pub fn start(status: u16, expected: usize) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("bind test server");
        let addr = server.server_addr().to_ip().expect("ip listener");

        let handle = thread::spawn(move || {
            let mut captured = Vec::new();
            while captured.len() < expected {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(5)) else {
                    break;
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                captured.push(CapturedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.to_string()))
                        .collect(),
                    body,
                });
                let _ = request.respond(tiny_http::Response::empty(status));
            }
            captured
        });

        Self {
            url: format!("http://{addr}"),
            handle,
        }
    }

    /// Wait for the server thread and return what it captured.
    pub fn finish(self) -> Vec<CapturedRequest> {
        self.handle.join().expect("test server thread")
    }
}
