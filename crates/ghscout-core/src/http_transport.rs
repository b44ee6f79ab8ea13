use anyhow::Context;
use reqwest::blocking::Client;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single outbound GET. An `Err` means the request never produced
/// an HTTP status (DNS, connect, TLS, body read).
pub trait HttpTransport: Send + Sync {
    fn get(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .with_context(|| format!("request to {} failed", request.url))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("failed to read response body from {}", request.url))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use super::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

    fn serve_once(reply: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let address = listener.local_addr().expect("local addr");
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            while !raw.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut chunk).expect("read request");
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..read]);
            }
            stream.write_all(reply.as_bytes()).expect("write reply");
            let _ = sender.send(String::from_utf8_lossy(&raw).to_string());
        });

        (format!("http://{address}/repos/octocat/Hello-World/readme"), receiver)
    }

    fn local_transport() -> ReqwestTransport {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .expect("client");
        ReqwestTransport { client }
    }

    #[test]
    fn reqwest_transport_sends_headers_and_returns_status_and_body() {
        let (url, request_text) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        );
        let transport = local_transport();

        let response = transport
            .get(&HttpRequest::get(url).header("Accept", "application/vnd.github.v3.raw"))
            .expect("response");

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "not found");
        let sent = request_text.recv().expect("request text").to_ascii_lowercase();
        assert!(sent.starts_with("get /repos/octocat/hello-world/readme"));
        assert!(sent.contains("accept: application/vnd.github.v3.raw"));
    }

    #[test]
    fn reqwest_transport_reports_refused_connection_as_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let address = listener.local_addr().expect("local addr");
        drop(listener);
        let transport = local_transport();

        let error = transport
            .get(&HttpRequest::get(format!("http://{address}/rate_limit")))
            .expect_err("connection should fail");

        assert!(format!("{error:#}").contains("request to http://"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = HttpRequest::get("https://example.test")
            .header("Accept", "application/vnd.github.v3.raw");

        assert_eq!(
            request.header_value("accept"),
            Some("application/vnd.github.v3.raw")
        );
        assert_eq!(request.header_value("authorization"), None);
    }

    #[test]
    fn success_covers_2xx_only() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = HttpResponse {
            status: 301,
            body: String::new(),
        };

        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
