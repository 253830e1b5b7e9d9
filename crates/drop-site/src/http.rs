//! Minimal HTTP/1.1 request and response types.

use crate::error::{SiteError, SiteResult};

/// An HTTP header (name-value pair).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

impl HttpHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A parsed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, etc.).
    pub method: String,
    /// Path without the query string.
    pub path: String,
    /// Query string without the leading `?`, if any.
    pub query: Option<String>,
    /// HTTP version string (e.g., "HTTP/1.1").
    pub http_version: String,
    pub headers: Vec<HttpHeader>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method: method.into(),
            path,
            query,
            http_version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new("GET", target)
    }

    pub fn post(target: &str) -> Self {
        Self::new("POST", target)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader::new(name, value));
        self
    }

    /// Parses the request line and headers (everything before the blank line).
    pub fn parse_head(head: &str) -> SiteResult<Self> {
        let mut lines = head.split("\r\n");
        let request_line = lines
            .next()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| SiteError::HttpError("empty request".to_string()))?;

        let mut parts = request_line.split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SiteError::HttpError(format!(
                "malformed request line: {}",
                request_line
            )));
        };
        if !version.starts_with("HTTP/1.") {
            return Err(SiteError::HttpError(format!("unsupported version: {}", version)));
        }
        if !target.starts_with('/') {
            return Err(SiteError::HttpError(format!("unsupported target: {}", target)));
        }

        let mut request = Self::new(method, target);
        request.http_version = version.to_string();

        for line in lines.filter(|l| !l.is_empty()) {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| SiteError::HttpError(format!("malformed header: {}", line)))?;
            request.headers.push(HttpHeader::new(name.trim(), value.trim()));
        }

        Ok(request)
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Get the Content-Length header as usize.
    pub fn content_length(&self) -> Option<usize> {
        self.get_header("Content-Length")
            .and_then(|v| v.parse().ok())
    }
}

fn split_target(target: &str) -> (String, Option<String>) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    }
}

/// An HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code (e.g., 200, 404).
    pub status_code: u16,
    /// Reason phrase (e.g., "OK", "Not Found").
    pub reason: String,
    pub headers: Vec<HttpHeader>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with the standard reason phrase and no body.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            reason: reason_for_status(status_code).to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    fn html(status_code: u16, body: String) -> Self {
        Self::new(status_code)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body.into_bytes())
    }

    /// 200 with an HTML body.
    pub fn ok_html(body: String) -> Self {
        Self::html(200, body)
    }

    /// 404 with an HTML body.
    pub fn not_found(body: String) -> Self {
        Self::html(404, body)
    }

    /// 500 with an HTML body.
    pub fn server_error(body: String) -> Self {
        Self::html(500, body)
    }

    /// 303 See Other to `location`.
    pub fn redirect(location: &str) -> Self {
        Self::new(303).with_header("Location", location)
    }

    /// 405 listing the allowed methods.
    pub fn method_not_allowed(allow: &str) -> Self {
        Self::new(405).with_header("Allow", allow)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader::new(name, value));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Check if the response is successful (2xx status code).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Body as UTF-8 text, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Serializes status line, headers and body. Adds `Content-Length`
    /// unless already set, and `Connection: close`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status_code, self.reason);
        for header in &self.headers {
            head.push_str(&format!("{}: {}\r\n", header.name, header.value));
        }
        if self.get_header("Content-Length").is_none() {
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Standard reason phrase for a status code.
pub fn reason_for_status(status_code: u16) -> &'static str {
    match status_code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
