//! Parsed requests.

use bytes::Bytes;

use super::framing::{declared_content_length, strip_cr};
use super::parser::{decode, is_supported_version, parse_header_lines, split_message};
use super::{ContentType, Headers, Method, ParseError};

/// A request as handed to route handlers.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Build a request from a header block (request line plus header lines,
    /// without the terminating blank line) and the body that followed it.
    pub fn from_parts(head: &[u8], body: Bytes) -> Result<Self, ParseError> {
        let head = strip_cr(head);
        declared_content_length(&head)?;
        let text = decode(&head)?;
        let mut lines = text.split('\n');

        let request_line = lines.next().unwrap_or_default();
        let mut tokens = request_line.split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseError::Malformed("request line"));
        };

        let method: Method = method.parse()?;
        if !target.starts_with('/') {
            return Err(ParseError::Malformed("request target"));
        }
        if !is_supported_version(version) {
            return Err(ParseError::UnsupportedVersion(version.to_string()));
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };

        Ok(Self {
            method,
            path,
            query,
            headers: parse_header_lines(lines)?,
            body,
        })
    }

    /// Parse a complete message, header block and body included.
    pub fn parse(blob: &[u8]) -> Result<Self, ParseError> {
        let (head, body) = split_message(blob)?;
        Self::from_parts(&head, Bytes::from(body))
    }

    /// Request method, `GET` once a `HEAD` has been rewritten.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Serve a `HEAD` request as `GET`. Returns whether a rewrite happened.
    pub(crate) fn rewrite_head_as_get(&mut self) -> bool {
        if self.method == Method::Head {
            self.method = Method::Get;
            true
        } else {
            false
        }
    }

    /// Request path, always starting with `/`, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Text after `?` in the request target.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// All header fields.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Single header value, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Raw body bytes, exactly as received.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8, or `None` if it is not valid text.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Parsed `Content-Length` header.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")?.parse().ok()
    }

    /// Parsed `Content-Type` header.
    pub fn content_type(&self) -> Option<ContentType> {
        self.header("content-type").map(ContentType::parse)
    }

    /// `Host` header.
    pub fn host(&self) -> Option<&str> {
        self.header("host")
    }

    /// `false` once the client asked for `Connection: close`.
    pub fn keep_alive(&self) -> bool {
        !self
            .header("connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("close"))
    }
}
