//! Responses and their wire encoding.
//!
//! # Design Decisions
//! - A handler fills in a [`Response`] and calls [`Response::complete`] once;
//!   a second call is reported as [`ResponseError::AlreadyCompleted`]
//! - Only the connection handler turns a completed response into bytes, so a
//!   response reaches the socket at most once
//! - `Content-Length` is always computed from the body, even when the body
//!   itself is omitted for a `HEAD` request

use bytes::{BufMut, BytesMut};

use super::parser::{decode, is_supported_version, parse_header_lines, split_message};
use super::{ContentType, Headers, ParseError, ResponseError, Status, VERSION};

/// Response under construction by a handler.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: Status,
    headers: Headers,
    body: Vec<u8>,
    omit_body: bool,
    completed: bool,
}

impl Response {
    /// Empty `200 OK` response, not yet completed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Replace the status.
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Header fields set so far.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Set a header, replacing any field with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Body bytes, even when they will be omitted on the wire.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8, or `None` if it is not valid text.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Parsed `Content-Type` header.
    pub fn content_type(&self) -> Option<ContentType> {
        self.headers.get("content-type").map(ContentType::parse)
    }

    /// Set the `Content-Type` header.
    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.headers.insert("Content-Type", content_type.as_str());
    }

    /// `Location` header, set on redirects.
    pub fn location(&self) -> Option<&str> {
        self.headers.get("location")
    }

    /// Set the `Location` header.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.headers.insert("Location", location);
    }

    /// Whether the body will be left off the wire (the request was `HEAD`).
    pub fn omits_body(&self) -> bool {
        self.omit_body
    }

    pub(crate) fn set_omit_body(&mut self, omit: bool) {
        self.omit_body = omit;
    }

    /// Mark the response as ready to send.
    pub fn complete(&mut self) -> Result<(), ResponseError> {
        if self.completed {
            return Err(ResponseError::AlreadyCompleted);
        }
        self.completed = true;
        Ok(())
    }

    /// Whether [`Response::complete`] has been called.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// For responses built by the server itself rather than a handler.
    pub(crate) fn into_completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Encode status line, headers and (unless omitted) body.
    pub fn to_bytes(&self, server_name: Option<&str>) -> BytesMut {
        let body_len = if self.omit_body { 0 } else { self.body.len() };
        let mut out = BytesMut::with_capacity(128 + self.headers.len() * 32 + body_len);

        out.put_slice(format!("{VERSION} {}\r\n", self.status).as_bytes());
        if let Some(name) = server_name.filter(|n| !n.is_empty()) {
            if !self.headers.contains("server") {
                out.put_slice(format!("Server: {name}\r\n").as_bytes());
            }
        }
        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            out.put_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        out.put_slice(format!("Content-Length: {}\r\n\r\n", self.body.len()).as_bytes());
        if !self.omit_body {
            out.put_slice(&self.body);
        }
        out
    }

    /// Parse a complete response message.
    pub fn parse(blob: &[u8]) -> Result<Self, ParseError> {
        let (head, body) = split_message(blob)?;
        let text = decode(&head)?;
        let mut lines = text.split('\n');

        let status_line = lines.next().unwrap_or_default();
        let (version, rest) = status_line
            .split_once(' ')
            .ok_or(ParseError::Malformed("status line"))?;
        if !is_supported_version(version) {
            return Err(ParseError::UnsupportedVersion(version.to_string()));
        }
        let code = rest.split(' ').next().unwrap_or_default();
        let status = code
            .parse()
            .ok()
            .and_then(Status::from_code)
            .ok_or(ParseError::Malformed("status code"))?;

        Ok(Self {
            status,
            headers: parse_header_lines(lines)?,
            body,
            omit_body: false,
            completed: false,
        })
    }
}
