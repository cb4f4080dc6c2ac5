//! Status codes and content types.

use std::fmt;

/// Response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    Continue,
    #[default]
    Ok,
    Created,
    Accepted,
    NoContent,
    MovedPermanently,
    Found,
    SeeOther,
    NotModified,
    TemporaryRedirect,
    PermanentRedirect,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    RequestTimeout,
    PayloadTooLarge,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    HttpVersionNotSupported,
}

impl Status {
    const ALL: [Status; 23] = [
        Status::Continue,
        Status::Ok,
        Status::Created,
        Status::Accepted,
        Status::NoContent,
        Status::MovedPermanently,
        Status::Found,
        Status::SeeOther,
        Status::NotModified,
        Status::TemporaryRedirect,
        Status::PermanentRedirect,
        Status::BadRequest,
        Status::Unauthorized,
        Status::Forbidden,
        Status::NotFound,
        Status::MethodNotAllowed,
        Status::RequestTimeout,
        Status::PayloadTooLarge,
        Status::InternalServerError,
        Status::NotImplemented,
        Status::BadGateway,
        Status::ServiceUnavailable,
        Status::HttpVersionNotSupported,
    ];

    /// Numeric status code.
    pub fn code(&self) -> u16 {
        match self {
            Status::Continue => 100,
            Status::Ok => 200,
            Status::Created => 201,
            Status::Accepted => 202,
            Status::NoContent => 204,
            Status::MovedPermanently => 301,
            Status::Found => 302,
            Status::SeeOther => 303,
            Status::NotModified => 304,
            Status::TemporaryRedirect => 307,
            Status::PermanentRedirect => 308,
            Status::BadRequest => 400,
            Status::Unauthorized => 401,
            Status::Forbidden => 403,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::RequestTimeout => 408,
            Status::PayloadTooLarge => 413,
            Status::InternalServerError => 500,
            Status::NotImplemented => 501,
            Status::BadGateway => 502,
            Status::ServiceUnavailable => 503,
            Status::HttpVersionNotSupported => 505,
        }
    }

    /// Canonical reason phrase.
    pub fn reason(&self) -> &'static str {
        match self {
            Status::Continue => "Continue",
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::Accepted => "Accepted",
            Status::NoContent => "No Content",
            Status::MovedPermanently => "Moved Permanently",
            Status::Found => "Found",
            Status::SeeOther => "See Other",
            Status::NotModified => "Not Modified",
            Status::TemporaryRedirect => "Temporary Redirect",
            Status::PermanentRedirect => "Permanent Redirect",
            Status::BadRequest => "Bad Request",
            Status::Unauthorized => "Unauthorized",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::RequestTimeout => "Request Timeout",
            Status::PayloadTooLarge => "Payload Too Large",
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
            Status::BadGateway => "Bad Gateway",
            Status::ServiceUnavailable => "Service Unavailable",
            Status::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }

    /// Status for a numeric code, if it is one of ours.
    pub fn from_code(code: u16) -> Option<Status> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// Value of the `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Plain,
    Css,
    Javascript,
    Json,
    OctetStream,
    Custom(String),
}

impl ContentType {
    /// MIME type as sent in `Content-Type`.
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Plain => "text/plain",
            ContentType::Css => "text/css",
            ContentType::Javascript => "application/javascript",
            ContentType::Json => "application/json",
            ContentType::OctetStream => "application/octet-stream",
            ContentType::Custom(value) => value,
        }
    }

    /// Parameters such as `; charset=utf-8` are ignored when matching.
    pub fn parse(value: &str) -> ContentType {
        let essence = value.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/html" => ContentType::Html,
            "text/plain" => ContentType::Plain,
            "text/css" => ContentType::Css,
            "application/javascript" | "text/javascript" => ContentType::Javascript,
            "application/json" => ContentType::Json,
            "application/octet-stream" => ContentType::OctetStream,
            _ => ContentType::Custom(value.trim().to_string()),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for status in Status::ALL {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
        assert_eq!(Status::from_code(299), None);
    }

    #[test]
    fn default_is_ok() {
        assert_eq!(Status::default(), Status::Ok);
        assert_eq!(Status::NotFound.to_string(), "404 Not Found");
    }

    #[test]
    fn content_type_ignores_parameters() {
        assert_eq!(ContentType::parse("text/html; charset=utf-8"), ContentType::Html);
        assert_eq!(
            ContentType::parse("image/png"),
            ContentType::Custom("image/png".to_string())
        );
    }
}
