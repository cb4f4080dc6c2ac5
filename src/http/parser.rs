//! Text-level helpers shared by the request and response parsers.

use super::framing::{declared_content_length, find_header_end, find_message_end, raw_offset, strip_cr};
use super::{Headers, ParseError};

/// Decode a header block as UTF-8.
///
/// A sequence cut off at the end of the input is [`ParseError::Incomplete`]
/// since the rest of it may still be in flight; invalid bytes anywhere else
/// are malformed.
pub(crate) fn decode(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| match e.error_len() {
        None => ParseError::Incomplete,
        Some(_) => ParseError::Malformed("invalid utf-8"),
    })
}

/// Split a standalone message into its header block and body.
///
/// Carriage returns are dropped from the header block only. A declared
/// `Content-Length` takes exactly that many raw bytes after the boundary;
/// without one the body runs to the last boundary, or to the end of input
/// when there is no further boundary.
pub(crate) fn split_message(blob: &[u8]) -> Result<(Vec<u8>, Vec<u8>), ParseError> {
    let stripped = strip_cr(blob);
    let head_end = find_header_end(&stripped).ok_or(ParseError::Incomplete)?;
    let head = stripped[..head_end].to_vec();
    let rest = &blob[raw_offset(blob, head_end + 2)..];

    let body = match declared_content_length(&head)? {
        Some(length) => rest.get(..length).ok_or(ParseError::Incomplete)?,
        None => match find_message_end(&strip_cr(rest)) {
            Some(end) => &rest[..raw_offset(rest, end)],
            None => rest,
        },
    };
    Ok((head, body.to_vec()))
}

/// Parse `Name: Value` lines into a header map.
pub(crate) fn parse_header_lines<'a>(
    lines: impl Iterator<Item = &'a str>,
) -> Result<Headers, ParseError> {
    let mut headers = Headers::new();
    for line in lines {
        if line.starts_with([' ', '\t']) {
            return Err(ParseError::Malformed("folded header line"));
        }
        let (name, value) = line
            .split_once(':')
            .ok_or(ParseError::Malformed("header line without colon"))?;
        if name.is_empty() || name.contains([' ', '\t']) {
            return Err(ParseError::Malformed("invalid header name"));
        }
        headers.insert(name, value.trim());
    }
    Ok(headers)
}

/// Whether `token` names the one protocol version served.
pub(crate) fn is_supported_version(token: &str) -> bool {
    token.eq_ignore_ascii_case(super::VERSION)
}
