//! Message boundary detection.
//!
//! # Responsibilities
//! - Locate the end of a header block (first `LF LF`)
//! - Locate the last complete message boundary in a buffer (last `LF LF`)
//! - Read the declared body length from a header block
//!
//! # Design Decisions
//! - Operates on bytes that already had carriage returns removed, so a
//!   `CRLF CRLF` terminator on the wire shows up here as `LF LF`
//! - `None` always means "incomplete, read more"
//!
//! # Known Limitation
//! Message heads are delimited by the blank-line marker only. A body is
//! attached to a message solely through `Content-Length`; there is no chunked
//! decoding, and a peer that sends a body without declaring its length will
//! have that body read as the start of the next message.

use super::ParseError;

const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Offset of the first `LF LF` pair, i.e. where the header block ends.
pub fn find_header_end(data: &[u8]) -> Option<usize> {
    if data.len() < 2 {
        return None;
    }
    data.windows(2).position(|pair| pair == [LF, LF])
}

/// Offset of the last `LF LF` pair, i.e. where the last complete message in
/// a buffer of pipelined messages ends.
pub fn find_message_end(data: &[u8]) -> Option<usize> {
    if data.len() < 2 {
        return None;
    }
    data.windows(2).rposition(|pair| pair == [LF, LF])
}

/// Copy `data` without its carriage-return bytes.
pub fn strip_cr(data: &[u8]) -> Vec<u8> {
    data.iter().copied().filter(|&b| b != CR).collect()
}

/// Number of raw bytes that hold the first `stripped_len` non-CR bytes of `raw`.
///
/// Maps an offset in the output of [`strip_cr`] back onto the original buffer.
pub fn raw_offset(raw: &[u8], stripped_len: usize) -> usize {
    if stripped_len == 0 {
        return 0;
    }
    let mut seen = 0;
    for (i, &b) in raw.iter().enumerate() {
        if b != CR {
            seen += 1;
            if seen == stripped_len {
                return i + 1;
            }
        }
    }
    raw.len()
}

/// `Content-Length` declared in a header block.
///
/// Repeated fields must agree; a value that is not a number is ignored.
pub fn declared_content_length(head: &[u8]) -> Result<Option<usize>, ParseError> {
    let mut declared = None;
    for line in head.split(|&b| b == LF).skip(1) {
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            continue;
        };
        let (name, value) = line.split_at(colon);
        if !name.trim_ascii().eq_ignore_ascii_case(b"content-length") {
            continue;
        }
        let Some(length) = std::str::from_utf8(&value[1..])
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        else {
            continue;
        };
        match declared {
            Some(previous) if previous != length => {
                return Err(ParseError::Malformed("conflicting content-length"));
            }
            _ => declared = Some(length),
        }
    }
    Ok(declared)
}
