//! Request methods.

use std::fmt;
use std::str::FromStr;

use super::ParseError;

/// HTTP request method.
///
/// [`Method::Any`] only exists for route registration; it never comes off
/// the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Any,
}

impl Method {
    /// Upper-case token as it appears on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Any => "*",
        }
    }

    /// Whether a binding registered for `self` accepts a request with `other`.
    pub fn accepts(&self, other: Method) -> bool {
        *self == Method::Any || *self == other
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(ParseError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_served_methods() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("DELETE".parse::<Method>(), Ok(Method::Delete));
    }

    #[test]
    fn any_is_not_a_wire_method() {
        assert!("ANY".parse::<Method>().is_err());
        assert!("*".parse::<Method>().is_err());
        assert!("PATCH".parse::<Method>().is_err());
    }

    #[test]
    fn any_accepts_everything() {
        assert!(Method::Any.accepts(Method::Post));
        assert!(Method::Get.accepts(Method::Get));
        assert!(!Method::Get.accepts(Method::Head));
    }
}
