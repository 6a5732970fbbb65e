//! Request-line parsing: §4.3 of `SPEC_FULL.md`.

use crate::errors::ErrorKind;
use crate::http::types::{Method, RawVersion};

/// Maximum length the parser will retain for the raw URI field.
const MAX_URI_LEN: usize = 100;
/// Upper bound on the whole request line read from the socket.
pub(crate) const MAX_REQUEST_LINE_LEN: usize = 110;

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Request {
    pub(crate) method: Method,
    /// Raw URI field verbatim off the wire, truncated to `MAX_URI_LEN`.
    pub(crate) uri: String,
    /// `Some` for a Full request (version field present and well-formed
    /// enough to be a `HTTP/D.D` token); `None` for a Simple request.
    /// Whether it names a *supported* version is validated later, by the
    /// response builder (`RawVersion::validate`).
    pub(crate) version: Option<RawVersion>,
    /// `scheme://authority` prefix, possibly empty.
    pub(crate) resource_location: String,
    /// Path component, beginning with `/`.
    pub(crate) resource_name: String,
}

impl Request {
    pub(crate) fn is_simple(&self) -> bool {
        self.version.is_none()
    }
}

/// Splits `line` on the request line's two mandatory spaces and the
/// optional Full-request version field, producing a [`Request`].
///
/// `line` includes its trailing CRLF (or LF, or nothing at EOF) exactly as
/// read off the wire.
pub(crate) fn parse_request_line(line: &[u8]) -> Result<Request, ErrorKind> {
    let method_end = memchr::memchr(b' ', line).ok_or(ErrorKind::InvalidUri)?;
    let method = Method::from_token(&line[..method_end]);

    let rest = &line[method_end + 1..];
    let (uri_bytes, trailer) = match memchr::memchr(b' ', rest) {
        Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
        None => (strip_line_ending(rest), None),
    };
    if uri_bytes.is_empty() || (uri_bytes[0] != b'/' && !has_scheme(uri_bytes)) {
        return Err(ErrorKind::InvalidUri);
    }

    // A version field only counts as "present" (Full request) if it is
    // exactly a `HTTP/D.D` token immediately followed by CRLF at end of
    // line; anything else (missing CRLF, garbage trailer) falls back to a
    // Simple request per SPEC_FULL.md §4.3's edge case.
    let version = trailer
        .and_then(|t| t.strip_suffix(b"\r\n"))
        .and_then(RawVersion::parse);

    let (resource_location, resource_name) = split_uri(uri_bytes);

    let mut uri = String::from_utf8_lossy(uri_bytes).into_owned();
    uri.truncate(MAX_URI_LEN);

    Ok(Request {
        method,
        uri,
        version,
        resource_location,
        resource_name,
    })
}

fn has_scheme(uri: &[u8]) -> bool {
    uri.starts_with(b"http://") || uri.starts_with(b"https://")
}

fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_suffix(b"\r\n")
        .or_else(|| bytes.strip_suffix(b"\n"))
        .unwrap_or(bytes)
}

/// Splits a URI into its optional `scheme://authority` prefix and its path.
fn split_uri(uri: &[u8]) -> (String, String) {
    if !has_scheme(uri) {
        return (String::new(), String::from_utf8_lossy(uri).into_owned());
    }
    let scheme_len = if uri.starts_with(b"https://") { 8 } else { 7 };
    let path_start = memchr::memchr(b'/', &uri[scheme_len..])
        .map(|i| scheme_len + i)
        .unwrap_or(uri.len());
    let location = String::from_utf8_lossy(&uri[..path_start]).into_owned();
    let name = if path_start == uri.len() {
        "/".to_string()
    } else {
        String::from_utf8_lossy(&uri[path_start..]).into_owned()
    };
    (location, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::types::Version;

    #[test]
    fn simple_request_has_no_version() {
        let req = parse_request_line(b"GET /\r\n").unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.resource_name, "/");
        assert!(req.is_simple());
    }

    #[test]
    fn full_request_extracts_version() {
        let req = parse_request_line(b"GET / HTTP/1.0\r\n").unwrap();
        assert!(!req.is_simple());
        assert_eq!(req.version.unwrap().validate().unwrap(), Version::Http10);
    }

    #[test]
    fn three_tokens_without_crlf_falls_back_to_simple() {
        let req = parse_request_line(b"GET /foo HTTP/1.0").unwrap();
        assert!(req.is_simple());
    }

    #[test]
    fn malformed_but_present_version_is_still_full() {
        // HTTP/0.9 is well-formed D.D, just not in {1.0, 1.1}: it must stay
        // Full so the response builder can reject it with 400, not silently
        // degrade to a 200 Simple response.
        let req = parse_request_line(b"GET / HTTP/0.9\r\n").unwrap();
        assert!(!req.is_simple());
        assert!(req.version.unwrap().validate().is_err());
    }

    #[test]
    fn scheme_and_authority_are_split_from_path() {
        let req = parse_request_line(b"GET http://example.com/a/b HTTP/1.1\r\n").unwrap();
        assert_eq!(req.resource_location, "http://example.com");
        assert_eq!(req.resource_name, "/a/b");
    }

    #[test]
    fn unrecognized_method_is_unknown_not_substring_matched() {
        let req = parse_request_line(b"GETAWAY / HTTP/1.0\r\n").unwrap();
        assert_eq!(req.method, Method::Unknown);
    }

    #[test]
    fn missing_uri_is_invalid() {
        assert!(parse_request_line(b"GET \r\n").is_err());
    }
}
