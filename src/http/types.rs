//! Core HTTP protocol types: methods, versions, and status codes.

use crate::errors::ErrorKind;

/// HTTP request methods recognized by the request line parser.
///
/// Only `GET`, `HEAD`, and `POST` are recognized as named methods; anything
/// else (including a method token that merely contains one of these as a
/// substring) is `Unknown`. `Post` and `Head` carry no response-construction
/// semantics distinct from `Get` — see `DESIGN.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Method {
    Get,
    Head,
    Post,
    Unknown,
}

impl Method {
    /// Matches `token` (the whitespace-delimited leading field of the request
    /// line) against the recognized method set by exact equality, never by
    /// substring search.
    #[inline]
    pub(crate) fn from_token(token: &[u8]) -> Self {
        match token {
            b"GET" => Method::Get,
            b"HEAD" => Method::Head,
            b"POST" => Method::Post,
            _ => Method::Unknown,
        }
    }
}

/// The request's parsed HTTP version, once validated by the response
/// builder. `SERVER_VERSION` is what this server always answers with, on
/// both the `1.0` and `1.1` request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Version {
    Http10,
    Http11,
}

impl Version {
    pub(crate) const SERVER_VERSION: &'static str = "1.0";
}

/// The raw `HTTP/D.D` token captured off the wire, before the response
/// builder decides whether it is well-formed enough (`[1-9]\.[0-9]`) and
/// whether it names a supported version (`1.0` or `1.1`).
///
/// Kept distinct from [`Version`] because a syntactically valid but
/// unsupported version (`HTTP/2.0`) and a syntactically invalid one
/// (`HTTP/0.9`) map to different status codes (505 vs 400) — see
/// `SPEC_FULL.md` §4.4 step 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawVersion {
    major: u8,
    minor: u8,
}

impl RawVersion {
    /// Parses a `HTTP/D.D`-shaped token (single ASCII digit, `.`, single
    /// ASCII digit). Returns `None` if the token isn't of that shape at all.
    pub(crate) fn parse(token: &[u8]) -> Option<Self> {
        let digits = token.strip_prefix(b"HTTP/")?;
        let [major, b'.', minor] = *digits else {
            return None;
        };
        if !major.is_ascii_digit() || !minor.is_ascii_digit() {
            return None;
        }
        Some(RawVersion { major, minor })
    }

    /// Validates against `[1-9]\.[0-9]` and then against the supported set
    /// `{1.0, 1.1}`, per `SPEC_FULL.md` §4.4 step 4.
    pub(crate) fn validate(self) -> Result<Version, ErrorKind> {
        if self.major == b'0' {
            return Err(ErrorKind::InvalidVersion);
        }
        match (self.major, self.minor) {
            (b'1', b'0') => Ok(Version::Http10),
            (b'1', b'1') => Ok(Version::Http11),
            _ => Err(ErrorKind::UnsupportedVersion),
        }
    }
}

/// HTTP status codes this server can emit, per the reason-phrase table in
/// `SPEC_FULL.md` §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum StatusCode {
    Ok,
    BadRequest,
    Unauthorized,
    FileNotFound,
    InternalError,
    NotImplemented,
    ServiceUnavailable,
    UnsupportedVersion,
}

impl StatusCode {
    /// Numeric status code.
    pub(crate) const fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::FileNotFound => 404,
            StatusCode::InternalError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::ServiceUnavailable => 503,
            StatusCode::UnsupportedVersion => 505,
        }
    }

    /// Authoritative reason phrase (spelled per `SPEC_FULL.md` §4.4, not the
    /// source's misspelling of 501).
    pub(crate) const fn reason_phrase(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::FileNotFound => "Not Found",
            StatusCode::InternalError => "Internal server error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::UnsupportedVersion => "Unsupported request version",
        }
    }

    /// Formats the status line the server always emits: `HTTP/1.0 <code> <reason>\r\n`.
    pub(crate) fn status_line(self) -> String {
        format!(
            "HTTP/{} {} {}\r\n",
            Version::SERVER_VERSION,
            self.code(),
            self.reason_phrase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_matches_exact_token_only() {
        assert_eq!(Method::from_token(b"GET"), Method::Get);
        assert_eq!(Method::from_token(b"HEAD"), Method::Head);
        assert_eq!(Method::from_token(b"POST"), Method::Post);
        // A token merely containing "GET" must not match (source's defect, fixed).
        assert_eq!(Method::from_token(b"GETAWAY"), Method::Unknown);
        assert_eq!(Method::from_token(b"FORGET"), Method::Unknown);
        assert_eq!(Method::from_token(b"PUT"), Method::Unknown);
    }

    #[test]
    fn raw_version_parses_any_digit_dot_digit() {
        assert!(RawVersion::parse(b"HTTP/1.0").is_some());
        assert!(RawVersion::parse(b"HTTP/0.9").is_some());
        assert!(RawVersion::parse(b"HTTP/2.0").is_some());
    }

    #[test]
    fn raw_version_none_on_malformed_token() {
        assert!(RawVersion::parse(b"HTTP/11").is_none());
        assert!(RawVersion::parse(b"garbage").is_none());
    }

    #[test]
    fn validate_accepts_only_supported_versions() {
        assert_eq!(
            RawVersion::parse(b"HTTP/1.0").unwrap().validate().unwrap(),
            Version::Http10
        );
        assert_eq!(
            RawVersion::parse(b"HTTP/1.1").unwrap().validate().unwrap(),
            Version::Http11
        );
    }

    #[test]
    fn validate_rejects_zero_major_as_bad_request() {
        let err = RawVersion::parse(b"HTTP/0.9").unwrap().validate().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BadRequest);
    }

    #[test]
    fn validate_rejects_unsupported_minor_as_unsupported_version() {
        let err = RawVersion::parse(b"HTTP/2.0").unwrap().validate().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UnsupportedVersion);
    }

    #[test]
    fn status_line_always_reports_server_version() {
        assert_eq!(
            StatusCode::UnsupportedVersion.status_line(),
            "HTTP/1.0 505 Unsupported request version\r\n"
        );
        assert_eq!(StatusCode::Ok.status_line(), "HTTP/1.0 200 OK\r\n");
    }
}
