//! Tagged request-handling failures and their mapping onto [`StatusCode`].

use crate::http::types::StatusCode;
use std::io;

/// Every way request parsing or response construction can fail, tagged by
/// kind rather than carrying a formatted status line (see `DESIGN.md`).
#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorKind {
    #[error("unrecognized or malformed HTTP method")]
    InvalidMethod,
    #[error("a Simple request used a method other than GET")]
    SimpleNonGet,
    #[error("malformed request URI")]
    InvalidUri,
    #[error("requested resource escapes the server root")]
    PathEscapesRoot,
    #[error("malformed HTTP version token")]
    InvalidVersion,
    #[error("HTTP version not supported")]
    UnsupportedVersion,
    #[error("requested resource does not exist")]
    NotFound,
    #[error("requested resource is not readable")]
    Unauthorized,
    #[error("I/O error while building the response: {0}")]
    Io(#[from] io::Error),
}

impl ErrorKind {
    /// Pure mapping from failure kind to the status code it produces. This is
    /// the tagged-variant design `SPEC_FULL.md` §9 mandates in place of the
    /// source's ad hoc formatted status strings.
    pub(crate) const fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::InvalidMethod
            | ErrorKind::SimpleNonGet
            | ErrorKind::InvalidUri
            | ErrorKind::PathEscapesRoot
            | ErrorKind::InvalidVersion => StatusCode::BadRequest,
            ErrorKind::UnsupportedVersion => StatusCode::UnsupportedVersion,
            ErrorKind::NotFound => StatusCode::FileNotFound,
            ErrorKind::Unauthorized => StatusCode::Unauthorized,
            ErrorKind::Io(_) => StatusCode::InternalError,
        }
    }
}
