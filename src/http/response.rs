//! Response construction: §4.4 of `SPEC_FULL.md`.
//!
//! `build` never fails: any validation or filesystem error is folded into a
//! status-only [`Response`] rather than propagated, because by the time the
//! Worker calls this the request line is already known to be parseable (a
//! request that couldn't even be parsed is handled separately by the Worker,
//! which closes the connection without building a response at all).

use std::fs::{self, File};
use std::io;
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use crate::bio;
use crate::errors::ErrorKind;
use crate::http::request::Request;
use crate::http::types::{Method, StatusCode};

/// Content-type table from `SPEC_FULL.md` §4.4 step 6. Anything else, or an
/// extensionless path, falls back to `text/plain`.
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseType {
    Simple,
    Full,
}

/// A fully built response, ready to be written to a client socket.
///
/// On any non-`Ok` status the response is status-line-only regardless of
/// `response_type` — this is the Simple-error-upgrade policy from §4.4 step 7
/// and also the ordinary Full non-OK behavior (headers are only sent
/// alongside a 200).
pub(crate) struct Response {
    status: StatusCode,
    response_type: ResponseType,
    resource_file: Option<File>,
    content_length: u64,
    content_type: &'static str,
}

impl Response {
    /// Runs the §4.4 state flow and always produces a response, upgrading
    /// every failure to the status-only wire shape.
    pub(crate) fn build(request: &Request, server_root: &Path) -> Response {
        let response_type = if request.is_simple() {
            ResponseType::Simple
        } else {
            ResponseType::Full
        };
        match build_ok(request, response_type, server_root) {
            Ok(response) => response,
            Err(err) => Response::status_only(response_type, err.status_code()),
        }
    }

    fn status_only(response_type: ResponseType, status: StatusCode) -> Response {
        Response {
            status,
            response_type,
            resource_file: None,
            content_length: 0,
            content_type: "text/plain",
        }
    }

    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    /// Writes this response to `stream`. A non-OK status writes the status
    /// line alone; an OK Simple response writes the file body alone; an OK
    /// Full response writes status, headers, then body.
    pub(crate) fn write_to(&self, stream: &mut TcpStream) -> io::Result<()> {
        if self.status != StatusCode::Ok {
            return bio::write_n(stream, self.status.status_line().as_bytes());
        }

        if self.response_type == ResponseType::Full {
            let head = format!(
                "{}Content-length: {}\r\nContent-type: {}\r\n\r\n",
                self.status.status_line(),
                self.content_length,
                self.content_type
            );
            bio::write_n(stream, head.as_bytes())?;
        }

        if let Some(file) = &self.resource_file {
            bio::write_from_file(stream, file, self.content_length)?;
        }
        Ok(())
    }
}

/// Writes the Monitor's drain-time 503, per §4.7 step 5. Not a [`Response`]
/// value since it's synthesized outside the normal request/response flow and
/// carries a header the ordinary response builder never emits.
pub(crate) fn status_only_503(stream: &mut TcpStream) -> io::Result<()> {
    bio::write_n(
        stream,
        b"HTTP/1.0 503 Service Unavailable\r\nConnection: close\r\nContent-type: text/plain\r\n\r\n",
    )
}

fn build_ok(
    request: &Request,
    response_type: ResponseType,
    server_root: &Path,
) -> Result<Response, ErrorKind> {
    validate_method(request, response_type)?;

    let absolute_path = resolve_absolute_path(
        server_root,
        &request.resource_location,
        &request.resource_name,
    )?;

    if response_type == ResponseType::Full {
        // `is_simple()` being false guarantees a version field was captured.
        request.version.expect("full request carries a version").validate()?;
    }

    let file = File::open(&absolute_path)?;
    let metadata = file.metadata()?;
    let content_type = infer_content_type(&absolute_path);

    Ok(Response {
        status: StatusCode::Ok,
        response_type,
        resource_file: Some(file),
        content_length: metadata.len(),
        content_type,
    })
}

fn validate_method(request: &Request, response_type: ResponseType) -> Result<(), ErrorKind> {
    if request.method == Method::Unknown {
        return Err(ErrorKind::InvalidMethod);
    }
    if response_type == ResponseType::Simple && request.method != Method::Get {
        return Err(ErrorKind::SimpleNonGet);
    }
    Ok(())
}

/// Concatenates `server_root`, `location`, and `name` (remapping `/` to
/// `/index.html`) the way the source does, then confirms the result stays
/// under `server_root` and is an existing, readable file.
fn resolve_absolute_path(server_root: &Path, location: &str, name: &str) -> Result<PathBuf, ErrorKind> {
    let path_component = if name == "/" { "/index.html" } else { name };
    let relative = format!("{location}{path_component}");

    if escapes_root(&relative) {
        return Err(ErrorKind::PathEscapesRoot);
    }

    let candidate = PathBuf::from(format!("{}{}", server_root.display(), relative));

    let metadata = fs::metadata(&candidate).map_err(|_| ErrorKind::NotFound)?;
    if !metadata.is_file() {
        return Err(ErrorKind::NotFound);
    }
    if File::open(&candidate).is_err() {
        return Err(ErrorKind::Unauthorized);
    }

    // Defense in depth: a symlink inside server_root could still point
    // outside it even though the lexical check above passed.
    let canonical_root = server_root.canonicalize()?;
    let canonical_candidate = candidate.canonicalize()?;
    if !canonical_candidate.starts_with(&canonical_root) {
        return Err(ErrorKind::PathEscapesRoot);
    }

    Ok(candidate)
}

/// Walks `relative`'s path components, rejecting any `..` that would climb
/// above the root before the candidate is ever touched on disk.
fn escapes_root(relative: &str) -> bool {
    use std::path::Component;
    let mut depth: i32 = 0;
    for component in Path::new(relative).components() {
        match component {
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            Component::Normal(_) => depth += 1,
            _ => {}
        }
    }
    false
}

fn infer_content_type(path: &Path) -> &'static str {
    let extension = path.extension().and_then(|ext| ext.to_str());
    extension
        .and_then(|ext| {
            EXTENSION_TABLE
                .iter()
                .find(|(candidate, _)| *candidate == ext)
                .map(|(_, content_type)| *content_type)
        })
        .unwrap_or("text/plain")
}
