//! Per-thread dequeue/parse/respond/close loop: §4.5 of `SPEC_FULL.md`.

use std::net::{Shutdown, TcpStream};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::bio::BufReader;
use crate::http::request::{parse_request_line, MAX_REQUEST_LINE_LEN};
use crate::http::response::Response;
use crate::queue::BoundedQueue;

/// Runs the worker loop until the queue is shut down and drained. Called on
/// its own `std::thread`; returns once there is no more work and no more will
/// arrive.
pub(crate) fn run(id: usize, queue: Arc<BoundedQueue<TcpStream>>, server_root: Arc<Path>) {
    debug!(worker = id, "starting");
    while let Some(stream) = queue.pop() {
        serve(stream, &server_root);
    }
    debug!(worker = id, "queue shut down, exiting");
}

fn serve(mut stream: TcpStream, server_root: &Path) {
    let line = {
        let mut reader = BufReader::new(&stream);
        match reader.read_line(MAX_REQUEST_LINE_LEN) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "read failed before a request line was received");
                return;
            }
        }
    };

    if line.is_empty() {
        return; // client closed without sending anything
    }

    // A request line the parser can't even tokenize carries no usable
    // version information at all; per SPEC_FULL.md §4.4 step 7's narrow
    // exception, such a connection is simply closed without a response,
    // rather than upgraded to a synthesized status line.
    let request = match parse_request_line(&line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed request line, closing without a response");
            return;
        }
    };

    let response = Response::build(&request, server_root);

    if let Err(e) = stream.shutdown(Shutdown::Read) {
        warn!(error = %e, "failed to shut down read half before responding");
    }

    if let Err(e) = response.write_to(&mut stream) {
        warn!(error = %e, status = ?response.status(), "write failed, aborting response");
    }

    let _ = stream.shutdown(Shutdown::Write);
}
