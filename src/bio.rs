//! Buffered, partial-failure-tolerant socket I/O.
//!
//! Grounded on `examples/original_source/src/rio.c`: a fill-once/drain-many
//! buffered reader, a retry-on-`EINTR` writer, and a zero-copy file transfer
//! built on `sendfile(2)`.

use std::fs::File;
use std::io::{self, ErrorKind as IoErrorKind, Read, Write};
use std::net::TcpStream;
use std::os::fd::AsRawFd;

const BUFFER_SIZE: usize = 8192;
const MAX_WRITE_RETRIES: u32 = 5;

/// A buffered reader over a single `TcpStream`. Never shared across threads
/// or descriptors; owned exclusively by the Worker serving that connection.
pub(crate) struct BufReader<'a> {
    stream: &'a TcpStream,
    buf: [u8; BUFFER_SIZE],
    pos: usize,
    filled: usize,
}

impl<'a> BufReader<'a> {
    pub(crate) fn new(stream: &'a TcpStream) -> Self {
        Self {
            stream,
            buf: [0; BUFFER_SIZE],
            pos: 0,
            filled: 0,
        }
    }

    fn fill_if_empty(&mut self) -> io::Result<usize> {
        if self.pos == self.filled {
            self.pos = 0;
            self.filled = self.stream.read(&mut self.buf)?;
        }
        Ok(self.filled - self.pos)
    }

    /// Reads bytes up to and including the first `\n`, capped at `max`.
    /// Returns the bytes read; empty on EOF with nothing read. Reaching
    /// `max` without a newline returns exactly `max` bytes (truncated line,
    /// not an error).
    pub(crate) fn read_line(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let mut line = Vec::with_capacity(max.min(256));
        while line.len() < max {
            let available = self.fill_if_empty()?;
            if available == 0 {
                break; // EOF
            }
            let chunk = &self.buf[self.pos..self.filled];
            let want = max - line.len();
            let take = chunk.len().min(want);

            if let Some(nl) = chunk[..take].iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&chunk[..=nl]);
                self.pos += nl + 1;
                return Ok(line);
            }

            line.extend_from_slice(&chunk[..take]);
            self.pos += take;
        }
        Ok(line)
    }
}

/// Writes exactly `buf.len()` bytes to `stream`, retrying short writes and
/// retrying up to [`MAX_WRITE_RETRIES`] times on `ErrorKind::Interrupted`.
pub(crate) fn write_n(stream: &mut TcpStream, buf: &[u8]) -> io::Result<()> {
    let mut written = 0;
    let mut retries = 0;
    while written < buf.len() {
        match stream.write(&buf[written..]) {
            Ok(n) => written += n,
            Err(e) if e.kind() == IoErrorKind::Interrupted => {
                retries += 1;
                if retries > MAX_WRITE_RETRIES {
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Transfers exactly `len` bytes from `file` (at its current position) to
/// `stream` using the kernel's zero-copy `sendfile(2)` where available,
/// falling back to a buffered read/write loop otherwise. Same retry
/// discipline as [`write_n`].
pub(crate) fn write_from_file(stream: &mut TcpStream, file: &File, len: u64) -> io::Result<()> {
    #[cfg(target_os = "linux")]
    {
        sendfile_linux(stream, file, len)
    }
    #[cfg(not(target_os = "linux"))]
    {
        copy_via_userspace(stream, file, len)
    }
}

#[cfg(target_os = "linux")]
fn sendfile_linux(stream: &mut TcpStream, file: &File, len: u64) -> io::Result<()> {
    let out_fd = stream.as_raw_fd();
    let in_fd = file.as_raw_fd();
    let mut remaining = len;
    let mut retries = 0;

    while remaining > 0 {
        let n = unsafe { libc::sendfile(out_fd, in_fd, std::ptr::null_mut(), remaining as usize) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == IoErrorKind::Interrupted {
                retries += 1;
                if retries > MAX_WRITE_RETRIES {
                    return Err(err);
                }
                continue;
            }
            if err.raw_os_error() == Some(libc::EINVAL) || err.raw_os_error() == Some(libc::ENOSYS)
            {
                return copy_via_userspace(stream, file, remaining);
            }
            return Err(err);
        }
        remaining -= n as u64;
    }
    Ok(())
}

fn copy_via_userspace(stream: &mut TcpStream, mut file: &File, mut remaining: u64) -> io::Result<()> {
    let mut buf = [0u8; BUFFER_SIZE];
    while remaining > 0 {
        let want = (buf.len() as u64).min(remaining) as usize;
        let n = file.read(&mut buf[..want])?;
        if n == 0 {
            return Err(io::Error::new(
                IoErrorKind::UnexpectedEof,
                "file truncated during transfer",
            ));
        }
        write_n(stream, &buf[..n])?;
        remaining -= n as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || TcpStream::connect(addr).unwrap());
        let (server, _) = listener.accept().unwrap();
        (server, client.join().unwrap())
    }

    #[test]
    fn read_line_stops_at_newline() {
        let (mut server, mut client) = loopback_pair();
        thread::spawn(move || {
            client.write_all(b"GET / HTTP/1.0\r\nrest").unwrap();
        });
        let mut reader = BufReader::new(&server);
        let line = reader.read_line(200).unwrap();
        assert_eq!(line, b"GET / HTTP/1.0\r\n");
        let _ = &mut server;
    }

    #[test]
    fn read_line_truncates_at_max_without_newline() {
        let (server, mut client) = loopback_pair();
        thread::spawn(move || {
            client.write_all(&[b'a'; 50]).unwrap();
            thread::sleep(std::time::Duration::from_millis(20));
        });
        let mut reader = BufReader::new(&server);
        let line = reader.read_line(10).unwrap();
        assert_eq!(line.len(), 10);
        assert!(line.iter().all(|&b| b == b'a'));
    }

    #[test]
    fn read_line_empty_on_immediate_eof() {
        let (server, client) = loopback_pair();
        drop(client);
        let mut reader = BufReader::new(&server);
        let line = reader.read_line(100).unwrap();
        assert!(line.is_empty());
    }

    #[test]
    fn write_n_sends_full_buffer() {
        let (mut server, mut client) = loopback_pair();
        let payload = vec![7u8; 20_000];
        let payload2 = payload.clone();
        let reader = thread::spawn(move || {
            let mut got = Vec::new();
            client.read_to_end(&mut got).unwrap();
            got
        });
        write_n(&mut server, &payload).unwrap();
        drop(server);
        assert_eq!(reader.join().unwrap(), payload2);
    }
}
