//! Bind/listen/accept loop feeding the bounded queue: §4.6 of `SPEC_FULL.md`.

use std::io;
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, warn};

use crate::queue::BoundedQueue;

/// A bound, listening IPv4 stream socket, backed by `socket2` rather than
/// `std::net::TcpListener` so the Monitor can shut it down from another
/// thread (`TcpListener` exposes no `shutdown`).
pub(crate) struct Acceptor {
    socket: Socket,
    local_addr: SocketAddr,
}

impl Acceptor {
    pub(crate) fn bind(port: u16) -> io::Result<Acceptor> {
        let address: SocketAddr = ([0, 0, 0, 0], port).into();
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&address.into())?;
        socket.listen(10)?;
        let local_addr = socket
            .local_addr()?
            .as_socket()
            .expect("bound IPv4 socket has a socket address");
        Ok(Acceptor { socket, local_addr })
    }

    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Hands the Monitor a handle to the same underlying socket so it can
    /// call `shutdown` on it independently of the accept loop.
    pub(crate) fn try_clone(&self) -> io::Result<Socket> {
        self.socket.try_clone()
    }

    /// Runs the accept loop until `running` is cleared or `accept` fails for
    /// a reason other than the Monitor's shutdown. Connections are handed off
    /// to `queue`; a push that fails because the queue was shut down mid-flight
    /// simply drops the connection.
    pub(crate) fn run(&self, queue: &BoundedQueue<TcpStream>, running: &Arc<AtomicBool>) {
        while running.load(Ordering::Acquire) {
            match self.socket.accept() {
                Ok((conn, _addr)) => {
                    let stream: TcpStream = conn.into();
                    if queue.push(stream).is_err() {
                        debug!("queue shut down mid-flight, dropping accepted connection");
                    }
                }
                Err(e) => {
                    if !running.load(Ordering::Acquire) {
                        debug!("accept loop stopping: shutdown in progress");
                        break;
                    }
                    warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
