//! Wires Config, the bounded queue, the Acceptor, the Workers, and the
//! Monitor together and runs the server to completion: §6 of `SPEC_FULL.md`.

use std::net::TcpStream;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{error, info};

use crate::acceptor::Acceptor;
use crate::config::Config;
use crate::monitor::{self, WorkerHandle, SHUTDOWN_BUDGET};
use crate::queue::{BoundedQueue, CompletionLatch};
use crate::worker;

/// Fixed at 5 per `SPEC_FULL.md` §4 — not configurable at runtime.
const WORKER_COUNT: usize = 5;
/// Fixed at 25 per `SPEC_FULL.md` §4.1.
const QUEUE_CAPACITY: usize = 25;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("shutdown did not complete cleanly within the budget")]
    UncleanShutdown,
}

/// Builds and runs the server until a clean or unclean shutdown completes.
pub fn run(config: Config) -> Result<(), ServerError> {
    let acceptor = Acceptor::bind(config.port).map_err(|source| ServerError::Bind {
        port: config.port,
        source,
    })?;
    info!(addr = %acceptor.local_addr(), "listening");

    let monitor_socket = acceptor
        .try_clone()
        .map_err(|source| ServerError::Bind { port: config.port, source })?;

    let queue: Arc<BoundedQueue<TcpStream>> = Arc::new(BoundedQueue::new(QUEUE_CAPACITY));
    let running = Arc::new(AtomicBool::new(true));
    let server_root: Arc<std::path::Path> = Arc::from(config.server_root.as_path());

    let workers: Vec<WorkerHandle> = (0..WORKER_COUNT)
        .map(|id| {
            let queue = Arc::clone(&queue);
            let server_root = Arc::clone(&server_root);
            let latch = Arc::new(CompletionLatch::new());
            let latch_for_thread = Arc::clone(&latch);
            let join = thread::spawn(move || {
                worker::run(id, queue, server_root);
                latch_for_thread.signal();
            });
            WorkerHandle { join, latch }
        })
        .collect();

    let shutdown_complete = Arc::new(CompletionLatch::new());
    let monitor_handle = {
        let running = Arc::clone(&running);
        let queue = Arc::clone(&queue);
        let shutdown_complete = Arc::clone(&shutdown_complete);
        thread::spawn(move || {
            monitor::run(monitor_socket, running, queue, workers, shutdown_complete);
        })
    };

    let acceptor_handle = {
        let queue = Arc::clone(&queue);
        let running = Arc::clone(&running);
        thread::spawn(move || acceptor.run(&queue, &running))
    };

    // The main thread's only job from here on is waiting for the Monitor's
    // shutdown sequence, per §4.7 — it never touches the queue or signals.
    let clean = shutdown_complete.wait_timeout(SHUTDOWN_BUDGET);
    let _ = acceptor_handle.join();
    let _ = monitor_handle.join();

    if !clean {
        error!("main thread timed out waiting for shutdown to complete");
        return Err(ServerError::UncleanShutdown);
    }

    Ok(())
}
