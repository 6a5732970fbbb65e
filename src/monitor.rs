//! Signal-driven shutdown sequence: §4.7 of `SPEC_FULL.md`.
//!
//! Exactly one Monitor thread exists per process; it is the only thread that
//! installs signal handling, and the only thread that ever flips `running` or
//! calls `BoundedQueue::shutdown`. The Acceptor and Workers cooperate purely
//! by observing those two signals.

use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use socket2::Socket;
use tracing::{error, info, warn};

use crate::http::response::status_only_503;
use crate::queue::{BoundedQueue, CompletionLatch};

/// Overall budget for the whole shutdown sequence; the main thread gives up
/// waiting on [`CompletionLatch`] after this and exits non-zero.
pub(crate) const SHUTDOWN_BUDGET: Duration = Duration::from_secs(10);
/// Share of the budget allotted to joining workers, combined across all of
/// them (not per worker) — a worker that doesn't show up in time is
/// abandoned, not retried against a fresh deadline.
const JOIN_BUDGET: Duration = Duration::from_millis(9_000);

/// A spawned Worker thread plus the latch it signals when its loop exits,
/// used to join it with a deadline ([`std::thread::JoinHandle::join`] has no
/// timeout of its own).
pub(crate) struct WorkerHandle {
    pub(crate) join: JoinHandle<()>,
    pub(crate) latch: Arc<CompletionLatch>,
}

/// Runs the Monitor: blocks on the termination signals, then executes the
/// shutdown sequence exactly once and signals `shutdown_complete`.
pub(crate) fn run(
    listener: Socket,
    running: Arc<AtomicBool>,
    queue: Arc<BoundedQueue<TcpStream>>,
    workers: Vec<WorkerHandle>,
    shutdown_complete: Arc<CompletionLatch>,
) {
    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(signals) => signals,
        Err(e) => {
            error!(error = %e, "failed to register signal handlers");
            shutdown_complete.signal();
            return;
        }
    };

    // Blocks until SIGINT or SIGTERM arrives; any further signals during or
    // after the sequence below are ignored (§4.7's "exactly one invocation").
    if let Some(signal) = signals.forever().next() {
        info!(signal, "termination signal received, starting shutdown");
    }

    let clean = shutdown_sequence(listener, &running, &queue, workers);
    if clean {
        info!("shutdown complete");
    } else {
        warn!("shutdown completed uncleanly (a worker missed its join deadline)");
    }
    shutdown_complete.signal();
}

fn shutdown_sequence(
    listener: Socket,
    running: &Arc<AtomicBool>,
    queue: &Arc<BoundedQueue<TcpStream>>,
    workers: Vec<WorkerHandle>,
) -> bool {
    // Step 1: fail the Acceptor's blocked accept().
    if let Err(e) = listener.shutdown(Shutdown::Read) {
        warn!(error = %e, "failed to shut down listener read half");
    }

    // Step 2.
    running.store(false, Ordering::Release);

    // Step 3: wake every Worker blocked in pop().
    queue.shutdown();

    // Step 4: join workers against a shared deadline.
    let deadline = Instant::now() + JOIN_BUDGET;
    let mut clean = true;
    for worker in workers {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if worker.latch.wait_timeout(remaining) {
            if worker.join.join().is_err() {
                warn!("worker thread panicked");
                clean = false;
            }
        } else {
            warn!("worker missed its join deadline, abandoning its thread");
            clean = false;
            // Dropping the handle here detaches the thread rather than
            // blocking the shutdown sequence on it further.
        }
    }

    // Step 5: drain anything left in the queue with a synthesized 503.
    while let Some(mut stream) = queue.try_pop() {
        if let Err(e) = status_only_503(&mut stream) {
            warn!(error = %e, "failed to write drain-time 503");
        }
        let _ = stream.shutdown(Shutdown::Both);
    }

    // Step 6.
    if let Err(e) = listener.shutdown(Shutdown::Write) {
        warn!(error = %e, "failed to shut down listener write half");
    }
    drop(listener);

    clean
}
