//! The bounded producer/consumer queue between the Acceptor and the Workers.
//!
//! This is the concurrency substrate `SPEC_FULL.md` §4.1 calls out as THE
//! hard part: a fixed-capacity FIFO, blocking producers while full and
//! consumers while empty, with a clean shutdown path that wakes every
//! blocked thread instead of leaving one parked forever.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

struct Inner<T> {
    items: VecDeque<T>,
    capacity: usize,
    shut_down: bool,
}

/// A bounded, thread-safe FIFO queue.
///
/// Synchronization is one [`Mutex`] guarding the deque plus two [`Condvar`]s:
/// `not_full` (signaled by consumers after a pop) and `not_empty` (signaled
/// by producers after a push). This gives the same correctness properties a
/// semaphore pair would (bounded blocking, no lost wakeups, FIFO order
/// matching push order) without needing a counting-semaphore primitive.
pub(crate) struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

/// Returned by [`BoundedQueue::push`] when the queue has already been shut
/// down and the item was not admitted.
#[derive(Debug)]
pub(crate) struct QueueShutDown;

impl<T> BoundedQueue<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded queue capacity must be positive");
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                capacity,
                shut_down: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Blocks until a free slot is available, then pushes `item`. Fails only
    /// once the queue has been shut down.
    pub(crate) fn push(&self, item: T) -> Result<(), QueueShutDown> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if guard.shut_down {
                return Err(QueueShutDown);
            }
            if guard.items.len() < guard.capacity {
                guard.items.push_back(item);
                self.not_empty.notify_one();
                return Ok(());
            }
            guard = self.not_full.wait(guard).unwrap();
        }
    }

    /// Blocks until an item is available or the queue is drained after
    /// shutdown, in which case `None` is returned. Items already queued at
    /// the time of shutdown are still delivered, in FIFO order, before the
    /// queue starts returning `None`.
    pub(crate) fn pop(&self) -> Option<T> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if let Some(item) = guard.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if guard.shut_down {
                return None;
            }
            guard = self.not_empty.wait(guard).unwrap();
        }
    }

    /// Non-blocking pop, used by the Monitor to drain whatever is left after
    /// shutdown without waiting on an empty queue.
    pub(crate) fn try_pop(&self) -> Option<T> {
        let mut guard = self.inner.lock().unwrap();
        let item = guard.items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Wakes every thread blocked in `push` or `pop`. Idempotent. After this
    /// call, `push` fails immediately and `pop` drains remaining items (FIFO)
    /// before returning `None`.
    pub(crate) fn shutdown(&self) {
        let mut guard = self.inner.lock().unwrap();
        guard.shut_down = true;
        drop(guard);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `Condvar`-backed latch that can be waited on with a deadline, used by
/// the Monitor to join workers with a bounded timeout and to signal shutdown
/// completion to the main thread. `std::thread::JoinHandle::join` has no
/// timeout of its own, so this plays that role instead.
pub(crate) struct CompletionLatch {
    state: Mutex<bool>,
    condvar: Condvar,
}

impl CompletionLatch {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    pub(crate) fn signal(&self) {
        let mut done = self.state.lock().unwrap();
        *done = true;
        self.condvar.notify_all();
    }

    /// Waits until `signal` is called or `timeout` elapses. Returns whether
    /// the latch was signaled.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut done = self.state.lock().unwrap();
        while !*done {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return *done;
            }
            let (guard, result) = self.condvar.wait_timeout(done, remaining).unwrap();
            done = guard;
            if result.timed_out() && !*done {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_order_is_preserved() {
        let q: BoundedQueue<i32> = BoundedQueue::new(25);
        for i in 0..10 {
            q.push(i).unwrap();
        }
        for i in 0..10 {
            assert_eq!(q.pop(), Some(i));
        }
    }

    #[test]
    fn push_blocks_while_full_and_unblocks_on_pop() {
        let q = Arc::new(BoundedQueue::new(2));
        q.push(1).unwrap();
        q.push(2).unwrap();

        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || {
            q2.push(3).unwrap();
        });

        // Give the pusher a chance to block; it must not have succeeded yet.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(q.len(), 2);

        assert_eq!(q.pop(), Some(1));
        handle.join().unwrap();
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn pop_blocks_while_empty_and_unblocks_on_push() {
        let q: Arc<BoundedQueue<i32>> = Arc::new(BoundedQueue::new(25));
        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || q2.pop());

        thread::sleep(Duration::from_millis(50));
        q.push(42).unwrap();

        assert_eq!(handle.join().unwrap(), Some(42));
    }

    #[test]
    fn shutdown_drains_then_returns_none() {
        let q: BoundedQueue<i32> = BoundedQueue::new(25);
        q.push(1).unwrap();
        q.push(2).unwrap();
        q.shutdown();

        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), None);
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn push_fails_fast_after_shutdown() {
        let q: BoundedQueue<i32> = BoundedQueue::new(25);
        q.shutdown();
        assert!(q.push(1).is_err());
    }

    #[test]
    fn shutdown_wakes_blocked_pop() {
        let q: Arc<BoundedQueue<i32>> = Arc::new(BoundedQueue::new(25));
        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || q2.pop());

        thread::sleep(Duration::from_millis(50));
        q.shutdown();

        assert_eq!(handle.join().unwrap(), None);
    }

    #[test]
    fn completion_latch_times_out_when_not_signaled() {
        let latch = CompletionLatch::new();
        assert!(!latch.wait_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn completion_latch_reports_signal() {
        let latch = Arc::new(CompletionLatch::new());
        let latch2 = Arc::clone(&latch);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            latch2.signal();
        });
        assert!(latch.wait_timeout(Duration::from_secs(2)));
    }
}
