//! Cancellable worker threads.
//!
//! A [`Worker`] runs a closure in a loop on its own OS thread until either
//! the cooperative stop flag is set or the closure resigns by returning
//! `false` (an argument mutator does this when its operation has been
//! deleted out from under it). The flag is only checked at the top of each
//! iteration, so stop latency is bounded by one in-flight iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(crate) struct Worker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a named worker. `body` runs repeatedly; returning `false`
    /// ends the loop early.
    pub(crate) fn spawn<F>(name: String, mut body: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || while !flag.load(Ordering::Relaxed) && body() {})
            .expect("failed to spawn worker thread");
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Request the worker to stop after its current iteration.
    pub(crate) fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Whether the thread has already exited (stopped or resigned).
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the thread to exit.
    pub(crate) fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Request stop and wait.
    pub(crate) fn stop_and_join(&mut self) {
        self.stop();
        self.join();
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_worker_runs_until_stopped() {
        let count = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&count);
        let mut w = Worker::spawn("test-counter".into(), move || {
            c.fetch_add(1, Ordering::Relaxed);
            true
        });
        while count.load(Ordering::Relaxed) < 10 {
            std::thread::yield_now();
        }
        w.stop_and_join();
        let at_stop = count.load(Ordering::Relaxed);
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(count.load(Ordering::Relaxed), at_stop, "ran after join");
    }

    #[test]
    fn test_worker_resigns_on_false() {
        let mut w = Worker::spawn("test-resign".into(), || false);
        w.join();
        assert!(w.is_finished());
    }

    #[test]
    fn test_drop_joins() {
        let count = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&count);
        {
            let _w = Worker::spawn("test-drop".into(), move || {
                c.fetch_add(1, Ordering::Relaxed);
                true
            });
        }
        let at_drop = count.load(Ordering::Relaxed);
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(count.load(Ordering::Relaxed), at_drop);
    }
}
