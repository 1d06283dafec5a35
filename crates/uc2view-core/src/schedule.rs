//! Best-effort deferred work and one-shot timers for the ingest loop.
//!
//! The ingest loop is single-threaded. Work that must not stall frame
//! processing (histograms) is posted to an [`IdleQueue`] and its results are
//! collected later, when the host reports idle time.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

pub type Task<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// A queue of deferred tasks whose results are collected on idle.
pub trait IdleQueue<T> {
    /// Enqueue a task. Never runs it inline.
    fn post(&mut self, task: Task<T>);

    /// Collect finished results, spending at most roughly `budget` doing so.
    fn drain(&mut self, budget: Duration) -> Vec<T>;

    /// Forget all outstanding work; results of cancelled tasks are discarded.
    fn cancel_all(&mut self);

    /// Tasks posted since the last cancel whose results were not yet drained.
    fn pending(&self) -> usize;
}

// ---------------------------------------------------------------------------
// Same-thread queue
// ---------------------------------------------------------------------------

/// Runs tasks on the host thread, at the back of the run queue.
///
/// Weaker than [`PooledQueue`]: a task starts only when the host calls
/// [`IdleQueue::drain`], and once started it runs to completion on the
/// host thread even if that overruns the budget. At least one task runs per
/// drain so the queue always makes progress.
pub struct DeferredQueue<T> {
    tasks: VecDeque<Task<T>>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IdleQueue<T> for DeferredQueue<T> {
    fn post(&mut self, task: Task<T>) {
        self.tasks.push_back(task);
    }

    fn drain(&mut self, budget: Duration) -> Vec<T> {
        let start = Instant::now();
        let mut out = Vec::new();
        while let Some(task) = self.tasks.pop_front() {
            out.push(task());
            if start.elapsed() >= budget {
                break;
            }
        }
        out
    }

    fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    fn pending(&self) -> usize {
        self.tasks.len()
    }
}

// ---------------------------------------------------------------------------
// Thread-pool queue
// ---------------------------------------------------------------------------

/// Runs tasks on the rayon pool and hands results back over a channel.
pub struct PooledQueue<T> {
    tx: Sender<(u64, T)>,
    rx: Receiver<(u64, T)>,
    generation: u64,
    in_flight: usize,
}

impl<T: Send + 'static> PooledQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            generation: 0,
            in_flight: 0,
        }
    }

    /// Block until every pending task has reported or `timeout` expires.
    pub fn wait_all(&mut self, timeout: Duration) -> Vec<T> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok((generation, value)) => self.accept(generation, value, &mut out),
                Err(_) => break,
            }
        }
        out
    }

    fn accept(&mut self, generation: u64, value: T, out: &mut Vec<T>) {
        if generation == self.generation {
            self.in_flight = self.in_flight.saturating_sub(1);
            out.push(value);
        }
    }
}

impl<T: Send + 'static> Default for PooledQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> IdleQueue<T> for PooledQueue<T> {
    fn post(&mut self, task: Task<T>) {
        let tx = self.tx.clone();
        let generation = self.generation;
        self.in_flight += 1;
        rayon::spawn(move || {
            // The receiver is gone only after teardown.
            tx.send((generation, task())).ok();
        });
    }

    fn drain(&mut self, budget: Duration) -> Vec<T> {
        let start = Instant::now();
        let mut out = Vec::new();
        while let Ok((generation, value)) = self.rx.try_recv() {
            self.accept(generation, value, &mut out);
            if start.elapsed() >= budget {
                break;
            }
        }
        out
    }

    fn cancel_all(&mut self) {
        self.generation += 1;
        self.in_flight = 0;
    }

    fn pending(&self) -> usize {
        self.in_flight
    }
}

// ---------------------------------------------------------------------------
// One-shot timer
// ---------------------------------------------------------------------------

/// A cancellable one-shot deadline polled by the host loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedrawTimer {
    deadline: Option<Instant>,
}

impl RedrawTimer {
    /// (Re)arm to fire `delay` after `now`. Re-arming replaces the deadline.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_queue_never_runs_on_post() {
        let mut q: DeferredQueue<u32> = DeferredQueue::new();
        q.post(Box::new(|| 7));
        assert_eq!(q.pending(), 1);
        assert_eq!(q.drain(Duration::from_millis(10)), vec![7]);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn pooled_queue_discards_cancelled_results() {
        let mut q: PooledQueue<u32> = PooledQueue::new();
        q.post(Box::new(|| 1));
        q.cancel_all();
        q.post(Box::new(|| 2));
        assert_eq!(q.wait_all(Duration::from_secs(5)), vec![2]);
    }

    #[test]
    fn timer_fires_once() {
        let now = Instant::now();
        let mut t = RedrawTimer::default();
        t.arm(now, Duration::from_millis(10));
        assert!(!t.fire_if_due(now));
        assert!(t.fire_if_due(now + Duration::from_millis(10)));
        assert!(!t.fire_if_due(now + Duration::from_millis(20)));
    }
}
