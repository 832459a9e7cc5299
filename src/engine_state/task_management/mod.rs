//! # Task Management System
//!
//! This module provides the worker pool that runs chunk loading and meshing
//! off the main thread.
//!
//! ## Architecture Overview
//!
//! - `WorkerPool`: a fixed set of worker threads, one job slot each
//! - `Task`: a unit of work a worker can run
//! - `MeshJob`: the task the engine runs, loading and meshing one chunk
//!
//! ## Worker Lifecycle
//!
//! Each worker moves through `Idle -> Busy -> Done -> Idle`:
//! 1. The main thread fills an idle worker's slot and marks it busy
//! 2. The worker wakes, takes the job, releases the lock and runs it
//! 3. The worker stores the output and marks itself done
//! 4. The main thread takes the output and marks the worker idle
//!
//! A separate exit flag is honored only while a worker waits for a job, so a
//! running job always finishes before its worker stops.
//!
//! ## Synchronization
//! - Each slot is guarded by its own `Mutex` and `Condvar`; nothing else is
//!   shared between the main thread and a worker
//! - A poisoned slot is recovered on the main thread, so one panicking job
//!   does not stop scheduling on the other workers

pub mod task;

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use crate::error::EngineError;
use task::Task;

/// Where a worker is in its job cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for a job.
    Idle,
    /// Running a job.
    Busy,
    /// Holding a finished job's output.
    Done,
}

struct Slot<T: Task> {
    state: WorkerState,
    exit: bool,
    job: Option<T>,
    output: Option<T::Output>,
}

struct Shared<T: Task> {
    slot: Mutex<Slot<T>>,
    wake: Condvar,
}

impl<T: Task> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Worker<T: Task> {
    shared: Arc<Shared<T>>,
    handle: Option<JoinHandle<()>>,
}

/// A fixed pool of worker threads, each holding at most one job.
pub struct WorkerPool<T: Task> {
    workers: Vec<Worker<T>>,
}

impl<T: Task> WorkerPool<T> {
    /// Starts `count` workers sharing `context`.
    ///
    /// # Arguments
    /// * `count` - Number of worker threads; at least one is started
    /// * `context` - Read-only state passed to every task
    ///
    /// # Returns
    /// The pool, or [`EngineError::WorkerSpawn`] when a thread could not be
    /// started. Workers started before the failure are stopped again.
    pub fn new(count: usize, context: Arc<T::Context>) -> Result<Self, EngineError> {
        let count = count.max(1);
        let mut pool = Self {
            workers: Vec::with_capacity(count),
        };
        for index in 0..count {
            let shared = Arc::new(Shared {
                slot: Mutex::new(Slot {
                    state: WorkerState::Idle,
                    exit: false,
                    job: None,
                    output: None,
                }),
                wake: Condvar::new(),
            });
            let worker_shared = Arc::clone(&shared);
            let worker_context = Arc::clone(&context);
            let handle = thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(move || run_worker(index, &worker_shared, &*worker_context))
                .map_err(EngineError::WorkerSpawn)?;
            info!("Spawned worker {}", index);
            pool.workers.push(Worker {
                shared,
                handle: Some(handle),
            });
        }
        Ok(pool)
    }

    /// Number of workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Current state of worker `index`.
    pub fn state(&self, index: usize) -> Option<WorkerState> {
        self.workers
            .get(index)
            .map(|worker| worker.shared.lock().state)
    }

    /// Indices of every idle worker.
    pub fn idle_workers(&self) -> Vec<usize> {
        (0..self.workers.len())
            .filter(|&index| self.state(index) == Some(WorkerState::Idle))
            .collect()
    }

    /// Whether no worker is busy or holding output.
    pub fn is_quiet(&self) -> bool {
        self.idle_workers().len() == self.workers.len()
    }

    /// Hands `job` to worker `index` and wakes it.
    ///
    /// # Returns
    /// The job back when the worker is not idle or does not exist.
    pub fn submit(&self, index: usize, job: T) -> Result<(), T> {
        let Some(worker) = self.workers.get(index) else {
            return Err(job);
        };
        let mut slot = worker.shared.lock();
        if slot.state != WorkerState::Idle || slot.exit {
            return Err(job);
        }
        slot.job = Some(job);
        slot.state = WorkerState::Busy;
        worker.shared.wake.notify_one();
        Ok(())
    }

    /// Takes the output of worker `index` if it is done, making it idle again.
    pub fn collect(&self, index: usize) -> Option<T::Output> {
        let worker = self.workers.get(index)?;
        let mut slot = worker.shared.lock();
        if slot.state != WorkerState::Done {
            return None;
        }
        slot.state = WorkerState::Idle;
        let output = slot.output.take();
        if output.is_none() {
            warn!("Worker {} finished without output", index);
        }
        output
    }

    /// Takes every finished output, in worker order.
    pub fn collect_finished(&self) -> Vec<(usize, T::Output)> {
        (0..self.workers.len())
            .filter_map(|index| self.collect(index).map(|output| (index, output)))
            .collect()
    }

    /// Asks every worker to stop and waits for them.
    ///
    /// Running jobs finish first; their output is discarded.
    pub fn shutdown(&mut self) {
        for worker in &self.workers {
            worker.shared.lock().exit = true;
            worker.shared.wake.notify_all();
        }
        for (index, worker) in self.workers.iter_mut().enumerate() {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    warn!("Worker {} panicked", index);
                }
            }
        }
    }
}

impl<T: Task> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<T: Task>(index: usize, shared: &Shared<T>, context: &T::Context) {
    loop {
        let job = {
            let mut slot = shared.lock();
            while slot.state != WorkerState::Busy {
                if slot.exit {
                    info!("Worker {} exiting", index);
                    return;
                }
                slot = shared
                    .wake
                    .wait(slot)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            slot.job.take()
        };

        let output = job.map(|job| job.process(context));
        debug!("Worker {} finished a job", index);

        let mut slot = shared.lock();
        slot.output = output;
        slot.state = WorkerState::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    struct Double(u32);

    impl Task for Double {
        type Context = AtomicUsize;
        type Output = u32;

        fn process(self, runs: &AtomicUsize) -> u32 {
            runs.fetch_add(1, Ordering::SeqCst);
            self.0 * 2
        }
    }

    fn wait_for<T: Task>(pool: &WorkerPool<T>, index: usize) -> Option<T::Output> {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if let Some(output) = pool.collect(index) {
                return Some(output);
            }
            thread::sleep(Duration::from_millis(1));
        }
        None
    }

    #[test]
    fn jobs_round_trip_through_a_worker() {
        let runs = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::<Double>::new(2, runs.clone()).unwrap();
        assert_eq!(pool.worker_count(), 2);
        assert!(pool.submit(1, Double(21)).is_ok());
        assert_eq!(wait_for(&pool, 1), Some(42));
        assert_eq!(pool.state(1), Some(WorkerState::Idle));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn busy_workers_refuse_jobs() {
        let pool = WorkerPool::<Double>::new(1, Arc::new(AtomicUsize::new(0))).unwrap();
        assert!(pool.submit(0, Double(1)).is_ok());
        assert!(matches!(pool.submit(0, Double(2)), Err(Double(2))));
        assert_eq!(wait_for(&pool, 0), Some(2));
        assert!(pool.submit(0, Double(3)).is_ok());
        assert_eq!(wait_for(&pool, 0), Some(6));
    }

    #[test]
    fn missing_workers_refuse_jobs() {
        let pool = WorkerPool::<Double>::new(1, Arc::new(AtomicUsize::new(0))).unwrap();
        assert!(pool.submit(3, Double(1)).is_err());
        assert_eq!(pool.state(3), None);
    }

    #[test]
    fn zero_workers_means_one() {
        let pool = WorkerPool::<Double>::new(0, Arc::new(AtomicUsize::new(0))).unwrap();
        assert_eq!(pool.worker_count(), 1);
        assert!(pool.is_quiet());
    }

    #[test]
    fn shutdown_stops_idle_workers() {
        let mut pool = WorkerPool::<Double>::new(3, Arc::new(AtomicUsize::new(0))).unwrap();
        pool.shutdown();
        assert!(pool.workers.iter().all(|w| w.handle.is_none()));
        assert!(pool.submit(0, Double(1)).is_err());
    }
}
