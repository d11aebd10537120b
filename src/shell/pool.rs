//! Command worker threads of one shell instance
//!
//! Each shell instance owns a primary worker and a stack of alternate
//! workers. A request runs on the primary when it is idle; a request issued
//! while the primary is busy (usually a command dispatching another
//! command) runs on the most recently used idle alternate.
//!
//! Running a job is Start/Wait/Stop: the job is sent to the worker, the
//! caller blocks on the reply channel, and the command's cancellation token
//! is tracked while it runs. A cancelled job that does not return within the
//! grace period is abandoned: its worker is replaced so the shell stays
//! usable, and the old thread exits on its own once the job finally ends.

use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{DispatchConfig, ExhaustionPolicy};
use crate::error::{Error, Result};
use crate::models::ShellType;
use crate::shell::outcome::{DispatchOutcome, HandlerFault};

type JobFn = Box<dyn FnOnce() -> DispatchOutcome + Send + 'static>;

/// Work item sent to a worker thread
struct Task {
    label: String,
    job: JobFn,
    reply: mpsc::Sender<DispatchOutcome>,
}

/// Which slot of the pool a worker occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSlot {
    Primary,
    Alternate,
}

struct Worker {
    id: usize,
    name: String,
    task_tx: mpsc::Sender<Task>,
    busy: Arc<AtomicBool>,
}

impl Worker {
    fn spawn(shell_type: ShellType, id: usize) -> Result<Self> {
        let name = format!("{}-cmd-{}", shell_type, id);
        let (task_tx, task_rx) = mpsc::channel::<Task>();
        let busy = Arc::new(AtomicBool::new(false));
        let thread_busy = busy.clone();

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let Task { label, job, reply } = task;
                    let outcome = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(
                        |payload| DispatchOutcome::Faulted(HandlerFault::from_panic(&*payload, &label)),
                    );
                    // Idle before replying, so the caller can reuse this worker at once
                    thread_busy.store(false, Ordering::SeqCst);
                    if reply.send(outcome).is_err() {
                        debug!("Reply for '{}' dropped, caller stopped waiting", label);
                    }
                }
                trace!("Command worker exiting");
            })
            .map_err(|e| Error::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;

        debug!("Spawned command worker {}", name);
        Ok(Self {
            id,
            name,
            task_tx,
            busy,
        })
    }

    fn try_claim(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn lease(&self, slot: WorkerSlot) -> Lease {
        Lease {
            id: self.id,
            name: self.name.clone(),
            slot,
            task_tx: self.task_tx.clone(),
            busy: self.busy.clone(),
        }
    }
}

/// A claimed worker, handed out for one job
struct Lease {
    id: usize,
    name: String,
    slot: WorkerSlot,
    task_tx: mpsc::Sender<Task>,
    busy: Arc<AtomicBool>,
}

/// Primary and alternate workers of one shell instance
pub struct ExecutionPool {
    shell_type: ShellType,
    config: DispatchConfig,
    primary: Mutex<Worker>,
    /// Most recently used alternate last
    alternates: Mutex<Vec<Worker>>,
    /// Tokens of running commands, keyed by ticket
    active: Mutex<Vec<(usize, CancellationToken)>>,
    next_id: AtomicUsize,
    next_ticket: AtomicUsize,
}

impl ExecutionPool {
    /// Spawn the primary worker plus the configured initial alternates
    pub fn new(shell_type: ShellType, config: DispatchConfig) -> Result<Self> {
        let primary = Worker::spawn(shell_type, 0)?;
        let mut alternates = Vec::with_capacity(config.alternate_threads);
        for id in 1..=config.alternate_threads {
            alternates.push(Worker::spawn(shell_type, id)?);
        }

        Ok(Self {
            shell_type,
            primary: Mutex::new(primary),
            alternates: Mutex::new(alternates),
            active: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(config.alternate_threads + 1),
            next_ticket: AtomicUsize::new(0),
            config,
        })
    }

    /// Run `job` on a worker and block until it finishes
    ///
    /// `token` is the command's cancellation token; once it is cancelled the
    /// job has the configured grace period to return before its worker is
    /// abandoned and the call returns [`DispatchOutcome::Cancelled`].
    pub fn run<F>(&self, label: &str, token: CancellationToken, job: F) -> Result<DispatchOutcome>
    where
        F: FnOnce() -> DispatchOutcome + Send + 'static,
    {
        let lease = self.acquire()?;
        debug!("Running '{}' on {} ({:?})", label, lease.name, lease.slot);

        // Start
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        self.active.lock().push((ticket, token.clone()));
        let (reply_tx, reply_rx) = mpsc::channel();
        let task = Task {
            label: label.to_string(),
            job: Box::new(job),
            reply: reply_tx,
        };
        if lease.task_tx.send(task).is_err() {
            self.active.lock().retain(|(active, _)| *active != ticket);
            lease.busy.store(false, Ordering::SeqCst);
            self.replace(&lease);
            return Err(Error::ThreadSpawnFailed {
                reason: format!("worker {} is gone", lease.name),
            });
        }

        // Wait
        let outcome = self.wait(&lease, &token, &reply_rx);

        // Stop
        self.active.lock().retain(|(active, _)| *active != ticket);
        Ok(outcome)
    }

    fn wait(
        &self,
        lease: &Lease,
        token: &CancellationToken,
        reply_rx: &mpsc::Receiver<DispatchOutcome>,
    ) -> DispatchOutcome {
        let poll = Duration::from_millis(self.config.wait_poll_ms.max(1));
        let grace = Duration::from_millis(self.config.cancel_grace_ms);
        let mut cancelled_at: Option<Instant> = None;

        loop {
            match reply_rx.recv_timeout(poll) {
                Ok(outcome) => return outcome,
                Err(RecvTimeoutError::Timeout) => {
                    if !token.is_cancelled() {
                        continue;
                    }
                    let since = *cancelled_at.get_or_insert_with(Instant::now);
                    if since.elapsed() >= grace {
                        warn!(
                            "Command worker {} ignored cancellation for {:?}, abandoning it",
                            lease.name, grace
                        );
                        self.replace(lease);
                        return DispatchOutcome::Cancelled;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    error!("Command worker {} exited without a reply", lease.name);
                    self.replace(lease);
                    return DispatchOutcome::Cancelled;
                }
            }
        }
    }

    fn acquire(&self) -> Result<Lease> {
        {
            let primary = self.primary.lock();
            if primary.try_claim() {
                return Ok(primary.lease(WorkerSlot::Primary));
            }
        }

        let mut alternates = self.alternates.lock();
        if let Some(index) = alternates.iter().rposition(|worker| worker.try_claim()) {
            let worker = alternates.remove(index);
            let lease = worker.lease(WorkerSlot::Alternate);
            alternates.push(worker);
            return Ok(lease);
        }

        let can_grow = self.config.exhaustion_policy == ExhaustionPolicy::Grow
            && alternates.len() < self.config.max_alternate_threads;
        if !can_grow {
            return Err(Error::NoThreadAvailable {
                shell_type: self.shell_type.to_string(),
            });
        }

        let worker = Worker::spawn(self.shell_type, self.next_id.fetch_add(1, Ordering::SeqCst))?;
        worker.busy.store(true, Ordering::SeqCst);
        let lease = worker.lease(WorkerSlot::Alternate);
        alternates.push(worker);
        Ok(lease)
    }

    /// Swap a leased worker for a fresh one
    ///
    /// The old thread keeps running its job; dropping its sender makes it
    /// exit as soon as the job returns.
    fn replace(&self, lease: &Lease) {
        let fresh = match Worker::spawn(self.shell_type, self.next_id.fetch_add(1, Ordering::SeqCst)) {
            Ok(worker) => worker,
            Err(e) => {
                error!("Could not replace command worker {}: {}", lease.name, e);
                return;
            }
        };

        match lease.slot {
            WorkerSlot::Primary => {
                let mut primary = self.primary.lock();
                if primary.id == lease.id {
                    *primary = fresh;
                }
            }
            WorkerSlot::Alternate => {
                let mut alternates = self.alternates.lock();
                if let Some(worker) = alternates.iter_mut().find(|worker| worker.id == lease.id) {
                    *worker = fresh;
                }
            }
        }
    }

    /// Cancel every command currently running in this pool
    pub fn cancel_active(&self) -> usize {
        let active = self.active.lock();
        for (_, token) in active.iter() {
            token.cancel();
        }
        active.len()
    }

    /// Number of commands currently running
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    /// Whether the primary worker is running a command
    pub fn is_primary_busy(&self) -> bool {
        self.primary.lock().is_busy()
    }

    /// Thread name of the primary worker
    pub fn primary_name(&self) -> String {
        self.primary.lock().name.clone()
    }

    /// Number of alternate workers, idle or busy
    pub fn alternate_count(&self) -> usize {
        self.alternates.lock().len()
    }

    pub fn shell_type(&self) -> ShellType {
        self.shell_type
    }
}

impl std::fmt::Debug for ExecutionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionPool")
            .field("shell_type", &self.shell_type)
            .field("primary", &self.primary_name())
            .field("alternates", &self.alternate_count())
            .field("active", &self.active_count())
            .finish()
    }
}
