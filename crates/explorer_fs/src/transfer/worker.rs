//! Background transfers
//!
//! Runs one batch per thread and streams per-item outcomes back over a
//! channel. Two batches may not target the same destination at once.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::{BatchKind, BatchReport, ConflictResolver, ItemOutcome, TransferEngine, TransferMode};
use crate::error::{TransferError, TransferResult};
use crate::location::{normalize, Location};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferJob {
    Copy { sources: Vec<PathBuf>, destination: Location },
    Move { sources: Vec<PathBuf>, destination: Location },
    Delete { targets: Vec<PathBuf> },
}

impl TransferJob {
    pub fn kind(&self) -> BatchKind {
        match self {
            TransferJob::Copy { .. } => BatchKind::Copy,
            TransferJob::Move { .. } => BatchKind::Move,
            TransferJob::Delete { .. } => BatchKind::Delete,
        }
    }

    fn destination(&self) -> Option<PathBuf> {
        match self {
            TransferJob::Copy { destination, .. } | TransferJob::Move { destination, .. } => {
                destination.path().map(normalize)
            }
            TransferJob::Delete { .. } => None,
        }
    }
}

type BusySet = Arc<Mutex<HashSet<PathBuf>>>;

/// Releases a destination when the batch thread ends, even by panic.
struct BusyGuard {
    busy: BusySet,
    destination: Option<PathBuf>,
}

impl BusyGuard {
    fn claim(busy: &BusySet, destination: Option<PathBuf>) -> TransferResult<Self> {
        if let Some(dest) = &destination {
            if !busy.lock().insert(dest.clone()) {
                return Err(TransferError::DestinationBusy(dest.clone()));
            }
        }
        Ok(Self {
            busy: busy.clone(),
            destination,
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(dest) = &self.destination {
            self.busy.lock().remove(dest);
        }
    }
}

/// Spawns transfer batches on their own threads.
#[derive(Debug, Clone)]
pub struct TransferWorker {
    engine: TransferEngine,
    busy: BusySet,
}

impl TransferWorker {
    pub fn new(engine: TransferEngine) -> Self {
        Self {
            engine,
            busy: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn is_busy(&self, destination: &Path) -> bool {
        self.busy.lock().contains(&normalize(destination))
    }

    /// Starts `job` in the background. Fails with `DestinationBusy` if
    /// another batch is still writing into the same folder.
    pub fn start(
        &self,
        job: TransferJob,
        mut resolver: Box<dyn ConflictResolver + Send>,
    ) -> TransferResult<BatchHandle> {
        let kind = job.kind();
        let guard = BusyGuard::claim(&self.busy, job.destination())?;
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        let engine = self.engine.clone();
        let thread_cancel = cancel.clone();
        let thread = std::thread::Builder::new()
            .name("Transfer Worker".to_string())
            .spawn(move || {
                let _guard = guard;
                let mut send = |item: &ItemOutcome| {
                    // Receiver gone means nobody is listening any more; keep going.
                    let _ = tx.send(item.clone());
                };
                match job {
                    TransferJob::Copy { sources, destination } => {
                        engine.run_transfer(TransferMode::Copy, &sources, &destination, resolver.as_mut(), &thread_cancel, &mut send);
                    }
                    TransferJob::Move { sources, destination } => {
                        engine.run_transfer(TransferMode::Move, &sources, &destination, resolver.as_mut(), &thread_cancel, &mut send);
                    }
                    TransferJob::Delete { targets } => {
                        engine.run_delete(&targets, &thread_cancel, &mut send);
                    }
                }
            })
            .map_err(|e| TransferError::from_io(Path::new("Transfer Worker"), &e))?;

        Ok(BatchHandle {
            kind,
            outcomes: rx,
            cancel,
            thread: Some(thread),
        })
    }
}

/// A running batch.
pub struct BatchHandle {
    kind: BatchKind,
    outcomes: Receiver<ItemOutcome>,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl BatchHandle {
    /// Stops the batch before its next item. The item in progress finishes.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Next outcome, blocking. `None` once the batch is done.
    pub fn recv(&self) -> Option<ItemOutcome> {
        self.outcomes.recv().ok()
    }

    /// Next outcome if one is ready.
    pub fn try_recv(&self) -> Option<ItemOutcome> {
        match self.outcomes.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Blocks until the batch ends and returns every outcome not yet received.
    pub fn wait(mut self) -> BatchReport {
        let items: Vec<ItemOutcome> = self.outcomes.iter().collect();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Transfer worker panicked after {} items", items.len());
            }
        }
        BatchReport::new(self.kind, items)
    }
}
