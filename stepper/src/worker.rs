use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    normalize::{normalize, Step},
    term::TermRef,
};

/// Background normalization of one term. The worker delivers the complete
/// step list within its budget or nothing at all; a cancelled or expired run
/// never surfaces a partial result. Cancellation is cooperative, checked
/// between steps.
pub struct NormalizationWorker {
    lineage: u64,
    cancel: Arc<AtomicBool>,
    receiver: Receiver<Vec<Step>>,
}

impl NormalizationWorker {
    /// Starts the run. `lineage` tags the result so a superseded run can be
    /// told apart from the one the caller is still interested in.
    pub fn spawn(term: TermRef, lineage: u64, budget: Duration) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();
        let flag = Arc::clone(&cancel);
        thread::spawn(move || {
            let deadline = Instant::now() + budget;
            let mut steps = Vec::new();
            for step in normalize(term) {
                if flag.load(Ordering::Relaxed) || Instant::now() >= deadline {
                    return;
                }
                steps.push(step);
            }
            // The receiver may be gone already; a dropped result is fine.
            sender.send(steps).ok();
        });
        NormalizationWorker {
            lineage,
            cancel,
            receiver,
        }
    }

    pub fn lineage(&self) -> u64 {
        self.lineage
    }

    /// The full step list, if the run already finished.
    pub fn try_take(&self) -> Option<Vec<Step>> {
        self.receiver.try_recv().ok()
    }

    /// Blocks up to `timeout` for the full step list.
    pub fn wait(&self, timeout: Duration) -> Option<Vec<Step>> {
        self.receiver.recv_timeout(timeout).ok()
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl Drop for NormalizationWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}
