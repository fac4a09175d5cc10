use std::{collections::BTreeSet, time::Duration};

use crate::{
    path::Path,
    reduce::{is_normal_form, normal_order_redex, reduce_at_traced, ReduceError},
    term::TermRef,
    worker::NormalizationWorker,
};

/// One entry of the reduction history: a term plus how it was produced.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TermInfo {
    pub term: TermRef,
    /// Redex address reduced to obtain `term`; `None` for the initial entry.
    pub target: Option<Path>,
    /// Addresses in `term` touched by the substitution.
    pub touched: BTreeSet<Path>,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Mode {
    Idle,
    SteppingManually,
    AutoRunning,
}

/// Drives reductions over one starting term. Keeps the full history, and
/// during an auto-run races a background worker against the foreground
/// stepping loop: whichever finishes the remaining steps first wins, and a
/// superseded run's results are discarded by lineage.
pub struct Session {
    history: Vec<TermInfo>,
    mode: Mode,
    run_counter: u64,
    auto_base: usize,
    worker: Option<NormalizationWorker>,
}

impl Session {
    pub fn new(term: TermRef) -> Self {
        Session {
            history: vec![TermInfo {
                term,
                target: None,
                touched: BTreeSet::new(),
            }],
            mode: Mode::Idle,
            run_counter: 0,
            auto_base: 0,
            worker: None,
        }
    }

    pub fn current(&self) -> &TermInfo {
        self.history.last().expect("history is never empty")
    }

    pub fn history(&self) -> &[TermInfo] {
        &self.history
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_normal(&self) -> bool {
        is_normal_form(&self.current().term)
    }

    /// One manual normal-order step. `Ok(false)` when already in normal
    /// form.
    pub fn step(&mut self) -> Result<bool, ReduceError> {
        match normal_order_redex(&self.current().term) {
            None => {
                self.mode = Mode::Idle;
                Ok(false)
            }
            Some(target) => {
                self.reduce_at(&target)?;
                Ok(true)
            }
        }
    }

    /// Manual reduction at a caller-chosen address. Supersedes any running
    /// auto-run: its worker is cancelled and its lineage invalidated.
    pub fn reduce_at(&mut self, target: &Path) -> Result<&TermInfo, ReduceError> {
        let (term, touched) = reduce_at_traced(&self.current().term, target)?;
        self.invalidate_auto();
        self.mode = Mode::SteppingManually;
        self.history.push(TermInfo {
            term,
            target: Some(target.clone()),
            touched,
        });
        Ok(self.current())
    }

    /// Starts an auto-run: a background worker attempts the whole remaining
    /// sequence while the foreground ticks one step at a time. A no-op when
    /// the term is already normal.
    pub fn start_auto(&mut self, budget: Duration) {
        if self.is_normal() {
            self.mode = Mode::Idle;
            return;
        }
        self.invalidate_auto();
        self.auto_base = self.history.len();
        self.worker = Some(NormalizationWorker::spawn(
            self.current().term.clone(),
            self.run_counter,
            budget,
        ));
        self.mode = Mode::AutoRunning;
    }

    /// One scheduler tick of an auto-run: splices the worker's result in
    /// wholesale if it arrived for the current lineage, otherwise performs a
    /// single synchronous step. Returns `false` once the run is over.
    pub fn tick(&mut self) -> bool {
        if self.mode != Mode::AutoRunning {
            return false;
        }
        if let Some(worker) = &self.worker {
            if let Some(steps) = worker.try_take() {
                let stale = worker.lineage() != self.run_counter;
                self.worker = None;
                if !stale {
                    // Skip the steps the foreground already performed; both
                    // sides follow the same deterministic strategy.
                    let done = self.history.len() - self.auto_base;
                    for step in steps.into_iter().skip(done) {
                        self.history.push(TermInfo {
                            term: step.term,
                            target: Some(step.target),
                            touched: step.touched,
                        });
                    }
                    self.mode = Mode::Idle;
                    return false;
                }
            }
        }
        match normal_order_redex(&self.current().term) {
            None => {
                self.invalidate_auto();
                self.mode = Mode::Idle;
                false
            }
            Some(target) => {
                let (term, touched) = reduce_at_traced(&self.current().term, &target)
                    .expect("normal_order_redex returned a non-redex address");
                self.history.push(TermInfo {
                    term,
                    target: Some(target),
                    touched,
                });
                true
            }
        }
    }

    /// User cancellation: back to `Idle`; the worker's in-flight result is
    /// discarded unconditionally.
    pub fn cancel(&mut self) {
        self.invalidate_auto();
        self.mode = Mode::Idle;
    }

    /// Drops back to the starting term, forgetting the history.
    pub fn reset(&mut self) {
        self.invalidate_auto();
        self.history.truncate(1);
        self.mode = Mode::Idle;
    }

    fn invalidate_auto(&mut self) {
        self.run_counter += 1;
        // Dropping the handle raises the cooperative cancel flag.
        self.worker = None;
    }
}
