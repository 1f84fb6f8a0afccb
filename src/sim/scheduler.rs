//! Cooperative timer queue
//!
//! Periodic gameplay tasks (survival ticker, spawn bursts, sweeps) live here
//! instead of in host timers. The clock only moves when the session advances
//! it, so pausing is simply not advancing. Every task remembers the epoch it
//! was scheduled under; the queue never cancels anything on its own.

/// What a scheduled task does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    SurvivalTick,
    SpawnBurst,
    Sweep,
}

/// A pending task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTask {
    pub due_ms: f64,
    pub epoch: u64,
    pub kind: TaskKind,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_seq: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler-local time: total milliseconds advanced so far
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `kind` to run `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f64, epoch: u64, kind: TaskKind) {
        self.schedule_at(self.now_ms + delay_ms.max(0.0), epoch, kind);
    }

    /// Schedule `kind` at an absolute scheduler time
    pub fn schedule_at(&mut self, due_ms: f64, epoch: u64, kind: TaskKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(ScheduledTask {
            due_ms,
            epoch,
            kind,
            seq,
        });
    }

    /// Move the clock forward
    pub fn advance(&mut self, dt_ms: f64) {
        if dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
    }

    /// Remove and return the earliest due task, ties broken by schedule order
    pub fn pop_due(&mut self) -> Option<ScheduledTask> {
        let now = self.now_ms;
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;
        Some(self.tasks.swap_remove(idx))
    }

    /// Number of tasks still queued (stale ones included)
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Pending tasks of one kind scheduled under `epoch`
    pub fn pending_for(&self, epoch: u64, kind: TaskKind) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.epoch == epoch && t.kind == kind)
            .count()
    }
}
