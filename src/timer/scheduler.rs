//! One-shot job queue on the session's logical clock
//!
//! Jobs are ordered by due time, then by insertion order, so two jobs due
//! at the same instant fire in the order they were scheduled.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled job; also its position in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobKey {
    due: Duration,
    seq: u64,
}

impl JobKey {
    pub fn due(&self) -> Duration {
        self.due
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<J> {
    jobs: BTreeMap<JobKey, J>,
    next_seq: u64,
}

impl<J> Default for Scheduler<J> {
    fn default() -> Self {
        Self {
            jobs: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<J> Scheduler<J> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, due: Duration, job: J) -> JobKey {
        let key = JobKey {
            due,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.jobs.insert(key, job);
        key
    }

    /// Remove a job before it fires; `None` if it already fired or was cancelled
    pub fn cancel(&mut self, key: JobKey) -> Option<J> {
        self.jobs.remove(&key)
    }

    /// Take the earliest job due at or before `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<(JobKey, J)> {
        let key = *self.jobs.keys().next()?;
        if key.due > now {
            return None;
        }
        self.jobs.remove(&key).map(|job| (key, job))
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.jobs.keys().next().map(|k| k.due)
    }

    /// Drop every job the predicate rejects
    pub fn retain(&mut self, mut keep: impl FnMut(&J) -> bool) {
        self.jobs.retain(|_, job| keep(job));
    }
}
