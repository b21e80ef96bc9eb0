//! Time-ordered queues of records waiting to be injected
use crate::model::InjectionRecord;
use serde::Deserialize;
use std::collections::VecDeque;

/// Records older than the first datagram by more than this are trimmed, in
/// seconds
pub const TRIM_EPSILON: f64 = 1.0;

/// Records that fall due more than this long after their own time are
/// dropped instead of injected, in seconds
pub const MAX_LOOKAHEAD: f64 = 2.0;

/// Minimum spacing of injected height datagrams, in seconds
pub const HEIGHT_INTERVAL: f64 = 1.0;

/// Tuning of the injection queues
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InjectionPolicy {
    /// See [`TRIM_EPSILON`]
    pub trim_epsilon: f64,
    /// See [`MAX_LOOKAHEAD`]
    pub max_lookahead: f64,
    /// See [`HEIGHT_INTERVAL`]
    pub height_interval: f64,
}

impl Default for InjectionPolicy {
    fn default() -> Self {
        InjectionPolicy {
            trim_epsilon: TRIM_EPSILON,
            max_lookahead: MAX_LOOKAHEAD,
            height_interval: HEIGHT_INTERVAL,
        }
    }
}

/// Records sorted by time, consumed from the front as the stream clock
/// advances
///
/// A record leaves the queue exactly once, either injected or discarded.
#[derive(Debug, Clone, Default)]
pub struct InjectionQueue {
    records: VecDeque<InjectionRecord>,
}

impl InjectionQueue {
    /// A queue of `records` in time order
    ///
    /// Records with equal timestamps keep their input order.
    pub fn new(records: Vec<InjectionRecord>) -> Self {
        let mut queue = InjectionQueue::default();
        queue.extend(records);
        queue
    }

    /// Merge more records into the queue
    pub fn extend(&mut self, records: Vec<InjectionRecord>) {
        let mut all: Vec<InjectionRecord> = self.records.drain(..).collect();
        all.extend(records);
        all.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        self.records = all.into();
    }

    /// Number of queued records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record older than `reference - epsilon`
    ///
    /// Returns the number of records dropped.
    pub fn trim(&mut self, reference: f64, epsilon: f64) -> usize {
        let cutoff = reference - epsilon;
        let keep_from = self.records.partition_point(|r| r.timestamp < cutoff);
        self.records.drain(..keep_from);
        keep_from
    }

    /// The next record if it is due at `now`
    pub fn peek_due(&self, now: f64) -> Option<&InjectionRecord> {
        self.records.front().filter(|r| r.timestamp <= now)
    }

    /// Remove and return the next record if it is due at `now`
    pub fn pop_due(&mut self, now: f64) -> Option<InjectionRecord> {
        self.peek_due(now)?;
        self.records.pop_front()
    }

    /// Remove every record due at `now`
    ///
    /// Records younger than `max_lookahead` are returned in time order; the
    /// rest are discarded so a late start does not flood the output.
    pub fn inject_due(&mut self, now: f64, max_lookahead: f64) -> Vec<InjectionRecord> {
        let mut due = Vec::new();
        let mut dropped = 0;
        while let Some(record) = self.pop_due(now) {
            if now - record.timestamp < max_lookahead {
                due.push(record);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::debug!("discarded {} stale injection records at {:.3}", dropped, now);
        }
        due
    }
}
