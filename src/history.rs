// history.rs

use std::collections::VecDeque;

use crate::stroke::StrokeId;

/// Default capacity of the stroke history.
pub const MAX_HISTORY: usize = 100;

/// Bounded, most-recent-last record of ordinary strokes.
///
/// Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<StrokeId>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a history from previously persisted strokes, keeping the newest
    /// `capacity` of them.
    pub fn hydrate(capacity: usize, strokes: impl IntoIterator<Item = StrokeId>) -> Self {
        let mut history = Self::new(capacity);
        for stroke in strokes {
            history.push(stroke);
        }
        history
    }

    /// Append a stroke, returning the evicted one if the buffer was full.
    pub fn push(&mut self, stroke: StrokeId) -> Option<StrokeId> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(stroke);
        evicted
    }

    pub fn pop(&mut self) -> Option<StrokeId> {
        self.entries.pop_back()
    }

    /// The last `n` strokes in original order, or `None` if fewer exist.
    pub fn last_n(&self, n: usize) -> Option<Vec<StrokeId>> {
        if n > self.entries.len() {
            return None;
        }
        Some(self.entries.iter().skip(self.entries.len() - n).cloned().collect())
    }

    /// Everything from position `start` onward, or `None` if `start` is past
    /// the end.
    pub fn since(&self, start: usize) -> Option<Vec<StrokeId>> {
        if start > self.entries.len() {
            return None;
        }
        Some(self.entries.iter().skip(start).cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StrokeId> + '_ {
        self.entries.iter()
    }

    /// Contiguous view of the entries, oldest first.
    pub fn make_contiguous(&mut self) -> &[StrokeId] {
        self.entries.make_contiguous()
    }
}
