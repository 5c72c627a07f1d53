//! Priority queues for cycling belief and goal events.
//!
//! `spec.md` §9 "Priority-map choice" calls for a structure keyed by
//! `(priority, insertion_seq)` so that ties break by insertion order
//! deterministically, with O(log n) pop/insert — a `BinaryHeap` over a
//! wrapper that orders by priority then a monotonic sequence number
//! gives exactly that.

use crate::event::Event;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry {
    priority: ordered_float::OrderedFloat<f64>,
    sequence: u64,
    event: Event,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}
impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first; among equal priorities, earlier
        // insertion (lower sequence) wins, so invert the sequence
        // comparison to keep BinaryHeap a max-heap on "should pop
        // first".
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A bounded, priority-ordered event queue with deterministic tie
/// breaking and lowest-priority eviction on overflow (`spec.md` §5).
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    next_sequence: u64,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        EventQueue {
            heap: BinaryHeap::new(),
            next_sequence: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert `event` at `priority`. If at capacity, evicts the
    /// current lowest-priority element first (`spec.md` §5
    /// `QueueOverflow`: never surfaced as an error).
    pub fn push(&mut self, event: Event, priority: f64) {
        if self.heap.len() >= self.capacity {
            self.evict_lowest();
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Entry {
            priority: ordered_float::OrderedFloat(priority),
            sequence,
            event,
        });
    }

    /// Pop up to `n` highest-priority events, highest first.
    pub fn pop_n(&mut self, n: usize) -> Vec<Event> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.heap.pop() {
                Some(entry) => out.push(entry.event),
                None => break,
            }
        }
        out
    }

    /// Multiply every still-queued event's priority by `durability`,
    /// keeping insertion order intact (`spec.md` §5 priority decay:
    /// `EVENT_DURABILITY=0.9999` applied once per cycle).
    pub fn decay(&mut self, durability: f64) {
        let entries = std::mem::take(&mut self.heap).into_vec();
        for entry in entries {
            self.heap.push(Entry {
                priority: ordered_float::OrderedFloat(entry.priority.into_inner() * durability),
                sequence: entry.sequence,
                event: entry.event,
            });
        }
    }

    fn evict_lowest(&mut self) {
        // BinaryHeap has no direct "peek min"; rebuild, dropping the
        // worst entry. Capacities are small (hundreds) per `spec.md`
        // §5, so this is cheap relative to the eviction it performs.
        if self.heap.is_empty() {
            return;
        }
        let mut entries: Vec<Entry> = std::mem::take(&mut self.heap).into_sorted_vec();
        entries.remove(0); // sorted ascending by Ord; index 0 is the worst.
        self.heap = BinaryHeap::from(entries);
    }
}
