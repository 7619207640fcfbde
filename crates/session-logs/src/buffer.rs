// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bounded FIFO buffer of pending log entries.
//!
//! # Eviction
//!
//! When a push would exceed the capacity, the oldest entry is dropped so the
//! buffer always holds the most recent `capacity` entries. Eviction is never
//! reported to the producer; the count is kept so the next [`LogBuffer::take`]
//! can report it on the side channel.
//!
//! # Draining
//!
//! [`LogBuffer::take`] swaps the whole queue out for an empty one. Entries
//! pushed afterwards start the next batch.

use std::collections::VecDeque;

use crate::constants;
use crate::entry::LogEntry;

/// In-memory queue of log entries awaiting delivery.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    /// Pending entries, oldest at the front.
    entries: VecDeque<LogEntry>,
    /// Maximum number of retained entries.
    capacity: usize,
    /// Entries evicted since the last take.
    evicted: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        LogBuffer::new(constants::DEFAULT_CAPACITY)
    }
}

impl LogBuffer {
    /// Creates a buffer retaining at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        LogBuffer {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            evicted: 0,
        }
    }

    /// Appends an entry, evicting the oldest one if the buffer is full.
    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
        }
        self.entries.push_back(entry);
    }

    /// Removes and returns every pending entry in insertion order, together
    /// with the number of entries evicted since the previous take.
    pub fn take(&mut self) -> (Vec<LogEntry>, usize) {
        let entries = std::mem::take(&mut self.entries);
        let evicted = std::mem::replace(&mut self.evicted, 0);
        (entries.into(), evicted)
    }

    /// Drops every pending entry without delivering it.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.evicted = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
