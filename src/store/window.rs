//! Fixed-capacity FIFO windows for samples and events.

use std::collections::vec_deque::{self, VecDeque};

/// Maximum number of samples kept per target.
pub const SAMPLE_WINDOW: usize = 120;

/// Maximum number of entries in the global event log.
pub const EVENT_LOG_CAPACITY: usize = 100;

/// An ordered window holding at most `capacity` entries, oldest first.
///
/// Pushing onto a full window evicts the oldest entry, so arrival order is
/// always preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedWindow<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedWindow<T> {
    /// Create an empty window.
    ///
    /// A zero capacity is bumped to one so the newest entry is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a window from an ordered sequence, keeping only the newest
    /// `capacity` entries.
    pub fn from_iter_newest<I>(capacity: usize, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut window = Self::new(capacity);
        window.extend(items);
        window
    }

    /// Append an entry, returning the evicted one if the window was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Oldest entry.
    pub fn first(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Newest entry.
    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.entries.iter()
    }

    /// Iterate the `n` newest entries, oldest of them first.
    pub fn newest(&self, n: usize) -> impl Iterator<Item = &T> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }
}

impl<T> Extend<T> for BoundedWindow<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a BoundedWindow<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
