use std::collections::VecDeque;

/// A bucketed priority queue over small integer priorities.
///
/// Items with equal priority pop in insertion order, which makes the search
/// deterministic when several open entries share the same f-cost. Buckets
/// are allocated on demand up to the largest priority pushed.
pub struct PriorityQueue<T> {
    buckets: Vec<VecDeque<T>>,
    /// No bucket below this index holds an item.
    lowest: usize,
    len: usize,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            lowest: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, priority: usize, item: T) {
        if priority >= self.buckets.len() {
            self.buckets.resize_with(priority + 1, VecDeque::new);
        }
        self.buckets[priority].push_back(item);
        self.lowest = self.lowest.min(priority);
        self.len += 1;
    }

    pub fn pop_min(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        while self.buckets[self.lowest].is_empty() {
            self.lowest += 1;
        }
        self.len -= 1;
        self.buckets[self.lowest].pop_front()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
