use std::collections::VecDeque;

/// Fixed-capacity FIFO of raw lines. Pushing past capacity evicts the oldest line.
#[derive(Debug, Clone)]
pub struct LineWindow {
    capacity: usize,
    lines: VecDeque<String>,
}

impl LineWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);
        if self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn extend<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        for line in lines {
            self.push(line);
        }
    }

    /// Take every line in insertion order, leaving the window empty.
    pub fn drain_all(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
