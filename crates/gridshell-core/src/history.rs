use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Older,
    Newer,
}

/// Bounded command history with prefix search.
///
/// A search collects the distinct entries starting with a prefix, most
/// recent first. Cycling walks that list and wraps at either end.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    limit: usize,
    matches: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
            matches: Vec::new(),
            cursor: 0,
        }
    }

    /// Records a submitted line. Blank lines are ignored and the oldest
    /// entries are dropped past the limit.
    pub fn push(&mut self, line: &str) {
        self.reset_search();
        if line.trim().is_empty() || self.limit == 0 {
            return;
        }
        self.entries.push_back(line.to_string());
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Starts a new search and returns the most recent match.
    pub fn start_search(&mut self, prefix: &str) -> Option<&str> {
        self.matches.clear();
        self.cursor = 0;
        for entry in self.entries.iter().rev() {
            if entry.starts_with(prefix) && !self.matches.contains(entry) {
                self.matches.push(entry.clone());
            }
        }
        self.matches.first().map(String::as_str)
    }

    /// Moves through the current search results.
    pub fn cycle(&mut self, direction: Direction) -> Option<&str> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        self.cursor = match direction {
            Direction::Older => (self.cursor + 1) % len,
            Direction::Newer => (self.cursor + len - 1) % len,
        };
        self.matches.get(self.cursor).map(String::as_str)
    }

    pub fn reset_search(&mut self) {
        self.matches.clear();
        self.cursor = 0;
    }
}
