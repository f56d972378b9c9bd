use crate::domain_knowledge::HISTORY_CAPACITY;
use std::collections::VecDeque;

/// One iteration of the simulation, frozen once created
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Tick {
    pub sequence_number: u64,
    pub downloaded_bytes: u64,
    pub uploaded_bytes: u64,
}

/// The last few ticks, oldest first. Only used for rendering.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    ticks: VecDeque<Tick>,
    capacity: usize,
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl SessionHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ticks: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, tick: Tick) {
        debug_assert!(
            self.ticks.back().is_none_or(|last| last.sequence_number + 1 == tick.sequence_number),
            "ticks must be appended in order without gaps"
        );

        self.ticks.push_back(tick);
        while self.ticks.len() > self.capacity {
            self.ticks.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<Tick> {
        self.ticks.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
