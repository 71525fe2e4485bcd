//! Bounded memory of recently issued opening questions.
//!
//! Shared by every request of the process. It only steers the judge away
//! from repeating itself, so contention is kept to short critical sections.

use std::collections::VecDeque;
use std::sync::Mutex;

/// FIFO buffer of the last `capacity` opening questions.
#[derive(Debug)]
pub struct RecentQuestions {
    capacity: usize,
    questions: Mutex<VecDeque<String>>,
}

impl RecentQuestions {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            questions: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a question, evicting the oldest when full.
    pub fn record(&self, question: impl Into<String>) {
        let mut questions = self
            .questions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if questions.len() == self.capacity {
            questions.pop_front();
        }
        questions.push_back(question.into());
    }

    /// Recorded questions, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.questions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}
