//! Step navigation state machine.
//!
//! Forward movement is gated by the caller (the engine validates first);
//! the navigator only tracks the position and which steps may be revisited.

use serde::Serialize;
use std::collections::BTreeSet;

/// How a step appears in the step indicator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Current,
    Completed,
    Locked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepNavigator {
    total: usize,
    current: usize,
    completed: BTreeSet<usize>,
}

impl StepNavigator {
    /// Navigator over `total` steps; at least one step always exists
    pub fn new(total: usize) -> Self {
        Self {
            total: total.max(1),
            current: 0,
            completed: BTreeSet::new(),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.total
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    /// Record the last step as validated once the form is submitted
    pub fn mark_final_completed(&mut self) {
        self.completed.insert(self.total - 1);
    }

    /// Mark the current step completed and move forward.
    /// Returns false on the last step, where only submit applies.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.completed.insert(self.current);
        self.current += 1;
        true
    }

    /// Move one step back without touching completion
    pub fn back(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Move to a step that has already been completed
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.total || !self.completed.contains(&index) {
            return false;
        }
        self.current = index;
        true
    }

    pub fn status(&self, index: usize) -> StepStatus {
        if index == self.current {
            StepStatus::Current
        } else if self.completed.contains(&index) {
            StepStatus::Completed
        } else {
            StepStatus::Locked
        }
    }

    /// Percentage of the way through the form, counting the current step
    pub fn progress_percent(&self) -> u8 {
        (((self.current + 1) * 100) / self.total) as u8
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.completed.clear();
    }
}
