//! # Rolling Conversation Window
//!
//! File: cli/src/bot/history.rs
//! Author: Christi Mahu
//!
//! The last N question/answer turns of `ask`, shared by every user of the
//! bot. Pushing a turn past the bound evicts the oldest one.
//!
use crate::services::completion::ChatTurn;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct HistoryWindow {
    turns: VecDeque<ChatTurn>,
    capacity: usize,
}

impl HistoryWindow {
    /// A window holding at most `capacity` turns (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the window, oldest turn first.
    pub fn snapshot(&self) -> Vec<ChatTurn> {
        self.turns.iter().cloned().collect()
    }
}
