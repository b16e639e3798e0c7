//! Frontier of untried candidate words
//!
//! Consumption is LIFO: whatever was pushed last is tried next, so the
//! expansions of a fresh success are explored depth-first. Pushing a word
//! that is already queued moves it to the top.

use crate::core::{SessionRecord, Word};
use rand::Rng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;

/// Ordered set of words waiting to be submitted
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    order: Vec<Word>,
    queued: FxHashSet<Word>,
}

impl Frontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the initial frontier from seed words in random order
    ///
    /// Tested words and duplicates are dropped.
    pub fn from_seeds<R: Rng + ?Sized>(
        seeds: impl IntoIterator<Item = Word>,
        tested: &SessionRecord,
        rng: &mut R,
    ) -> Self {
        let mut frontier = Self::new();
        for word in seeds {
            if !tested.contains(&word) && frontier.queued.insert(word.clone()) {
                frontier.order.push(word);
            }
        }
        frontier.order.shuffle(rng);
        frontier
    }

    /// Queue a word so it is popped next
    ///
    /// Returns `false` if the word was already tested. A word that is
    /// already queued is promoted to the top.
    pub fn push(&mut self, word: Word, tested: &SessionRecord) -> bool {
        if tested.contains(&word) {
            return false;
        }

        if self.queued.contains(&word) {
            if let Some(pos) = self.order.iter().rposition(|queued| *queued == word) {
                self.order.remove(pos);
            }
        } else {
            self.queued.insert(word.clone());
        }
        self.order.push(word);
        true
    }

    /// Queue several words in order; the last one ends up on top
    pub fn extend(&mut self, words: impl IntoIterator<Item = Word>, tested: &SessionRecord) -> usize {
        words
            .into_iter()
            .filter(|word| self.push(word.clone(), tested))
            .count()
    }

    /// Put a word back at the bottom, to be retried after everything else
    pub fn requeue_last(&mut self, word: Word, tested: &SessionRecord) {
        if tested.contains(&word) || !self.queued.insert(word.clone()) {
            return;
        }
        self.order.insert(0, word);
    }

    /// Remove and return the most recently pushed word
    pub fn pop(&mut self) -> Option<Word> {
        let word = self.order.pop()?;
        self.queued.remove(&word);
        Some(word)
    }

    /// Drop a queued word, e.g. one submitted by hand
    pub fn remove(&mut self, word: &Word) -> bool {
        if !self.queued.remove(word) {
            return false;
        }
        if let Some(pos) = self.order.iter().rposition(|queued| queued == word) {
            self.order.remove(pos);
        }
        true
    }

    /// Word that `pop` would return
    #[must_use]
    pub fn peek(&self) -> Option<&Word> {
        self.order.last()
    }

    #[must_use]
    pub fn contains(&self, word: &Word) -> bool {
        self.queued.contains(word)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Words in pop order (next first)
    pub fn iter_next(&self) -> impl Iterator<Item = &Word> {
        self.order.iter().rev()
    }
}
