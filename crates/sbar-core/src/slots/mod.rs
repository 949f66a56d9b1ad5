//! Ordered output slots shared by task supervisors and the aggregator.
//!
//! One slot per registered task, in registration order. Slot `i` is written only through the
//! [`SlotWriter`] handed to supervisor `i`; the aggregator reads the whole array at once.
//! Every access holds the board lock for the duration of a single copy, so a reader never
//! observes a half-written slot and a write is never lost.
use std::sync::{Arc, Mutex, MutexGuard};

/// The aggregate output slot array.
#[derive(Debug, Clone)]
pub struct SlotBoard {
    slots: Arc<Mutex<Vec<String>>>,
}

impl SlotBoard {
    /// Create a board with `len` empty slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(vec![String::new(); len])),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the board has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` over a consistent view of all slots.
    ///
    /// `f` must be short: writers wait until it returns.
    pub fn with_slots<R>(&self, f: impl FnOnce(&[String]) -> R) -> R {
        let guard = self.lock();
        f(&guard)
    }

    /// Copy of all slots.
    pub fn snapshot(&self) -> Vec<String> {
        self.with_slots(|s| s.to_vec())
    }

    /// Exclusive writer for slot `index`.
    ///
    /// Only the engine hands these out, exactly one per index.
    pub(crate) fn writer(&self, index: usize) -> SlotWriter {
        SlotWriter {
            index,
            board: self.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Write access to one slot of a [`SlotBoard`].
#[derive(Debug)]
pub struct SlotWriter {
    index: usize,
    board: SlotBoard,
}

impl SlotWriter {
    /// Slot index owned by this writer.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Replace the slot content.
    pub fn write(&self, output: String) {
        let mut slots = self.board.lock();
        if let Some(slot) = slots.get_mut(self.index) {
            *slot = output;
        }
    }
}
