//! Linear undo/redo history of canvas snapshots.
//!
//! Unlike a command stack, every entry is a complete snapshot. Committing
//! after an undo truncates the entries past the current position, so the
//! history is always a single line with a cursor into it.
//!
//! Undoing from the first entry does not stop there: it collapses the whole
//! history and reports [`HistoryStep::Cleared`], the same as an explicit
//! clear. Undo on an empty history reports `Cleared` too, since the canvas
//! may still show something the history never saw.

/// Configuration for the drawing history.
#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept, `None` for unbounded
    pub max_history: Option<usize>,
}

/// Outcome of an undo or redo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStep<T> {
    /// Restore this snapshot
    Restore(T),
    /// The history was emptied; the canvas should be blank
    Cleared,
    /// Nothing to do
    Unchanged,
}

/// Ordered snapshots with a cursor.
///
/// Invariant: `current_index` is `None` exactly when the history is empty,
/// otherwise it points at a valid entry.
#[derive(Debug, Clone)]
pub struct DrawingHistory<T: Clone> {
    history: Vec<T>,
    current_index: Option<usize>,
    config: HistoryConfig,
}

impl<T: Clone> Default for DrawingHistory<T> {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            current_index: None,
            config: HistoryConfig::default(),
        }
    }
}

impl<T: Clone> DrawingHistory<T> {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Replace everything with a single snapshot, e.g. a drawing loaded
    /// for edit. The configuration is kept.
    pub fn reset_to(&mut self, snapshot: T) {
        self.clear();
        self.commit(snapshot);
    }

    /// Record a new snapshot after the current one.
    /// Anything that could have been redone is discarded.
    pub fn commit(&mut self, snapshot: T) {
        let keep = self.current_index.map_or(0, |i| i + 1);
        self.history.truncate(keep);
        self.history.push(snapshot);

        if let Some(max) = self.config.max_history {
            let max = max.max(1);
            if self.history.len() > max {
                let excess = self.history.len() - max;
                self.history.drain(..excess);
            }
        }

        self.current_index = Some(self.history.len() - 1);
        log::debug!("📝 History: committed, {} snapshots", self.history.len());
    }

    /// Step back one snapshot. At the first snapshot, or with no snapshot
    /// at all, the history is cleared.
    pub fn undo(&mut self) -> HistoryStep<T> {
        match self.current_index {
            None => HistoryStep::Cleared,
            Some(0) => {
                log::debug!("↩️ History: undo past first snapshot, clearing");
                self.clear();
                HistoryStep::Cleared
            }
            Some(index) => {
                self.current_index = Some(index - 1);
                log::debug!("↩️ History: undo to {}", index - 1);
                HistoryStep::Restore(self.history[index - 1].clone())
            }
        }
    }

    /// Step forward one snapshot, if there is one.
    pub fn redo(&mut self) -> HistoryStep<T> {
        match self.current_index {
            Some(index) if index + 1 < self.history.len() => {
                self.current_index = Some(index + 1);
                log::debug!("↪️ History: redo to {}", index + 1);
                HistoryStep::Restore(self.history[index + 1].clone())
            }
            _ => HistoryStep::Unchanged,
        }
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.history.clear();
        self.current_index = None;
    }

    /// The snapshot the cursor points at.
    pub fn current(&self) -> Option<&T> {
        self.current_index.and_then(|i| self.history.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Whether undo would change anything (including collapsing to empty).
    pub fn can_undo(&self) -> bool {
        self.current_index.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.current_index
            .is_some_and(|i| i + 1 < self.history.len())
    }
}
