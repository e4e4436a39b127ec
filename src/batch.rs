//! Results of operations that process many items independently.

/// An item that could not be processed, with the reason.
#[derive(Debug)]
pub struct ItemFailure<E> {
    /// The name or key of the item as the caller supplied it.
    pub item: String,
    pub error: E,
}

/// Successes and per-item failures of a batch operation.
///
/// A failed item never aborts its siblings.
#[derive(Debug)]
pub struct BatchReport<T, E> {
    pub succeeded: Vec<T>,
    pub failed: Vec<ItemFailure<E>>,
}

impl<T, E> BatchReport<T, E> {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn push_success(&mut self, value: T) {
        self.succeeded.push(value);
    }

    pub fn push_failure(&mut self, item: impl Into<String>, error: E) {
        self.failed.push(ItemFailure {
            item: item.into(),
            error,
        });
    }

    /// Fold another report into this one.
    pub fn extend(&mut self, other: BatchReport<T, E>) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl<T, E> Default for BatchReport<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
