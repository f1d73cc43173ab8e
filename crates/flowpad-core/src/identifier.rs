//! Node id generation.
//!
//! Ids for nodes created on the canvas come from an [`IdGenerator`] owned by
//! the editor rather than from process-wide state, so two editors never
//! share a counter and tests get predictable ids.

/// Source of fresh node ids.
pub trait IdGenerator {
    /// Returns an id that this generator has not returned before.
    fn next_id(&mut self) -> String;
}

/// Prefix used by [`SequentialIds::default`].
pub const DEFAULT_PREFIX: &str = "dndnode_";

/// Monotonic counter producing `<prefix>0`, `<prefix>1`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Starts counting from `start` instead of zero.
    pub fn starting_at(mut self, start: u64) -> Self {
        self.next = start;
        self
    }

    /// Returns the counter value the next id will use.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.next_id(), "dndnode_0");
        assert_eq!(ids.next_id(), "dndnode_1");
        assert_eq!(ids.peek(), 2);
    }

    #[test]
    fn test_custom_prefix_and_start() {
        let mut ids = SequentialIds::new("n").starting_at(7);
        assert_eq!(ids.next_id(), "n7");
        assert_eq!(ids.next_id(), "n8");
    }

    #[test]
    fn test_boxed_generator() {
        let mut ids: Box<dyn IdGenerator> = Box::new(SequentialIds::new("b"));
        assert_eq!(ids.next_id(), "b0");
    }
}
