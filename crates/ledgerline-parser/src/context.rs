//! Tags scoped by `pushtag` / `poptag`.

use serde::{Deserialize, Serialize};

/// The stack of tags pushed by `pushtag` and not yet popped.
///
/// Each parse owns its own context. Pushing a tag twice needs two pops to
/// remove it; [`snapshot`](Self::snapshot) reports it once.
///
/// ```
/// use ledgerline_parser::TagContext;
///
/// let mut tags = TagContext::new();
/// tags.push("trip");
/// tags.push("work");
/// assert_eq!(tags.snapshot(), ["trip", "work"]);
/// assert!(tags.pop("trip"));
/// assert_eq!(tags.snapshot(), ["work"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagContext {
    stack: Vec<String>,
}

impl TagContext {
    /// Create an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Activate a tag.
    pub fn push(&mut self, tag: impl Into<String>) {
        self.stack.push(tag.into());
    }

    /// Deactivate the most recent push of `tag`.
    ///
    /// Returns `false`, leaving the context untouched, when the tag is not
    /// active.
    pub fn pop(&mut self, tag: &str) -> bool {
        match self.stack.iter().rposition(|t| t == tag) {
            Some(pos) => {
                self.stack.remove(pos);
                true
            }
            None => false,
        }
    }

    /// The active tags in first-push order, without duplicates.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::with_capacity(self.stack.len());
        for tag in &self.stack {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }

    /// Check whether a tag is active.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.stack.iter().any(|t| t == tag)
    }

    /// Number of unmatched pushes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Check if no tag is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
