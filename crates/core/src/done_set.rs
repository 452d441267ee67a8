use std::collections::HashSet;

use crate::types::JobId;

/// Identifiers this process has completed or found already acted upon.
///
/// Grows monotonically: there is no removal. Lives for the process only.
#[derive(Debug, Clone, Default)]
pub struct DoneSet(HashSet<JobId>);

impl DoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: JobId) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union `other` into this set. Safe to apply in any order because the
    /// set only ever grows.
    pub fn merge(&mut self, other: DoneSet) {
        self.0.extend(other.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_novelty() {
        let mut done = DoneSet::new();
        assert!(done.insert(JobId::from("a")));
        assert!(!done.insert(JobId::from("a")));
        assert_eq!(done.len(), 1);
    }

    #[test]
    fn merge_is_a_union() {
        let mut left = DoneSet::new();
        left.insert(JobId::from("a"));
        let mut right = left.clone();
        right.insert(JobId::from("b"));
        left.insert(JobId::from("c"));

        left.merge(right);
        assert_eq!(left.len(), 3);
        assert!(left.contains(&JobId::from("b")));
        assert!(left.contains(&JobId::from("c")));
    }
}
