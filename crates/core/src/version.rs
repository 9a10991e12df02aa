//! Optimistic concurrency primitives for shared, rewritten-wholesale state.

/// Optimistic concurrency expectation for a write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (last write wins).
    Any,
    /// Require the stored value to be at an exact version (0 = never written).
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

/// A value together with the store version it was read at.
///
/// Writers pass `ExpectedVersion::Exact(version)` back to the store so that a
/// concurrent writer in between is detected instead of silently overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: u64) -> Self {
        Self { value, version }
    }

    /// A value that has never been persisted.
    pub fn unsaved(value: T) -> Self {
        Self { value, version: 0 }
    }

    pub fn expected(&self) -> ExpectedVersion {
        ExpectedVersion::Exact(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_version_must_match() {
        assert!(ExpectedVersion::Exact(3).matches(3));
        assert!(!ExpectedVersion::Exact(2).matches(3));
        assert!(ExpectedVersion::Any.matches(3));
        assert!(ExpectedVersion::Any.matches(0));
    }

    #[test]
    fn unsaved_expects_version_zero() {
        let v = Versioned::unsaved("x");
        assert_eq!(v.expected(), ExpectedVersion::Exact(0));
    }
}
