//! Content versioning for CPU-side data that mirrors a GPU resource.
//!
//! Writers go through [`MutGuard`], which bumps the version on drop. The
//! upload side compares versions and skips buffers that did not change.

/// Monotonic change counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    version: u64,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self { version: 0 }
    }

    /// Marks as modified, increments version by 1
    pub fn changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether content changed since `seen` was observed.
    #[must_use]
    pub fn is_newer_than(&self, seen: u64) -> bool {
        self.version != seen
    }
}

/// Mutable guard - bumps the version when the scope ends
pub struct MutGuard<'a, T> {
    data: &'a mut T,
    tracker: &'a mut ChangeTracker,
}

impl<'a, T> MutGuard<'a, T> {
    pub fn new(data: &'a mut T, tracker: &'a mut ChangeTracker) -> Self {
        Self { data, tracker }
    }
}

impl<T> std::ops::Deref for MutGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl<T> std::ops::DerefMut for MutGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.data
    }
}

impl<T> Drop for MutGuard<'_, T> {
    fn drop(&mut self) {
        self.tracker.changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_bumps_version_on_drop() {
        let mut data = vec![1, 2, 3];
        let mut tracker = ChangeTracker::new();

        {
            let mut guard = MutGuard::new(&mut data, &mut tracker);
            guard.push(4);
        }

        assert_eq!(tracker.version(), 1);
        assert!(tracker.is_newer_than(0));
        assert!(!tracker.is_newer_than(1));
        assert_eq!(data, vec![1, 2, 3, 4]);
    }
}
