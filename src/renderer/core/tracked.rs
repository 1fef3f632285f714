//! Identity wrapper used to give GPU resources a stable pool key.
//!
//! Resources are recycled by name (§4.1), but a name alone does not
//! distinguish two distinct instances retrieved for the same name across
//! frames. `Tracked<T>` pairs a resource with a monotonically increasing
//! id so the pool, the barrier scheduler, and the retention set in a
//! command buffer can all refer to "this exact resource" unambiguously.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A resource paired with a unique identity and its last-used frame index.
#[derive(Debug)]
pub struct Tracked<T> {
    id: u64,
    inner: T,
    last_frame_used: u64,
}

impl<T> Tracked<T> {
    /// Wrap `inner`, assigning it a fresh identity with `last_frame_used`
    /// set to the frame it was created on.
    pub fn new(inner: T, created_frame: u64) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            inner,
            last_frame_used: created_frame,
        }
    }

    /// Stable identity, unique for the lifetime of the process.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Frame index this resource was last handed out for.
    #[must_use]
    pub fn last_frame_used(&self) -> u64 {
        self.last_frame_used
    }

    /// Record that this resource is being (re)used on `frame`.
    pub fn touch(&mut self, frame: u64) {
        self.last_frame_used = frame;
    }

    /// Whether this resource may be reused on `current_frame` given
    /// `buffer_count` (§4.1, §8 property 3): `frameIndex - lastFrameUsed >=
    /// bufferCount`.
    #[must_use]
    pub fn is_free_on(&self, current_frame: u64, buffer_count: u64) -> bool {
        current_frame.saturating_sub(self.last_frame_used) >= buffer_count
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_instances_get_distinct_ids() {
        let a: Tracked<u32> = Tracked::new(1, 0);
        let b: Tracked<u32> = Tracked::new(2, 0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn free_check_respects_buffer_count() {
        let mut t: Tracked<u32> = Tracked::new(0, 10);
        assert!(!t.is_free_on(10, 2));
        assert!(!t.is_free_on(11, 2));
        assert!(t.is_free_on(12, 2));
        t.touch(12);
        assert!(!t.is_free_on(12, 2));
    }
}
