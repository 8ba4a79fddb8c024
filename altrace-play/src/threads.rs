//! Dense thread-id remapping (§3 invariant 5, §8 "thread-id density").
//!
//! The recorder only ever has a raw OS thread id to write (`pthread_self()`
//! on the recording side); those are large, platform-specific, and not
//! fit for a human-readable dump. The player assigns each raw id a small
//! dense integer the first time it's seen, in first-seen order, and reuses
//! it for the rest of the trace — the reader is single-threaded by design
//! (§5), so this needs no synchronization.

use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct ThreadIdMap {
    dense: FxHashMap<u64, u32>,
    next: u32,
}

impl ThreadIdMap {
    pub fn new() -> Self {
        Self {
            dense: FxHashMap::default(),
            next: 1,
        }
    }

    /// Returns the dense id for `raw`, assigning a fresh one (starting at 1)
    /// if this is the first time `raw` has been seen.
    pub fn dense_id(&mut self, raw: u64) -> u32 {
        *self.dense.entry(raw).or_insert_with(|| {
            let id = self.next;
            self.next += 1;
            id
        })
    }

    /// The number of distinct raw thread ids seen so far.
    pub fn thread_count(&self) -> u32 {
        self.next - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_dense_ids_in_first_seen_order() {
        let mut map = ThreadIdMap::new();
        assert_eq!(map.dense_id(0xaaaa), 1);
        assert_eq!(map.dense_id(0xbbbb), 2);
        assert_eq!(map.dense_id(0xaaaa), 1);
        assert_eq!(map.dense_id(0xcccc), 3);
        assert_eq!(map.thread_count(), 3);
    }
}
