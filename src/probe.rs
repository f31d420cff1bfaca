//! Triangular-number probe sequence over a power-of-two table.

/// Cursor over the candidate slots for one key.
///
/// Starts at the home slot `hash & mask` and advances by strides 1, 2, 3,
/// ..., so the k-th candidate sits at the k-th triangular-number offset
/// from home. With a power-of-two bucket count this visits every bucket
/// exactly once per `mask + 1` steps, which bounds any search to one full
/// cycle.
pub(crate) struct ProbeSeq {
    index: usize,
    step: usize,
}

impl ProbeSeq {
    #[inline]
    pub(crate) fn new(hash: u64, mask: usize) -> Self {
        Self {
            index: (hash as usize) & mask,
            step: 1,
        }
    }

    #[inline]
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub(crate) fn move_next(&mut self, mask: usize) {
        self.index = self.index.wrapping_add(self.step) & mask;
        self.step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::ProbeSeq;

    /// Invariant: for every power-of-two table size and every start, the
    /// first `capacity` probe positions are a permutation of all buckets.
    #[test]
    fn full_cycle_is_a_permutation() {
        for shift in 0..8u32 {
            let capacity = 1usize << shift;
            let mask = capacity - 1;
            for start in 0..capacity as u64 {
                let mut probe = ProbeSeq::new(start, mask);
                let mut seen = vec![false; capacity];
                for _ in 0..capacity {
                    assert!(!seen[probe.index()], "bucket revisited before a full cycle");
                    seen[probe.index()] = true;
                    probe.move_next(mask);
                }
                assert!(seen.iter().all(|&b| b));
            }
        }
    }

    /// Invariant: the first few positions follow the triangular offsets
    /// 0, 1, 3, 6, 10, ... from the home slot.
    #[test]
    fn triangular_offsets_from_home() {
        let mask = 63;
        let mut probe = ProbeSeq::new(5, mask);
        let mut positions = Vec::new();
        for _ in 0..5 {
            positions.push(probe.index());
            probe.move_next(mask);
        }
        assert_eq!(positions, vec![5, 6, 8, 11, 15]);
    }

    /// Invariant: the home slot is the hash masked to the table size.
    #[test]
    fn home_slot_is_masked_hash() {
        let probe = ProbeSeq::new(0xdead_beef, 0xf);
        assert_eq!(probe.index(), 0xf);
    }
}
