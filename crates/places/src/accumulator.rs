use std::collections::HashSet;

use vibes_core::PlaceCandidate;

/// Keeps the first candidate seen for each place id, up to `capacity`.
///
/// Fullness counts every offered candidate, duplicates included, so callers
/// stop collecting on the raw count while the output stays unique.
#[derive(Debug, Clone)]
pub struct CandidateAccumulator {
    capacity: usize,
    collected: usize,
    seen: HashSet<String>,
    items: Vec<PlaceCandidate>,
}

impl CandidateAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            collected: 0,
            seen: HashSet::new(),
            items: Vec::with_capacity(capacity),
        }
    }

    /// Returns whether the candidate was kept.
    pub fn offer(&mut self, candidate: PlaceCandidate) -> bool {
        self.collected += 1;

        if self.items.len() >= self.capacity || self.seen.contains(&candidate.place_id) {
            return false;
        }

        self.seen.insert(candidate.place_id.clone());
        self.items.push(candidate);
        true
    }

    pub fn is_full(&self) -> bool {
        self.collected >= self.capacity
    }

    /// Offered candidates, duplicates included.
    pub fn collected(&self) -> usize {
        self.collected
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<PlaceCandidate> {
        self.items
    }
}
