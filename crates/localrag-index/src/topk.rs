//! Bounded top-k selection over `(ordinal, score)` pairs.
//!
//! Keeps at most `k` candidates in a min-heap whose root is the weakest kept
//! candidate. Higher score wins; on equal score the lower ordinal (earlier
//! insertion) wins, so results are deterministic.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Ordering key only; `score` is what callers get back.
    key: f32,
    score: f32,
    ordinal: usize,
}

impl Candidate {
    fn new(ordinal: usize, score: f32) -> Self {
        // -0.0 and 0.0 must tie; NaN never outranks a real score.
        let key = if score.is_nan() {
            f32::NEG_INFINITY
        } else if score == 0.0 {
            0.0
        } else {
            score
        };
        Self { key, score, ordinal }
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| other.ordinal.cmp(&self.ordinal))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// The `k` best `(ordinal, score)` pairs, best first.
///
/// Memory is bounded by the number of scores, not by `k`; any `k` up to
/// `usize::MAX` is accepted.
pub fn top_k<I>(scores: I, k: usize) -> Vec<(usize, f32)>
where
    I: IntoIterator<Item = (usize, f32)>,
{
    if k == 0 {
        return Vec::new();
    }
    let scores = scores.into_iter();
    let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(k.min(scores.size_hint().0));
    for (ordinal, score) in scores {
        let candidate = Candidate::new(ordinal, score);
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if heap.peek().is_some_and(|Reverse(weakest)| candidate > *weakest) {
            heap.pop();
            heap.push(Reverse(candidate));
        }
    }
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(c)| (c.ordinal, c.score))
        .collect()
}
