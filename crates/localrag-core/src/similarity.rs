//! Bounded, symmetric similarity between embedding vectors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Cosine similarity in `[-1, 1]`.
    #[default]
    Cosine,
    /// `1 / (1 + euclidean distance)`, in `(0, 1]`.
    Euclidean,
}

impl Metric {
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Cosine => cosine(a, b),
            Metric::Euclidean => euclidean(a, b),
        }
    }
}

/// Cosine similarity of `a` and `b`.
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ.
/// Accumulates in f64 so the result does not depend on argument order.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() || !dot.is_finite() {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0) as f32
}

/// Euclidean distance squashed into `(0, 1]`; identical vectors score 1.0.
pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dist = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt();
    if !dist.is_finite() {
        return 0.0;
    }
    (1.0 / (1.0 + dist)) as f32
}

/// L2 norm of `v`, accumulated in f64 like [`cosine`].
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt() as f32
}
