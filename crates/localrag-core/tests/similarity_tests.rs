use localrag_core::similarity::{cosine, euclidean, magnitude, Metric};

#[test]
fn cosine_of_identical_and_opposite_vectors() {
    let v = [1.0f32, 2.0, 3.0];
    let neg = [-1.0f32, -2.0, -3.0];
    assert!((cosine(&v, &v) - 1.0).abs() < 1e-6);
    assert!((cosine(&v, &neg) + 1.0).abs() < 1e-6);
}

#[test]
fn cosine_of_orthogonal_vectors_is_zero() {
    assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
}

#[test]
fn zero_vector_scores_zero_never_nan() {
    let zero = [0.0f32; 4];
    for v in [[0.0f32; 4], [1.0, 2.0, 3.0, 4.0], [-5.0, 0.0, 0.5, 1e-30]] {
        let s = cosine(&zero, &v);
        assert_eq!(s, 0.0);
        assert!(!s.is_nan());
        assert_eq!(cosine(&v, &zero), 0.0);
    }
}

#[test]
fn mismatched_lengths_score_zero() {
    assert_eq!(cosine(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    assert_eq!(euclidean(&[1.0], &[]), 0.0);
}

#[test]
fn metrics_are_symmetric_and_bounded() {
    let pairs: [(&[f32], &[f32]); 3] = [
        (&[0.3, -0.7, 0.1], &[0.9, 0.2, -0.4]),
        (&[1e-3, 5.0, 2.5], &[7.0, -1e-2, 3.3]),
        (&[0.0, 1.0, 0.0], &[0.0, 1.0, 0.0]),
    ];
    for metric in [Metric::Cosine, Metric::Euclidean] {
        for (a, b) in pairs {
            let ab = metric.score(a, b);
            let ba = metric.score(b, a);
            assert_eq!(ab, ba, "{metric:?} must be symmetric");
            assert!((-1.0..=1.0).contains(&ab));
        }
    }
}

#[test]
fn euclidean_identity_scores_one() {
    let v = [0.5f32, 0.25, -3.0];
    assert_eq!(euclidean(&v, &v), 1.0);
    assert!(euclidean(&v, &[0.0, 0.0, 0.0]) < 1.0);
}

#[test]
fn magnitude_is_the_l2_norm() {
    assert_eq!(magnitude(&[3.0, 4.0]), 5.0);
    assert_eq!(magnitude(&[]), 0.0);
    // f32 squares of these overflow; the f64 sum does not.
    let big = [3.0e20f32, 4.0e20];
    assert!((magnitude(&big) / 5.0e20 - 1.0).abs() < 1e-6);
}
