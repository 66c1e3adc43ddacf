//! Similarity and distance metrics over `[f32]` slices.
//!
//! Dot products and squared norms are accumulated eight lanes at a time
//! so the auto-vectorizer emits wide-register FMAs (AVX2/NEON). Cosine
//! computes the dot and both norms in a single pass over the inputs.

/// Cosine similarity between two vectors.
///
/// Returns a value in [-1, 1], where 1 means identical direction.
/// Mismatched lengths, empty inputs, and zero-norm vectors return 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    let mut chunks_a = a.chunks_exact(8);
    let mut chunks_b = b.chunks_exact(8);
    for (xa, xb) in (&mut chunks_a).zip(&mut chunks_b) {
        dot += xa[0] * xb[0]
            + xa[1] * xb[1]
            + xa[2] * xb[2]
            + xa[3] * xb[3]
            + xa[4] * xb[4]
            + xa[5] * xb[5]
            + xa[6] * xb[6]
            + xa[7] * xb[7];
        norm_a += xa[0] * xa[0]
            + xa[1] * xa[1]
            + xa[2] * xa[2]
            + xa[3] * xa[3]
            + xa[4] * xa[4]
            + xa[5] * xa[5]
            + xa[6] * xa[6]
            + xa[7] * xa[7];
        norm_b += xb[0] * xb[0]
            + xb[1] * xb[1]
            + xb[2] * xb[2]
            + xb[3] * xb[3]
            + xb[4] * xb[4]
            + xb[5] * xb[5]
            + xb[6] * xb[6]
            + xb[7] * xb[7];
    }
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Dot product of two vectors; 0 on length mismatch or empty input.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0f32;
    let mut chunks_a = a.chunks_exact(8);
    let mut chunks_b = b.chunks_exact(8);
    for (xa, xb) in (&mut chunks_a).zip(&mut chunks_b) {
        sum += xa[0] * xb[0]
            + xa[1] * xb[1]
            + xa[2] * xb[2]
            + xa[3] * xb[3]
            + xa[4] * xb[4]
            + xa[5] * xb[5]
            + xa[6] * xb[6]
            + xa[7] * xb[7];
    }
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        sum += x * y;
    }
    sum
}

/// L2 (Euclidean) norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    let mut chunks = v.chunks_exact(8);
    for x in &mut chunks {
        sum += x[0] * x[0]
            + x[1] * x[1]
            + x[2] * x[2]
            + x[3] * x[3]
            + x[4] * x[4]
            + x[5] * x[5]
            + x[6] * x[6]
            + x[7] * x[7];
    }
    for x in chunks.remainder() {
        sum += x * x;
    }
    sum.sqrt()
}

/// Normalizes a vector in place to unit length. The zero vector is left
/// untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm == 0.0 {
        return;
    }
    let inv = 1.0 / norm;
    for x in v.iter_mut() {
        *x *= inv;
    }
}

/// Euclidean distance between two vectors; 0 on length mismatch or empty
/// input.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0f32;
    let mut chunks_a = a.chunks_exact(8);
    let mut chunks_b = b.chunks_exact(8);
    for (xa, xb) in (&mut chunks_a).zip(&mut chunks_b) {
        let d0 = xa[0] - xb[0];
        let d1 = xa[1] - xb[1];
        let d2 = xa[2] - xb[2];
        let d3 = xa[3] - xb[3];
        let d4 = xa[4] - xb[4];
        let d5 = xa[5] - xb[5];
        let d6 = xa[6] - xb[6];
        let d7 = xa[7] - xb[7];
        sum += d0 * d0 + d1 * d1 + d2 * d2 + d3 * d3 + d4 * d4 + d5 * d5 + d6 * d6 + d7 * d7;
    }
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        let d = x - y;
        sum += d * d;
    }
    sum.sqrt()
}

/// Computes similarities between one query and many targets, writing one
/// score per target into `similarities` (pre-allocated, same length as
/// `targets`, written in target order).
///
/// The query norm is computed once. A zero-norm query or a
/// mismatched-length target yields 0 in the corresponding slot.
pub fn batch_cosine_similarity(query: &[f32], targets: &[&[f32]], similarities: &mut [f32]) {
    debug_assert_eq!(targets.len(), similarities.len());

    let mut query_norm = 0.0f32;
    for v in query {
        query_norm += v * v;
    }
    let query_norm = query_norm.sqrt();

    if query_norm == 0.0 {
        for s in similarities.iter_mut() {
            *s = 0.0;
        }
        return;
    }
    let inv_query_norm = 1.0 / query_norm;

    for (slot, target) in similarities.iter_mut().zip(targets) {
        if target.len() != query.len() {
            *slot = 0.0;
            continue;
        }
        let dot = dot_product(query, target);
        let target_norm = l2_norm(target);
        *slot = if target_norm == 0.0 {
            0.0
        } else {
            dot * inv_query_norm / target_norm
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert_relative_eq!(cosine_similarity(&a, &a), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_cosine_self_similarity_long() {
        // Length > 8 exercises the unrolled lanes plus the remainder.
        let v: Vec<f32> = (1..=37).map(|i| (i as f32) * 0.3 - 5.0).collect();
        assert_relative_eq!(cosine_similarity(&v, &v), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_relative_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![-1.0, -2.0, -3.0, -4.0];
        assert_relative_eq!(cosine_similarity(&a, &b), -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_cosine_symmetry_and_negation() {
        let a: Vec<f32> = (0..20).map(|i| (i as f32).sin()).collect();
        let b: Vec<f32> = (0..20).map(|i| (i as f32).cos()).collect();
        let neg_b: Vec<f32> = b.iter().map(|x| -x).collect();
        assert_relative_eq!(
            cosine_similarity(&a, &b),
            cosine_similarity(&b, &a),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            cosine_similarity(&a, &neg_b),
            -cosine_similarity(&a, &b),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_cosine_invalid_shapes() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_dot_product() {
        assert_relative_eq!(dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(dot_product(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_l2_norm() {
        assert_relative_eq!(l2_norm(&[3.0, 4.0]), 5.0, epsilon = 1e-6);
        assert_eq!(l2_norm(&[]), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut v: Vec<f32> = (1..=11).map(|i| i as f32).collect();
        normalize(&mut v);
        assert_relative_eq!(l2_norm(&v), 1.0, epsilon = 1e-5);

        let mut zero = vec![0.0; 4];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0; 4]);
    }

    #[test]
    fn test_euclidean_distance() {
        assert_relative_eq!(
            euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]),
            5.0,
            epsilon = 1e-5
        );
        assert_eq!(euclidean_distance(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_batch_cosine_matches_scalar() {
        let query: Vec<f32> = (0..24).map(|i| (i as f32) * 0.1 + 0.5).collect();
        let t1: Vec<f32> = (0..24).map(|i| (i as f32).cos()).collect();
        let t2 = query.clone();
        let t3: Vec<f32> = query.iter().map(|x| -x).collect();
        let targets: Vec<&[f32]> = vec![&t1, &t2, &t3];

        let mut out = vec![0.0; 3];
        batch_cosine_similarity(&query, &targets, &mut out);

        assert_relative_eq!(out[0], cosine_similarity(&query, &t1), epsilon = 1e-5);
        assert_relative_eq!(out[1], 1.0, epsilon = 1e-5);
        assert_relative_eq!(out[2], -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_batch_cosine_zero_query_and_bad_target() {
        let mut out = vec![9.0; 2];
        let t: Vec<f32> = vec![1.0, 2.0];
        let short: Vec<f32> = vec![1.0];
        batch_cosine_similarity(&[0.0, 0.0], &[&t, &short], &mut out);
        assert_eq!(out, vec![0.0, 0.0]);

        let mut out = vec![9.0; 1];
        batch_cosine_similarity(&[1.0, 0.0], &[&short], &mut out);
        assert_eq!(out, vec![0.0]);
    }
}
