// Dot product kernel for embedding similarity.
// Embeddings are 512-wide and unit-norm, so dot product is the only kernel
// the hot path needs; norm is used once at construction.

const LANES: usize = 8;

/// Dot product over eight independent lanes, which the compiler keeps in
/// vector registers. Mismatched lengths yield 0.0.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut lanes = [0.0f32; LANES];
    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let tail: f32 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| x * y)
        .sum();

    for (x, y) in a_chunks.zip(b_chunks) {
        for lane in 0..LANES {
            lanes[lane] += x[lane] * y[lane];
        }
    }

    lanes.iter().sum::<f32>() + tail
}

/// Euclidean length
#[inline]
pub fn norm(v: &[f32]) -> f32 {
    dot_product(v, v).sqrt()
}
