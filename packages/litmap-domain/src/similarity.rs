/// Cosine similarity between two vectors, clamped to `[-1, 1]`.
///
/// Empty input, mismatched lengths, and zero-magnitude vectors all score `0.0`: a vector with no
/// direction carries no information and is treated as maximally dissimilar rather than NaN.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> f32 {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return 0.0;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return 0.0;
	}

	let score = dot / (lhs_norm.sqrt() * rhs_norm.sqrt());

	if score.is_finite() { score.clamp(-1.0, 1.0) } else { 0.0 }
}
