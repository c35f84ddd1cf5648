//! Relative-score fusion of a dense and a lexical result list.
//!
//! Each list is min-max normalized on its own, then blended as
//! `alpha * dense + (1 - alpha) * lexical`. A hit missing from one list contributes 0 from that
//! side. A list whose scores are all equal normalizes to 1.0.

use std::collections::HashMap;

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
	pub id: String,
	pub score: f32,
	pub payload: Map<String, Value>,
}

pub fn fuse(dense: Vec<Hit>, lexical: Vec<Hit>, alpha: f32, limit: usize) -> Vec<Hit> {
	let alpha = alpha.clamp(0.0, 1.0);
	let dense = normalize(dense);
	let lexical = normalize(lexical);
	let mut fused: HashMap<String, Hit> = HashMap::with_capacity(dense.len() + lexical.len());

	for (mut hit, weight) in dense
		.into_iter()
		.map(|hit| (hit, alpha))
		.chain(lexical.into_iter().map(|hit| (hit, 1.0 - alpha)))
	{
		let contribution = hit.score * weight;

		match fused.get_mut(&hit.id) {
			Some(existing) => existing.score += contribution,
			None => {
				hit.score = contribution;

				fused.insert(hit.id.clone(), hit);
			},
		}
	}

	let mut out = fused.into_values().collect::<Vec<_>>();

	out.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
	out.truncate(limit);

	out
}

fn normalize(mut hits: Vec<Hit>) -> Vec<Hit> {
	let Some(min) = hits.iter().map(|hit| hit.score).reduce(f32::min) else {
		return hits;
	};
	let max = hits.iter().map(|hit| hit.score).fold(min, f32::max);
	let range = max - min;

	for hit in &mut hits {
		hit.score = if range <= f32::EPSILON { 1.0 } else { (hit.score - min) / range };
	}

	hits
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(id: &str, score: f32) -> Hit {
		Hit { id: id.to_string(), score, payload: Map::new() }
	}

	#[test]
	fn blends_normalized_scores() {
		let dense = vec![hit("a", 0.9), hit("b", 0.5), hit("c", 0.1)];
		let lexical = vec![hit("c", 12.0), hit("b", 2.0)];
		let fused = fuse(dense, lexical, 0.5, 10);
		let scores: HashMap<&str, f32> = fused.iter().map(|h| (h.id.as_str(), h.score)).collect();

		assert!((scores["a"] - 0.5).abs() < 1e-6);
		assert!((scores["b"] - 0.25).abs() < 1e-6);
		assert!((scores["c"] - 0.5).abs() < 1e-6);
		assert_eq!(fused.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), vec!["a", "c", "b"]);
	}

	#[test]
	fn alpha_one_ignores_lexical_scores() {
		let fused = fuse(vec![hit("a", 0.2), hit("b", 0.8)], vec![hit("a", 50.0)], 1.0, 1);

		assert_eq!(fused.len(), 1);
		assert_eq!(fused[0].id, "b");
		assert!((fused[0].score - 1.0).abs() < 1e-6);
	}

	#[test]
	fn single_hit_list_normalizes_to_one() {
		let fused = fuse(Vec::new(), vec![hit("only", 3.3)], 0.25, 5);

		assert!((fused[0].score - 0.75).abs() < 1e-6);
	}
}
