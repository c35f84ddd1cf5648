use std::cmp::Ordering;

use crate::document::Document;

/// Keeps documents scoring at least `threshold`, plus every unscored document.
///
/// When nothing survives, the top `min_keep` documents by score are returned instead so the
/// generation stage is not starved by a strict threshold. Output is ordered by score, highest
/// first, unscored documents last.
pub fn grade(documents: Vec<Document>, threshold: f32, min_keep: usize) -> Vec<Document> {
	let (mut kept, dropped): (Vec<_>, Vec<_>) = documents
		.into_iter()
		.partition(|doc| doc.score().map(|score| score >= threshold).unwrap_or(true));

	if kept.is_empty() {
		kept = dropped;

		sort_by_score(&mut kept);
		kept.truncate(min_keep);

		return kept;
	}

	sort_by_score(&mut kept);

	kept
}

pub fn sort_by_score(documents: &mut [Document]) {
	documents.sort_by(cmp_score_desc);
}

pub fn cmp_score_desc(a: &Document, b: &Document) -> Ordering {
	match (a.score(), b.score()) {
		(Some(a_score), Some(b_score)) => b_score.total_cmp(&a_score),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
	.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn scored(id: &str, score: f32) -> Document {
		Document::new(Some(id.to_string()), format!("nội dung {id}"), Map::new()).with_score(score)
	}

	#[test]
	fn ties_break_on_id() {
		let mut docs = vec![scored("b", 0.5), scored("a", 0.5), scored("c", 0.9)];

		sort_by_score(&mut docs);

		assert_eq!(docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["c", "a", "b"]);
	}

	#[test]
	fn zero_min_keep_allows_an_empty_result() {
		assert!(grade(vec![scored("a", 0.1)], 0.5, 0).is_empty());
	}
}
