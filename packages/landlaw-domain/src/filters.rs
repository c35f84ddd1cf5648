use serde::{Deserialize, Serialize};

use crate::document::{META_ARTICLE_ID, META_CHAPTER_ID, META_SECTION_ID};

/// Exact-match constraints on law chunk metadata. Empty values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilters {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub article_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chapter_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub section_id: Option<String>,
}
impl MetadataFilters {
	pub fn pairs(&self) -> Vec<(&'static str, &str)> {
		[
			(META_ARTICLE_ID, self.article_id.as_deref()),
			(META_CHAPTER_ID, self.chapter_id.as_deref()),
			(META_SECTION_ID, self.section_id.as_deref()),
		]
		.into_iter()
		.filter_map(|(key, value)| {
			let value = value?.trim();

			(!value.is_empty()).then_some((key, value))
		})
		.collect()
	}

	pub fn is_empty(&self) -> bool {
		self.pairs().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_values_are_not_constraints() {
		let filters = MetadataFilters {
			article_id: Some("152".to_string()),
			chapter_id: Some("  ".to_string()),
			section_id: None,
		};

		assert_eq!(filters.pairs(), vec![("article_id", "152")]);
		assert!(MetadataFilters::default().is_empty());
	}
}
