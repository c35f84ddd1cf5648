//! Reducer for the working document set.
//!
//! Every join point in the workflow funnels document updates through [`merge`]. The rule is:
//!
//! 1. An empty update clears the set.
//! 2. An update whose ids are all already present and which is strictly smaller than the current
//!    set is a filter: it replaces the set verbatim, keeping its own order.
//! 3. Anything else is a merge: the current set keeps its order and new documents are appended,
//!    skipping any whose id or content signature was already seen.
//!
//! Rule 2 is inferred from the shape of the update, not declared by the caller. A late branch
//! that only re-finds a strict subset of already-merged documents is therefore treated as a
//! filter and narrows the set. Callers that fold branch results should skip empty contributions
//! instead of passing them here, since rule 1 would otherwise wipe sibling results.

use std::collections::HashSet;

use crate::document::{ContentSignature, Document};

pub fn merge(existing: &[Document], incoming: Vec<Document>) -> Vec<Document> {
	if incoming.is_empty() {
		return Vec::new();
	}
	if is_filter(existing, &incoming) {
		return incoming;
	}

	let mut seen_ids: HashSet<String> = HashSet::with_capacity(existing.len() + incoming.len());
	let mut seen_signatures: HashSet<ContentSignature> =
		HashSet::with_capacity(existing.len() + incoming.len());
	let mut out = Vec::with_capacity(existing.len() + incoming.len());

	for doc in existing.iter().cloned().chain(incoming) {
		let signature = doc.signature();

		if seen_ids.contains(&doc.id) || seen_signatures.contains(&signature) {
			continue;
		}

		seen_ids.insert(doc.id.clone());
		seen_signatures.insert(signature);
		out.push(doc);
	}

	out
}

fn is_filter(existing: &[Document], incoming: &[Document]) -> bool {
	if incoming.len() >= existing.len() {
		return false;
	}

	let existing_ids: HashSet<&str> = existing.iter().map(|doc| doc.id.as_str()).collect();

	incoming.iter().all(|doc| existing_ids.contains(doc.id.as_str()))
}
