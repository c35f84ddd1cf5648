//! The record threaded through the workflow and its per-field reducers.

use serde::{Deserialize, Serialize};

use landlaw_domain::{
	Document, Message,
	message::{self, add_messages},
	reconcile, scoring,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
	#[serde(default)]
	pub messages: Vec<Message>,
	#[serde(default)]
	pub question: String,
	#[serde(default)]
	pub queries: Vec<String>,
	#[serde(default, rename = "isComplex")]
	pub is_complex: bool,
	#[serde(default, rename = "isRelatedToLandLaw")]
	pub is_related_to_land_law: bool,
	#[serde(default)]
	pub documents: Vec<Document>,
	#[serde(default)]
	pub answer: String,
	#[serde(default)]
	pub loop_step: u32,
}
impl AgentState {
	pub fn from_messages(messages: Vec<Message>) -> Self {
		Self { messages, ..Default::default() }
	}

	/// The question nodes should work on: the rewritten question when one exists, otherwise the
	/// latest human turn.
	pub fn active_question(&self) -> Option<&str> {
		let question = self.question.trim();

		if !question.is_empty() {
			return Some(question);
		}

		message::latest_question(&self.messages).map(str::trim).filter(|q| !q.is_empty())
	}

	/// Documents highest score first. The stored set keeps reconciler order, which is the branch
	/// fold order whenever grading keeps every document.
	pub fn ranked_documents(&self) -> Vec<Document> {
		let mut documents = self.documents.clone();

		scoring::sort_by_score(&mut documents);

		documents
	}

	/// Merges a node's partial update. `messages` append by id, `documents` go through the
	/// reconciler, `loop_step` adds, every other field replaces.
	pub fn apply(&mut self, update: StateUpdate) {
		let StateUpdate {
			messages,
			question,
			queries,
			is_complex,
			is_related_to_land_law,
			documents,
			answer,
			loop_step,
		} = update;

		if !messages.is_empty() {
			add_messages(&mut self.messages, messages);
		}
		if let Some(question) = question {
			self.question = question;
		}
		if let Some(queries) = queries {
			self.queries = queries;
		}
		if let Some(is_complex) = is_complex {
			self.is_complex = is_complex;
		}
		if let Some(related) = is_related_to_land_law {
			self.is_related_to_land_law = related;
		}
		if let Some(documents) = documents {
			self.documents = reconcile::merge(&self.documents, documents);
		}
		if let Some(answer) = answer {
			self.answer = answer;
		}

		self.loop_step += loop_step;
	}
}

/// A partial state update. `None` leaves a field untouched; `loop_step` is a delta.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
	pub messages: Vec<Message>,
	pub question: Option<String>,
	pub queries: Option<Vec<String>>,
	pub is_complex: Option<bool>,
	pub is_related_to_land_law: Option<bool>,
	pub documents: Option<Vec<Document>>,
	pub answer: Option<String>,
	pub loop_step: u32,
}
impl StateUpdate {
	pub fn documents(documents: Vec<Document>) -> Self {
		Self { documents: Some(documents), ..Default::default() }
	}

	/// A terminal reply: appended to the conversation and exposed as the answer.
	pub fn reply(text: impl Into<String>) -> Self {
		let text = text.into();

		Self { messages: vec![Message::ai(text.clone())], answer: Some(text), ..Default::default() }
	}
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn doc(id: &str) -> Document {
		Document::new(Some(id.to_string()), format!("nội dung {id}"), Map::new())
	}

	#[test]
	fn loop_step_is_additive() {
		let mut state = AgentState::default();

		state.apply(StateUpdate { loop_step: 1, ..Default::default() });
		state.apply(StateUpdate { question: Some("mới".to_string()), ..Default::default() });
		state.apply(StateUpdate { loop_step: 1, ..Default::default() });

		assert_eq!(state.loop_step, 2);
		assert_eq!(state.question, "mới");
	}

	#[test]
	fn untouched_documents_survive_other_updates() {
		let mut state = AgentState::default();

		state.apply(StateUpdate::documents(vec![doc("a"), doc("b")]));
		state.apply(StateUpdate { answer: Some("x".to_string()), ..Default::default() });

		assert_eq!(state.documents.len(), 2);

		state.apply(StateUpdate::documents(Vec::new()));

		assert!(state.documents.is_empty());
	}

	#[test]
	fn active_question_prefers_rewritten_question() {
		let mut state = AgentState::from_messages(vec![Message::human("Đất tôi bị thu hồi?")]);

		assert_eq!(state.active_question(), Some("Đất tôi bị thu hồi?"));

		state.question = "Thu hồi quyền sử dụng đất".to_string();

		assert_eq!(state.active_question(), Some("Thu hồi quyền sử dụng đất"));
	}

	#[test]
	fn ranked_documents_follow_score_after_a_full_grade() {
		let mut state = AgentState::default();
		let fold = vec![doc("a").with_score(0.6), doc("e").with_score(0.95), doc("b").with_score(0.9)];
		let mut graded = fold.clone();

		scoring::sort_by_score(&mut graded);
		state.apply(StateUpdate::documents(fold));
		state.apply(StateUpdate::documents(graded));

		assert_eq!(state.documents.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["a", "e", "b"]);
		assert_eq!(
			state.ranked_documents().iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
			vec!["e", "b", "a"]
		);
	}

	#[test]
	fn serializes_with_wire_field_names() {
		let state = AgentState { is_complex: true, is_related_to_land_law: true, ..Default::default() };
		let json = serde_json::to_value(&state).expect("Failed to encode state.");

		assert_eq!(json["isComplex"], true);
		assert_eq!(json["isRelatedToLandLaw"], true);
		assert_eq!(json["loop_step"], 0);
	}
}
