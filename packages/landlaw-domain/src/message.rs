use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	#[serde(alias = "user")]
	Human,
	#[serde(alias = "assistant")]
	Ai,
}
impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Human => "human",
			Self::Ai => "ai",
		}
	}

	/// Role name on the OpenAI-compatible chat wire.
	pub fn chat_role(self) -> &'static str {
		match self {
			Self::Human => "user",
			Self::Ai => "assistant",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	#[serde(default = "new_message_id")]
	pub id: String,
	pub role: Role,
	pub content: String,
}
impl Message {
	pub fn human(content: impl Into<String>) -> Self {
		Self { id: new_message_id(), role: Role::Human, content: content.into() }
	}

	pub fn ai(content: impl Into<String>) -> Self {
		Self { id: new_message_id(), role: Role::Ai, content: content.into() }
	}
}

/// Appends `incoming` to `existing`; a message whose id is already present replaces it in place.
pub fn add_messages(existing: &mut Vec<Message>, incoming: Vec<Message>) {
	for message in incoming {
		match existing.iter_mut().find(|current| current.id == message.id) {
			Some(current) => *current = message,
			None => existing.push(message),
		}
	}
}

pub fn latest_question(messages: &[Message]) -> Option<&str> {
	messages.iter().rev().find(|message| message.role == Role::Human).map(|message| message.content.as_str())
}

fn new_message_id() -> String {
	Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_messages_appends_new_and_replaces_known_ids() {
		let first = Message::human("Điều 152 quy định gì?");
		let mut history = vec![first.clone()];
		let edited = Message { content: "Điều 153 quy định gì?".to_string(), ..first.clone() };
		let reply = Message::ai("Theo Điều 153...");

		add_messages(&mut history, vec![edited, reply.clone()]);

		assert_eq!(history.len(), 2);
		assert_eq!(history[0].id, first.id);
		assert_eq!(history[0].content, "Điều 153 quy định gì?");
		assert_eq!(history[1], reply);
	}

	#[test]
	fn latest_question_skips_ai_turns() {
		let history =
			vec![Message::human("câu một"), Message::ai("trả lời"), Message::human("câu hai"), Message::ai("...")];

		assert_eq!(latest_question(&history), Some("câu hai"));
		assert_eq!(latest_question(&[Message::ai("x")]), None);
	}

	#[test]
	fn role_accepts_chat_aliases() {
		let message: Message =
			serde_json::from_str(r#"{"role":"user","content":"xin chào"}"#).expect("Failed to decode message.");

		assert_eq!(message.role, Role::Human);
		assert!(!message.id.is_empty());
	}
}
