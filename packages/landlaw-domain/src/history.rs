use std::sync::LazyLock;

use regex::Regex;

use crate::message::{Message, Role};

pub const EMPTY_HISTORY: &str = "Chưa có lịch sử hội thoại (đây là câu hỏi đầu tiên).";

static ARTICLE_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"Điều\s+\d+").expect("article regex is valid"));

/// Renders prior turns for a prompt. The last `keep_recent_turns` question/answer pairs are kept
/// verbatim; older human turns collapse into the list of articles they mentioned.
pub fn format_conversation_history(messages: &[Message], keep_recent_turns: usize) -> String {
	if messages.is_empty() {
		return String::new();
	}

	let recent_count = (keep_recent_turns * 2).min(messages.len());
	let (old, recent) = messages.split_at(messages.len() - recent_count);
	let mut formatted = String::new();

	if !old.is_empty() {
		let mut topics: Vec<&str> = Vec::new();

		for message in old.iter().filter(|message| message.role == Role::Human) {
			let topic = ARTICLE_RE.find(&message.content).map(|found| found.as_str()).unwrap_or("chủ đề khác");

			if !topics.contains(&topic) {
				topics.push(topic);
			}
		}

		if !topics.is_empty() {
			formatted.push_str(&format!("[Lịch sử cũ - Đã thảo luận: {}]\n\n", topics.join(", ")));
		}
	}

	let recent = recent
		.iter()
		.map(|message| {
			let label = match message.role {
				Role::Human => "Người dùng",
				Role::Ai => "Trợ lý",
			};

			format!("{label}: {}", message.content)
		})
		.collect::<Vec<_>>()
		.join("\n\n");

	formatted.push_str(&recent);

	formatted
}

/// History for a generation prompt: everything before the current question.
pub fn history_before_latest(messages: &[Message], keep_recent_turns: usize) -> String {
	let prior = match messages.iter().rposition(|message| message.role == Role::Human) {
		Some(index) => &messages[..index],
		None => messages,
	};
	let formatted = format_conversation_history(prior, keep_recent_turns);

	if formatted.is_empty() { EMPTY_HISTORY.to_string() } else { formatted }
}
