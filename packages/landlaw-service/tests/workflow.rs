use std::{
	collections::{HashMap, HashSet},
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::{Map, Value};

use landlaw_config::LlmProviderConfig;
use landlaw_domain::{Document, Message, Role};
use landlaw_service::{
	AgentState, BoxFuture, ChatModel, Checkpointer, Error, MemoryCheckpointer, Node, Providers,
	Result, RunConfig, RunInput, RunOverrides, SearchEngine, SearchOptions, Workflow,
	nodes::{NodeContext, retrieve},
	prompts,
};

const SIMPLE_QUESTION: &str = "Điều 152 quy định gì?";
const ANSWER: &str = "Theo Điều 152 Luật Đất đai 2024, việc cấp Giấy chứng nhận được thực hiện...";
const REWRITE: &str = "Quy định tại Điều 152 Luật Đất đai 2024 về cấp Giấy chứng nhận";

struct ScriptedChat {
	related: bool,
	complex: bool,
	sub_queries: Vec<String>,
	relevance_calls: AtomicUsize,
	map_calls: AtomicUsize,
	grade_calls: AtomicUsize,
	rewrite_calls: AtomicUsize,
	answer_calls: AtomicUsize,
}
impl ScriptedChat {
	fn new(related: bool, complex: bool, sub_queries: &[&str]) -> Self {
		Self {
			related,
			complex,
			sub_queries: sub_queries.iter().map(|query| query.to_string()).collect(),
			relevance_calls: AtomicUsize::new(0),
			map_calls: AtomicUsize::new(0),
			grade_calls: AtomicUsize::new(0),
			rewrite_calls: AtomicUsize::new(0),
			answer_calls: AtomicUsize::new(0),
		}
	}
}
impl ChatModel for ScriptedChat {
	fn structured<'a>(
		&'a self,
		_: &'a LlmProviderConfig,
		messages: &'a [Value],
		schema_name: &'a str,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			let text = prompt_text(messages);
			let value = match schema_name {
				"check_land_law_relevance" => {
					self.relevance_calls.fetch_add(1, Ordering::SeqCst);

					serde_json::json!({ "is_related_to_land_law": self.related, "reasoning": "test" })
				},
				"route_query_complexity" =>
					serde_json::json!({ "is_complex": self.complex, "reasoning": "test" }),
				"decompose_query" => serde_json::json!({ "sub_queries": self.sub_queries }),
				"grade_document" => {
					self.grade_calls.fetch_add(1, Ordering::SeqCst);

					if text.contains("[lỗi]") {
						return Err(Error::Provider { message: "grade call timed out".to_string() });
					}

					serde_json::json!({ "is_relevant": true })
				},
				"map_document_answer" => {
					self.map_calls.fetch_add(1, Ordering::SeqCst);

					if text.contains("[lỗi]") {
						return Err(Error::Provider { message: "map call timed out".to_string() });
					}
					if text.contains("[có]") {
						serde_json::json!({
							"has_answer": true,
							"partial_answer": "Người sử dụng đất được cấp Giấy chứng nhận.",
							"source_reference": "Điều 152",
						})
					} else {
						serde_json::json!({ "has_answer": false })
					}
				},
				other => {
					return Err(Error::Provider { message: format!("unexpected schema {other}") });
				},
			};

			Ok(value)
		})
	}

	fn complete<'a>(
		&'a self,
		_: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			if prompt_text(messages).contains("Câu hỏi ban đầu:") {
				self.rewrite_calls.fetch_add(1, Ordering::SeqCst);

				return Ok(REWRITE.to_string());
			}

			self.answer_calls.fetch_add(1, Ordering::SeqCst);

			Ok(ANSWER.to_string())
		})
	}
}

#[derive(Default)]
struct ScriptedSearch {
	results: HashMap<String, Vec<Document>>,
	delays_ms: HashMap<String, u64>,
	failing: HashSet<String>,
	calls: AtomicUsize,
	limits: Mutex<Vec<u32>>,
}
impl ScriptedSearch {
	fn with(mut self, query: &str, documents: Vec<Document>) -> Self {
		self.results.insert(query.to_string(), documents);

		self
	}

	fn delayed(mut self, query: &str, delay_ms: u64) -> Self {
		self.delays_ms.insert(query.to_string(), delay_ms);

		self
	}

	fn failing(mut self, query: &str) -> Self {
		self.failing.insert(query.to_string());

		self
	}
}
impl SearchEngine for ScriptedSearch {
	fn hybrid_search<'a>(
		&'a self,
		query: &'a str,
		options: &'a SearchOptions,
	) -> BoxFuture<'a, Result<Vec<Document>>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.limits.lock().expect("Failed to lock limits.").push(options.limit);

			if let Some(delay_ms) = self.delays_ms.get(query) {
				tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
			}
			if self.failing.contains(query) {
				return Err(Error::Search { message: "Qdrant unavailable.".to_string() });
			}

			Ok(self.results.get(query).cloned().unwrap_or_default())
		})
	}
}

fn prompt_text(messages: &[Value]) -> String {
	messages
		.iter()
		.filter_map(|message| message.get("content").and_then(Value::as_str))
		.collect::<Vec<_>>()
		.join("\n")
}

fn law_doc(id: &str, content: &str, score: f32) -> Document {
	let mut metadata = Map::new();

	metadata.insert("source".to_string(), Value::from("Luật Đất đai 2024"));
	metadata.insert("title".to_string(), Value::from(format!("Điều {id}")));
	metadata.insert("article_id".to_string(), Value::from(id));

	Document::new(Some(id.to_string()), content, metadata).with_score(score)
}

fn run_config() -> RunConfig {
	let llm = LlmProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:9".to_string(),
		api_key: "test-key".to_string(),
		path: "/chat/completions".to_string(),
		model: "test-model".to_string(),
		temperature: 0.0,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	};

	RunConfig {
		query_llm: llm.clone(),
		response_llm: llm,
		search: Default::default(),
		workflow: Default::default(),
		generation: Default::default(),
		filters: Default::default(),
		thread_id: None,
	}
}

fn ask(question: &str) -> RunInput {
	RunInput { messages: vec![Message::human(question)] }
}

fn workflow(chat: &Arc<ScriptedChat>, search: &Arc<ScriptedSearch>) -> Workflow {
	Workflow::new(Providers::new(chat.clone(), search.clone()))
}

fn ids(documents: &[Document]) -> Vec<&str> {
	documents.iter().map(|doc| doc.id.as_str()).collect()
}

#[tokio::test]
async fn simple_question_answers_in_one_pass() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(ScriptedSearch::default().with(
		SIMPLE_QUESTION,
		vec![
			law_doc("152", "Điều 152. Cấp Giấy chứng nhận quyền sử dụng đất...", 0.92),
			law_doc("151", "Điều 151. Trường hợp không cấp Giấy chứng nhận...", 0.71),
		],
	));
	let state = workflow(&chat, &search)
		.invoke(ask(SIMPLE_QUESTION), &run_config())
		.await
		.expect("Failed to run workflow.");

	assert_eq!(state.answer, ANSWER);
	assert_eq!(state.loop_step, 0);
	assert_eq!(state.question, SIMPLE_QUESTION);
	assert_eq!(ids(&state.documents), vec!["152", "151"]);
	assert_eq!(state.messages.len(), 2);
	assert_eq!(state.messages[1].role, Role::Ai);
	assert_eq!(state.messages[1].content, ANSWER);
	assert_eq!(search.calls.load(Ordering::SeqCst), 1);
	assert_eq!(*search.limits.lock().expect("Failed to lock limits."), vec![6]);
	assert_eq!(chat.answer_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unrelated_question_is_rejected_without_search() {
	let question = "Hôm nay thời tiết thế nào?";
	let chat = Arc::new(ScriptedChat::new(false, false, &[]));
	let search = Arc::new(ScriptedSearch::default());
	let state = workflow(&chat, &search)
		.invoke(ask(question), &run_config())
		.await
		.expect("Failed to run workflow.");

	assert_eq!(state.answer, prompts::reject_message(question));
	assert_eq!(state.messages.len(), 2);
	assert_eq!(search.calls.load(Ordering::SeqCst), 0);
	assert_eq!(chat.answer_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn retries_stop_at_the_configured_bound() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(ScriptedSearch::default());
	let state = workflow(&chat, &search)
		.invoke(ask(SIMPLE_QUESTION), &run_config())
		.await
		.expect("Failed to run workflow.");

	assert_eq!(state.loop_step, 2);
	assert_eq!(search.calls.load(Ordering::SeqCst), 3);
	assert_eq!(chat.rewrite_calls.load(Ordering::SeqCst), 2);
	assert_eq!(chat.relevance_calls.load(Ordering::SeqCst), 3);
	assert_eq!(chat.answer_calls.load(Ordering::SeqCst), 0);
	assert_eq!(state.question, REWRITE);
	assert_eq!(state.answer, prompts::no_answer_message(REWRITE));
	assert!(state.documents.is_empty());
}

#[tokio::test]
async fn zero_retries_go_straight_to_no_answer() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(ScriptedSearch::default());
	let cfg = run_config()
		.with_overrides(&RunOverrides { max_retries: Some(0), ..Default::default() })
		.expect("Failed to apply overrides.");
	let state =
		workflow(&chat, &search).invoke(ask(SIMPLE_QUESTION), &cfg).await.expect("Failed to run workflow.");

	assert_eq!(state.loop_step, 0);
	assert_eq!(search.calls.load(Ordering::SeqCst), 1);
	assert_eq!(chat.rewrite_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fan_out_folds_in_query_order() {
	let chat = Arc::new(ScriptedChat::new(true, true, &[]));
	let search = Arc::new(
		ScriptedSearch::default()
			.with("q0", vec![law_doc("a", "Điều khoản A.", 0.9)])
			.with("q1", vec![law_doc("b", "Điều khoản B.", 0.9)])
			.with("q2", vec![law_doc("c", "Điều khoản C.", 0.9)])
			.delayed("q0", 60)
			.delayed("q1", 30),
	);
	let providers = Providers::new(chat.clone(), search.clone());
	let cfg = run_config();
	let ctx = NodeContext { providers: &providers, cfg: &cfg };
	let mut state = AgentState {
		messages: vec![Message::human("Câu hỏi tổng hợp")],
		question: "Câu hỏi tổng hợp".to_string(),
		queries: vec!["q0".to_string(), "q1".to_string(), "q2".to_string()],
		is_complex: true,
		is_related_to_land_law: true,
		..Default::default()
	};

	for update in retrieve::retrieve_documents(&ctx, &state).await.expect("Failed to retrieve.") {
		state.apply(update);
	}

	assert_eq!(ids(&state.documents), vec!["a", "b", "c"]);
	assert_eq!(
		state.documents.iter().map(|doc| doc.query_index()).collect::<Vec<_>>(),
		vec![Some(0), Some(1), Some(2)]
	);
	assert_eq!(*search.limits.lock().expect("Failed to lock limits."), vec![4, 4, 4]);
}

#[tokio::test]
async fn failed_branch_does_not_sink_its_siblings() {
	let chat = Arc::new(ScriptedChat::new(
		true,
		true,
		&["Điều kiện chuyển nhượng", "Thủ tục thế chấp", "Thuế chuyển nhượng"],
	));
	let search = Arc::new(
		ScriptedSearch::default()
			.with("Điều kiện chuyển nhượng", vec![law_doc("45", "Điều 45. Điều kiện...", 0.88)])
			.failing("Thủ tục thế chấp")
			.with("Thuế chuyển nhượng", vec![law_doc("153", "Điều 153. Thuế...", 0.8)]),
	);
	let state = workflow(&chat, &search)
		.invoke(ask("Điều kiện, thủ tục và thuế khi chuyển nhượng?"), &run_config())
		.await
		.expect("Failed to run workflow.");

	assert_eq!(search.calls.load(Ordering::SeqCst), 3);
	assert_eq!(ids(&state.documents), vec!["45", "153"]);
	assert_eq!(state.queries.len(), 3);
	assert_eq!(state.answer, ANSWER);
}

#[tokio::test]
async fn failed_model_grade_drops_only_that_document() {
	let chat = Arc::new(ScriptedChat::new(true, true, &["q0", "q1"]));
	let search = Arc::new(
		ScriptedSearch::default()
			.with(
				"q0",
				vec![law_doc("a", "Điều khoản A.", 0.6), law_doc("e", "Điều khoản E [lỗi].", 0.95)],
			)
			.with("q1", vec![law_doc("b", "Điều khoản B.", 0.9)]),
	);
	let mut cfg = run_config();

	cfg.workflow.llm_grading = true;

	let state = workflow(&chat, &search)
		.invoke(ask("Điều khoản A và B quy định gì?"), &cfg)
		.await
		.expect("Failed to run workflow.");

	assert_eq!(chat.grade_calls.load(Ordering::SeqCst), 3);
	assert_eq!(ids(&state.documents), vec!["b", "a"]);
	assert_eq!(chat.rewrite_calls.load(Ordering::SeqCst), 0);
	assert_eq!(chat.answer_calls.load(Ordering::SeqCst), 1);
	assert_eq!(state.answer, ANSWER);
}

fn many_documents(markers: &[&str]) -> Vec<Document> {
	markers
		.iter()
		.enumerate()
		.map(|(index, marker)| {
			law_doc(&format!("{}", 100 + index), &format!("Nội dung điều {index} {marker}"), 0.9)
		})
		.collect()
}

#[tokio::test]
async fn map_reduce_without_relevant_partials_skips_reduce() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(
		ScriptedSearch::default().with(SIMPLE_QUESTION, many_documents(&["", "", "", ""])),
	);
	let mut cfg = run_config();

	cfg.generation.map_reduce_doc_threshold = 3;

	let state =
		workflow(&chat, &search).invoke(ask(SIMPLE_QUESTION), &cfg).await.expect("Failed to run workflow.");

	assert_eq!(chat.map_calls.load(Ordering::SeqCst), 4);
	assert_eq!(chat.answer_calls.load(Ordering::SeqCst), 0);
	assert_eq!(state.answer, prompts::NO_RELEVANT_INFORMATION);
}

#[tokio::test]
async fn failed_map_call_counts_as_no_answer() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(
		ScriptedSearch::default()
			.with(SIMPLE_QUESTION, many_documents(&["[lỗi]", "[có]", "", "[lỗi]"])),
	);
	let mut cfg = run_config();

	cfg.generation.map_reduce_doc_threshold = 3;

	let state =
		workflow(&chat, &search).invoke(ask(SIMPLE_QUESTION), &cfg).await.expect("Failed to run workflow.");

	assert_eq!(chat.map_calls.load(Ordering::SeqCst), 4);
	assert_eq!(chat.answer_calls.load(Ordering::SeqCst), 1);
	assert_eq!(state.answer, ANSWER);
}

#[tokio::test]
async fn every_node_is_checkpointed_and_threads_carry_history() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(
		ScriptedSearch::default()
			.with(SIMPLE_QUESTION, vec![law_doc("152", "Điều 152. Cấp Giấy chứng nhận...", 0.9)]),
	);
	let checkpointer = Arc::new(MemoryCheckpointer::new());
	let workflow = workflow(&chat, &search).with_checkpointer(checkpointer.clone());
	let cfg = run_config().with_thread_id("thread-1");
	let first = workflow.invoke(ask(SIMPLE_QUESTION), &cfg).await.expect("Failed to run workflow.");
	let history = checkpointer.history("thread-1");

	assert_eq!(history.iter().map(|checkpoint| checkpoint.step).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
	assert_eq!(
		history.iter().map(|checkpoint| checkpoint.next_node).collect::<Vec<_>>(),
		vec![
			Some(Node::RouteQuery),
			Some(Node::RetrieveDocuments),
			Some(Node::GradeDocuments),
			Some(Node::Generate),
			None,
		]
	);
	assert_eq!(history[4].state, first);

	let latest = workflow
		.latest_checkpoint("thread-1")
		.await
		.expect("Failed to load checkpoint.")
		.expect("Expected a checkpoint.");

	assert!(latest.is_complete());

	let second = workflow
		.invoke(ask("Còn Điều 151 thì sao?"), &cfg)
		.await
		.expect("Failed to run workflow.");
	let history = checkpointer.history("thread-1");

	assert_eq!(second.messages.len(), 4);
	assert_eq!(second.messages[0].content, SIMPLE_QUESTION);
	assert_eq!(second.question, "Còn Điều 151 thì sao?");
	assert_eq!(history[5].step, 5);
	assert_ne!(history[5].run_id, history[4].run_id);
}

#[tokio::test]
async fn resume_continues_from_the_next_node() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(
		ScriptedSearch::default()
			.with(SIMPLE_QUESTION, vec![law_doc("152", "Điều 152. Cấp Giấy chứng nhận...", 0.9)]),
	);
	let recorded = Arc::new(MemoryCheckpointer::new());

	workflow(&chat, &search)
		.with_checkpointer(recorded.clone())
		.invoke(ask(SIMPLE_QUESTION), &run_config().with_thread_id("source"))
		.await
		.expect("Failed to run workflow.");

	let mut interrupted = recorded.history("source")[2].clone();

	assert_eq!(interrupted.next_node, Some(Node::GradeDocuments));

	interrupted.thread_id = "interrupted".to_string();

	let checkpointer = Arc::new(MemoryCheckpointer::new());

	checkpointer.save(&interrupted).await.expect("Failed to save checkpoint.");

	let workflow = workflow(&chat, &search).with_checkpointer(checkpointer.clone());
	let cfg = run_config();
	let state = workflow.resume("interrupted", &cfg).await.expect("Failed to resume.");
	let history = checkpointer.history("interrupted");

	assert_eq!(state.answer, ANSWER);
	assert_eq!(search.calls.load(Ordering::SeqCst), 1);
	assert_eq!(history.iter().map(|checkpoint| checkpoint.step).collect::<Vec<_>>(), vec![2, 3, 4]);
	assert!(history.iter().all(|checkpoint| checkpoint.run_id == interrupted.run_id));

	let again = workflow.resume("interrupted", &cfg).await.expect("Failed to resume.");

	assert_eq!(again, state);
	assert_eq!(checkpointer.history("interrupted").len(), 3);
}

#[tokio::test]
async fn resume_requires_a_checkpoint() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(ScriptedSearch::default());
	let without_store = workflow(&chat, &search);

	assert!(matches!(
		without_store.resume("missing", &run_config()).await,
		Err(Error::InvalidRequest { .. })
	));

	let with_store = workflow(&chat, &search).with_checkpointer(Arc::new(MemoryCheckpointer::new()));

	assert!(matches!(
		with_store.resume("missing", &run_config()).await,
		Err(Error::NotFound { .. })
	));
}

#[tokio::test]
async fn input_without_a_question_is_rejected() {
	let chat = Arc::new(ScriptedChat::new(true, false, &[]));
	let search = Arc::new(ScriptedSearch::default());
	let workflow = workflow(&chat, &search);
	let input = RunInput { messages: vec![Message::ai("Xin chào"), Message::human("   ")] };

	assert!(matches!(
		workflow.invoke(input, &run_config()).await,
		Err(Error::InvalidRequest { .. })
	));
	assert!(matches!(
		workflow.invoke(RunInput::default(), &run_config()).await,
		Err(Error::InvalidRequest { .. })
	));
	assert_eq!(chat.relevance_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn overrides_are_validated() {
	let out_of_range = RunOverrides { alpha: Some(1.5), ..Default::default() };

	assert!(matches!(run_config().with_overrides(&out_of_range), Err(Error::InvalidRequest { .. })));

	let narrowed = run_config()
		.with_overrides(&RunOverrides { docs_per_sub_query: Some(3), ..Default::default() })
		.expect("Failed to apply overrides.");

	assert_eq!(narrowed.search.docs_per_sub_query, 3);
	assert_eq!(narrowed.search.limit, 6);
}

#[test]
fn model_overrides_follow_provider_rules() {
	let swapped = run_config()
		.with_overrides(&RunOverrides {
			query_model: Some(" gpt-4o-mini ".to_string()),
			response_model: Some("gpt-4o".to_string()),
			response_temperature: Some(0.3),
			..Default::default()
		})
		.expect("Failed to apply overrides.");

	assert_eq!(swapped.query_llm.model, "gpt-4o-mini");
	assert_eq!(swapped.response_llm.model, "gpt-4o");
	assert_eq!(swapped.response_llm.temperature, 0.3);
	assert_eq!(swapped.query_llm.temperature, 0.0);

	let blank_model = RunOverrides { query_model: Some("  ".to_string()), ..Default::default() };
	let hot = RunOverrides { response_temperature: Some(2.5), ..Default::default() };

	assert!(matches!(run_config().with_overrides(&blank_model), Err(Error::InvalidRequest { .. })));
	assert!(matches!(run_config().with_overrides(&hot), Err(Error::InvalidRequest { .. })));
}
