//! Vietnamese prompt builders. Each returns chat messages ready for the provider.

use serde_json::Value;

use crate::structured::{
	Decomposition, DocumentGrade, LandLawRelevance, PartialAnswer, RouteDecision, StructuredOutput,
};

pub const NO_RELEVANT_INFORMATION: &str =
	"Xin lỗi, tôi không tìm thấy thông tin liên quan trong cơ sở dữ liệu để trả lời câu hỏi của bạn.";

pub fn build_relevance_messages(question: &str) -> Vec<Value> {
	let system_prompt = "Bạn là trợ lý AI chuyên về Luật Đất đai Việt Nam 2024. \
Nhiệm vụ của bạn là xác định câu hỏi của người dùng có liên quan đến pháp luật đất đai hay không. \
Các chủ đề liên quan gồm: quyền sử dụng đất, giao đất, cho thuê đất, thu hồi đất, bồi thường, \
tái định cư, Giấy chứng nhận, chuyển nhượng, thừa kế, thế chấp quyền sử dụng đất, giá đất, \
quy hoạch sử dụng đất và thủ tục hành chính về đất đai. \
Câu hỏi chào hỏi, ngoài lề hoặc thuộc lĩnh vực pháp luật khác là không liên quan.";

	structured_messages::<LandLawRelevance>(system_prompt, format!("Câu hỏi: {question}"))
}

pub fn build_route_messages(question: &str) -> Vec<Value> {
	let system_prompt = "Bạn là chuyên gia phân tích câu hỏi pháp luật đất đai. \
Hãy phân loại câu hỏi là đơn giản hay phức tạp. \
Câu hỏi ĐƠN GIẢN hỏi về một điều luật, một khái niệm hoặc một thủ tục duy nhất (ví dụ: \"Điều 152 quy định gì?\"). \
Câu hỏi PHỨC TẠP kết hợp nhiều điều luật, so sánh nhiều chế định, hoặc gồm nhiều câu hỏi nhỏ cần tìm kiếm riêng. \
Khi phân vân, hãy chọn đơn giản.";

	structured_messages::<RouteDecision>(system_prompt, format!("Câu hỏi: {question}"))
}

pub fn build_decompose_messages(question: &str, max_sub_queries: u32) -> Vec<Value> {
	let system_prompt = format!(
		"Bạn là chuyên gia tìm kiếm văn bản Luật Đất đai 2024. \
Hãy tách câu hỏi phức tạp thành tối đa {max_sub_queries} câu truy vấn con độc lập. \
Mỗi câu truy vấn con tập trung vào một khía cạnh, dùng thuật ngữ pháp lý chính xác \
và có thể tìm kiếm riêng mà không cần ngữ cảnh của câu hỏi gốc. \
Không lặp lại cùng một ý trong nhiều câu truy vấn."
	);

	structured_messages::<Decomposition>(&system_prompt, format!("Câu hỏi: {question}"))
}

pub fn build_grade_messages(question: &str, document: &str) -> Vec<Value> {
	let system_prompt = "Bạn là chuyên gia đánh giá độ liên quan của tài liệu pháp luật. \
Tài liệu LIÊN QUAN khi nó chứa thông tin trả lời câu hỏi hoặc đề cập đến cùng điều, khoản, chủ đề. \
Tài liệu hoàn toàn không liên quan đến câu hỏi là KHÔNG LIÊN QUAN.";

	structured_messages::<DocumentGrade>(
		system_prompt,
		format!("Câu hỏi: {question}\n\nTài liệu:\n{document}"),
	)
}

pub fn build_transform_messages(question: &str) -> Vec<Value> {
	let system_prompt = "Bạn là chuyên gia tối ưu hóa truy vấn tìm kiếm luật pháp. \
Hệ thống không tìm thấy tài liệu phù hợp với câu hỏi hiện tại. \
Hãy viết lại câu hỏi để tìm kiếm tốt hơn trong Luật Đất đai 2024: \
dùng thuật ngữ pháp lý chính xác (ví dụ \"quyền sử dụng đất\" thay vì \"quyền đất\"), \
viết đầy đủ các từ viết tắt (ví dụ \"QSDĐ\" thành \"quyền sử dụng đất\"), \
bổ sung ngữ cảnh liên quan như loại đất. \
Giữ nguyên ý nghĩa câu hỏi gốc. Chỉ trả về câu hỏi đã viết lại, không trả lời.";

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": format!("Câu hỏi ban đầu: {question}") }),
	]
}

pub fn build_generation_messages(context: &str, question: &str, history: &str) -> Vec<Value> {
	let system_prompt = "Bạn là trợ lý luật sư chuyên nghiệp về Luật Đất đai Việt Nam. \
Hãy trả lời câu hỏi chỉ dựa trên các điều luật được cung cấp.\n\
1. Trích dẫn rõ điều, khoản (ví dụ: \"Theo Điều 260, Khoản 12 Luật Đất đai 2024...\").\n\
2. Giải thích bằng ngôn ngữ dễ hiểu, chia thành các ý chính khi cần.\n\
3. Nêu rõ điều kiện, ngoại lệ và thời hạn hiệu lực nếu có.\n\
4. Không bịa đặt thông tin không có trong tài liệu; nếu không chắc chắn, hãy nói rõ giới hạn.\n\
5. Trả lời trực tiếp trước, sau đó mới giải thích chi tiết.";
	let user_prompt = format!(
		"Lịch sử hội thoại:\n{history}\n\nTài liệu luật:\n{context}\n\nCâu hỏi: {question}"
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

pub fn build_map_messages(document: &str, question: &str) -> Vec<Value> {
	let system_prompt = "Bạn là trợ lý phân tích văn bản Luật Đất đai 2024. \
Bạn chỉ được xem MỘT đoạn tài liệu. Hãy trích xuất những gì đoạn tài liệu này đóng góp để trả lời câu hỏi. \
Nếu đoạn tài liệu không chứa thông tin hữu ích, đặt has_answer là false và để partial_answer rỗng. \
Nếu có, tóm tắt ngắn gọn phần liên quan trong partial_answer và ghi nguồn (ví dụ \"Điều 152, Khoản 2\") \
trong source_reference. Không dùng kiến thức bên ngoài tài liệu.";

	structured_messages::<PartialAnswer>(
		system_prompt,
		format!("Câu hỏi: {question}\n\nTài liệu:\n{document}"),
	)
}

pub fn build_reduce_messages(question: &str, partial_answers: &str, history: &str) -> Vec<Value> {
	let system_prompt = "Bạn là trợ lý luật sư chuyên nghiệp về Luật Đất đai Việt Nam. \
Bạn nhận được các câu trả lời từng phần, mỗi phần rút ra từ một điều luật và có ghi nguồn. \
Hãy tổng hợp thành một câu trả lời mạch lạc, không lặp ý, giữ nguyên trích dẫn điều, khoản. \
Nếu các phần mâu thuẫn, nêu rõ sự khác biệt. Không thêm thông tin không có trong các phần.";
	let user_prompt = format!(
		"Lịch sử hội thoại:\n{history}\n\nCác câu trả lời từng phần:\n{partial_answers}\n\nCâu hỏi: {question}"
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

pub fn reject_message(question: &str) -> String {
	format!(
		"Xin lỗi, câu hỏi \"{question}\" có vẻ không liên quan đến Luật Đất đai Việt Nam 2024. \
Tôi chỉ hỗ trợ các câu hỏi về pháp luật đất đai, ví dụ: quyền sử dụng đất, thu hồi đất, \
bồi thường, cấp Giấy chứng nhận hoặc chuyển nhượng quyền sử dụng đất. \
Bạn vui lòng nhập lại câu hỏi liên quan đến Luật Đất đai nhé."
	)
}

pub fn no_answer_message(question: &str) -> String {
	format!(
		"Xin lỗi, tôi không thể tìm thấy thông tin phù hợp trong Luật Đất đai 2024 để trả lời câu hỏi của bạn.\n\n\
Câu hỏi: {question}\n\n\
Vui lòng:\n\
1. Kiểm tra lại cách diễn đạt: dùng thuật ngữ pháp lý chính xác, nêu rõ điều, khoản cụ thể nếu có.\n\
2. Tham khảo gợi ý: thay vì \"đất tôi\", hãy dùng \"quyền sử dụng đất\"; thay vì \"giấy tờ\", hãy dùng \
\"Giấy chứng nhận quyền sử dụng đất\"; nêu cụ thể loại đất (đất ở, đất nông nghiệp).\n\
3. Liên hệ chuyên gia nếu câu hỏi liên quan đến trường hợp cụ thể hoặc thủ tục hành chính.\n\n\
Bạn có thể diễn đạt lại câu hỏi để tôi hỗ trợ tốt hơn không?"
	)
}

fn structured_messages<T>(system_prompt: &str, user_prompt: String) -> Vec<Value>
where
	T: StructuredOutput,
{
	let schema = T::schema();
	let system_prompt =
		format!("{system_prompt}\nChỉ trả về JSON hợp lệ đúng theo cấu trúc sau:\n{schema}");

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}
