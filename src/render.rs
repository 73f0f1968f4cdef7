use crate::assistant::AskOutcome;
use crate::store::types::SearchResult;

pub fn sufficiency_label(enough_context: bool) -> &'static str {
    if enough_context {
        "✅ Sufficient"
    } else {
        "⚠️ Insufficient"
    }
}

/// Category and creation date as stored in metadata, "N/A" when absent.
pub fn result_fields(result: &SearchResult) -> (String, String) {
    let category = result.category().unwrap_or("N/A").to_string();
    let created = result
        .metadata
        .get("created_at")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| result.created_at.to_rfc3339());
    (category, created)
}

/// Markdown rendering of a full answer: answer, reasoning, sufficiency, raw matches.
pub fn render_markdown(outcome: &AskOutcome, show_results: bool) -> String {
    let mut out = format!(
        "**Q:** {}\n\n**Answer**\n{}\n",
        outcome.question, outcome.answer.answer
    );

    if !outcome.answer.thought_process.is_empty() {
        out.push_str("\n**Thought Process**\n");
        for thought in &outcome.answer.thought_process {
            out.push_str(&format!("- {}\n", thought));
        }
    }

    out.push_str(&format!(
        "\n**Context Sufficiency:** {}\n",
        sufficiency_label(outcome.answer.enough_context)
    ));

    if show_results {
        out.push_str("\n**Raw Search Results**\n");
        if outcome.results.is_empty() {
            out.push_str("_No matching entries._\n");
        }
        for (i, result) in outcome.results.iter().enumerate() {
            let (category, created) = result_fields(result);
            out.push_str(&format!(
                "\n**Result {}** | Category: {} | Created: {} | Similarity: {:.2}\n{}\n",
                i + 1,
                category,
                created,
                result.similarity(),
                result.content.trim()
            ));
        }
    }

    out
}

/// Split text into chunks of at most `max_len` bytes, preferring line then
/// word boundaries. A character wider than `max_len` becomes its own chunk.
pub fn chunk_message(text: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(max_len);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        if chunk_len == 0 {
            chunk_len = remaining.chars().next().map_or(remaining.len(), char::len_utf8);
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}
