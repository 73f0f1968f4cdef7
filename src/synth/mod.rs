pub mod answer;
pub mod prompts;

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::FaqError;
use crate::llm::{ChatModel, Message};
use crate::store::types::SearchResult;

pub use answer::{AnswerFormatError, SynthesizedAnswer};

/// Turns a question plus retrieved rows into a structured answer.
pub struct Synthesizer {
    model: Arc<dyn ChatModel>,
}

impl Synthesizer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Concatenate retrieved rows in retrieval order, numbered and tagged.
    pub fn format_context(context: &[SearchResult]) -> String {
        context
            .iter()
            .enumerate()
            .map(|(i, row)| {
                format!(
                    "[{}] (category: {}, similarity: {:.2})\n{}",
                    i + 1,
                    row.category().unwrap_or("N/A"),
                    row.similarity(),
                    row.content.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn build_messages(question: &str, context: &[SearchResult]) -> Vec<Message> {
        vec![
            Message::system(prompts::SYSTEM_PROMPT),
            Message::user(format!("# User question:\n{}", question.trim())),
            Message::user(format!(
                "# Retrieved information:\n{}",
                Self::format_context(context)
            )),
        ]
    }

    pub async fn generate_response(
        &self,
        question: &str,
        context: &[SearchResult],
    ) -> Result<SynthesizedAnswer, FaqError> {
        if context.is_empty() {
            info!(question, "No context retrieved, skipping synthesis");
            return Ok(SynthesizedAnswer {
                answer: prompts::NO_CONTEXT_ANSWER.to_string(),
                thought_process: vec![
                    "The similarity search returned no matching FAQ entries.".to_string(),
                ],
                enough_context: false,
            });
        }

        let messages = Self::build_messages(question, context);
        let schema = prompts::answer_schema();
        let raw = self.model.complete(&messages, Some(&schema)).await?;
        debug!(reply_len = raw.len(), "completion received");

        let answer = SynthesizedAnswer::parse(&raw)
            .map_err(|e| FaqError::Synthesis(format!("invalid structured answer: {}", e)))?;
        info!(
            context_rows = context.len(),
            steps = answer.thought_process.len(),
            enough_context = answer.enough_context,
            "answer synthesized"
        );
        Ok(answer)
    }
}
