use serde_json::{json, Value};

pub const SYSTEM_PROMPT: &str = r#"# Role and Purpose
You are an AI assistant for an FAQ system. Your task is to synthesize a coherent and helpful answer
based on the given question and relevant context retrieved from a knowledge database.

# Guidelines
1. Provide a clear and concise answer to the question.
2. Use only the information from the relevant context to support your answer.
3. The context is retrieved based on cosine similarity, so some information might be missing or irrelevant.
4. Be transparent when there is insufficient information to fully answer the question.
5. Do not make up or infer information not present in the provided context.
6. If you cannot answer the question based on the given context, clearly state that.
7. Maintain a helpful and professional tone appropriate for customer service.
8. Adhere strictly to company guidelines and policies by using only the provided knowledge base.

Review the question from the user and respond with a JSON object containing:
- "thought_process": the ordered list of reasoning steps you took
- "answer": the final answer text
- "enough_context": true only if the context was sufficient to answer confidently"#;

/// Answer returned without calling the model when retrieval found nothing.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any stored FAQ entries related to your question, so I can't answer it confidently.";

/// `response_format` requesting the three-field structured answer.
pub fn answer_schema() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "synthesized_answer",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "thought_process": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Reasoning steps taken to reach the answer"
                    },
                    "answer": {
                        "type": "string",
                        "description": "The synthesized answer to the user's question"
                    },
                    "enough_context": {
                        "type": "boolean",
                        "description": "Whether the assistant has enough context to answer the question"
                    }
                },
                "required": ["thought_process", "answer", "enough_context"],
                "additionalProperties": false
            }
        }
    })
}
