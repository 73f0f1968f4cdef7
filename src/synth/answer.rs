use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Structured answer produced by the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedAnswer {
    pub answer: String,
    pub thought_process: Vec<String>,
    pub enough_context: bool,
}

/// Why a model reply was not a valid structured answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnswerFormatError {
    #[error("reply is not a JSON object: {0}")]
    NotJson(String),
    #[error("reply is missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("answer text is empty")]
    EmptyAnswer,
}

/// Strip one surrounding ``` / ```json fence if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn field<'a>(object: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, AnswerFormatError> {
    object.get(name).ok_or(AnswerFormatError::MissingField(name))
}

impl SynthesizedAnswer {
    /// Validate a raw model reply. No defaults are filled in: every field
    /// must be present with the right type.
    pub fn parse(raw: &str) -> Result<Self, AnswerFormatError> {
        let value: Value = serde_json::from_str(strip_code_fence(raw))
            .map_err(|e| AnswerFormatError::NotJson(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| AnswerFormatError::NotJson("top-level value is not an object".into()))?;

        let answer = field(object, "answer")?
            .as_str()
            .ok_or(AnswerFormatError::WrongType {
                field: "answer",
                expected: "a string",
            })?
            .trim()
            .to_string();
        if answer.is_empty() {
            return Err(AnswerFormatError::EmptyAnswer);
        }

        let steps_type_error = AnswerFormatError::WrongType {
            field: "thought_process",
            expected: "an array of strings",
        };
        let thought_process = field(object, "thought_process")?
            .as_array()
            .ok_or_else(|| steps_type_error.clone())?
            .iter()
            .map(|step| step.as_str().map(str::to_string).ok_or_else(|| steps_type_error.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let enough_context = field(object, "enough_context")?
            .as_bool()
            .ok_or(AnswerFormatError::WrongType {
                field: "enough_context",
                expected: "a boolean",
            })?;

        Ok(Self {
            answer,
            thought_process,
            enough_context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_reply() {
        let parsed = SynthesizedAnswer::parse(
            r#"{"thought_process": ["read context", "found definition"], "answer": "A bond is a loan.", "enough_context": true}"#,
        )
        .unwrap();
        assert_eq!(parsed.answer, "A bond is a loan.");
        assert_eq!(parsed.thought_process, vec!["read context", "found definition"]);
        assert!(parsed.enough_context);
    }

    #[test]
    fn tolerates_a_json_code_fence() {
        let raw = "```json\n{\"thought_process\": [], \"answer\": \"ok\", \"enough_context\": false}\n```";
        assert_eq!(SynthesizedAnswer::parse(raw).unwrap().answer, "ok");
    }

    #[test]
    fn names_each_failure() {
        assert!(matches!(
            SynthesizedAnswer::parse("The answer is 42"),
            Err(AnswerFormatError::NotJson(_))
        ));
        assert!(matches!(
            SynthesizedAnswer::parse("[1, 2]"),
            Err(AnswerFormatError::NotJson(_))
        ));
        assert_eq!(
            SynthesizedAnswer::parse(r#"{"answer": "x", "enough_context": true}"#),
            Err(AnswerFormatError::MissingField("thought_process"))
        );
        assert_eq!(
            SynthesizedAnswer::parse(r#"{"answer": "x", "thought_process": [1], "enough_context": true}"#),
            Err(AnswerFormatError::WrongType {
                field: "thought_process",
                expected: "an array of strings"
            })
        );
        assert_eq!(
            SynthesizedAnswer::parse(r#"{"answer": "x", "thought_process": [], "enough_context": "yes"}"#),
            Err(AnswerFormatError::WrongType {
                field: "enough_context",
                expected: "a boolean"
            })
        );
        assert_eq!(
            SynthesizedAnswer::parse(r#"{"answer": "  ", "thought_process": [], "enough_context": true}"#),
            Err(AnswerFormatError::EmptyAnswer)
        );
    }
}
