//! Message construction for the coach.

use promptcademy_core::scoring::RubricItem;
use serde::Serialize;
use serde_json::{json, Value};

/// System instructions for rubric scoring.
pub const SYSTEM_PROMPT: &str = "\
You are PromptCademy's coach. Score the learner's deliverable against each rubric item.
Reply with a single JSON object and nothing else, shaped as:
{\"scores\":[{\"name\":string,\"score\":integer,\"reason\":string}],\
\"total\":integer,\"summary\":string,\"actions\":[string]}
Use the rubric item names exactly. Each score is between 0 and that item's max.
\"total\" is between 0 and 100. Give at most three concrete next actions.";

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// The two scoring messages: instructions, then the JSON-encoded submission.
pub fn scoring_messages(
    deliverable: &str,
    rubric: &[RubricItem],
    context: &Value,
) -> Vec<ChatMessage> {
    let payload = json!({
        "deliverable": deliverable,
        "rubric": rubric,
        "context": context,
    });
    vec![
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user",
            content: payload.to_string(),
        },
    ]
}

/// Playground prompt: the lesson template followed by the learner's input.
pub fn playground_prompt(template: &str, user_input: &str) -> String {
    format!("{template}\n\n{user_input}")
}
