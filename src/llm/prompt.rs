//! Prompts sent with every generation.

/// System prompt: the model must answer with a bare `{summary, response}` object.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant. Your ONLY response should be a single valid JSON object, \
with no extra text, no markdown, no comments, no explanations, and no additional fields. \
The JSON object must have exactly these two keys: \"summary\" and \"response\".\n\
Example:\n\
{\"summary\": \"A brief summary of the user's question\", \"response\": \"A detailed, helpful answer.\"}\n\
Do not include any other text, formatting, or fields. If you cannot answer, still return a valid JSON object \
with both keys, and leave the values empty.";

/// Shape reminder appended to the user turn.
pub const FORMAT_INSTRUCTIONS: &str = r#"{
  "summary": "brief summary of the question",
  "response": "detailed helpful answer with proper formatting"
}"#;

/// User turn as sent to the model: the question plus the format reminder.
pub fn user_turn(user_prompt: &str) -> String {
    format!("{user_prompt}\n\nPlease provide a helpful response in this exact JSON format:\n{FORMAT_INSTRUCTIONS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_keeps_question_first() {
        let turn = user_turn("What is a lifetime?");
        assert!(turn.starts_with("What is a lifetime?\n\n"));
        assert!(turn.ends_with(FORMAT_INSTRUCTIONS));
    }

    #[test]
    fn system_prompt_names_both_keys() {
        assert!(SYSTEM_PROMPT.contains("\"summary\""));
        assert!(SYSTEM_PROMPT.contains("\"response\""));
    }
}
