//! Prompt construction for multiple-choice questions.

use crate::model::Answers;
use crate::traits::ChatMessage;

/// Persona given to the model for every question.
pub const SYSTEM_PROMPT: &str = "You are a security expert who answers questions.";

/// Format instructions and worked examples appended after the options.
const INSTRUCTIONS: &str = "Choose the correct answer ( A, B, C, D ) only. Always return a single character corresponding to the correct answer, no other character is allowed. You can reason internally, but never ever disclose any explanation or steps for how you found the answer. See the example below:

Example #1:

Question: What color is the sky?
Options:
A -> Blue
B -> Green
C -> Yellow
D -> Red

Your answer should be: A

Example #2:

Question: Which of these options is a number?
Options:
A -> Green
B -> 1
C -> Blue
D -> Red

Your answer should be: B
";

/// Render the user message for a question.
pub fn build_user_prompt(question: &str, answers: &Answers) -> String {
    let mut prompt = format!("Question: {question}\nOptions: \n");
    for (letter, text) in answers.iter() {
        prompt.push_str(&format!("{letter} -> {text} \n"));
    }
    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt
}

/// The fixed two-message conversation sent for every attempt.
pub fn build_messages(question: &str, answers: &Answers) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(question, answers)),
    ]
}
