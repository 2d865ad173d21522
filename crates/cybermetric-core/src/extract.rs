//! Answer extraction from free-text model output.

use crate::model::Answer;

/// Extract the chosen option from a model response.
///
/// Returns the first `A`-`D` letter (either case) that stands on its own,
/// i.e. is not glued to another letter or digit. Surrounding punctuation and
/// explanation text are ignored, so `"B, not A"`, `"(b)"` and
/// `"The answer is B because..."` all yield `B`, while letters inside words
/// (`"I cannot answer"`) never count. Empty or whitespace-only input yields
/// `None`.
pub fn extract_answer(response: &str) -> Option<Answer> {
    let text = response.trim();
    if text.is_empty() {
        return None;
    }

    let chars: Vec<char> = text.chars().collect();
    chars.iter().enumerate().find_map(|(i, &c)| {
        let answer = Answer::from_char(c)?;
        let before = i.checked_sub(1).map(|j| chars[j]);
        let after = chars.get(i + 1).copied();
        let standalone = !before.is_some_and(char::is_alphanumeric)
            && !after.is_some_and(char::is_alphanumeric);
        standalone.then_some(answer)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_letter() {
        assert_eq!(extract_answer("A"), Some(Answer::A));
        assert_eq!(extract_answer("  d"), Some(Answer::D));
        assert_eq!(extract_answer("c\n"), Some(Answer::C));
    }

    #[test]
    fn first_letter_wins() {
        assert_eq!(extract_answer("B, not A"), Some(Answer::B));
        assert_eq!(extract_answer("D or C"), Some(Answer::D));
    }

    #[test]
    fn letter_inside_explanation() {
        assert_eq!(
            extract_answer("The answer is B because..."),
            Some(Answer::B)
        );
        assert_eq!(extract_answer("Answer: D"), Some(Answer::D));
        assert_eq!(extract_answer("Your answer should be: A"), Some(Answer::A));
    }

    #[test]
    fn punctuated_letters() {
        assert_eq!(extract_answer("(c)"), Some(Answer::C));
        assert_eq!(extract_answer("**B**"), Some(Answer::B));
        assert_eq!(extract_answer("A."), Some(Answer::A));
        assert_eq!(extract_answer("-> d"), Some(Answer::D));
    }

    #[test]
    fn no_letter_is_absent() {
        assert_eq!(extract_answer(""), None);
        assert_eq!(extract_answer("   \n\t"), None);
        assert_eq!(extract_answer("42!?"), None);
        assert_eq!(extract_answer("E, F or G"), None);
        assert_eq!(extract_answer("... --- ..."), None);
    }

    #[test]
    fn letters_inside_words_do_not_count() {
        assert_eq!(extract_answer("I cannot answer that"), None);
        assert_eq!(extract_answer("abcd"), None);
        assert_eq!(extract_answer("B2"), None);
    }
}
