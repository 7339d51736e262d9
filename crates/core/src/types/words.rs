//! Word submission validation.

/// Maximum length of a single submitted word.
pub const MAX_WORD_LENGTH: usize = 20;

/// Maximum length of an optional submitter name.
pub const MAX_SUBMITTER_NAME_LENGTH: usize = 30;

/// Which of the three words failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordPosition {
    First,
    Second,
    Third,
}

impl WordPosition {
    const fn ordinal(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
        }
    }
}

/// Errors that can occur when validating a word submission.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    /// A word is empty or longer than [`MAX_WORD_LENGTH`].
    #[error("All three words are required ({} word must be 1-20 characters)", .position.ordinal())]
    MissingWord {
        /// Position of the offending word.
        position: WordPosition,
    },
    /// The submitter name is longer than [`MAX_SUBMITTER_NAME_LENGTH`].
    #[error("Name must be at most 30 characters")]
    SubmitterNameTooLong,
}

/// Validate the user-supplied parts of a word submission.
///
/// Duplicate words within one submission are allowed. Lengths are counted
/// in characters and no trimming is applied.
///
/// # Errors
///
/// Returns [`SubmissionError::MissingWord`] for the first word that is empty
/// or too long, then [`SubmissionError::SubmitterNameTooLong`] if a name is
/// present and too long.
pub fn validate_word_submission(
    word1: &str,
    word2: &str,
    word3: &str,
    submitter_name: Option<&str>,
) -> Result<(), SubmissionError> {
    let words = [
        (WordPosition::First, word1),
        (WordPosition::Second, word2),
        (WordPosition::Third, word3),
    ];

    for (position, word) in words {
        let length = word.chars().count();
        if length == 0 || length > MAX_WORD_LENGTH {
            return Err(SubmissionError::MissingWord { position });
        }
    }

    if let Some(name) = submitter_name
        && name.chars().count() > MAX_SUBMITTER_NAME_LENGTH
    {
        return Err(SubmissionError::SubmitterNameTooLong);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission() {
        assert!(validate_word_submission("kind", "funny", "loud", None).is_ok());
        assert!(validate_word_submission("a", "b", "c", Some("Sam")).is_ok());
    }

    #[test]
    fn test_duplicate_words_allowed() {
        assert!(validate_word_submission("cat", "cat", "cat", None).is_ok());
    }

    #[test]
    fn test_empty_word_rejected() {
        assert_eq!(
            validate_word_submission("kind", "", "loud", None),
            Err(SubmissionError::MissingWord {
                position: WordPosition::Second
            })
        );
    }

    #[test]
    fn test_long_word_rejected() {
        let long = "w".repeat(21);
        assert_eq!(
            validate_word_submission("kind", "funny", &long, None),
            Err(SubmissionError::MissingWord {
                position: WordPosition::Third
            })
        );
        assert!(validate_word_submission(&"w".repeat(20), "b", "c", None).is_ok());
    }

    #[test]
    fn test_first_bad_word_reported() {
        assert_eq!(
            validate_word_submission("", "", "", None),
            Err(SubmissionError::MissingWord {
                position: WordPosition::First
            })
        );
    }

    #[test]
    fn test_submitter_name_too_long() {
        let name = "n".repeat(31);
        assert_eq!(
            validate_word_submission("a", "b", "c", Some(&name)),
            Err(SubmissionError::SubmitterNameTooLong)
        );
        assert!(validate_word_submission("a", "b", "c", Some(&"n".repeat(30))).is_ok());
    }

    #[test]
    fn test_word_errors_take_precedence_over_name() {
        let name = "n".repeat(31);
        assert!(matches!(
            validate_word_submission("", "b", "c", Some(&name)),
            Err(SubmissionError::MissingWord { .. })
        ));
    }

    #[test]
    fn test_error_message_names_position() {
        let err = SubmissionError::MissingWord {
            position: WordPosition::Second,
        };
        assert!(err.to_string().contains("second word"));
    }
}
