// Listing and message validation rules.
//
// Listings collect every violation so the seller can fix the whole form in
// one pass; chat messages report only the first failing rule. Both are
// pure checks - issuing warnings for violations is an explicit, separate
// call on the moderation service.

use super::profanity::ProfanityMatcher;

/// Bounds for listing and message content, in characters.
pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MIN_CHARS: usize = 20;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// Result of validating a listing. Errors appear in rule-check order:
/// length checks before content checks, title before description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Result of validating a chat message: at most one error, the first
/// applicable rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCheck {
    pub valid: bool,
    pub error: Option<String>,
}

impl MessageCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Applies length and profanity rules to user-supplied text.
pub struct ContentValidator {
    matcher: ProfanityMatcher,
}

impl ContentValidator {
    pub fn new(matcher: ProfanityMatcher) -> Self {
        Self { matcher }
    }

    /// Validate a listing's title and description.
    ///
    /// All rules are evaluated and every violation is collected, so the
    /// result is stable for identical input.
    pub fn validate_listing(&self, title: &str, description: &str) -> ValidationResult {
        let mut errors = Vec::new();

        let title_len = title.chars().count();
        if title_len < TITLE_MIN_CHARS {
            errors.push(format!(
                "Title must be at least {} characters",
                TITLE_MIN_CHARS
            ));
        } else if title_len > TITLE_MAX_CHARS {
            errors.push(format!("Title must be at most {} characters", TITLE_MAX_CHARS));
        }

        let description_len = description.chars().count();
        if description_len < DESCRIPTION_MIN_CHARS {
            errors.push(format!(
                "Description must be at least {} characters",
                DESCRIPTION_MIN_CHARS
            ));
        } else if description_len > DESCRIPTION_MAX_CHARS {
            errors.push(format!(
                "Description must be at most {} characters",
                DESCRIPTION_MAX_CHARS
            ));
        }

        if self.matcher.scan(title).is_some() {
            errors.push("Title contains inappropriate language".to_string());
        }
        if self.matcher.scan(description).is_some() {
            errors.push("Description contains inappropriate language".to_string());
        }

        ValidationResult::from_errors(errors)
    }

    /// Validate a chat message. Returns only the first failing rule:
    /// empty content, then length, then profanity.
    pub fn validate_message(&self, content: &str) -> MessageCheck {
        if content.trim().is_empty() {
            return MessageCheck::rejected("Message cannot be empty");
        }
        if content.chars().count() > MESSAGE_MAX_CHARS {
            return MessageCheck::rejected(format!(
                "Message is too long (max {} characters)",
                MESSAGE_MAX_CHARS
            ));
        }
        if self.matcher.scan(content).is_some() {
            return MessageCheck::rejected("Message contains inappropriate language");
        }
        MessageCheck::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::profanity::{LanguageList, WordLists};

    fn validator() -> ContentValidator {
        let lists = WordLists::new(vec![LanguageList {
            language: "en".to_string(),
            words: vec!["badword".to_string()],
        }]);
        ContentValidator::new(ProfanityMatcher::new(&lists).unwrap())
    }

    const GOOD_DESCRIPTION: &str = "This is a fine description of reasonable length.";

    #[test]
    fn accepts_valid_listing() {
        let result = validator().validate_listing("Desk lamp, barely used", GOOD_DESCRIPTION);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn short_title_is_the_only_error() {
        let result = validator().validate_listing("Hi", GOOD_DESCRIPTION);

        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Title must be at least 3 characters"]);
    }

    #[test]
    fn collects_all_violations_in_rule_order() {
        let result = validator().validate_listing("Hi", "badword");

        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "Title must be at least 3 characters",
                "Description must be at least 20 characters",
                "Description contains inappropriate language",
            ]
        );
    }

    #[test]
    fn rejects_out_of_bounds_lengths() {
        let v = validator();

        let long_title = "x".repeat(201);
        let result = v.validate_listing(&long_title, GOOD_DESCRIPTION);
        assert_eq!(result.errors, vec!["Title must be at most 200 characters"]);

        let long_description = "x".repeat(2001);
        let result = v.validate_listing("Desk lamp", &long_description);
        assert_eq!(
            result.errors,
            vec!["Description must be at most 2000 characters"]
        );
    }

    #[test]
    fn boundary_lengths_are_accepted() {
        let v = validator();

        let title_min = "x".repeat(3);
        let title_max = "x".repeat(200);
        let desc_min = "x".repeat(20);
        let desc_max = "x".repeat(2000);

        assert!(v.validate_listing(&title_min, &desc_min).valid);
        assert!(v.validate_listing(&title_max, &desc_max).valid);
    }

    #[test]
    fn flags_profanity_in_title_and_description() {
        let result = validator().validate_listing("badword for sale", "badword badword badword badword");

        assert_eq!(
            result.errors,
            vec![
                "Title contains inappropriate language",
                "Description contains inappropriate language",
            ]
        );
    }

    #[test]
    fn listing_validation_is_idempotent() {
        let v = validator();
        let first = v.validate_listing("Hi", "too short");
        let second = v.validate_listing("Hi", "too short");
        assert_eq!(first, second);
    }

    #[test]
    fn message_rules_short_circuit() {
        let v = validator();

        let empty = v.validate_message("");
        assert_eq!(
            empty,
            MessageCheck {
                valid: false,
                error: Some("Message cannot be empty".to_string()),
            }
        );

        // Whitespace-only counts as empty.
        assert!(!v.validate_message("   ").valid);

        let long = v.validate_message(&"a".repeat(1001));
        assert_eq!(
            long.error.as_deref(),
            Some("Message is too long (max 1000 characters)")
        );

        // Over-long AND profane still reports only the length error.
        let both = v.validate_message(&format!("badword {}", "a".repeat(1000)));
        assert_eq!(
            both.error.as_deref(),
            Some("Message is too long (max 1000 characters)")
        );

        let profane = v.validate_message("you badword");
        assert_eq!(
            profane.error.as_deref(),
            Some("Message contains inappropriate language")
        );

        assert!(v.validate_message("hey, is the lamp still available?").valid);
    }

    #[test]
    fn message_at_max_length_is_accepted() {
        assert!(validator().validate_message(&"a".repeat(1000)).valid);
    }
}
