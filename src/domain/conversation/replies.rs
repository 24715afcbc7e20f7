//! User-facing reply texts.
//!
//! Every message the engine sends is built here so wording stays in one place.
//! None of these expose internal identifiers or error details.

use crate::domain::questionnaire::format_numbered;

use super::BotCommand;

pub const INVALID_CATEGORY_NUMBER: &str = "Invalid category number. Please try again.";
pub const CATEGORY_NOT_A_NUMBER: &str = "Invalid input. Please enter a category number.";
pub const INVALID_ANSWER_NUMBER: &str = "Invalid answer number. Please try again.";
pub const ANSWER_NOT_A_NUMBER: &str = "Invalid input. Please enter an answer number.";
pub const NO_QUESTIONS_IN_CATEGORY: &str = "No questions were found in the selected category.";
pub const NO_CATEGORIES: &str = "There are no categories yet. Please come back later.";
pub const QUESTIONS_CHANGED: &str =
    "The questions in this category have changed. Please choose a category again.";
pub const NO_PROPHECY: &str = "The stars are silent today. Try another category.";

/// Greeting sent on `/start`.
pub fn greeting(name: &str) -> String {
    format!("Hello, {}! \u{1F44B} Enter the number of the category you want to choose:", name)
}

/// Usage text sent on `/info`.
pub fn info() -> String {
    let mut text = String::from("This bot tells fortunes.\n");
    text.push_str(
        "Choose a category and answer a series of questions to receive a prophecy.\n",
    );
    text.push_str(&format!("To begin, press {}.\n", BotCommand::Start.command()));
    text
}

/// The numbered category menu, or a notice when none exist.
pub fn category_list<S: AsRef<str>>(categories: &[S]) -> String {
    if categories.is_empty() {
        return NO_CATEGORIES.to_string();
    }
    format!("Categories:\n{}", format_numbered(categories))
}

pub fn question(text: &str) -> String {
    format!("Question:\n{}", text)
}

pub fn answer_options<S: AsRef<str>>(options: &[S]) -> String {
    format!("Enter the number of your answer:\n{}", format_numbered(options))
}

pub fn prophecy(text: Option<&str>) -> String {
    format!("Your prophecy:\n{}", text.unwrap_or(NO_PROPHECY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_addresses_user() {
        assert!(greeting("Taras").starts_with("Hello, Taras!"));
    }

    #[test]
    fn info_mentions_start() {
        assert!(info().contains("/start"));
    }

    #[test]
    fn category_list_is_numbered() {
        assert_eq!(category_list(&["Love", "Career"]), "Categories:\n1. Love\n2. Career\n");
    }

    #[test]
    fn empty_category_list_explains_itself() {
        let empty: [&str; 0] = [];
        assert_eq!(category_list(&empty), NO_CATEGORIES);
    }

    #[test]
    fn answer_options_are_numbered() {
        assert_eq!(answer_options(&["A", "B"]), "Enter the number of your answer:\n1. A\n2. B\n");
    }

    #[test]
    fn missing_prophecy_uses_fallback() {
        assert_eq!(prophecy(None), format!("Your prophecy:\n{}", NO_PROPHECY));
        assert_eq!(prophecy(Some("Luck")), "Your prophecy:\nLuck");
    }
}
