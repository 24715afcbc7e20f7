//! Persisted records produced by a conversation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AnswerOptionId, QuestionId, UserId, ValidationError};

/// A user as the store knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
}

impl UserRecord {
    /// Creates a user record, falling back to a placeholder name when the
    /// transport did not supply one.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            format!("user-{}", id)
        } else {
            name.trim().to_string()
        };
        Self { id, name }
    }
}

/// One submitted answer: which option a user picked for which question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub option_id: AnswerOptionId,
}

impl AnswerEvent {
    /// Builds an answer event from resolved identifiers.
    ///
    /// Either identifier may be missing when the catalog changed between
    /// presenting the question and receiving the answer.
    pub fn resolved(
        user_id: UserId,
        question_id: Option<QuestionId>,
        option_id: Option<AnswerOptionId>,
    ) -> Result<Self, ValidationError> {
        let question_id = question_id.ok_or_else(|| ValidationError::empty_field("question_id"))?;
        let option_id = option_id.ok_or_else(|| ValidationError::empty_field("option_id"))?;
        Ok(Self {
            user_id,
            question_id,
            option_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_trims_name() {
        let user = UserRecord::new(UserId::new(1), "  Olena ");
        assert_eq!(user.name, "Olena");
    }

    #[test]
    fn user_record_defaults_blank_name() {
        let user = UserRecord::new(UserId::new(77), "   ");
        assert_eq!(user.name, "user-77");
    }

    #[test]
    fn resolved_answer_requires_question_id() {
        let result = AnswerEvent::resolved(UserId::new(1), None, Some(AnswerOptionId::new(3)));
        assert_eq!(result, Err(ValidationError::empty_field("question_id")));
    }

    #[test]
    fn resolved_answer_requires_option_id() {
        let result = AnswerEvent::resolved(UserId::new(1), Some(QuestionId::new(2)), None);
        assert_eq!(result, Err(ValidationError::empty_field("option_id")));
    }

    #[test]
    fn resolved_answer_keeps_ids() {
        let event = AnswerEvent::resolved(
            UserId::new(1),
            Some(QuestionId::new(2)),
            Some(AnswerOptionId::new(3)),
        )
        .unwrap();
        assert_eq!(event.question_id.as_i64(), 2);
        assert_eq!(event.option_id.as_i64(), 3);
    }
}
