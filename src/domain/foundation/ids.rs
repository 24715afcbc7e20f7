//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares an `i64`-backed identifier with the conversions every store key needs.
macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

int_id!(
    /// Identifies one conversation. For chat transports this is the chat id.
    SessionId
);

int_id!(
    /// Persisted user identity. Users are keyed by the chat they talk from.
    UserId
);

int_id!(
    /// Primary key of a stored question.
    QuestionId
);

int_id!(
    /// Primary key of a stored answer option.
    AnswerOptionId
);

impl From<SessionId> for UserId {
    fn from(session: SessionId) -> Self {
        Self(session.0)
    }
}

/// Zero-based position of a category in storage order.
///
/// Users pick categories by their one-based menu number; this type is
/// always the zero-based index the store is queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIndex(usize);

impl CategoryIndex {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn as_usize(&self) -> usize {
        self.0
    }

    /// The index as a SQL offset.
    pub fn as_offset(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Display for CategoryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
