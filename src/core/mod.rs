//! Core business logic - framework-agnostic workflows over the entities.
//!
//! Every workflow here takes a database connection and returns `Result`;
//! nothing in this layer knows about HTTP. The closed enums in this module
//! are the single canonical representation of the string fields stored on
//! the entities - parsing happens once at the boundary, never at read sites.

/// Per-topic realtime event bus
pub mod events;
/// Point settlement: ledger entries plus the cached balance
pub mod points;
/// Profile management: ensure, role selection, edits, activity feed
pub mod profile;
/// Question/answer lifecycle state machine
pub mod question;

use std::fmt;

/// The two user roles.
///
/// Stored as the canonical uppercase string; [`Role::parse`] folds the
/// legacy free-form spellings (`youth`, `Senior`, old `user_type` values)
/// into the enum once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Younger volunteer who answers questions
    Youth,
    /// Senior user who asks questions
    Senior,
}

impl Role {
    /// Parses a stored or submitted role string, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "YOUTH" => Some(Role::Youth),
            "SENIOR" => Some(Role::Senior),
            _ => None,
        }
    }

    /// Canonical stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Youth => "YOUTH",
            Role::Senior => "SENIOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question lifecycle status: `pending` -> `answered` -> `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    /// Waiting for an answer; visible in the youth marketplace
    Pending,
    /// Has at least one answer; waiting for the owner's selection
    Answered,
    /// Owner selected an answer and rated it
    Completed,
}

impl QuestionStatus {
    /// Parses a stored status string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(QuestionStatus::Pending),
            "answered" => Some(QuestionStatus::Answered),
            "completed" => Some(QuestionStatus::Completed),
            _ => None,
        }
    }

    /// Canonical stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            QuestionStatus::Pending => "pending",
            QuestionStatus::Answered => "answered",
            QuestionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Satisfaction rating supplied when selecting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfaction {
    /// "So-so" rating, worth 1 point
    Neutral,
    /// "Good" rating, worth 3 points
    Good,
    /// "Excellent" rating, worth 5 points
    Excellent,
}

impl Satisfaction {
    /// Parses a submitted rating string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "neutral" => Some(Satisfaction::Neutral),
            "good" => Some(Satisfaction::Good),
            "excellent" => Some(Satisfaction::Excellent),
            _ => None,
        }
    }

    /// Canonical stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Satisfaction::Neutral => "neutral",
            Satisfaction::Good => "good",
            Satisfaction::Excellent => "excellent",
        }
    }

    /// Points awarded to the answering profile for this rating.
    #[must_use]
    pub const fn reward_points(self) -> i64 {
        match self {
            Satisfaction::Excellent => 5,
            Satisfaction::Good => 3,
            Satisfaction::Neutral => 1,
        }
    }

    /// Ledger description written alongside the reward.
    #[must_use]
    pub const fn reward_description(self) -> &'static str {
        match self {
            Satisfaction::Excellent => "답변이 매우 좋아요로 채택되었습니다.",
            Satisfaction::Good => "답변이 좋아요로 채택되었습니다.",
            Satisfaction::Neutral => "답변이 채택되었습니다.",
        }
    }
}

impl fmt::Display for Satisfaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a point ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Points credited to the profile
    Earn,
    /// Points spent by the profile
    Use,
}

impl EntryType {
    /// Canonical stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EntryType::Earn => "EARN",
            EntryType::Use => "USE",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
