//! Question entity - A senior's request for help.
//!
//! Lifecycle status moves `pending` -> `answered` -> `completed`; the
//! satisfaction rating is only set at completion. AI questions carry
//! `is_ai_question = true` and are excluded from the youth marketplace.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Question database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    /// Unique identifier for the question
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short title shown in listings
    pub title: String,
    /// Free-text body of the question
    pub content: String,
    /// Profile that owns this question
    pub user_id: i64,
    /// Lifecycle status string: `"pending"`, `"answered"`, or `"completed"`
    pub status: String,
    /// Optional category tag for organization
    pub category: Option<String>,
    /// Optional reference to an uploaded image
    pub image_url: Option<String>,
    /// Whether this question was routed to the AI relay
    pub is_ai_question: bool,
    /// Satisfaction rating set at completion: `"neutral"`, `"good"`, or `"excellent"`
    pub satisfaction: Option<String>,
    /// When the question received its answer
    pub answered_at: Option<DateTimeUtc>,
    /// Profile that answered, once answered
    pub answered_by: Option<i64>,
    /// When the question was created
    pub created_at: DateTimeUtc,
    /// When the question was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Question and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each question belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
    /// One question has many answers
    #[sea_orm(has_many = "super::answer::Entity")]
    Answers,
    /// One AI question has at most one AI answer
    #[sea_orm(has_many = "super::ai_answer::Entity")]
    AiAnswers,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl Related<super::ai_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiAnswers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
