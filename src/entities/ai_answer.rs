//! AI answer entity - The relayed completion for an AI question.
//!
//! One-to-one with its question in practice; persisted only after the full
//! token stream has been delivered to the caller.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// AI answer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ai_answers")]
pub struct Model {
    /// Unique identifier for the AI answer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// AI question this answer responds to
    pub question_id: i64,
    /// Full accumulated completion text
    pub content: String,
    /// When the AI answer was created
    pub created_at: DateTimeUtc,
    /// When the AI answer was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between AiAnswer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each AI answer belongs to one question; removed by the storage
    /// cascade when the question is hard-deleted
    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::Id",
        on_delete = "Cascade"
    )]
    Question,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
