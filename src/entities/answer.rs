//! Answer entity - A youth volunteer's response to a question.
//!
//! Many answers may exist per question; at most one carries
//! `is_selected = true`, enforced by the selection workflow's
//! compare-and-swap update.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Answer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answers")]
pub struct Model {
    /// Unique identifier for the answer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Question this answer responds to
    pub question_id: i64,
    /// Profile that authored the answer
    pub user_id: i64,
    /// Free-text body of the answer
    pub content: String,
    /// Whether the question owner selected this answer
    pub is_selected: bool,
    /// When the answer was created
    pub created_at: DateTimeUtc,
    /// When the answer was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Answer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each answer belongs to one question; removed by the storage cascade
    /// when the question is hard-deleted
    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::Id",
        on_delete = "Cascade"
    )]
    Question,
    /// Each answer belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
