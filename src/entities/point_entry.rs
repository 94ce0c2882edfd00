//! Point ledger entity - Append-only record of balance changes.
//!
//! Entries are never mutated or deleted once created; the profile's cached
//! `points` column is a derived sum of these entries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Point ledger database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_entries")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile whose balance changed
    pub user_id: i64,
    /// Signed amount of the change (positive for EARN, negative for USE)
    pub amount: i64,
    /// Entry type string: `"EARN"` or `"USE"`
    pub entry_type: String,
    /// Human-readable description of why the balance changed
    pub description: String,
    /// Optional reference to the answer that triggered the entry
    pub related_answer_id: Option<i64>,
    /// When the entry was appended
    pub created_at: DateTimeUtc,
}

/// Defines relationships between PointEntry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
    /// Optional link to the answer that earned the points; cleared by the
    /// storage layer when the answer goes away, the entry itself is kept
    #[sea_orm(
        belongs_to = "super::answer::Entity",
        from = "Column::RelatedAnswerId",
        to = "super::answer::Column::Id",
        on_delete = "SetNull"
    )]
    Answer,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
