//! Profile entity - Represents a registered user of either role.
//!
//! Each profile carries a cached running point balance. The cache is a
//! denormalized sum of the profile's point ledger entries and is only ever
//! updated inside the same database transaction that appends an entry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Unique identifier for the profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Email address, unique per profile
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: String,
    /// Handle shown next to questions and answers
    pub username: String,
    /// Canonical role string: `"YOUTH"` or `"SENIOR"`
    pub role: String,
    /// Cached running point balance, kept non-negative
    pub points: i64,
    /// Optional reference to an uploaded profile image
    pub profile_image: Option<String>,
    /// When the profile was created
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Profile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One profile owns many questions
    #[sea_orm(has_many = "super::question::Entity")]
    Questions,
    /// One profile authors many answers
    #[sea_orm(has_many = "super::answer::Entity")]
    Answers,
    /// One profile accumulates many point ledger entries
    #[sea_orm(has_many = "super::point_entry::Entity")]
    PointEntries,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl Related<super::point_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
