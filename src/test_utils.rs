//! Shared test utilities.
//!
//! Helpers for setting up in-memory test databases and creating test
//! profiles and questions with sensible defaults.

use crate::{core::question, entities::profile, errors::Result};
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a profile with the given email and raw role string.
///
/// The role is stored verbatim so tests can exercise legacy spellings
/// (`youth`, `Senior`) as well as the canonical uppercase values.
pub async fn create_test_profile(
    db: &DatabaseConnection,
    email: &str,
    role: &str,
) -> Result<profile::Model> {
    let username = email.split('@').next().unwrap_or(email).to_string();
    let now = chrono::Utc::now();
    let model = profile::ActiveModel {
        email: Set(email.to_string()),
        name: Set(username.clone()),
        username: Set(username),
        role: Set(role.to_string()),
        points: Set(0),
        profile_image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Sets up a database with one SENIOR and one YOUTH profile, the minimal
/// cast for a question/answer lifecycle.
pub async fn setup_with_participants(
) -> Result<(DatabaseConnection, profile::Model, profile::Model)> {
    let db = setup_test_db().await?;
    let senior = create_test_profile(&db, "senior@example.com", "SENIOR").await?;
    let youth = create_test_profile(&db, "youth@example.com", "YOUTH").await?;
    Ok((db, senior, youth))
}

/// Creates a pending question with the given title and valid default
/// content.
pub async fn create_test_question(
    db: &DatabaseConnection,
    user_id: i64,
    title: &str,
) -> Result<crate::entities::question::Model> {
    question::create_question(
        db,
        user_id,
        title.to_string(),
        "도움이 필요한 충분히 긴 질문 내용입니다".to_string(),
        None,
        None,
        false,
    )
    .await
}
