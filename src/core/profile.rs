//! Profile business logic - Handles profile lookup, creation, and edits.
//!
//! Profiles are created on first contact (the hosted sign-up flow of the
//! surrounding product is out of scope here) and are never hard-deleted.
//! All role strings are parsed through [`Role`] exactly once at this
//! boundary; only canonical values are ever written back.

use crate::{
    core::Role,
    entities::{Answer, Profile, Question, answer, profile},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Finds a profile by its unique ID.
pub async fn get_profile_by_id(
    db: &DatabaseConnection,
    profile_id: i64,
) -> Result<Option<profile::Model>> {
    Profile::find_by_id(profile_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a profile by email, returning None if absent.
pub async fn get_profile_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<profile::Model>> {
    Profile::find()
        .filter(profile::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fetches the profile for an email, creating it when absent.
///
/// New profiles start with the YOUTH role, zero points, and a username
/// derived from the email's local part, matching the first-sign-in
/// behavior of the product.
pub async fn ensure_profile(
    db: &DatabaseConnection,
    email: &str,
    name: Option<&str>,
) -> Result<profile::Model> {
    if let Some(existing) = get_profile_by_email(db, email).await? {
        return Ok(existing);
    }

    let fallback = email.split('@').next().unwrap_or(email).to_string();
    let display_name = name.map_or_else(|| fallback.clone(), ToString::to_string);

    let now = chrono::Utc::now();
    let new_profile = profile::ActiveModel {
        email: Set(email.to_string()),
        name: Set(display_name),
        username: Set(fallback),
        role: Set(Role::Youth.as_str().to_string()),
        points: Set(0),
        profile_image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    new_profile.insert(db).await.map_err(Into::into)
}

/// Stores the canonical role string for a profile.
///
/// Role selection is allowed at any time; the workflow treats the role as
/// stable once set but does not lock it (unspecified business intent in
/// the product).
pub async fn set_role(
    db: &DatabaseConnection,
    profile_id: i64,
    role: Role,
) -> Result<profile::Model> {
    let existing = get_profile_by_id(db, profile_id)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })?;

    let mut active: profile::ActiveModel = existing.into();
    active.role = Set(role.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Returns the parsed role of a profile, if the stored value is recognizable.
pub async fn get_role(db: &DatabaseConnection, profile_id: i64) -> Result<Option<Role>> {
    let profile = get_profile_by_id(db, profile_id)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })?;
    Ok(Role::parse(&profile.role))
}

/// Updates display fields of a profile; ignores fields passed as None.
pub async fn update_profile(
    db: &DatabaseConnection,
    profile_id: i64,
    name: Option<String>,
    username: Option<String>,
    profile_image: Option<String>,
) -> Result<profile::Model> {
    let existing = get_profile_by_id(db, profile_id)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })?;

    let mut active: profile::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(username) = username {
        active.username = Set(username);
    }
    if let Some(image) = profile_image {
        active.profile_image = Set(Some(image));
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// A recent answer by a profile, paired with its question's title.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Activity {
    /// Answer id
    pub answer_id: i64,
    /// Title of the question that was answered (falls back to the answer text)
    pub title: String,
    /// When the answer was written
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Returns the profile's most recent answers with their question titles,
/// newest first, capped at `limit`.
pub async fn get_recent_activities(
    db: &DatabaseConnection,
    profile_id: i64,
    limit: u64,
) -> Result<Vec<Activity>> {
    let rows = Answer::find()
        .filter(answer::Column::UserId.eq(profile_id))
        .order_by_desc(answer::Column::CreatedAt)
        .limit(limit)
        .find_also_related(Question)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(ans, question)| Activity {
            answer_id: ans.id,
            title: question.map_or_else(|| ans.content.clone(), |q| q.title),
            created_at: ans.created_at,
        })
        .collect())
}
