//! Point settlement business logic.
//!
//! Every balance change appends one immutable ledger entry and updates the
//! profile's cached `points` column in the same database transaction. The
//! cache bump is a single atomic SQL UPDATE (`points = points + delta`), so
//! no read-modify-write race exists between concurrent settlements. The
//! ledger is append-only: nothing in this module updates or deletes entries.

use crate::{
    core::EntryType,
    entities::{PointEntry, Profile, point_entry, profile},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Atomically adds `delta` to a profile's cached point balance.
///
/// Uses `UPDATE profiles SET points = points + delta WHERE id = ?` rather
/// than read-then-write, so concurrent settlements cannot lose updates.
/// Callers must run this inside the same transaction that appends the
/// corresponding ledger entry.
pub async fn update_profile_points_atomic<C>(
    db: &C,
    profile_id: i64,
    delta: i64,
) -> Result<profile::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    // First verify the profile exists
    let _profile = Profile::find_by_id(profile_id)
        .one(db)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })?;

    Profile::update_many()
        .col_expr(
            profile::Column::Points,
            Expr::col(profile::Column::Points).add(delta),
        )
        .filter(profile::Column::Id.eq(profile_id))
        .exec(db)
        .await?;

    Profile::find_by_id(profile_id)
        .one(db)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })
}

/// Appends an EARN ledger entry and bumps the cached balance, using the
/// caller's connection. Run this inside an open transaction when the award
/// must settle together with other mutations (answer selection does).
pub async fn award_points_in<C>(
    db: &C,
    profile_id: i64,
    amount: i64,
    description: &str,
    related_answer_id: Option<i64>,
) -> Result<point_entry::Model>
where
    C: ConnectionTrait,
{
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    // The profile must exist before the entry is appended, so a missing
    // recipient surfaces as not-found instead of an FK violation
    Profile::find_by_id(profile_id)
        .one(db)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })?;

    let entry = point_entry::ActiveModel {
        user_id: Set(profile_id),
        amount: Set(amount),
        entry_type: Set(EntryType::Earn.as_str().to_string()),
        description: Set(description.to_string()),
        related_answer_id: Set(related_answer_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let entry = entry.insert(db).await?;

    update_profile_points_atomic(db, profile_id, amount).await?;

    Ok(entry)
}

/// Awards points to a profile as a standalone settlement.
///
/// Wraps [`award_points_in`] in its own transaction so the ledger entry and
/// the cache bump commit as one unit.
pub async fn award_points(
    db: &DatabaseConnection,
    profile_id: i64,
    amount: i64,
    description: &str,
    related_answer_id: Option<i64>,
) -> Result<point_entry::Model> {
    let txn = db.begin().await?;
    let entry = award_points_in(&txn, profile_id, amount, description, related_answer_id).await?;
    txn.commit().await?;
    Ok(entry)
}

/// Spends points from a profile's balance.
///
/// Appends a USE ledger entry with a negative amount and decrements the
/// cached balance in one transaction. Rejects when the balance would go
/// negative.
pub async fn use_points(
    db: &DatabaseConnection,
    profile_id: i64,
    amount: i64,
    description: &str,
) -> Result<point_entry::Model> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    let profile = Profile::find_by_id(profile_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })?;

    if profile.points < amount {
        return Err(Error::InsufficientPoints {
            current: profile.points,
            required: amount,
        });
    }

    let entry = point_entry::ActiveModel {
        user_id: Set(profile_id),
        amount: Set(-amount),
        entry_type: Set(EntryType::Use.as_str().to_string()),
        description: Set(description.to_string()),
        related_answer_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let entry = entry.insert(&txn).await?;

    update_profile_points_atomic(&txn, profile_id, -amount).await?;

    txn.commit().await?;
    Ok(entry)
}

/// Retrieves a profile's ledger entries, newest first.
pub async fn get_point_history(
    db: &DatabaseConnection,
    profile_id: i64,
) -> Result<Vec<point_entry::Model>> {
    PointEntry::find()
        .filter(point_entry::Column::UserId.eq(profile_id))
        .order_by_desc(point_entry::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Balance summary derived from the cached total and the ledger.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PointSummary {
    /// Cached running balance from the profile row
    pub total_points: i64,
    /// Sum of all EARN entries
    pub total_earned: i64,
    /// Absolute sum of all USE entries
    pub total_used: i64,
}

/// Computes the point summary for a profile.
pub async fn get_point_summary(db: &DatabaseConnection, profile_id: i64) -> Result<PointSummary> {
    let profile = Profile::find_by_id(profile_id)
        .one(db)
        .await?
        .ok_or(Error::ProfileNotFound { id: profile_id })?;

    let entries = get_point_history(db, profile_id).await?;
    let total_earned = entries.iter().filter(|e| e.amount > 0).map(|e| e.amount).sum();
    let total_used = entries
        .iter()
        .filter(|e| e.amount < 0)
        .map(|e| -e.amount)
        .sum();

    Ok(PointSummary {
        total_points: profile.points,
        total_earned,
        total_used,
    })
}
