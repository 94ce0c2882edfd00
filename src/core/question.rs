//! Question/answer lifecycle business logic.
//!
//! States move `pending` -> `answered` -> `completed`. Both transitions out
//! of a state are optimistic compare-and-swap updates (`UPDATE ... WHERE
//! status = ?` checking the affected-row count), so only one writer ever
//! wins a transition. Answer selection settles points to the answering
//! profile inside the same transaction that flips the answer and completes
//! the question: the three mutations commit or roll back as one unit.

use crate::{
    core::{QuestionStatus, Role, Satisfaction, points},
    entities::{Answer, Profile, Question, answer, point_entry, question},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// How many pending questions the marketplace listing returns.
const PENDING_LISTING_LIMIT: u64 = 50;

/// Creates a new question in the `pending` state.
///
/// Title and content are validated (title 2-100 chars, content 10-2000
/// chars, both profanity-screened). The owning profile must exist.
pub async fn create_question(
    db: &DatabaseConnection,
    user_id: i64,
    title: String,
    content: String,
    category: Option<String>,
    image_url: Option<String>,
    is_ai_question: bool,
) -> Result<question::Model> {
    crate::validation::validate_text(&title, crate::validation::TITLE_BOUNDS)?;
    crate::validation::validate_text(&content, crate::validation::QUESTION_BOUNDS)?;

    Profile::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::ProfileNotFound { id: user_id })?;

    let now = chrono::Utc::now();
    let model = question::ActiveModel {
        title: Set(title),
        content: Set(content),
        user_id: Set(user_id),
        status: Set(QuestionStatus::Pending.as_str().to_string()),
        category: Set(category),
        image_url: Set(image_url),
        is_ai_question: Set(is_ai_question),
        satisfaction: Set(None),
        answered_at: Set(None),
        answered_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Creates the `pending` question backing an AI relay request.
///
/// AI questions take the relay's free-text bounds (2-1000 chars) rather
/// than the marketplace question bounds, and derive their title from the
/// leading characters of the content.
pub async fn create_ai_question(
    db: &DatabaseConnection,
    user_id: i64,
    content: &str,
) -> Result<question::Model> {
    crate::validation::validate_text(content, crate::validation::DEFAULT_BOUNDS)?;

    Profile::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::ProfileNotFound { id: user_id })?;

    let title: String = content.chars().take(50).collect();
    let now = chrono::Utc::now();
    let model = question::ActiveModel {
        title: Set(title),
        content: Set(content.to_string()),
        user_id: Set(user_id),
        status: Set(QuestionStatus::Pending.as_str().to_string()),
        category: Set(None),
        image_url: Set(None),
        is_ai_question: Set(true),
        satisfaction: Set(None),
        answered_at: Set(None),
        answered_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Persists the accumulated completion text for an AI question and moves
/// the question to `answered`. Called after the token stream has already
/// been delivered, so callers treat failure as non-fatal and only log it.
pub async fn attach_ai_answer(
    db: &DatabaseConnection,
    question_id: i64,
    content: &str,
) -> Result<crate::entities::ai_answer::Model> {
    use crate::entities::ai_answer;

    let txn = db.begin().await?;

    let now = chrono::Utc::now();
    let model = ai_answer::ActiveModel {
        question_id: Set(question_id),
        content: Set(content.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let inserted = model.insert(&txn).await?;

    Question::update_many()
        .col_expr(
            question::Column::Status,
            Expr::value(QuestionStatus::Answered.as_str()),
        )
        .col_expr(question::Column::AnsweredAt, Expr::value(now))
        .col_expr(question::Column::UpdatedAt, Expr::value(now))
        .filter(question::Column::Id.eq(question_id))
        .filter(question::Column::Status.eq(QuestionStatus::Pending.as_str()))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(inserted)
}

/// Retrieves a question by its unique ID.
pub async fn get_question_by_id(
    db: &DatabaseConnection,
    question_id: i64,
) -> Result<Option<question::Model>> {
    Question::find_by_id(question_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Pending non-AI questions for the youth marketplace, newest first,
/// capped at 50.
pub async fn get_pending_questions(db: &DatabaseConnection) -> Result<Vec<question::Model>> {
    Question::find()
        .filter(question::Column::Status.eq(QuestionStatus::Pending.as_str()))
        .filter(question::Column::IsAiQuestion.eq(false))
        .order_by_desc(question::Column::CreatedAt)
        .limit(PENDING_LISTING_LIMIT)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All questions owned by a profile, newest first.
pub async fn get_questions_by_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<question::Model>> {
    Question::find()
        .filter(question::Column::UserId.eq(user_id))
        .order_by_desc(question::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All answers on a question, newest first.
pub async fn get_answers_for_question(
    db: &DatabaseConnection,
    question_id: i64,
) -> Result<Vec<answer::Model>> {
    Answer::find()
        .filter(answer::Column::QuestionId.eq(question_id))
        .order_by_desc(answer::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All answers written by a profile, newest first.
pub async fn get_answers_by_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<answer::Model>> {
    Answer::find()
        .filter(answer::Column::UserId.eq(user_id))
        .order_by_desc(answer::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an answer by its unique ID.
pub async fn get_answer_by_id(
    db: &DatabaseConnection,
    answer_id: i64,
) -> Result<Option<answer::Model>> {
    Answer::find_by_id(answer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Submits a YOUTH profile's answer against a `pending` question.
///
/// The pending -> answered transition is a CAS update filtered on the
/// current status; losing the race yields [`Error::QuestionAlreadyAnswered`]
/// and inserts nothing. The CAS and the answer insert share one
/// transaction.
pub async fn submit_answer(
    db: &DatabaseConnection,
    question_id: i64,
    user_id: i64,
    content: &str,
) -> Result<answer::Model> {
    // Validate what gets stored, not the raw input
    let content = content.trim();
    crate::validation::validate_text(content, crate::validation::DEFAULT_BOUNDS)?;

    let submitter = Profile::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::ProfileNotFound { id: user_id })?;
    if Role::parse(&submitter.role) != Some(Role::Youth) {
        return Err(Error::NotAuthorized {
            reason: "청년 사용자만 답변할 수 있습니다.".to_string(),
        });
    }

    let txn = db.begin().await?;

    let now = chrono::Utc::now();
    // CAS: only the first submitter moves the question out of `pending`
    let updated = Question::update_many()
        .col_expr(
            question::Column::Status,
            Expr::value(QuestionStatus::Answered.as_str()),
        )
        .col_expr(question::Column::AnsweredBy, Expr::value(user_id))
        .col_expr(question::Column::AnsweredAt, Expr::value(now))
        .col_expr(question::Column::UpdatedAt, Expr::value(now))
        .filter(question::Column::Id.eq(question_id))
        .filter(question::Column::Status.eq(QuestionStatus::Pending.as_str()))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        return match Question::find_by_id(question_id).one(&txn).await? {
            Some(_) => Err(Error::QuestionAlreadyAnswered { id: question_id }),
            None => Err(Error::QuestionNotFound { id: question_id }),
        };
    }

    let model = answer::ActiveModel {
        question_id: Set(question_id),
        user_id: Set(user_id),
        content: Set(content.to_string()),
        is_selected: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let inserted = model.insert(&txn).await.map_err(|e| {
        if matches!(
            e.sql_err(),
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_))
        ) {
            Error::InvalidReference
        } else {
            Error::Database(e)
        }
    })?;

    txn.commit().await?;
    Ok(inserted)
}

/// Selects an answer, completes the question, and settles the reward.
///
/// Only the question owner may select. One transaction performs the whole
/// unit: flip the answer's `is_selected` (CAS on `is_selected = false`),
/// complete the question with its satisfaction rating (CAS on
/// `status = 'answered'`), append the EARN ledger entry, and bump the
/// answering profile's cached balance. Any failure rolls everything back.
pub async fn select_answer(
    db: &DatabaseConnection,
    question_id: i64,
    answer_id: i64,
    owner_id: i64,
    satisfaction: Satisfaction,
) -> Result<(answer::Model, point_entry::Model)> {
    let txn = db.begin().await?;

    let target = Question::find_by_id(question_id)
        .one(&txn)
        .await?
        .ok_or(Error::QuestionNotFound { id: question_id })?;
    if target.user_id != owner_id {
        return Err(Error::NotAuthorized {
            reason: "질문 작성자만 답변을 채택할 수 있습니다.".to_string(),
        });
    }

    let chosen = Answer::find_by_id(answer_id)
        .one(&txn)
        .await?
        .filter(|a| a.question_id == question_id)
        .ok_or(Error::AnswerNotFound { id: answer_id })?;

    let now = chrono::Utc::now();
    let flipped = Answer::update_many()
        .col_expr(answer::Column::IsSelected, Expr::value(true))
        .col_expr(answer::Column::UpdatedAt, Expr::value(now))
        .filter(answer::Column::Id.eq(answer_id))
        .filter(answer::Column::IsSelected.eq(false))
        .exec(&txn)
        .await?;
    if flipped.rows_affected == 0 {
        return Err(Error::AnswerAlreadySelected { id: question_id });
    }

    let completed = Question::update_many()
        .col_expr(
            question::Column::Status,
            Expr::value(QuestionStatus::Completed.as_str()),
        )
        .col_expr(
            question::Column::Satisfaction,
            Expr::value(satisfaction.as_str()),
        )
        .col_expr(question::Column::UpdatedAt, Expr::value(now))
        .filter(question::Column::Id.eq(question_id))
        .filter(question::Column::Status.eq(QuestionStatus::Answered.as_str()))
        .exec(&txn)
        .await?;
    if completed.rows_affected == 0 {
        // Status was not `answered`: either a concurrent selection finished
        // first or the question never received an answer transition.
        return Err(Error::AnswerAlreadySelected { id: question_id });
    }

    let entry = points::award_points_in(
        &txn,
        chosen.user_id,
        satisfaction.reward_points(),
        satisfaction.reward_description(),
        Some(answer_id),
    )
    .await?;

    txn.commit().await?;

    let selected = Answer::find_by_id(answer_id)
        .one(db)
        .await?
        .ok_or(Error::AnswerNotFound { id: answer_id })?;
    Ok((selected, entry))
}

/// Explicitly un-flags an answer. Idempotent: rejecting an already
/// unselected answer changes nothing, transitions nothing, settles nothing.
pub async fn reject_answer(
    db: &DatabaseConnection,
    answer_id: i64,
    owner_id: i64,
) -> Result<answer::Model> {
    let target = Answer::find_by_id(answer_id)
        .one(db)
        .await?
        .ok_or(Error::AnswerNotFound { id: answer_id })?;

    let parent = Question::find_by_id(target.question_id)
        .one(db)
        .await?
        .ok_or(Error::QuestionNotFound {
            id: target.question_id,
        })?;
    if parent.user_id != owner_id {
        return Err(Error::NotAuthorized {
            reason: "질문 작성자만 답변을 평가할 수 있습니다.".to_string(),
        });
    }

    if !target.is_selected {
        return Ok(target);
    }

    let mut active: answer::ActiveModel = target.into();
    active.is_selected = Set(false);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Edits a question's title and/or content. Owner-only; edited fields are
/// re-validated; no status transition happens.
pub async fn edit_question(
    db: &DatabaseConnection,
    question_id: i64,
    owner_id: i64,
    title: Option<String>,
    content: Option<String>,
) -> Result<question::Model> {
    let existing = Question::find_by_id(question_id)
        .one(db)
        .await?
        .ok_or(Error::QuestionNotFound { id: question_id })?;
    if existing.user_id != owner_id {
        return Err(Error::NotAuthorized {
            reason: "질문 작성자만 수정할 수 있습니다.".to_string(),
        });
    }

    if let Some(ref title) = title {
        crate::validation::validate_text(title, crate::validation::TITLE_BOUNDS)?;
    }
    if let Some(ref content) = content {
        crate::validation::validate_text(content, crate::validation::QUESTION_BOUNDS)?;
    }

    let mut active: question::ActiveModel = existing.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some(content) = content {
        active.content = Set(content);
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Edits an answer's content. Author-only; re-validated; no transition.
pub async fn edit_answer(
    db: &DatabaseConnection,
    answer_id: i64,
    author_id: i64,
    content: String,
) -> Result<answer::Model> {
    let content = content.trim().to_string();
    crate::validation::validate_text(&content, crate::validation::DEFAULT_BOUNDS)?;

    let existing = Answer::find_by_id(answer_id)
        .one(db)
        .await?
        .ok_or(Error::AnswerNotFound { id: answer_id })?;
    if existing.user_id != author_id {
        return Err(Error::NotAuthorized {
            reason: "답변 작성자만 수정할 수 있습니다.".to_string(),
        });
    }

    let mut active: answer::ActiveModel = existing.into();
    active.content = Set(content);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Hard-deletes a question at any status. Owner-only. The application
/// issues a single delete; answer rows are removed by the storage-level
/// cascade and ledger entries survive with their answer reference cleared.
pub async fn delete_question(
    db: &DatabaseConnection,
    question_id: i64,
    owner_id: i64,
) -> Result<()> {
    let existing = Question::find_by_id(question_id)
        .one(db)
        .await?
        .ok_or(Error::QuestionNotFound { id: question_id })?;
    if existing.user_id != owner_id {
        return Err(Error::NotAuthorized {
            reason: "질문 작성자만 삭제할 수 있습니다.".to_string(),
        });
    }

    existing.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use crate::validation::ValidationError;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_validation_short_circuits_before_storage() -> Result<()> {
        // No query expectations registered: reaching the database panics
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_question(
            &db,
            1,
            "제목입니다".to_string(),
            "짧음".to_string(),
            None,
            None,
            false,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation(_)));

        let result = submit_answer(&db, 1, 1, "a").await;
        assert!(matches!(result.unwrap_err(), Error::Validation(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_question_starts_pending() -> Result<()> {
        let (db, senior, _) = setup_with_participants().await?;

        let q = create_question(
            &db,
            senior.id,
            "t".repeat(2),
            "의미있는 열 글자 이상 내용".to_string(),
            Some("스마트폰".to_string()),
            None,
            false,
        )
        .await?;
        assert_eq!(q.status, "pending");
        assert_eq!(q.satisfaction, None);
        assert_eq!(q.answered_by, None);
        assert!(!q.is_ai_question);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_question_rejects_short_content() -> Result<()> {
        let (db, senior, _) = setup_with_participants().await?;

        let result = create_question(
            &db,
            senior.id,
            "제목입니다".to_string(),
            "짧음".to_string(),
            None,
            None,
            false,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation(ValidationError::TooShort { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_listing_excludes_ai_and_answered() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;

        let visible = create_test_question(&db, senior.id, "보이는 질문").await?;
        create_question(
            &db,
            senior.id,
            "AI 질문".to_string(),
            "AI에게 물어보는 충분히 긴 내용".to_string(),
            None,
            None,
            true,
        )
        .await?;
        let answered = create_test_question(&db, senior.id, "답변된 질문").await?;
        submit_answer(&db, answered.id, youth.id, "충분히 긴 답변 내용입니다").await?;

        let pending = get_pending_questions(&db).await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, visible.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_answer_transitions_question() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;

        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;
        assert!(!ans.is_selected);
        assert_eq!(ans.question_id, q.id);

        let reloaded = get_question_by_id(&db, q.id).await?.unwrap();
        assert_eq!(reloaded.status, "answered");
        assert_eq!(reloaded.answered_by, Some(youth.id));
        assert!(reloaded.answered_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_answer_requires_youth_role() -> Result<()> {
        let (db, senior, _) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;

        let result = submit_answer(&db, q.id, senior.id, "시니어가 쓴 답변입니다").await;
        assert!(matches!(result.unwrap_err(), Error::NotAuthorized { .. }));

        let reloaded = get_question_by_id(&db, q.id).await?.unwrap();
        assert_eq!(reloaded.status, "pending");
        assert!(get_answers_for_question(&db, q.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_answer_role_comparison_is_case_insensitive() -> Result<()> {
        let (db, senior, _) = setup_with_participants().await?;
        // Legacy rows stored lowercase role strings
        let legacy = create_test_profile(&db, "legacy@example.com", "youth").await?;
        let q = create_test_question(&db, senior.id, "질문").await?;

        let ans = submit_answer(&db, q.id, legacy.id, "충분히 긴 답변 내용입니다").await?;
        assert_eq!(ans.user_id, legacy.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_second_submit_loses_the_race() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let other = create_test_profile(&db, "other@example.com", "YOUTH").await?;
        let q = create_test_question(&db, senior.id, "질문").await?;

        submit_answer(&db, q.id, youth.id, "첫 번째 답변 내용입니다").await?;
        let result = submit_answer(&db, q.id, other.id, "두 번째 답변 내용입니다").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::QuestionAlreadyAnswered { .. }
        ));

        // Exactly one answer row exists
        assert_eq!(get_answers_for_question(&db, q.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_answer_missing_question() -> Result<()> {
        let (db, _, youth) = setup_with_participants().await?;

        let result = submit_answer(&db, 999, youth.id, "충분히 긴 답변 내용입니다").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::QuestionNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_select_answer_full_settlement() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;
        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;

        let (selected, entry) =
            select_answer(&db, q.id, ans.id, senior.id, Satisfaction::Excellent).await?;
        assert!(selected.is_selected);
        assert_eq!(entry.amount, 5);
        assert_eq!(entry.entry_type, "EARN");
        assert_eq!(entry.user_id, youth.id);
        assert_eq!(entry.related_answer_id, Some(ans.id));

        let reloaded = get_question_by_id(&db, q.id).await?.unwrap();
        assert_eq!(reloaded.status, "completed");
        assert_eq!(reloaded.satisfaction, Some("excellent".to_string()));

        let profile = crate::core::profile::get_profile_by_id(&db, youth.id)
            .await?
            .unwrap();
        assert_eq!(profile.points, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_reward_amounts_for_all_ratings() -> Result<()> {
        for (satisfaction, expected) in [
            (Satisfaction::Excellent, 5),
            (Satisfaction::Good, 3),
            (Satisfaction::Neutral, 1),
        ] {
            let (db, senior, youth) = setup_with_participants().await?;
            let q = create_test_question(&db, senior.id, "질문").await?;
            let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;

            let (_, entry) = select_answer(&db, q.id, ans.id, senior.id, satisfaction).await?;
            assert_eq!(entry.amount, expected);

            let profile = crate::core::profile::get_profile_by_id(&db, youth.id)
                .await?
                .unwrap();
            assert_eq!(profile.points, expected);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_select_answer_owner_only() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;
        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;

        let result = select_answer(&db, q.id, ans.id, youth.id, Satisfaction::Good).await;
        assert!(matches!(result.unwrap_err(), Error::NotAuthorized { .. }));

        // Nothing settled
        let profile = crate::core::profile::get_profile_by_id(&db, youth.id)
            .await?
            .unwrap();
        assert_eq!(profile.points, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_second_selection_fails_and_settles_nothing() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;
        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;

        select_answer(&db, q.id, ans.id, senior.id, Satisfaction::Good).await?;
        let result = select_answer(&db, q.id, ans.id, senior.id, Satisfaction::Excellent).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AnswerAlreadySelected { .. }
        ));

        // Only the first settlement happened
        let profile = crate::core::profile::get_profile_by_id(&db, youth.id)
            .await?
            .unwrap();
        assert_eq!(profile.points, 3);
        assert_eq!(
            crate::core::points::get_point_history(&db, youth.id)
                .await?
                .len(),
            1
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_select_answer_wrong_question_pairing() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q1 = create_test_question(&db, senior.id, "첫 질문").await?;
        let q2 = create_test_question(&db, senior.id, "둘째 질문").await?;
        let ans = submit_answer(&db, q1.id, youth.id, "충분히 긴 답변 내용입니다").await?;

        let result = select_answer(&db, q2.id, ans.id, senior.id, Satisfaction::Good).await;
        assert!(matches!(result.unwrap_err(), Error::AnswerNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_answer_is_idempotent() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;
        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;

        // Rejecting an already-unselected answer is a no-op
        let rejected = reject_answer(&db, ans.id, senior.id).await?;
        assert!(!rejected.is_selected);
        assert_eq!(rejected.updated_at, ans.updated_at);

        let reloaded = get_question_by_id(&db, q.id).await?.unwrap();
        assert_eq!(reloaded.status, "answered");
        assert!(crate::core::points::get_point_history(&db, youth.id)
            .await?
            .is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_answer_unflags_selected() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;
        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;
        select_answer(&db, q.id, ans.id, senior.id, Satisfaction::Neutral).await?;

        let rejected = reject_answer(&db, ans.id, senior.id).await?;
        assert!(!rejected.is_selected);

        // Question status and the ledger are untouched by reject
        let reloaded = get_question_by_id(&db, q.id).await?.unwrap();
        assert_eq!(reloaded.status, "completed");
        assert_eq!(
            crate::core::points::get_point_history(&db, youth.id)
                .await?
                .len(),
            1
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_answer_content_trimmed_before_validation() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;

        // Padding must not let a too-short answer through
        let result = submit_answer(&db, q.id, youth.id, "  a  ").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation(ValidationError::TooShort { length: 1, .. })
        ));

        let ans = submit_answer(&db, q.id, youth.id, "  충분히 긴 답변 내용입니다  ").await?;
        assert_eq!(ans.content, "충분히 긴 답변 내용입니다");

        let edited =
            edit_answer(&db, ans.id, youth.id, "  수정된 답변 내용입니다  ".to_string()).await?;
        assert_eq!(edited.content, "수정된 답변 내용입니다");

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_question_revalidates() -> Result<()> {
        let (db, senior, _) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;

        let edited = edit_question(
            &db,
            q.id,
            senior.id,
            None,
            Some("수정된 충분히 긴 질문 내용입니다".to_string()),
        )
        .await?;
        assert_eq!(edited.content, "수정된 충분히 긴 질문 내용입니다");
        assert_eq!(edited.status, "pending");

        let result = edit_question(&db, q.id, senior.id, None, Some("시발 내용 포함된 질문입니다".to_string())).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation(ValidationError::ProhibitedWords)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_answer_author_only() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;
        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;

        let result = edit_answer(&db, ans.id, senior.id, "다른 사람이 고친 내용".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::NotAuthorized { .. }));

        let edited = edit_answer(&db, ans.id, youth.id, "작성자가 고친 답변 내용".to_string()).await?;
        assert_eq!(edited.content, "작성자가 고친 답변 내용");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_question_cascades_in_storage() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;
        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;
        select_answer(&db, q.id, ans.id, senior.id, Satisfaction::Good).await?;

        delete_question(&db, q.id, senior.id).await?;
        assert!(get_question_by_id(&db, q.id).await?.is_none());
        // The answer rows go with the question; the ledger keeps its entry
        // with the answer reference cleared
        assert!(get_answer_by_id(&db, ans.id).await?.is_none());
        let history = crate::core::points::get_point_history(&db, youth.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, 3);
        assert_eq!(history[0].related_answer_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_answered_question_succeeds() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;
        let q = create_test_question(&db, senior.id, "질문").await?;
        submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;

        // Deleting an answered question must not trip the answers FK
        delete_question(&db, q.id, senior.id).await?;
        assert!(get_question_by_id(&db, q.id).await?.is_none());
        assert!(get_answers_for_question(&db, q.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_ai_question_relay_persistence() -> Result<()> {
        let (db, senior, _) = setup_with_participants().await?;

        let q = create_ai_question(&db, senior.id, "리모컨이 안 돼요").await?;
        assert!(q.is_ai_question);
        assert_eq!(q.status, "pending");
        assert_eq!(q.title, "리모컨이 안 돼요");

        let ai = attach_ai_answer(&db, q.id, "건전지를 확인해 보세요.").await?;
        assert_eq!(ai.question_id, q.id);

        let reloaded = get_question_by_id(&db, q.id).await?.unwrap();
        assert_eq!(reloaded.status, "answered");
        assert_eq!(reloaded.answered_by, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_ai_question_title_truncated_to_fifty_chars() -> Result<()> {
        let (db, senior, _) = setup_with_participants().await?;

        let content = "가".repeat(80);
        let q = create_ai_question(&db, senior.id, &content).await?;
        assert_eq!(q.title.chars().count(), 50);
        assert_eq!(q.content.chars().count(), 80);

        Ok(())
    }

    #[tokio::test]
    async fn test_end_to_end_lifecycle() -> Result<()> {
        let (db, senior, youth) = setup_with_participants().await?;

        let q = create_question(
            &db,
            senior.id,
            "t".repeat(2),
            "의미있는 열 글자 이상 내용".to_string(),
            None,
            None,
            false,
        )
        .await?;
        assert_eq!(q.status, "pending");

        let ans = submit_answer(&db, q.id, youth.id, "충분히 긴 답변 내용입니다").await?;
        let after_submit = get_question_by_id(&db, q.id).await?.unwrap();
        assert_eq!(after_submit.status, "answered");
        assert!(!ans.is_selected);

        let (selected, entry) =
            select_answer(&db, q.id, ans.id, senior.id, Satisfaction::Good).await?;
        assert!(selected.is_selected);
        assert_eq!(entry.entry_type, "EARN");
        assert_eq!(entry.amount, 3);

        let done = get_question_by_id(&db, q.id).await?.unwrap();
        assert_eq!(done.status, "completed");
        assert_eq!(done.satisfaction, Some("good".to_string()));

        let youth_profile = crate::core::profile::get_profile_by_id(&db, youth.id)
            .await?
            .unwrap();
        assert_eq!(youth_profile.points, 3);

        Ok(())
    }
}
