//! Request handlers for the JSON, SSE, and multipart endpoints.

use crate::{
    core::{
        self, Role, Satisfaction,
        events::{Event, Topic},
    },
    entities::{answer, point_entry, profile, question},
    errors::{Error, Result},
    server::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};
use tokio::sync::mpsc;
use tokio_stream::wrappers::{BroadcastStream, ReceiverStream};
use tracing::error;

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------- profiles

#[derive(Deserialize)]
pub struct EnsureProfileRequest {
    email: String,
    name: Option<String>,
}

pub async fn ensure_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnsureProfileRequest>,
) -> Result<Json<profile::Model>> {
    let profile = core::profile::ensure_profile(&state.db, &req.email, req.name.as_deref()).await?;
    Ok(Json(profile))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<profile::Model>> {
    let profile = core::profile::get_profile_by_id(&state.db, id)
        .await?
        .ok_or(Error::ProfileNotFound { id })?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    name: Option<String>,
    username: Option<String>,
    profile_image: Option<String>,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<profile::Model>> {
    let profile =
        core::profile::update_profile(&state.db, id, req.name, req.username, req.profile_image)
            .await?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct SetRoleRequest {
    role: String,
}

pub async fn set_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<profile::Model>> {
    let role = Role::parse(&req.role).ok_or_else(|| Error::BadRequest {
        message: format!("Unknown role: {}", req.role),
    })?;
    let profile = core::profile::set_role(&state.db, id, role).await?;
    Ok(Json(profile))
}

/// How many recent activities the profile page shows.
const ACTIVITY_LIMIT: u64 = 5;

pub async fn get_activities(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<core::profile::Activity>>> {
    let activities = core::profile::get_recent_activities(&state.db, id, ACTIVITY_LIMIT).await?;
    Ok(Json(activities))
}

// --------------------------------------------------------------- questions

#[derive(Deserialize)]
pub struct CreateQuestionRequest {
    user_id: i64,
    title: String,
    content: String,
    category: Option<String>,
    image_url: Option<String>,
}

pub async fn create_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<question::Model>)> {
    let question = core::question::create_question(
        &state.db,
        req.user_id,
        req.title,
        req.content,
        req.category,
        req.image_url,
        false,
    )
    .await?;

    let event = Event::QuestionCreated {
        question_id: question.id,
    };
    state.events.publish(&Topic::PendingQuestions, &event);
    state.events.publish(&Topic::User(question.user_id), &event);

    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn get_pending_questions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<question::Model>>> {
    let questions = core::question::get_pending_questions(&state.db).await?;
    Ok(Json(questions))
}

/// A question together with its answers, as the detail view consumes it.
#[derive(Serialize)]
pub struct QuestionDetail {
    question: question::Model,
    answers: Vec<answer::Model>,
}

pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<QuestionDetail>> {
    let question = core::question::get_question_by_id(&state.db, id)
        .await?
        .ok_or(Error::QuestionNotFound { id })?;
    let answers = core::question::get_answers_for_question(&state.db, id).await?;
    Ok(Json(QuestionDetail { question, answers }))
}

pub async fn get_user_questions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<question::Model>>> {
    let questions = core::question::get_questions_by_user(&state.db, id).await?;
    Ok(Json(questions))
}

#[derive(Deserialize)]
pub struct EditQuestionRequest {
    user_id: i64,
    title: Option<String>,
    content: Option<String>,
}

pub async fn edit_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<EditQuestionRequest>,
) -> Result<Json<question::Model>> {
    let question =
        core::question::edit_question(&state.db, id, req.user_id, req.title, req.content).await?;
    Ok(Json(question))
}

#[derive(Deserialize)]
pub struct OwnerQuery {
    user_id: i64,
}

pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(owner): Query<OwnerQuery>,
) -> Result<StatusCode> {
    core::question::delete_question(&state.db, id, owner.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------- answers

pub async fn get_question_answers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<answer::Model>>> {
    let answers = core::question::get_answers_for_question(&state.db, id).await?;
    Ok(Json(answers))
}

#[derive(Deserialize)]
pub struct SubmitAnswerRequest {
    user_id: i64,
    content: String,
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<(StatusCode, Json<answer::Model>)> {
    let answer = core::question::submit_answer(&state.db, id, req.user_id, &req.content).await?;

    let event = Event::AnswerSubmitted {
        question_id: id,
        answer_id: answer.id,
    };
    state.events.publish(&Topic::Question(id), &event);
    // The question just left the marketplace listing
    state.events.publish(&Topic::PendingQuestions, &event);

    Ok((StatusCode::CREATED, Json(answer)))
}

#[derive(Deserialize)]
pub struct SelectAnswerRequest {
    user_id: i64,
    satisfaction: String,
}

/// Response for a completed selection: the flipped answer plus the ledger
/// entry the settlement appended.
#[derive(Serialize)]
pub struct SelectAnswerResponse {
    answer: answer::Model,
    point_entry: point_entry::Model,
}

pub async fn select_answer(
    State(state): State<Arc<AppState>>,
    Path((question_id, answer_id)): Path<(i64, i64)>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<Json<SelectAnswerResponse>> {
    let satisfaction = Satisfaction::parse(&req.satisfaction).ok_or_else(|| Error::BadRequest {
        message: format!("Unknown satisfaction rating: {}", req.satisfaction),
    })?;

    let (answer, entry) =
        core::question::select_answer(&state.db, question_id, answer_id, req.user_id, satisfaction)
            .await?;

    state.events.publish(
        &Topic::Question(question_id),
        &Event::AnswerSelected {
            question_id,
            answer_id,
            satisfaction: satisfaction.as_str().to_string(),
        },
    );
    state.events.publish(
        &Topic::User(entry.user_id),
        &Event::PointsAwarded {
            user_id: entry.user_id,
            amount: entry.amount,
        },
    );

    Ok(Json(SelectAnswerResponse {
        answer,
        point_entry: entry,
    }))
}

#[derive(Deserialize)]
pub struct RejectAnswerRequest {
    user_id: i64,
}

pub async fn reject_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<RejectAnswerRequest>,
) -> Result<Json<answer::Model>> {
    let answer = core::question::reject_answer(&state.db, id, req.user_id).await?;
    Ok(Json(answer))
}

#[derive(Deserialize)]
pub struct EditAnswerRequest {
    user_id: i64,
    content: String,
}

pub async fn edit_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<EditAnswerRequest>,
) -> Result<Json<answer::Model>> {
    let answer = core::question::edit_answer(&state.db, id, req.user_id, req.content).await?;
    Ok(Json(answer))
}

// ------------------------------------------------------------------ points

pub async fn get_point_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<point_entry::Model>>> {
    let history = core::points::get_point_history(&state.db, id).await?;
    Ok(Json(history))
}

pub async fn get_point_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<core::points::PointSummary>> {
    let summary = core::points::get_point_summary(&state.db, id).await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
pub struct UsePointsRequest {
    amount: i64,
    description: String,
}

pub async fn use_points(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UsePointsRequest>,
) -> Result<Json<point_entry::Model>> {
    let entry = core::points::use_points(&state.db, id, req.amount, &req.description).await?;

    state.events.publish(
        &Topic::User(id),
        &Event::PointsAwarded {
            user_id: id,
            amount: entry.amount,
        },
    );

    Ok(Json(entry))
}

// ---------------------------------------------------------------- AI relay

#[derive(Deserialize)]
pub struct AskAiRequest {
    user_id: i64,
    content: String,
}

/// Streams an AI answer back as server-sent events.
///
/// Frames are `data: {"content": token}` followed by a final
/// `data: [DONE]`. The backing question is persisted before the stream
/// opens; the accumulated answer is persisted after it closes, and a
/// persistence failure at that point is logged but never surfaced - the
/// text was already delivered. A client disconnect stops the relay and
/// discards the partial text.
pub async fn ask_ai(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskAiRequest>,
) -> Result<Sse<ReceiverStream<std::result::Result<SseEvent, Infallible>>>> {
    let question = core::question::create_ai_question(&state.db, req.user_id, &req.content).await?;
    let mut tokens = state.ai.stream_chat(req.content.trim()).await?;

    let (tx, rx) = mpsc::channel::<std::result::Result<SseEvent, Infallible>>(32);
    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut full_text = String::new();

        while let Some(item) = tokens.next().await {
            match item {
                Ok(token) => {
                    full_text.push_str(&token);
                    let frame =
                        SseEvent::default().data(serde_json::json!({ "content": token }).to_string());
                    if tx.send(Ok(frame)).await.is_err() {
                        // Client disconnected; partial text is discarded
                        return;
                    }
                }
                Err(e) => {
                    error!(error = %e, question_id = question.id, "AI stream aborted");
                    let _ = tx
                        .send(Ok(SseEvent::default()
                            .event("error")
                            .data(serde_json::json!({ "error": e.to_string() }).to_string())))
                        .await;
                    return;
                }
            }
        }

        if let Err(e) =
            core::question::attach_ai_answer(&task_state.db, question.id, &full_text).await
        {
            // Non-fatal: the answer already reached the caller
            error!(error = %e, question_id = question.id, "failed to persist AI answer");
        }

        let _ = tx.send(Ok(SseEvent::default().data("[DONE]"))).await;
    });

    Ok(Sse::new(ReceiverStream::new(rx)))
}

// ----------------------------------------------------------- speech-to-text

#[derive(Serialize)]
pub struct WhisperResponse {
    text: String,
}

/// Accepts a multipart audio blob in the `file` field and returns its
/// Korean transcription.
pub async fn whisper(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<WhisperResponse>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Malformed multipart body: {e}"),
    })? {
        if field.name() == Some("file") {
            let file_name = field
                .file_name()
                .unwrap_or("audio.webm")
                .to_string();
            let audio = field.bytes().await.map_err(|e| Error::BadRequest {
                message: format!("Failed to read audio field: {e}"),
            })?;
            let text = state.ai.transcribe(file_name, audio.to_vec()).await?;
            return Ok(Json(WhisperResponse { text }));
        }
    }

    Err(Error::BadRequest {
        message: "Missing audio file field".to_string(),
    })
}

// ------------------------------------------------------------------ events

#[derive(Deserialize)]
pub struct EventsQuery {
    topic: String,
}

/// Subscribes to one event-bus topic as an SSE stream.
pub async fn subscribe_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<SseEvent, Infallible>>>> {
    let topic = Topic::parse(&query.topic).ok_or_else(|| Error::BadRequest {
        message: format!("Unknown topic: {}", query.topic),
    })?;

    let receiver = state.events.subscribe(&topic);
    let stream = BroadcastStream::new(receiver).filter_map(|item| async move {
        // Lagged subscribers just skip the events they missed
        let event = item.ok()?;
        let data = serde_json::to_string(&event).ok()?;
        Some(Ok(SseEvent::default().data(data)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
