//! Per-topic realtime event bus.
//!
//! Workflow completions publish typed events to narrow topics; consumers
//! subscribe to exactly the topics that cover their view instead of
//! listening table-wide and refetching everything. Fan-out rides on tokio
//! broadcast channels, one per topic, created lazily on first use.

use serde::Serialize;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};
use tokio::sync::broadcast;

/// Channel capacity per topic; slow subscribers lag rather than block.
const TOPIC_CAPACITY: usize = 64;

/// A subscription scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// New questions entering the youth marketplace
    PendingQuestions,
    /// Everything that happens to one question
    Question(i64),
    /// Settlements and answers affecting one profile
    User(i64),
}

impl Topic {
    /// Parses the wire form used by the SSE endpoint
    /// (`pending-questions`, `question:<id>`, `user:<id>`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value == "pending-questions" {
            return Some(Topic::PendingQuestions);
        }
        if let Some(id) = value.strip_prefix("question:") {
            return id.parse().ok().map(Topic::Question);
        }
        if let Some(id) = value.strip_prefix("user:") {
            return id.parse().ok().map(Topic::User);
        }
        None
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::PendingQuestions => f.write_str("pending-questions"),
            Topic::Question(id) => write!(f, "question:{id}"),
            Topic::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// A workflow event delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A question entered `pending`
    QuestionCreated {
        /// The new question
        question_id: i64,
    },
    /// A question transitioned to `answered`
    AnswerSubmitted {
        /// The answered question
        question_id: i64,
        /// The new answer
        answer_id: i64,
    },
    /// An answer was selected and the question completed
    AnswerSelected {
        /// The completed question
        question_id: i64,
        /// The selected answer
        answer_id: i64,
        /// Rating the owner gave
        satisfaction: String,
    },
    /// Points settled to a profile
    PointsAwarded {
        /// Profile whose balance changed
        user_id: i64,
        /// Signed amount of the change
        amount: i64,
    },
}

/// Lazily-created broadcast channels keyed by topic.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to a topic, creating its channel if needed.
    #[must_use]
    pub fn subscribe(&self, topic: &Topic) -> broadcast::Receiver<Event> {
        let mut channels = self.channels.write().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(topic.clone())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Publishes an event to one topic. Events on topics nobody subscribed
    /// to are dropped silently.
    pub fn publish(&self, topic: &Topic, event: &Event) {
        let channels = self.channels.read().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = channels.get(topic) {
            // send only fails when there are no receivers
            let _ = sender.send(event.clone());
        }
    }
}
