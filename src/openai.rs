//! Upstream AI client - chat completion streaming and Whisper transcription.
//!
//! The chat call requests a token stream and forwards each delta through an
//! mpsc channel; dropping the receiver (caller disconnect) ends the relay
//! task and aborts the upstream request. Frame parsing follows the SSE wire
//! form the completion API emits: `data: {json}\n\n` repeated, closed by a
//! literal `data: [DONE]\n\n`.

use crate::errors::{Error, Result};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// Fixed system prompt: concise, respectful, simple-language answers for
/// senior users.
const SYSTEM_PROMPT: &str = "당신은 노인들을 돕는 친절한 AI 도우미입니다.\n\
다음 지침을 따라 답변해주세요:\n\
1. 존중하는 태도로 이해하기 쉽게 설명\n\
2. 짧고 명확한 문장으로 답변\n\
3. 쉬운 단어 사용\n\
4. 핵심 내용만 간단히 설명";

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const TRANSCRIPTION_MODEL: &str = "whisper-1";
const TRANSCRIPTION_LANGUAGE: &str = "ko";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for the upstream AI API.
#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl AiClient {
    /// Creates a client for the hosted API.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base(DEFAULT_API_BASE.to_string(), api_key, model)
    }

    /// Creates a client against an alternate base URL (used by tests).
    #[must_use]
    pub fn with_base(api_base: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
            model,
        }
    }

    /// Opens a streaming chat completion for `content` and returns the
    /// token stream.
    ///
    /// Each item is one delta token. Upstream errors after the stream has
    /// started surface as an `Err` item; the relay task stops as soon as
    /// the receiver is dropped.
    pub async fn stream_chat(&self, content: &str) -> Result<ReceiverStream<Result<String>>> {
        let request = ChatRequest {
            model: &self.model,
            stream: true,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: 0.7,
            max_tokens: 1000,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                message: format!("chat completion returned {status}: {body}"),
            });
        }

        let (tx, rx) = mpsc::channel::<Result<String>>(32);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            'outer: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx
                            .send(Err(Error::Upstream {
                                message: format!("stream read failed: {e}"),
                            }))
                            .await;
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);

                while let Some(frame) = take_frame(&mut buffer) {
                    for data in frame.lines().filter_map(|l| l.strip_prefix("data: ")) {
                        if data == "[DONE]" {
                            break 'outer;
                        }
                        if let Some(token) = parse_chunk_data(data) {
                            if tx.send(Ok(token)).await.is_err() {
                                // Caller went away; abort the relay
                                debug!("chat relay receiver dropped, aborting stream");
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(ReceiverStream::new(rx))
    }

    /// Transcribes an audio blob with the Whisper API, Korean language.
    pub async fn transcribe(&self, file_name: String, audio: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(audio).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", TRANSCRIPTION_LANGUAGE);

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.api_base))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                message: format!("transcription returned {status}: {body}"),
            });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text)
    }
}

/// Pops the next complete `\n\n`-terminated frame off the byte buffer.
///
/// Frames are decoded only once fully received; network chunks can split a
/// multi-byte character, so decoding per chunk would corrupt it.
fn take_frame(buffer: &mut Vec<u8>) -> Option<String> {
    let pos = buffer.windows(2).position(|w| w == b"\n\n")?;
    let frame: Vec<u8> = buffer.drain(..pos + 2).collect();
    Some(String::from_utf8_lossy(&frame[..pos]).into_owned())
}

/// Extracts the delta token from one `data:` payload. Malformed or empty
/// chunks yield None and are skipped, matching the tolerant relay behavior.
fn parse_chunk_data(data: &str) -> Option<String> {
    let chunk: ChatChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(error = %e, "skipping malformed completion chunk");
            return None;
        }
    };
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|content| !content.is_empty())
}
