//! Route handlers.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::agent::LoopEvent;

use super::types::{ChatRequest, ChatResponse, HealthResponse, RootResponse, StreamEvent};
use super::AppState;

/// Buffered loop events per in-flight stream.
const EVENT_CHANNEL_CAPACITY: usize = 16;

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Health Fact Checker API".to_string(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Minimal error payload; internal detail stays in the logs.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// POST /api/chat — run the loop to completion, return the aggregate.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, "chat request");

    match state.checker.run(&request.message).await {
        Ok(report) => {
            tracing::info!(
                %request_id,
                cycles = report.cycles,
                termination = ?report.termination,
                "chat request complete"
            );
            Json(ChatResponse {
                response: report.answer,
                sources: report.sources,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(%request_id, error = %e, "chat request failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing request: {}", e),
            )
        }
    }
}

/// POST /api/chat/stream — same loop, surfaced as server-sent events.
///
/// Each content-bearing loop message becomes a `message` frame; the stream
/// ends with exactly one `done` frame, or one `error` frame if the run
/// failed (no frames follow an error).
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream_id = Uuid::new_v4();
    tracing::info!(%stream_id, "chat stream opened");

    let (tx, mut rx) = mpsc::channel::<LoopEvent>(EVENT_CHANNEL_CAPACITY);
    let checker_state = Arc::clone(&state);
    let message = request.message;
    let run = tokio::spawn(async move { checker_state.checker.run_streaming(&message, tx).await });

    let stream = async_stream::stream! {
        // The sender lives inside the run task; the channel closes when the
        // loop finishes either way.
        while let Some(event) = rx.recv().await {
            let frame = match event {
                LoopEvent::Candidate { content } => StreamEvent::Message {
                    content,
                    node: "agent".to_string(),
                },
                LoopEvent::ToolOutput { content, .. } => StreamEvent::Message {
                    content,
                    node: "action".to_string(),
                },
            };
            match Event::default().json_data(&frame) {
                Ok(sse) => yield Ok(sse),
                Err(e) => {
                    tracing::error!(%stream_id, error = %e, "failed to serialize stream frame; dropping");
                }
            }
        }

        let terminal = match run.await {
            Ok(Ok(report)) => {
                tracing::info!(
                    %stream_id,
                    cycles = report.cycles,
                    termination = ?report.termination,
                    "chat stream complete"
                );
                StreamEvent::Done
            }
            Ok(Err(e)) => {
                tracing::error!(%stream_id, error = %e, "chat stream failed");
                StreamEvent::Error {
                    message: format!("Error processing request: {}", e),
                }
            }
            Err(e) => {
                tracing::error!(%stream_id, error = %e, "chat stream task aborted");
                StreamEvent::Error {
                    message: "internal error".to_string(),
                }
            }
        };
        if let Ok(sse) = Event::default().json_data(&terminal) {
            yield Ok(sse);
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}
