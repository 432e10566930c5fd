use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use cyberguard_application::commands::analysis_commands;
use cyberguard_application::queries::analysis_queries;
use cyberguard_application::AppState;
use cyberguard_domain::{AnalysisRequest, EntityAssessment, EntityId};

use crate::error::HttpError;

#[derive(Deserialize)]
pub struct StartAnalysisBody {
    pub entity_id: u64,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// `{"state":"idle"}` when nothing has been selected yet, else the request.
#[derive(Serialize)]
#[serde(untagged)]
pub enum AnalysisView {
    Idle { state: &'static str },
    Request(AnalysisRequest),
}

impl From<Option<AnalysisRequest>> for AnalysisView {
    fn from(value: Option<AnalysisRequest>) -> Self {
        match value {
            Some(request) => AnalysisView::Request(request),
            None => AnalysisView::Idle { state: "idle" },
        }
    }
}

pub async fn start_analysis(
    State(state): State<AppState>,
    Json(payload): Json<StartAnalysisBody>,
) -> Result<(StatusCode, Json<AnalysisRequest>), HttpError> {
    let request = analysis_commands::start_analysis(&state, EntityId(payload.entity_id)).await?;
    Ok((StatusCode::ACCEPTED, Json(request)))
}

pub async fn bulk_assess(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntityAssessment>>, HttpError> {
    let assessments = analysis_commands::bulk_assess(&state).await?;
    Ok(Json(assessments))
}

pub async fn current_analysis(State(state): State<AppState>) -> Result<Json<AnalysisView>, HttpError> {
    let current = analysis_queries::current_analysis(&state).await?;
    Ok(Json(AnalysisView::from(current)))
}

pub async fn analysis_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<AnalysisRequest>>, HttpError> {
    let history = analysis_queries::analysis_history(&state, query.limit).await?;
    Ok(Json(history))
}

pub async fn analysis_feed(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_analysis_events(socket, state))
}

async fn stream_analysis_events(mut socket: WebSocket, state: AppState) {
    let mut rx = state.analysis_hub.subscribe();
    debug!("analysis feed subscriber connected");
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!("failed to encode analysis event: {}", err);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("analysis feed subscriber lagged by {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(err)) => {
                    debug!("analysis feed socket error: {}", err);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("analysis feed subscriber disconnected");
}
