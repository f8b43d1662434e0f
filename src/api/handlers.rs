use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::*},
    error::AppError,
    models::chunk::Subject,
    pipeline::suggest_subjects,
};

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Processing chat message");

    if request.message.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty".to_string()));
    }

    let subject = match &request.subject {
        Some(raw) => Some(Subject::parse(raw).ok_or_else(|| {
            AppError::Validation(format!("Unknown subject: {}", raw))
        })?),
        None => None,
    };

    let start = std::time::Instant::now();
    let response = state.tutor.chat(&request.message, subject).await;
    state
        .observability
        .metrics
        .record_chat(start.elapsed().as_millis() as u64);

    Ok(Json(ChatResponse {
        answer: response.answer,
        sources: response.sources,
        student_profile: response.student_profile,
        confidence: response.confidence,
        session_id: response.session_id,
        query_count: response.query_count,
        error: response.error,
    }))
}

pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Starting new session: {:?}", request.session_id);

    let session = state.tutor.start_session(request.session_id);

    let response = SessionResponse {
        id: session.id,
        name: session.name,
        started_at: session.started_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn end_session(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Ending current session");

    let ended = state.tutor.end_session().map(|s| s.id);

    Ok(Json(EndSessionResponse { ended }))
}

pub async fn add_curriculum(
    State(state): State<AppState>,
    Json(request): Json<AddCurriculumRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Adding curriculum content: {} paths", request.paths.len());

    if request.paths.is_empty() {
        return Err(AppError::Validation(
            "At least one curriculum path is required".to_string(),
        ));
    }

    let paths: Vec<std::path::PathBuf> =
        request.paths.iter().map(std::path::PathBuf::from).collect();

    let chunks_added = state.tutor.add_curriculum(&paths).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddCurriculumResponse { chunks_added }),
    ))
}

pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionsParams>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Getting learning suggestions");

    if params.query.trim().is_empty() {
        return Err(AppError::Validation("Query must not be empty".to_string()));
    }

    let subjects = suggest_subjects(&params.query)
        .iter()
        .map(|s| s.as_str().to_string())
        .collect();
    let suggestions = state.tutor.learning_suggestions(&params.query);

    Ok(Json(SuggestionsResponse {
        subjects,
        suggestions,
    }))
}

pub async fn status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    debug!("Getting system status");

    let status = state.tutor.status().await;

    Ok(Json(StatusResponse {
        is_initialized: status.is_initialized,
        current_session: status.current_session,
        stats: status.stats,
        indexed_chunks: status.indexed_chunks,
        model_info: status.model_info,
    }))
}
