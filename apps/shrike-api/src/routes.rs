use axum::{
	Json, Router,
	extract::{
		Path, State, WebSocketUpgrade,
		ws::{Message, WebSocket},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use shrike_service::{
	AdjudicateRequest, AdjudicateResponse, Error as ServiceError, EvidenceResponse, IngestRequest,
	IngestResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/ingest", post(ingest))
		.route("/v1/items/{item_id}/review", post(review))
		.route("/v1/events/{event_id}/evidence", get(evidence))
		.route("/v1/stream", get(stream))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ingest(
	State(state): State<AppState>,
	Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
	let response = state.service.ingest(payload).await?;

	Ok(Json(response))
}

async fn review(
	State(state): State<AppState>,
	Path(item_id): Path<Uuid>,
	Json(payload): Json<AdjudicateRequest>,
) -> Result<Json<AdjudicateResponse>, ApiError> {
	let response = state.service.adjudicate(item_id, payload).await?;

	Ok(Json(response))
}

async fn evidence(
	State(state): State<AppState>,
	Path(event_id): Path<Uuid>,
) -> Result<Json<EvidenceResponse>, ApiError> {
	let response = state.service.list_evidence(event_id).await?;

	Ok(Json(response))
}

async fn stream(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
	let receiver = state.stream.subscribe();

	upgrade.on_upgrade(move |socket| stream_socket(socket, receiver))
}

async fn stream_socket(mut socket: WebSocket, mut receiver: broadcast::Receiver<String>) {
	loop {
		match receiver.recv().await {
			Ok(frame) =>
				if socket.send(Message::Text(frame.into())).await.is_err() {
					break;
				},
			Err(broadcast::error::RecvError::Lagged(skipped)) => {
				tracing::debug!(skipped, "Stream subscriber lagged behind the broadcast.");
			},
			Err(broadcast::error::RecvError::Closed) => break,
		}
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::Provider { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "provider_error", message),
			ServiceError::Qdrant { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "index_error", message),
			ServiceError::Storage { message } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
