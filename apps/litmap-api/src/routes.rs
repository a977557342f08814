use axum::{
	Json, Router,
	body::Bytes,
	extract::{FromRequest, Path, Query, Request, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::state::AppState;
use litmap_domain::{
	evidence::EvidenceRecord,
	models::{ChatHistory, Note, Project, ResearchMap},
	paper::Paper,
};
use litmap_service::{
	ChatRequest, ChatResponse, CreateNoteRequest, CreateProjectRequest, Error as ServiceError,
	ExtractEvidenceRequest, NoteView, RefineRequest, RefineResponse, UpdateNoteRequest,
	UpdateProjectRequest,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/projects", post(create_project).get(list_projects))
		.route("/projects/{id}", get(get_project).patch(update_project))
		.route("/research/map/{project_id}", post(build_research_map).get(get_research_map))
		.route("/chat", post(chat))
		.route("/chat/history/{project_id}", get(chat_history).delete(clear_chat_history))
		.route("/notes", post(create_note))
		.route("/notes/project/{project_id}", get(list_notes))
		.route("/notes/{id}", get(get_note).patch(update_note).delete(delete_note))
		.route("/notes/{id}/refine", post(refine_note))
		.route("/evidence/extract", post(extract_evidence))
		.route("/literature/search", get(search_literature))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn create_project(
	State(state): State<AppState>,
	JsonBody(payload): JsonBody<CreateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
	let project = state.service.create_project(payload).await?;

	Ok(Json(project))
}

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
	let projects = state.service.list_projects().await?;

	Ok(Json(projects))
}

async fn get_project(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
	let project = state.service.get_project(&id).await?;

	Ok(Json(project))
}

async fn update_project(
	State(state): State<AppState>,
	Path(id): Path<String>,
	JsonBody(payload): JsonBody<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
	let project = state.service.update_project(&id, payload).await?;

	Ok(Json(project))
}

async fn build_research_map(
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<Json<ResearchMap>, ApiError> {
	let map = state.service.build_research_map(&project_id).await?;

	Ok(Json(map))
}

async fn get_research_map(
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<Json<ResearchMap>, ApiError> {
	let map = state.service.get_research_map(&project_id).await?;

	Ok(Json(map))
}

async fn chat(
	State(state): State<AppState>,
	JsonBody(payload): JsonBody<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	let response = state.service.chat(payload).await?;

	Ok(Json(response))
}

async fn chat_history(
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<Json<ChatHistory>, ApiError> {
	let history = state.service.chat_history(&project_id).await?;

	Ok(Json(history))
}

async fn clear_chat_history(
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
	state.service.clear_chat_history(&project_id).await?;

	Ok(Json(SuccessResponse { success: true }))
}

async fn create_note(
	State(state): State<AppState>,
	JsonBody(payload): JsonBody<CreateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
	let note = state.service.create_note(payload).await?;

	Ok(Json(note))
}

async fn list_notes(
	State(state): State<AppState>,
	Path(project_id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError> {
	let notes = state.service.list_notes(&project_id).await?;

	Ok(Json(notes))
}

async fn get_note(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
	let note = state.service.get_note(&id).await?;

	Ok(Json(note))
}

async fn update_note(
	State(state): State<AppState>,
	Path(id): Path<String>,
	JsonBody(payload): JsonBody<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
	let note = state.service.update_note(&id, payload).await?;

	Ok(Json(note))
}

async fn delete_note(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
	state.service.delete_note(&id).await?;

	Ok(Json(SuccessResponse { success: true }))
}

/// The body is optional here; an empty one selects the default action.
async fn refine_note(
	State(state): State<AppState>,
	Path(id): Path<String>,
	body: Bytes,
) -> Result<Json<RefineResponse>, ApiError> {
	let payload = if body.iter().all(u8::is_ascii_whitespace) {
		RefineRequest::default()
	} else {
		serde_json::from_slice(&body).map_err(|err| {
			json_error(StatusCode::BAD_REQUEST, "invalid_json", err.to_string(), None)
		})?
	};
	let response = state.service.refine_note(&id, payload).await?;

	Ok(Json(response))
}

async fn extract_evidence(
	State(state): State<AppState>,
	JsonBody(payload): JsonBody<ExtractEvidenceRequest>,
) -> Result<Json<EvidenceRecord>, ApiError> {
	let record = state.service.extract_evidence(payload).await?;

	Ok(Json(record))
}

async fn search_literature(
	State(state): State<AppState>,
	Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
	let limit = match params.limit.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
		None => None,
		Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
			json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				"limit must be a positive integer.",
				Some(vec!["limit".to_string()]),
			)
		})?),
	};
	let query = params.query.unwrap_or_default();
	let papers = state.service.search_literature(&query, limit).await?;

	Ok(Json(SearchResponse { query: query.trim().to_string(), papers }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchParams {
	query: Option<String>,
	limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
	query: String,
	papers: Vec<Paper>,
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
	success: bool,
}

/// `Json` with body rejections reported in the API error shape.
pub struct JsonBody<T>(pub T);
impl<S, T> FromRequest<S> for JsonBody<T>
where
	S: Send + Sync,
	T: DeserializeOwned + Send,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		match Json::<T>::from_request(req, state).await {
			Ok(Json(value)) => Ok(Self(value)),
			Err(rejection) => Err(rejection.into()),
		}
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
	error_code: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	error: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		error: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), error: error.into(), fields }
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let err_display = err.to_string();

		match err {
			ServiceError::InvalidRequest { .. } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", err_display, None),
			ServiceError::MissingFields { fields } =>
				json_error(StatusCode::BAD_REQUEST, "missing_fields", err_display, Some(fields)),
			ServiceError::NotFound { .. } =>
				json_error(StatusCode::NOT_FOUND, "not_found", err_display, None),
			ServiceError::Provider { message } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "provider_error", message, None),
			ServiceError::ResearchBuild { message } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "research_build_failed", message, None),
			ServiceError::Storage { .. } => {
				tracing::error!(error = %err_display, "Storage failure while serving request.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", err_display, None)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text(), None)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error: self.error, error_code: self.error_code, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
