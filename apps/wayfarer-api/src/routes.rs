use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use wayfarer_domain::{ContentKind, ObjectId};
use wayfarer_service::{
	CounterResponse, DiscoveryPage, DiscoveryRequest, Error as ServiceError, LikeResponse,
	PeopleRequest, PeopleResponse,
};

use crate::state::AppState;

/// Caller identity set by the upstream auth gateway.
pub const USER_ID_HEADER: &str = "x-wayfarer-user-id";

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

#[derive(Debug, Default, Deserialize)]
pub struct DiscoveryQuery {
	pub after: Option<String>,
	pub limit: Option<String>,
	pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CounterRequest {
	pub delta: i64,
}

#[derive(Serialize)]
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

	/// Maps a service error to a response. Storage failures hide their detail unless
	/// `expose_details` is set.
	pub fn from_service(err: ServiceError, expose_details: bool) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::Unauthorized { message } =>
				Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Request failed on storage.");

				let message =
					if expose_details { message } else { INTERNAL_ERROR_MESSAGE.to_string() };

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/discovery/discover", get(discover))
		.route("/api/discovery/plans", get(list_plans))
		.route("/api/discovery/posts", get(list_posts))
		.route("/api/discovery/people", get(people))
		.route("/api/content/{segment}/{id}/like", post(like).delete(unlike))
		.route("/api/content/{segment}/{id}/comments/count", post(adjust_comments))
		.route("/api/content/{segment}/{id}/remixes/count", post(adjust_remixes))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn discover(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<DiscoveryQuery>,
) -> Result<Json<DiscoveryPage>, ApiError> {
	let req = discovery_request(&headers, query);
	let page = state.service.trending_page(req).await.map_err(|err| api_error(&state, err))?;

	Ok(Json(page))
}

async fn list_plans(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<DiscoveryQuery>,
) -> Result<Json<DiscoveryPage>, ApiError> {
	list_kind(state, ContentKind::TravelPlan, &headers, query).await
}

async fn list_posts(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<DiscoveryQuery>,
) -> Result<Json<DiscoveryPage>, ApiError> {
	list_kind(state, ContentKind::Post, &headers, query).await
}

async fn list_kind(
	state: AppState,
	kind: ContentKind,
	headers: &HeaderMap,
	query: DiscoveryQuery,
) -> Result<Json<DiscoveryPage>, ApiError> {
	let req = discovery_request(headers, query);
	let page = state.service.list_kind(kind, req).await.map_err(|err| api_error(&state, err))?;

	Ok(Json(page))
}

async fn people(
	State(state): State<AppState>,
	Query(query): Query<DiscoveryQuery>,
) -> Result<Json<PeopleResponse>, ApiError> {
	let req = PeopleRequest { query: query.q, limit: query.limit };
	let response = state.service.search_people(req).await.map_err(|err| api_error(&state, err))?;

	Ok(Json(response))
}

async fn like(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((segment, id)): Path<(String, String)>,
) -> Result<Json<LikeResponse>, ApiError> {
	let viewer = viewer(&headers);
	let response = state
		.service
		.like(viewer.as_ref(), &segment, &id)
		.await
		.map_err(|err| api_error(&state, err))?;

	Ok(Json(response))
}

async fn unlike(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((segment, id)): Path<(String, String)>,
) -> Result<Json<LikeResponse>, ApiError> {
	let viewer = viewer(&headers);
	let response = state
		.service
		.unlike(viewer.as_ref(), &segment, &id)
		.await
		.map_err(|err| api_error(&state, err))?;

	Ok(Json(response))
}

async fn adjust_comments(
	State(state): State<AppState>,
	Path((segment, id)): Path<(String, String)>,
	Json(payload): Json<CounterRequest>,
) -> Result<Json<CounterResponse>, ApiError> {
	let response = state
		.service
		.adjust_comments(&segment, &id, payload.delta)
		.await
		.map_err(|err| api_error(&state, err))?;

	Ok(Json(response))
}

async fn adjust_remixes(
	State(state): State<AppState>,
	Path((segment, id)): Path<(String, String)>,
	Json(payload): Json<CounterRequest>,
) -> Result<Json<CounterResponse>, ApiError> {
	let response = state
		.service
		.adjust_remixes(&segment, &id, payload.delta)
		.await
		.map_err(|err| api_error(&state, err))?;

	Ok(Json(response))
}

fn api_error(state: &AppState, err: ServiceError) -> ApiError {
	ApiError::from_service(err, state.expose_error_details())
}

fn discovery_request(headers: &HeaderMap, query: DiscoveryQuery) -> DiscoveryRequest {
	DiscoveryRequest {
		viewer: viewer(headers),
		after: query.after,
		limit: query.limit,
		search: query.q,
	}
}

/// The caller's user id. Missing or malformed headers are treated as anonymous.
fn viewer(headers: &HeaderMap) -> Option<ObjectId> {
	let raw = headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();

	match ObjectId::parse(raw) {
		Ok(id) => Some(id),
		Err(err) => {
			tracing::debug!(error = %err, "Ignoring malformed caller identity header.");

			None
		},
	}
}
