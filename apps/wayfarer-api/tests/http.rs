use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use wayfarer_api::{routes, state::AppState};
use wayfarer_domain::{ContentKind, ContentRef};
use wayfarer_service::WayfarerService;
use wayfarer_testkit::{
	TestDatabase,
	memory::{MemoryStore, content_row, oid, test_config, user_row},
};

const VIEWER: &str = "65a0000000000000000000f1";
const PLAN_A: &str = "65a000000000000000000011";
const PLAN_B: &str = "65a000000000000000000013";
const POST: &str = "65a000000000000000000012";

fn seeded_store() -> Arc<MemoryStore> {
	let store = Arc::new(MemoryStore::new());

	store.insert(content_row(ContentKind::TravelPlan, PLAN_A, 95.2));
	store.insert(content_row(ContentKind::TravelPlan, PLAN_B, 92.1));
	store.insert(content_row(ContentKind::Post, POST, 50.0));

	store
}

fn app(store: &Arc<MemoryStore>) -> Router {
	let service = WayfarerService::with_store(test_config(), store.clone());

	routes::router(AppState::from_service(service))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.expect("Failed to call router.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = if body.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&body).expect("Failed to parse response.")
	};

	(status, json)
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request.")
}

fn get_as(uri: &str, user_id: &str) -> Request<Body> {
	Request::builder()
		.uri(uri)
		.header(routes::USER_ID_HEADER, user_id)
		.body(Body::empty())
		.expect("Failed to build request.")
}

fn send_json(method: &str, uri: &str, user_id: Option<&str>, payload: Value) -> Request<Body> {
	let mut builder =
		Request::builder().method(method).uri(uri).header("content-type", "application/json");

	if let Some(user_id) = user_id {
		builder = builder.header(routes::USER_ID_HEADER, user_id);
	}

	builder.body(Body::from(payload.to_string())).expect("Failed to build request.")
}

#[tokio::test]
async fn health_returns_ok() {
	let (status, _) = send(app(&seeded_store()), get("/health")).await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn discover_pages_with_cursor() {
	let store = seeded_store();
	let (status, first) = send(app(&store), get("/api/discovery/discover?limit=2")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(first["data"][0]["id"], PLAN_A);
	assert_eq!(first["data"][1]["id"], PLAN_B);
	assert_eq!(first["pagination"]["next_cursor"], format!("92.1|TravelPlan|{PLAN_B}"));
	assert_eq!(first["pagination"]["has_next_page"], true);

	let uri = format!("/api/discovery/discover?limit=2&after=92.1%7CTravelPlan%7C{PLAN_B}");
	let (status, second) = send(app(&store), get(&uri)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(second["data"].as_array().map(Vec::len), Some(1));
	assert_eq!(second["data"][0]["id"], POST);
	assert_eq!(second["data"][0]["type"], "Post");
	assert_eq!(second["pagination"]["next_cursor"], Value::Null);
	assert_eq!(second["pagination"]["has_next_page"], false);
}

#[tokio::test]
async fn bad_limit_and_cursor_degrade_to_defaults() {
	let store = seeded_store();
	let (status, json) =
		send(app(&store), get("/api/discovery/discover?limit=lots&after=%7C%7C")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["data"].as_array().map(Vec::len), Some(3));
	assert_eq!(json["data"][0]["id"], PLAN_A);
	assert_eq!(json["pagination"]["has_next_page"], false);
}

#[tokio::test]
async fn authenticated_feed_marks_liked_items() {
	let store = seeded_store();

	store.seed_like(&oid(VIEWER), ContentRef { kind: ContentKind::Post, id: oid(POST) });

	let (_, json) = send(app(&store), get_as("/api/discovery/discover", VIEWER)).await;

	assert_eq!(json["data"][0]["isLiked"], false);
	assert_eq!(json["data"][2]["isLiked"], true);
	assert_eq!(store.liked_lookups(), 1);

	let (_, anonymous) = send(app(&store), get_as("/api/discovery/discover", "not-a-user")).await;

	assert_eq!(anonymous["data"][2]["isLiked"], false);
	assert_eq!(store.liked_lookups(), 1);
}

#[tokio::test]
async fn type_listings_and_people_search() {
	let store = seeded_store();

	store.insert_user(user_row("65a0000000000000000000a1", "marta", "Marta Silva"));
	store.insert_user(user_row("65a0000000000000000000a2", "zoe", "Zoe Park"));

	let (status, plans) = send(app(&store), get("/api/discovery/plans?limit=1")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(plans["data"][0]["id"], PLAN_A);
	assert_eq!(plans["data"][0]["remixCount"], 0);
	assert_eq!(plans["pagination"]["has_next_page"], true);

	let (_, posts) = send(app(&store), get("/api/discovery/posts?q=nothing-matches")).await;

	assert_eq!(posts["data"].as_array().map(Vec::len), Some(0));
	assert_eq!(posts["pagination"]["next_cursor"], Value::Null);

	let (_, people) = send(app(&store), get("/api/discovery/people?q=mar")).await;

	assert_eq!(people["data"].as_array().map(Vec::len), Some(1));
	assert_eq!(people["data"][0]["displayName"], "Marta Silva");
}

#[tokio::test]
async fn like_routes_require_identity_and_are_idempotent() {
	let store = seeded_store();
	let uri = format!("/api/content/plans/{PLAN_A}/like");
	let (status, json) = send(app(&store), send_json("POST", &uri, None, Value::Null)).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(json["error_code"], "UNAUTHORIZED");

	for _ in 0..2 {
		let (status, json) =
			send(app(&store), send_json("POST", &uri, Some(VIEWER), Value::Null)).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(json["liked"], true);
		assert_eq!(json["likes_count"], 1);
	}

	let (status, json) =
		send(app(&store), send_json("DELETE", &uri, Some(VIEWER), Value::Null)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["liked"], false);
	assert_eq!(json["likes_count"], 0);
}

#[tokio::test]
async fn like_routes_validate_targets() {
	let store = seeded_store();
	let cases = [
		(format!("/api/content/videos/{PLAN_A}/like"), StatusCode::BAD_REQUEST),
		("/api/content/plans/xyz/like".to_string(), StatusCode::BAD_REQUEST),
		(format!("/api/content/posts/{PLAN_A}/like"), StatusCode::NOT_FOUND),
	];

	for (uri, expected) in cases {
		let (status, _) =
			send(app(&store), send_json("POST", &uri, Some(VIEWER), Value::Null)).await;

		assert_eq!(status, expected, "{uri}");
	}
}

#[tokio::test]
async fn counter_hooks_adjust_and_floor() {
	let store = seeded_store();
	let comments = format!("/api/content/posts/{POST}/comments/count");
	let (status, json) = send(
		app(&store),
		send_json("POST", &comments, None, serde_json::json!({ "delta": -1 })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["count"], 0);

	let remixes = format!("/api/content/plans/{PLAN_B}/remixes/count");
	let (status, json) =
		send(app(&store), send_json("POST", &remixes, None, serde_json::json!({ "delta": 1 })))
			.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["count"], 1);

	let post_remixes = format!("/api/content/posts/{POST}/remixes/count");
	let (status, _) = send(
		app(&store),
		send_json("POST", &post_remixes, None, serde_json::json!({ "delta": 1 })),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set WAYFARER_PG_DSN to run."]
async fn postgres_backed_feed_starts_empty() {
	let Some(base_dsn) = wayfarer_testkit::env_dsn() else {
		eprintln!("Skipping postgres_backed_feed_starts_empty; set WAYFARER_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let mut config = test_config();

	config.storage.postgres.dsn = test_db.dsn().to_string();

	let state = AppState::new(config).await.expect("Failed to initialize app state.");
	let (status, json) = send(routes::router(state), get("/api/discovery/discover")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["data"], serde_json::json!([]));
	assert_eq!(json["pagination"]["has_next_page"], false);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
