use time::{Duration, OffsetDateTime};

use wayfarer_config::Postgres;
use wayfarer_domain::{ContentKind, ContentRef, Cursor, ObjectId};
use wayfarer_storage::{
	content::{self, RankedQuery},
	db::Db,
	likes,
	models::{NewContent, NewUser, ScoreUpdate},
	trending, users,
};
use wayfarer_testkit::TestDatabase;

async fn bootstrap(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn oid(n: u32) -> ObjectId {
	ObjectId::parse(&format!("65a0000000000000000{n:05x}")).expect("Expected valid object id.")
}

async fn seed_user(db: &Db, n: u32, username: &str) -> ObjectId {
	let id = oid(n);

	users::insert_user(
		db,
		&NewUser {
			id: id.clone(),
			username: username.to_string(),
			display_name: format!("{username} display"),
			bio: String::new(),
		},
	)
	.await
	.expect("Failed to insert user.");

	id
}

async fn seed_content(
	db: &Db,
	kind: ContentKind,
	n: u32,
	author: &ObjectId,
	public: bool,
	created_at: OffsetDateTime,
) -> ObjectId {
	let id = oid(n);

	content::insert_content(
		db,
		&NewContent {
			id: id.clone(),
			kind,
			author_id: author.clone(),
			title: format!("Item {n}"),
			text: "Three days in Lisbon".to_string(),
			public,
			created_at,
		},
	)
	.await
	.expect("Failed to insert content.");

	id
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set WAYFARER_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some(base_dsn) = wayfarer_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set WAYFARER_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	db.ensure_schema().await.expect("Failed to re-run schema.");

	for table in ["users", "travel_plans", "posts", "likes"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Missing table {table}.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set WAYFARER_PG_DSN to run."]
async fn keyset_reads_follow_score_then_id() {
	let Some(base_dsn) = wayfarer_testkit::env_dsn() else {
		eprintln!("Skipping keyset_reads_follow_score_then_id; set WAYFARER_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let now = OffsetDateTime::now_utc();
	let author = seed_user(&db, 1, "ana").await;
	let a = seed_content(&db, ContentKind::TravelPlan, 11, &author, true, now).await;
	let b = seed_content(&db, ContentKind::TravelPlan, 12, &author, true, now).await;
	let c = seed_content(&db, ContentKind::TravelPlan, 13, &author, true, now).await;
	let hidden = seed_content(&db, ContentKind::TravelPlan, 14, &author, false, now).await;

	trending::write_scores(
		&db,
		ContentKind::TravelPlan,
		&[
			ScoreUpdate { id: a.clone(), score: 2.0 },
			ScoreUpdate { id: b.clone(), score: 2.0 },
			ScoreUpdate { id: c.clone(), score: 0.5 },
			ScoreUpdate { id: hidden.clone(), score: 99.0 },
		],
	)
	.await
	.expect("Failed to write scores.");

	let first = content::fetch_ranked(
		&db,
		RankedQuery { kind: ContentKind::TravelPlan, after: None, search: None, limit: 10 },
	)
	.await
	.expect("Failed to fetch ranked plans.");
	let ids: Vec<ObjectId> = first.iter().map(|row| row.id.clone()).collect();

	assert_eq!(ids, vec![b.clone(), a.clone(), c.clone()]);
	assert_eq!(first[0].remix_count, Some(0));

	let cursor = Cursor::new(2.0, ContentKind::TravelPlan, b.clone());
	let rest = content::fetch_ranked(
		&db,
		RankedQuery {
			kind: ContentKind::TravelPlan,
			after: Some(&cursor),
			search: None,
			limit: 10,
		},
	)
	.await
	.expect("Failed to fetch ranked plans after cursor.");
	let ids: Vec<ObjectId> = rest.iter().map(|row| row.id.clone()).collect();

	assert_eq!(ids, vec![a, c]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set WAYFARER_PG_DSN to run."]
async fn trending_candidates_respect_window_and_privacy() {
	let Some(base_dsn) = wayfarer_testkit::env_dsn() else {
		eprintln!(
			"Skipping trending_candidates_respect_window_and_privacy; set WAYFARER_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let now = OffsetDateTime::now_utc();
	let author = seed_user(&db, 1, "ana").await;
	let fresh = seed_content(&db, ContentKind::Post, 21, &author, true, now).await;
	let _stale =
		seed_content(&db, ContentKind::Post, 22, &author, true, now - Duration::days(8)).await;
	let _private = seed_content(&db, ContentKind::Post, 23, &author, false, now).await;
	let candidates = trending::fetch_candidates(&db, ContentKind::Post, now - Duration::days(7))
		.await
		.expect("Failed to fetch candidates.");

	assert_eq!(candidates.len(), 1);
	assert_eq!(candidates[0].id, fresh);
	assert_eq!(candidates[0].remix_count, None);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set WAYFARER_PG_DSN to run."]
async fn likes_are_idempotent_and_counts_never_go_negative() {
	let Some(base_dsn) = wayfarer_testkit::env_dsn() else {
		eprintln!(
			"Skipping likes_are_idempotent_and_counts_never_go_negative; set WAYFARER_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let now = OffsetDateTime::now_utc();
	let author = seed_user(&db, 1, "ana").await;
	let fan = seed_user(&db, 2, "bo").await;
	let plan = seed_content(&db, ContentKind::TravelPlan, 31, &author, true, now).await;
	let target = ContentRef { kind: ContentKind::TravelPlan, id: plan.clone() };
	let first = likes::like(&db, &fan, &target).await.expect("Failed to like.");
	let second = likes::like(&db, &fan, &target).await.expect("Failed to like again.");

	assert!(first.changed);
	assert!(!second.changed);
	assert_eq!(second.likes_count, 1);

	let liked = likes::liked_among(&db, &fan, &[target.clone()]).await.expect("Failed lookup.");

	assert!(liked.contains(&target));

	let removed = likes::unlike(&db, &fan, &target).await.expect("Failed to unlike.");
	let again = likes::unlike(&db, &fan, &target).await.expect("Failed to unlike again.");

	assert_eq!(removed.likes_count, 0);
	assert!(!again.changed);
	assert_eq!(again.likes_count, 0);

	let comments = content::adjust_comments_count(&db, ContentKind::TravelPlan, &plan, -1)
		.await
		.expect("Failed to adjust comments.");

	assert_eq!(comments, 0);

	let remixes =
		content::adjust_remix_count(&db, &plan, 2).await.expect("Failed to adjust remixes.");

	assert_eq!(remixes, 2);

	let missing = ContentRef { kind: ContentKind::Post, id: oid(999) };

	assert!(matches!(
		likes::like(&db, &fan, &missing).await,
		Err(wayfarer_storage::Error::NotFound(_))
	));

	let stranger = oid(998);

	assert!(matches!(
		likes::like(&db, &stranger, &target).await,
		Err(wayfarer_storage::Error::NotFound(message)) if message.contains("user")
	));
	assert_eq!(
		likes::unlike(&db, &fan, &target).await.expect("Failed to read like state.").likes_count,
		0
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set WAYFARER_PG_DSN to run."]
async fn people_search_matches_username_or_display_name() {
	let Some(base_dsn) = wayfarer_testkit::env_dsn() else {
		eprintln!(
			"Skipping people_search_matches_username_or_display_name; set WAYFARER_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed_user(&db, 1, "marta").await;
	seed_user(&db, 2, "Martin").await;
	seed_user(&db, 3, "zoe").await;

	let found = users::search_users(&db, "mart", 10).await.expect("Failed to search users.");
	let names: Vec<&str> = found.iter().map(|user| user.username.as_str()).collect();

	assert_eq!(names, vec!["marta", "Martin"]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
