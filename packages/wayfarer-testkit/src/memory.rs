//! An in-process [`ContentStore`] for service and HTTP tests that run without Postgres.

use std::{
	collections::HashSet,
	sync::{
		Mutex, MutexGuard, PoisonError,
		atomic::{AtomicUsize, Ordering},
	},
};

use time::OffsetDateTime;

use wayfarer_config::{Config, Discovery, Postgres, Service, Storage, Trending};
use wayfarer_domain::{ContentKind, ContentRef, ObjectId, ranking::sort_feed};
use wayfarer_service::{BoxFuture, ContentStore};
use wayfarer_storage::{
	Error, Result,
	content::RankedQuery,
	likes::LikeState,
	models::{ContentRow, UserRow},
};

#[derive(Default)]
pub struct MemoryStore {
	content: Mutex<Vec<ContentRow>>,
	users: Mutex<Vec<UserRow>>,
	likes: Mutex<HashSet<(ObjectId, ContentRef)>>,
	ranked_reads: AtomicUsize,
	liked_lookups: AtomicUsize,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, row: ContentRow) {
		lock(&self.content).push(row);
	}

	pub fn insert_user(&self, row: UserRow) {
		lock(&self.users).push(row);
	}

	/// Records a like without touching counters, as if it predates the test.
	pub fn seed_like(&self, user_id: &ObjectId, target: ContentRef) {
		lock(&self.likes).insert((user_id.clone(), target));
	}

	pub fn row(&self, kind: ContentKind, id: &ObjectId) -> Option<ContentRow> {
		lock(&self.content).iter().find(|row| row.kind == kind && &row.id == id).cloned()
	}

	/// Number of per-collection ranked reads served so far.
	pub fn ranked_reads(&self) -> usize {
		self.ranked_reads.load(Ordering::SeqCst)
	}

	/// Number of batched liked-status lookups served so far.
	pub fn liked_lookups(&self) -> usize {
		self.liked_lookups.load(Ordering::SeqCst)
	}

	fn update_row<F>(&self, kind: ContentKind, id: &ObjectId, apply: F) -> Result<i64>
	where
		F: FnOnce(&mut ContentRow) -> i64,
	{
		let mut content = lock(&self.content);
		let row = content
			.iter_mut()
			.find(|row| row.kind == kind && &row.id == id)
			.ok_or_else(|| Error::NotFound(format!("{kind} {id}")))?;

		Ok(apply(row))
	}
}
impl ContentStore for MemoryStore {
	fn fetch_ranked<'a>(&'a self, query: RankedQuery<'a>) -> BoxFuture<'a, Result<Vec<ContentRow>>> {
		self.ranked_reads.fetch_add(1, Ordering::SeqCst);

		let needle =
			query.search.map(str::trim).filter(|term| !term.is_empty()).map(str::to_lowercase);
		let mut rows: Vec<ContentRow> = lock(&self.content)
			.iter()
			.filter(|row| row.kind == query.kind && row.privacy == "public")
			.filter(|row| query.after.is_none_or(|cursor| cursor.admits(row.trending_score, &row.id)))
			.filter(|row| {
				needle.as_deref().is_none_or(|needle| {
					row.title.to_lowercase().contains(needle)
						|| row.text.to_lowercase().contains(needle)
				})
			})
			.cloned()
			.collect();

		sort_feed(&mut rows);
		rows.truncate(usize::try_from(query.limit).unwrap_or(0));

		Box::pin(async move { Ok(rows) })
	}

	fn liked_among<'a>(
		&'a self,
		user_id: &'a ObjectId,
		targets: &'a [ContentRef],
	) -> BoxFuture<'a, Result<HashSet<ContentRef>>> {
		self.liked_lookups.fetch_add(1, Ordering::SeqCst);

		let likes = lock(&self.likes);
		let liked = targets
			.iter()
			.filter(|target| likes.contains(&(user_id.clone(), (*target).clone())))
			.cloned()
			.collect();

		Box::pin(async move { Ok(liked) })
	}

	fn like<'a>(
		&'a self,
		user_id: &'a ObjectId,
		target: &'a ContentRef,
	) -> BoxFuture<'a, Result<LikeState>> {
		let result = self.update_row(target.kind, &target.id, |row| row.likes_count).and_then(|_| {
			let inserted = lock(&self.likes).insert((user_id.clone(), target.clone()));
			let likes_count = self.update_row(target.kind, &target.id, |row| {
				if inserted {
					row.likes_count += 1;
				}

				row.likes_count
			})?;

			Ok(LikeState { liked: true, likes_count, changed: inserted })
		});

		Box::pin(async move { result })
	}

	fn unlike<'a>(
		&'a self,
		user_id: &'a ObjectId,
		target: &'a ContentRef,
	) -> BoxFuture<'a, Result<LikeState>> {
		let result = self.update_row(target.kind, &target.id, |row| row.likes_count).and_then(|_| {
			let removed = lock(&self.likes).remove(&(user_id.clone(), target.clone()));
			let likes_count = self.update_row(target.kind, &target.id, |row| {
				if removed {
					row.likes_count = (row.likes_count - 1).max(0);
				}

				row.likes_count
			})?;

			Ok(LikeState { liked: false, likes_count, changed: removed })
		});

		Box::pin(async move { result })
	}

	fn adjust_comments<'a>(
		&'a self,
		kind: ContentKind,
		id: &'a ObjectId,
		delta: i64,
	) -> BoxFuture<'a, Result<i64>> {
		let result = self.update_row(kind, id, |row| {
			row.comments_count = (row.comments_count + delta).max(0);

			row.comments_count
		});

		Box::pin(async move { result })
	}

	fn adjust_remixes<'a>(&'a self, id: &'a ObjectId, delta: i64) -> BoxFuture<'a, Result<i64>> {
		let result = self.update_row(ContentKind::TravelPlan, id, |row| {
			let count = (row.remix_count.unwrap_or(0) + delta).max(0);

			row.remix_count = Some(count);

			count
		});

		Box::pin(async move { result })
	}

	fn search_users<'a>(
		&'a self,
		term: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<UserRow>>> {
		let needle = term.trim().to_lowercase();
		let mut rows: Vec<UserRow> = lock(&self.users)
			.iter()
			.filter(|user| {
				user.username.to_lowercase().contains(&needle)
					|| user.display_name.to_lowercase().contains(&needle)
			})
			.cloned()
			.collect();

		rows.sort_by(|a, b| {
			a.username.to_lowercase().cmp(&b.username.to_lowercase()).then_with(|| a.id.cmp(&b.id))
		});
		rows.truncate(usize::try_from(limit).unwrap_or(0));

		Box::pin(async move { Ok(rows) })
	}
}

/// A configuration with defaults for every optional section and a DSN that is never dialled.
pub fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			expose_error_details: false,
		},
		storage: Storage {
			postgres: Postgres {
				dsn: "postgres://wayfarer@localhost/unused".to_string(),
				pool_max_conns: 1,
			},
		},
		trending: Trending::default(),
		discovery: Discovery::default(),
	}
}

/// Parses a fixture id, panicking on malformed input.
pub fn oid(raw: &str) -> ObjectId {
	match ObjectId::parse(raw) {
		Ok(id) => id,
		Err(err) => panic!("Invalid fixture object id {raw:?}: {err}."),
	}
}

/// A public item created at the unix epoch with zeroed counters.
pub fn content_row(kind: ContentKind, id: &str, score: f64) -> ContentRow {
	let created_at = OffsetDateTime::UNIX_EPOCH;

	ContentRow {
		id: oid(id),
		kind,
		author_id: oid("65a0000000000000000000aa"),
		title: format!("{kind} {id}"),
		text: String::new(),
		privacy: "public".to_string(),
		likes_count: 0,
		comments_count: 0,
		remix_count: kind.tracks_remixes().then_some(0),
		trending_score: score,
		created_at,
		updated_at: created_at,
	}
}

pub fn user_row(id: &str, username: &str, display_name: &str) -> UserRow {
	UserRow {
		id: oid(id),
		username: username.to_string(),
		display_name: display_name.to_string(),
		bio: String::new(),
		created_at: OffsetDateTime::UNIX_EPOCH,
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
