use std::collections::HashSet;

use wayfarer_domain::{ContentKind, ContentRef, ObjectId};
use wayfarer_storage::{
	Result,
	content::{self, RankedQuery},
	db::Db,
	likes::{self, LikeState},
	models::{ContentRow, UserRow},
	users,
};

use crate::BoxFuture;

/// Engagement-store operations the discovery service depends on.
pub trait ContentStore
where
	Self: Send + Sync,
{
	fn fetch_ranked<'a>(&'a self, query: RankedQuery<'a>) -> BoxFuture<'a, Result<Vec<ContentRow>>>;

	fn liked_among<'a>(
		&'a self,
		user_id: &'a ObjectId,
		targets: &'a [ContentRef],
	) -> BoxFuture<'a, Result<HashSet<ContentRef>>>;

	fn like<'a>(
		&'a self,
		user_id: &'a ObjectId,
		target: &'a ContentRef,
	) -> BoxFuture<'a, Result<LikeState>>;

	fn unlike<'a>(
		&'a self,
		user_id: &'a ObjectId,
		target: &'a ContentRef,
	) -> BoxFuture<'a, Result<LikeState>>;

	fn adjust_comments<'a>(
		&'a self,
		kind: ContentKind,
		id: &'a ObjectId,
		delta: i64,
	) -> BoxFuture<'a, Result<i64>>;

	fn adjust_remixes<'a>(&'a self, id: &'a ObjectId, delta: i64) -> BoxFuture<'a, Result<i64>>;

	fn search_users<'a>(&'a self, term: &'a str, limit: i64)
	-> BoxFuture<'a, Result<Vec<UserRow>>>;
}

/// [`ContentStore`] backed by the Postgres engagement store.
pub struct PgContentStore {
	pub db: Db,
}
impl PgContentStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl ContentStore for PgContentStore {
	fn fetch_ranked<'a>(&'a self, query: RankedQuery<'a>) -> BoxFuture<'a, Result<Vec<ContentRow>>> {
		Box::pin(content::fetch_ranked(&self.db, query))
	}

	fn liked_among<'a>(
		&'a self,
		user_id: &'a ObjectId,
		targets: &'a [ContentRef],
	) -> BoxFuture<'a, Result<HashSet<ContentRef>>> {
		Box::pin(likes::liked_among(&self.db, user_id, targets))
	}

	fn like<'a>(
		&'a self,
		user_id: &'a ObjectId,
		target: &'a ContentRef,
	) -> BoxFuture<'a, Result<LikeState>> {
		Box::pin(likes::like(&self.db, user_id, target))
	}

	fn unlike<'a>(
		&'a self,
		user_id: &'a ObjectId,
		target: &'a ContentRef,
	) -> BoxFuture<'a, Result<LikeState>> {
		Box::pin(likes::unlike(&self.db, user_id, target))
	}

	fn adjust_comments<'a>(
		&'a self,
		kind: ContentKind,
		id: &'a ObjectId,
		delta: i64,
	) -> BoxFuture<'a, Result<i64>> {
		Box::pin(content::adjust_comments_count(&self.db, kind, id, delta))
	}

	fn adjust_remixes<'a>(&'a self, id: &'a ObjectId, delta: i64) -> BoxFuture<'a, Result<i64>> {
		Box::pin(content::adjust_remix_count(&self.db, id, delta))
	}

	fn search_users<'a>(
		&'a self,
		term: &'a str,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<UserRow>>> {
		Box::pin(users::search_users(&self.db, term, limit))
	}
}
