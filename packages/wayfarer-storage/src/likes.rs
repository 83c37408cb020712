use std::collections::HashSet;

use wayfarer_domain::{ContentKind, ContentRef, ObjectId};

use crate::{Error, Result, content::table, db::Db};

/// Outcome of a like or unlike.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LikeState {
	pub liked: bool,
	pub likes_count: i64,
	/// False when the call was a no-op because the like already existed (or was already gone).
	pub changed: bool,
}

pub async fn like(db: &Db, user_id: &ObjectId, target: &ContentRef) -> Result<LikeState> {
	let mut tx = db.pool.begin().await?;
	let lock_sql =
		format!("SELECT likes_count FROM {} WHERE id = $1 FOR UPDATE", table(target.kind));
	let current: Option<i64> =
		sqlx::query_scalar(&lock_sql).bind(target.id.as_str()).fetch_optional(&mut *tx).await?;
	let Some(current) = current else {
		return Err(Error::NotFound(format!("{} {}", target.kind, target.id)));
	};
	let result = sqlx::query(
		"\
INSERT INTO likes (user_id, target_kind, target_id)
VALUES ($1, $2, $3)
ON CONFLICT DO NOTHING",
	)
	.bind(user_id.as_str())
	.bind(target.kind.as_str())
	.bind(target.id.as_str())
	.execute(&mut *tx)
	.await
	.map_err(|err| match err {
		sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() =>
			Error::NotFound(format!("user {user_id}")),
		err => Error::from(err),
	})?;
	let inserted = result.rows_affected() == 1;
	let likes_count = if inserted {
		let sql = format!(
			"UPDATE {} SET likes_count = likes_count + 1 WHERE id = $1 RETURNING likes_count",
			table(target.kind)
		);

		sqlx::query_scalar::<_, i64>(&sql).bind(target.id.as_str()).fetch_one(&mut *tx).await?
	} else {
		current
	};

	tx.commit().await?;

	Ok(LikeState { liked: true, likes_count, changed: inserted })
}

pub async fn unlike(db: &Db, user_id: &ObjectId, target: &ContentRef) -> Result<LikeState> {
	let mut tx = db.pool.begin().await?;
	let lock_sql =
		format!("SELECT likes_count FROM {} WHERE id = $1 FOR UPDATE", table(target.kind));
	let current: Option<i64> =
		sqlx::query_scalar(&lock_sql).bind(target.id.as_str()).fetch_optional(&mut *tx).await?;
	let Some(current) = current else {
		return Err(Error::NotFound(format!("{} {}", target.kind, target.id)));
	};
	let result = sqlx::query(
		"DELETE FROM likes WHERE user_id = $1 AND target_kind = $2 AND target_id = $3",
	)
	.bind(user_id.as_str())
	.bind(target.kind.as_str())
	.bind(target.id.as_str())
	.execute(&mut *tx)
	.await?;
	let deleted = result.rows_affected() == 1;
	let likes_count = if deleted {
		let sql = format!(
			"\
UPDATE {}
SET likes_count = GREATEST(likes_count - 1, 0)
WHERE id = $1
RETURNING likes_count",
			table(target.kind)
		);

		sqlx::query_scalar::<_, i64>(&sql).bind(target.id.as_str()).fetch_one(&mut *tx).await?
	} else {
		current
	};

	tx.commit().await?;

	Ok(LikeState { liked: false, likes_count, changed: deleted })
}

/// Which of `targets` the user has liked, resolved in one query.
pub async fn liked_among(
	db: &Db,
	user_id: &ObjectId,
	targets: &[ContentRef],
) -> Result<HashSet<ContentRef>> {
	if targets.is_empty() {
		return Ok(HashSet::new());
	}

	let kinds: Vec<String> =
		targets.iter().map(|target| target.kind.as_str().to_string()).collect();
	let ids: Vec<String> = targets.iter().map(|target| target.id.to_string()).collect();
	let rows: Vec<(String, String)> = sqlx::query_as(
		"\
SELECT likes.target_kind, likes.target_id
FROM likes
JOIN UNNEST($2::text[], $3::text[]) AS wanted(kind, id)
	ON likes.target_kind = wanted.kind AND likes.target_id = wanted.id
WHERE likes.user_id = $1",
	)
	.bind(user_id.as_str())
	.bind(kinds)
	.bind(ids)
	.fetch_all(&db.pool)
	.await?;
	let mut liked = HashSet::with_capacity(rows.len());

	for (kind, id) in rows {
		let kind =
			kind.parse::<ContentKind>().map_err(|err| Error::InvalidArgument(err.to_string()))?;
		let id = ObjectId::parse(&id).map_err(|err| Error::InvalidArgument(err.to_string()))?;

		liked.insert(ContentRef { kind, id });
	}

	Ok(liked)
}
