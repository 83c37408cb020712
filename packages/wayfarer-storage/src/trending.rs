use time::OffsetDateTime;

use wayfarer_domain::ContentKind;

use crate::{
	Result,
	content::table,
	db::Db,
	models::{ScoreUpdate, TrendingCandidate},
};

/// Public items of `kind` created at or after `since`.
pub async fn fetch_candidates(
	db: &Db,
	kind: ContentKind,
	since: OffsetDateTime,
) -> Result<Vec<TrendingCandidate>> {
	let remix = if kind.tracks_remixes() { "remix_count" } else { "NULL::bigint" };
	let sql = format!(
		"\
SELECT id, likes_count, comments_count, {remix} AS remix_count, trending_score, created_at
FROM {table}
WHERE privacy = 'public' AND created_at >= $1",
		table = table(kind),
	);
	let rows = sqlx::query_as::<_, TrendingCandidate>(&sql).bind(since).fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Writes all scores for one kind in a single statement. Returns the number of rows updated.
pub async fn write_scores(db: &Db, kind: ContentKind, updates: &[ScoreUpdate]) -> Result<u64> {
	if updates.is_empty() {
		return Ok(0);
	}

	let ids: Vec<String> = updates.iter().map(|update| update.id.to_string()).collect();
	let scores: Vec<f64> = updates.iter().map(|update| update.score).collect();
	let sql = format!(
		"\
UPDATE {table} AS target
SET trending_score = incoming.score
FROM UNNEST($1::text[], $2::float8[]) AS incoming(id, score)
WHERE target.id = incoming.id",
		table = table(kind),
	);
	let result = sqlx::query(&sql).bind(ids).bind(scores).execute(&db.pool).await?;

	Ok(result.rows_affected())
}
