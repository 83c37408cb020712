use sqlx::{Postgres, QueryBuilder};

use wayfarer_domain::{ContentKind, Cursor, ObjectId};

use crate::{
	Error, Result,
	db::Db,
	models::{ContentRow, NewContent},
};

/// Parameters of one per-collection keyset read.
#[derive(Clone, Copy, Debug)]
pub struct RankedQuery<'a> {
	pub kind: ContentKind,
	pub after: Option<&'a Cursor>,
	/// Case-insensitive substring matched against the title and the summary or body.
	pub search: Option<&'a str>,
	pub limit: i64,
}

pub(crate) fn table(kind: ContentKind) -> &'static str {
	match kind {
		ContentKind::TravelPlan => "travel_plans",
		ContentKind::Post => "posts",
	}
}

fn text_column(kind: ContentKind) -> &'static str {
	match kind {
		ContentKind::TravelPlan => "summary",
		ContentKind::Post => "body",
	}
}

fn remix_column(kind: ContentKind) -> &'static str {
	if kind.tracks_remixes() { "remix_count" } else { "NULL::bigint" }
}

fn select_columns(kind: ContentKind) -> String {
	format!(
		"\
SELECT
	id,
	'{kind}' AS kind,
	author_id,
	title,
	{text} AS text,
	privacy,
	likes_count,
	comments_count,
	{remix} AS remix_count,
	trending_score,
	created_at,
	updated_at
FROM {table}",
		kind = kind.as_str(),
		text = text_column(kind),
		remix = remix_column(kind),
		table = table(kind),
	)
}

/// Escapes LIKE metacharacters and wraps the term for a substring match.
pub fn like_pattern(term: &str) -> String {
	let mut out = String::with_capacity(term.len() + 2);

	out.push('%');

	for ch in term.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}

/// Public items of one kind strictly after `query.after`, in `(trending_score desc, id desc)`
/// order.
pub async fn fetch_ranked(db: &Db, query: RankedQuery<'_>) -> Result<Vec<ContentRow>> {
	if query.limit <= 0 {
		return Err(Error::InvalidArgument("limit must be greater than zero.".to_string()));
	}

	let mut builder = QueryBuilder::<Postgres>::new(select_columns(query.kind));

	builder.push(" WHERE privacy = 'public'");

	if let Some(cursor) = query.after {
		builder.push(" AND (trending_score < ");
		builder.push_bind(cursor.score);
		builder.push(" OR (trending_score = ");
		builder.push_bind(cursor.score);
		builder.push(" AND id < ");
		builder.push_bind(cursor.id.as_str().to_string());
		builder.push("))");
	}
	if let Some(term) = query.search.map(str::trim).filter(|term| !term.is_empty()) {
		let pattern = like_pattern(term);

		builder.push(" AND (title ILIKE ");
		builder.push_bind(pattern.clone());
		builder.push(format!(" ESCAPE '\\' OR {} ILIKE ", text_column(query.kind)));
		builder.push_bind(pattern);
		builder.push(" ESCAPE '\\')");
	}

	builder.push(" ORDER BY trending_score DESC, id DESC LIMIT ");
	builder.push_bind(query.limit);

	let rows = builder.build_query_as::<ContentRow>().fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn insert_content(db: &Db, content: &NewContent) -> Result<()> {
	let privacy = if content.public { "public" } else { "private" };
	let sql = format!(
		"\
INSERT INTO {table} (id, author_id, title, {text}, privacy, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $6)",
		table = table(content.kind),
		text = text_column(content.kind),
	);

	sqlx::query(&sql)
		.bind(content.id.as_str())
		.bind(content.author_id.as_str())
		.bind(content.title.as_str())
		.bind(content.text.as_str())
		.bind(privacy)
		.bind(content.created_at)
		.execute(&db.pool)
		.await?;

	Ok(())
}

/// Applies `delta` to `comments_count`, flooring at zero. Returns the new count.
pub async fn adjust_comments_count(
	db: &Db,
	kind: ContentKind,
	id: &ObjectId,
	delta: i64,
) -> Result<i64> {
	adjust_counter(db, kind, "comments_count", id, delta).await
}

/// Applies `delta` to a plan's `remix_count`, flooring at zero. Returns the new count.
pub async fn adjust_remix_count(db: &Db, id: &ObjectId, delta: i64) -> Result<i64> {
	adjust_counter(db, ContentKind::TravelPlan, "remix_count", id, delta).await
}

async fn adjust_counter(
	db: &Db,
	kind: ContentKind,
	column: &str,
	id: &ObjectId,
	delta: i64,
) -> Result<i64> {
	let sql = format!(
		"\
UPDATE {table}
SET {column} = GREATEST({column} + $1, 0), updated_at = now()
WHERE id = $2
RETURNING {column}",
		table = table(kind),
	);
	let count: Option<i64> = sqlx::query_scalar(&sql)
		.bind(delta)
		.bind(id.as_str())
		.fetch_optional(&db.pool)
		.await?;

	count.ok_or_else(|| Error::NotFound(format!("{kind} {id}")))
}
