use crate::{
	Result,
	content::like_pattern,
	db::Db,
	models::{NewUser, UserRow},
};

pub async fn insert_user(db: &Db, user: &NewUser) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO users (id, username, display_name, bio)
VALUES ($1, $2, $3, $4)",
	)
	.bind(user.id.as_str())
	.bind(user.username.as_str())
	.bind(user.display_name.as_str())
	.bind(user.bio.as_str())
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Users whose username or display name contains `term`, ordered by username. An empty term lists
/// everyone.
pub async fn search_users(db: &Db, term: &str, limit: i64) -> Result<Vec<UserRow>> {
	let pattern = like_pattern(term.trim());
	let rows = sqlx::query_as::<_, UserRow>(
		"\
SELECT id, username, display_name, bio, created_at
FROM users
WHERE username ILIKE $1 OR display_name ILIKE $1
ORDER BY lower(username) ASC, id ASC
LIMIT $2",
	)
	.bind(pattern)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
