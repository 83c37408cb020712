use time::OffsetDateTime;

use wayfarer_domain::{ContentKind, Engagement, ObjectId, Ranked};

/// A plan or post projected onto the columns both collections share.
///
/// `text` is the plan summary or the post body. `remix_count` is `None` for posts.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ContentRow {
	#[sqlx(try_from = "String")]
	pub id: ObjectId,
	#[sqlx(try_from = "String")]
	pub kind: ContentKind,
	#[sqlx(try_from = "String")]
	pub author_id: ObjectId,
	pub title: String,
	pub text: String,
	pub privacy: String,
	pub likes_count: i64,
	pub comments_count: i64,
	pub remix_count: Option<i64>,
	pub trending_score: f64,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl Ranked for ContentRow {
	fn trending_score(&self) -> f64 {
		self.trending_score
	}

	fn object_id(&self) -> &ObjectId {
		&self.id
	}

	fn kind(&self) -> ContentKind {
		self.kind
	}
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct UserRow {
	#[sqlx(try_from = "String")]
	pub id: ObjectId,
	pub username: String,
	pub display_name: String,
	pub bio: String,
	pub created_at: OffsetDateTime,
}

/// The columns the trending job needs to rescore one item.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct TrendingCandidate {
	#[sqlx(try_from = "String")]
	pub id: ObjectId,
	pub likes_count: i64,
	pub comments_count: i64,
	pub remix_count: Option<i64>,
	pub trending_score: f64,
	pub created_at: OffsetDateTime,
}
impl TrendingCandidate {
	pub fn engagement(&self) -> Engagement {
		Engagement {
			likes: self.likes_count,
			comments: self.comments_count,
			remixes: self.remix_count,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreUpdate {
	pub id: ObjectId,
	pub score: f64,
}

#[derive(Clone, Debug)]
pub struct NewContent {
	pub id: ObjectId,
	pub kind: ContentKind,
	pub author_id: ObjectId,
	pub title: String,
	pub text: String,
	pub public: bool,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct NewUser {
	pub id: ObjectId,
	pub username: String,
	pub display_name: String,
	pub bio: String,
}
