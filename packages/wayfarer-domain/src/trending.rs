use time::{Duration, OffsetDateTime};

use wayfarer_config::{EngagementWeights, Trending};

const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Engagement counters as stored on a content item. `remixes` is `None` for kinds that do not
/// track remixes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Engagement {
	pub likes: i64,
	pub comments: i64,
	pub remixes: Option<i64>,
}

/// Gravity-decay scoring: `points / (hours + offset) ^ gravity`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendingFormula {
	pub weights: EngagementWeights,
	pub gravity: f64,
	pub age_offset_hours: f64,
}
impl TrendingFormula {
	pub fn from_config(cfg: &Trending) -> Self {
		Self { weights: cfg.weights, gravity: cfg.gravity, age_offset_hours: cfg.age_offset_hours }
	}

	pub fn engagement_points(&self, engagement: Engagement) -> f64 {
		let mut points = engagement.likes.max(0) as f64 * self.weights.likes
			+ engagement.comments.max(0) as f64 * self.weights.comments;

		if let Some(remixes) = engagement.remixes {
			points += remixes.max(0) as f64 * self.weights.remixes;
		}

		points
	}

	pub fn score(&self, engagement: Engagement, hours_since_creation: f64) -> f64 {
		let hours = hours_since_creation.max(0.0);

		self.engagement_points(engagement) / (hours + self.age_offset_hours).powf(self.gravity)
	}

	pub fn score_at(
		&self,
		engagement: Engagement,
		created_at: OffsetDateTime,
		now: OffsetDateTime,
	) -> f64 {
		self.score(engagement, hours_between(created_at, now))
	}
}
impl Default for TrendingFormula {
	fn default() -> Self {
		Self::from_config(&Trending::default())
	}
}

/// Fractional hours from `created_at` to `now`. Negative when `created_at` is in the future.
pub fn hours_between(created_at: OffsetDateTime, now: OffsetDateTime) -> f64 {
	(now - created_at).as_seconds_f64() / SECONDS_PER_HOUR
}

/// Oldest creation time still eligible for rescoring at `now`.
pub fn window_start(now: OffsetDateTime, window_days: i64) -> OffsetDateTime {
	now - Duration::days(window_days)
}

pub fn needs_write(stored: f64, recomputed: f64, epsilon: f64) -> bool {
	(recomputed - stored).abs() > epsilon
}
