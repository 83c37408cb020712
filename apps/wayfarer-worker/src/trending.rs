use std::time::Instant;

use time::OffsetDateTime;

use wayfarer_config::Trending;
use wayfarer_domain::{
	ContentKind, TrendingFormula,
	trending::{needs_write, window_start},
};
use wayfarer_storage::{
	db::Db,
	models::{ScoreUpdate, TrendingCandidate},
	trending,
};

use crate::{BoxFuture, Result};

/// Storage operations one recomputation run needs.
pub trait TrendingStore
where
	Self: Send + Sync,
{
	fn fetch_candidates<'a>(
		&'a self,
		kind: ContentKind,
		since: OffsetDateTime,
	) -> BoxFuture<'a, wayfarer_storage::Result<Vec<TrendingCandidate>>>;

	fn write_scores<'a>(
		&'a self,
		kind: ContentKind,
		updates: &'a [ScoreUpdate],
	) -> BoxFuture<'a, wayfarer_storage::Result<u64>>;
}
impl TrendingStore for Db {
	fn fetch_candidates<'a>(
		&'a self,
		kind: ContentKind,
		since: OffsetDateTime,
	) -> BoxFuture<'a, wayfarer_storage::Result<Vec<TrendingCandidate>>> {
		Box::pin(trending::fetch_candidates(self, kind, since))
	}

	fn write_scores<'a>(
		&'a self,
		kind: ContentKind,
		updates: &'a [ScoreUpdate],
	) -> BoxFuture<'a, wayfarer_storage::Result<u64>> {
		Box::pin(trending::write_scores(self, kind, updates))
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendingJob {
	pub formula: TrendingFormula,
	pub window_days: i64,
	pub write_epsilon: f64,
}
impl TrendingJob {
	pub fn from_config(cfg: &Trending) -> Self {
		Self {
			formula: TrendingFormula::from_config(cfg),
			window_days: cfg.window_days,
			write_epsilon: cfg.write_epsilon,
		}
	}

	/// Scores that moved by more than the write epsilon.
	pub fn rescore(
		&self,
		candidates: &[TrendingCandidate],
		now: OffsetDateTime,
	) -> Vec<ScoreUpdate> {
		candidates
			.iter()
			.filter_map(|candidate| {
				let score = self.formula.score_at(candidate.engagement(), candidate.created_at, now);

				needs_write(candidate.trending_score, score, self.write_epsilon)
					.then(|| ScoreUpdate { id: candidate.id.clone(), score })
			})
			.collect()
	}

	/// Recomputes plans, then posts. The first failure ends the run.
	pub async fn run_once<S>(&self, store: &S, now: OffsetDateTime) -> Result<RunSummary>
	where
		S: TrendingStore + ?Sized,
	{
		let started = Instant::now();
		let since = window_start(now, self.window_days);
		let mut batches = Vec::with_capacity(ContentKind::ALL.len());

		for kind in ContentKind::ALL {
			let candidates = store.fetch_candidates(kind, since).await?;
			let updates = self.rescore(&candidates, now);
			let written =
				if updates.is_empty() { 0 } else { store.write_scores(kind, &updates).await? };

			if written < updates.len() as u64 {
				tracing::warn!(
					kind = %kind,
					expected = updates.len(),
					written,
					"Some rescored items disappeared before the write."
				);
			}

			tracing::debug!(
				kind = %kind,
				scanned = candidates.len(),
				written,
				"Trending batch finished."
			);

			batches.push(BatchSummary { kind, scanned: candidates.len(), written });
		}

		Ok(RunSummary { batches, elapsed_ms: started.elapsed().as_millis() })
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchSummary {
	pub kind: ContentKind,
	pub scanned: usize,
	pub written: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
	pub batches: Vec<BatchSummary>,
	pub elapsed_ms: u128,
}
impl RunSummary {
	pub fn written(&self) -> u64 {
		self.batches.iter().map(|batch| batch.written).sum()
	}
}
