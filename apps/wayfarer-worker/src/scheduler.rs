use std::{
	future::Future,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration as StdDuration,
};

use time::{Duration, OffsetDateTime};
use tokio::task::JoinHandle;

use crate::trending::{TrendingJob, TrendingStore};

/// Single-slot "run in progress" flag shared by the ticker and the run it spawned.
#[derive(Clone, Debug, Default)]
pub struct RunFlag(Arc<AtomicBool>);
impl RunFlag {
	pub fn try_acquire(&self) -> Option<RunGuard> {
		self.0
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()
			.map(|_| RunGuard { flag: self.0.clone() })
	}

	pub fn is_running(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

/// Clears the flag when the run ends, including on panic.
#[derive(Debug)]
pub struct RunGuard {
	flag: Arc<AtomicBool>,
}
impl Drop for RunGuard {
	fn drop(&mut self) {
		self.flag.store(false, Ordering::Release);
	}
}

pub struct Scheduler {
	store: Arc<dyn TrendingStore>,
	job: TrendingJob,
	interval_seconds: u64,
	flag: RunFlag,
}
impl Scheduler {
	pub fn new(store: Arc<dyn TrendingStore>, job: TrendingJob, interval_seconds: u64) -> Self {
		Self { store, job, interval_seconds, flag: RunFlag::default() }
	}

	/// Starts one run on its own task, or skips the tick while the previous run is in flight.
	pub fn tick(&self, now: OffsetDateTime) -> Option<JoinHandle<()>> {
		let Some(guard) = self.flag.try_acquire() else {
			tracing::warn!(tick = %now, "Previous trending run still in flight. Skipping tick.");

			return None;
		};
		let store = self.store.clone();
		let job = self.job;

		Some(tokio::spawn(async move {
			let _guard = guard;

			match job.run_once(store.as_ref(), now).await {
				Ok(summary) => {
					for batch in &summary.batches {
						tracing::info!(
							kind = %batch.kind,
							scanned = batch.scanned,
							written = batch.written,
							"Trending scores recomputed."
						);
					}

					tracing::info!(
						written = summary.written(),
						elapsed_ms = summary.elapsed_ms as u64,
						"Trending run finished."
					);
				},
				Err(err) => {
					tracing::error!(error = %err, "Trending run failed.");
				},
			}
		}))
	}

	/// Ticks on wall-clock multiples of the interval until `shutdown` resolves, then waits for an
	/// in-flight run.
	pub async fn run_until<F>(self, shutdown: F)
	where
		F: Future<Output = ()>,
	{
		tokio::pin!(shutdown);

		let mut in_flight: Option<JoinHandle<()>> = None;
		let mut boundary = next_tick(OffsetDateTime::now_utc(), self.interval_seconds);

		loop {
			let wait = to_std_duration(boundary - OffsetDateTime::now_utc());

			tokio::select! {
				_ = &mut shutdown => break,
				_ = tokio::time::sleep(wait) => {
					let now = OffsetDateTime::now_utc();

					if let Some(handle) = self.tick(now) {
						in_flight = Some(handle);
					}

					boundary = following_tick(boundary, now, self.interval_seconds);
				},
			}
		}

		if let Some(handle) = in_flight
			&& !handle.is_finished()
		{
			tracing::info!("Waiting for the in-flight trending run to finish.");

			if let Err(err) = handle.await {
				tracing::error!(error = %err, "Trending run task aborted.");
			}
		}
	}
}

/// The first multiple of `interval_seconds` since the unix epoch that is strictly after `now`.
pub fn next_tick(now: OffsetDateTime, interval_seconds: u64) -> OffsetDateTime {
	let interval = Duration::seconds(interval_seconds.max(1) as i64);
	let interval_nanos = interval.whole_nanoseconds();
	let now_nanos = now.unix_timestamp_nanos();
	let next = (now_nanos.div_euclid(interval_nanos) + 1) * interval_nanos;

	OffsetDateTime::from_unix_timestamp_nanos(next).unwrap_or(now + interval)
}

/// The boundary after the one that just fired. A timer that wakes early still moves past
/// `fired`, so each boundary ticks at most once.
pub fn following_tick(
	fired: OffsetDateTime,
	now: OffsetDateTime,
	interval_seconds: u64,
) -> OffsetDateTime {
	next_tick(now.max(fired), interval_seconds)
}

fn to_std_duration(duration: Duration) -> StdDuration {
	StdDuration::try_from(duration).unwrap_or(StdDuration::ZERO)
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use time::macros::datetime;
	use tokio::sync::Semaphore;

	use wayfarer_config::Trending;
	use wayfarer_domain::ContentKind;
	use wayfarer_storage::models::{ScoreUpdate, TrendingCandidate};

	use super::*;
	use crate::BoxFuture;

	struct GatedStore {
		gate: Arc<Semaphore>,
		fetches: AtomicUsize,
	}
	impl TrendingStore for GatedStore {
		fn fetch_candidates<'a>(
			&'a self,
			_kind: ContentKind,
			_since: OffsetDateTime,
		) -> BoxFuture<'a, wayfarer_storage::Result<Vec<TrendingCandidate>>> {
			self.fetches.fetch_add(1, Ordering::SeqCst);

			let gate = self.gate.clone();

			Box::pin(async move {
				gate.acquire().await.expect("Gate open.").forget();

				Ok(Vec::new())
			})
		}

		fn write_scores<'a>(
			&'a self,
			_kind: ContentKind,
			updates: &'a [ScoreUpdate],
		) -> BoxFuture<'a, wayfarer_storage::Result<u64>> {
			let written = updates.len() as u64;

			Box::pin(async move { Ok(written) })
		}
	}

	#[test]
	fn guard_is_exclusive_until_dropped() {
		let flag = RunFlag::default();
		let guard = flag.try_acquire().expect("First acquire.");

		assert!(flag.is_running());
		assert!(flag.try_acquire().is_none());

		drop(guard);

		assert!(!flag.is_running());
		assert!(flag.try_acquire().is_some());
	}

	#[tokio::test]
	async fn overlapping_tick_is_skipped() {
		let gate = Arc::new(Semaphore::new(0));
		let store = Arc::new(GatedStore { gate: gate.clone(), fetches: AtomicUsize::new(0) });
		let scheduler =
			Scheduler::new(store.clone(), TrendingJob::from_config(&Trending::default()), 1_800);
		let now = datetime!(2024-05-01 12:00 UTC);
		let first = scheduler.tick(now).expect("First tick runs.");

		assert!(scheduler.tick(now + Duration::minutes(30)).is_none());

		gate.add_permits(ContentKind::ALL.len());
		first.await.expect("Run task completes.");

		assert_eq!(store.fetches.load(Ordering::SeqCst), ContentKind::ALL.len());

		let third = scheduler.tick(now + Duration::hours(1)).expect("Later tick runs.");

		gate.add_permits(ContentKind::ALL.len());
		third.await.expect("Run task completes.");

		assert_eq!(store.fetches.load(Ordering::SeqCst), 2 * ContentKind::ALL.len());
	}

	#[test]
	fn ticks_align_to_wall_clock_multiples() {
		assert_eq!(
			next_tick(datetime!(2024-05-01 12:07:13 UTC), 1_800),
			datetime!(2024-05-01 12:30 UTC)
		);
		assert_eq!(
			next_tick(datetime!(2024-05-01 12:30 UTC), 1_800),
			datetime!(2024-05-01 13:00 UTC)
		);
		assert_eq!(
			next_tick(datetime!(2024-05-01 23:59:59.5 UTC), 60),
			datetime!(2024-05-02 00:00 UTC)
		);
	}

	#[test]
	fn early_wake_does_not_refire_the_same_boundary() {
		let fired = datetime!(2024-05-01 12:30 UTC);
		let early = datetime!(2024-05-01 12:29:59.9996 UTC);

		assert_eq!(next_tick(early, 1_800), fired);
		assert_eq!(following_tick(fired, early, 1_800), datetime!(2024-05-01 13:00 UTC));
		assert_eq!(
			following_tick(fired, datetime!(2024-05-01 12:30:00.2 UTC), 1_800),
			datetime!(2024-05-01 13:00 UTC)
		);
		assert_eq!(
			following_tick(fired, datetime!(2024-05-01 13:05 UTC), 1_800),
			datetime!(2024-05-01 13:30 UTC)
		);
	}

	#[test]
	fn waits_keep_sub_millisecond_precision() {
		let now = datetime!(2024-05-01 12:07:13.0009 UTC);
		let wait = to_std_duration(next_tick(now, 1_800) - now);

		assert_eq!(wait, StdDuration::new(1_366, 999_100_000));

		let early = datetime!(2024-05-01 12:29:59.9996 UTC);

		assert_eq!(to_std_duration(next_tick(early, 1_800) - early), StdDuration::from_micros(400));
		assert_eq!(to_std_duration(Duration::seconds(-1)), StdDuration::ZERO);
	}
}
