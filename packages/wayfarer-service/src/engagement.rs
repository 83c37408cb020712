use serde::{Deserialize, Serialize};

use wayfarer_domain::{ContentKind, ContentRef, ObjectId};

use crate::{Error, Result, WayfarerService};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
	pub liked: bool,
	pub likes_count: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterResponse {
	pub count: i64,
}

impl WayfarerService {
	pub async fn like(
		&self,
		viewer: Option<&ObjectId>,
		segment: &str,
		id: &str,
	) -> Result<LikeResponse> {
		let user_id = require_viewer(viewer)?;
		let target = parse_target(segment, id)?;
		let state = self.store.like(user_id, &target).await?;

		if state.changed {
			tracing::info!(
				user_id = %user_id,
				kind = %target.kind,
				target_id = %target.id,
				likes_count = state.likes_count,
				"Like recorded."
			);
		}

		Ok(LikeResponse { liked: state.liked, likes_count: state.likes_count })
	}

	pub async fn unlike(
		&self,
		viewer: Option<&ObjectId>,
		segment: &str,
		id: &str,
	) -> Result<LikeResponse> {
		let user_id = require_viewer(viewer)?;
		let target = parse_target(segment, id)?;
		let state = self.store.unlike(user_id, &target).await?;

		if state.changed {
			tracing::info!(
				user_id = %user_id,
				kind = %target.kind,
				target_id = %target.id,
				likes_count = state.likes_count,
				"Like removed."
			);
		}

		Ok(LikeResponse { liked: state.liked, likes_count: state.likes_count })
	}

	/// Applies a comment-count delta reported by the comment service.
	pub async fn adjust_comments(
		&self,
		segment: &str,
		id: &str,
		delta: i64,
	) -> Result<CounterResponse> {
		let target = parse_target(segment, id)?;

		validate_delta(delta)?;

		let count = self.store.adjust_comments(target.kind, &target.id, delta).await?;

		tracing::debug!(
			kind = %target.kind,
			target_id = %target.id,
			delta,
			count,
			"Comment count adjusted."
		);

		Ok(CounterResponse { count })
	}

	/// Applies a remix-count delta. Only plans track remixes.
	pub async fn adjust_remixes(
		&self,
		segment: &str,
		id: &str,
		delta: i64,
	) -> Result<CounterResponse> {
		let target = parse_target(segment, id)?;

		if !target.kind.tracks_remixes() {
			return Err(Error::InvalidRequest {
				message: format!("{} does not track remixes.", target.kind),
			});
		}

		validate_delta(delta)?;

		let count = self.store.adjust_remixes(&target.id, delta).await?;

		tracing::debug!(target_id = %target.id, delta, count, "Remix count adjusted.");

		Ok(CounterResponse { count })
	}
}

fn require_viewer(viewer: Option<&ObjectId>) -> Result<&ObjectId> {
	viewer.ok_or_else(|| Error::Unauthorized { message: "Sign in to like content.".to_string() })
}

fn parse_target(segment: &str, id: &str) -> Result<ContentRef> {
	let kind = ContentKind::from_path_segment(segment).ok_or_else(|| Error::InvalidRequest {
		message: format!("Unknown content collection {segment:?}."),
	})?;
	let id = ObjectId::parse(id)?;

	Ok(ContentRef { kind, id })
}

fn validate_delta(delta: i64) -> Result<()> {
	if delta == 0 {
		return Err(Error::InvalidRequest { message: "delta must be non-zero.".to_string() });
	}

	Ok(())
}
