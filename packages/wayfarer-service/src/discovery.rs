use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use wayfarer_domain::{ContentKind, ContentRef, Cursor, ObjectId, Page, ranking::merge_page};
use wayfarer_storage::{content::RankedQuery, models::ContentRow};

use crate::{Result, WayfarerService};

/// Query parameters shared by the discovery listings. Values arrive raw and are resolved
/// leniently.
#[derive(Clone, Debug, Default)]
pub struct DiscoveryRequest {
	/// Caller identity. `None` means anonymous.
	pub viewer: Option<ObjectId>,
	pub after: Option<String>,
	pub limit: Option<String>,
	/// Substring filter. Ignored by the mixed feed.
	pub search: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryItem {
	pub id: ObjectId,
	#[serde(rename = "type")]
	pub kind: ContentKind,
	pub author_id: ObjectId,
	pub title: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub body: Option<String>,
	pub likes_count: i64,
	pub comments_count: i64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub remix_count: Option<i64>,
	pub trending_score: f64,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	pub is_liked: bool,
}
impl DiscoveryItem {
	fn from_row(row: ContentRow, is_liked: bool) -> Self {
		let (summary, body) = match row.kind {
			ContentKind::TravelPlan => (Some(row.text), None),
			ContentKind::Post => (None, Some(row.text)),
		};

		Self {
			id: row.id,
			kind: row.kind,
			author_id: row.author_id,
			title: row.title,
			summary,
			body,
			likes_count: row.likes_count,
			comments_count: row.comments_count,
			remix_count: row.remix_count,
			trending_score: row.trending_score,
			created_at: row.created_at,
			is_liked,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
	pub next_cursor: Option<String>,
	pub has_next_page: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoveryPage {
	pub data: Vec<DiscoveryItem>,
	pub pagination: PageInfo,
}

impl WayfarerService {
	/// The mixed trending feed: plans and posts merged by `(trending_score desc, id desc)`.
	pub async fn trending_page(&self, req: DiscoveryRequest) -> Result<DiscoveryPage> {
		let limit = self.resolve_limit(req.limit.as_deref());
		let after = Cursor::decode_lenient(req.after.as_deref());
		let fetch = i64::from(limit) + 1;
		let (plans, posts) = tokio::try_join!(
			self.store.fetch_ranked(RankedQuery {
				kind: ContentKind::TravelPlan,
				after: after.as_ref(),
				search: None,
				limit: fetch,
			}),
			self.store.fetch_ranked(RankedQuery {
				kind: ContentKind::Post,
				after: after.as_ref(),
				search: None,
				limit: fetch,
			}),
		)?;
		let page = merge_page(vec![plans, posts], limit as usize);

		tracing::debug!(
			limit,
			resumed = after.is_some(),
			items = page.items.len(),
			has_next_page = page.has_next_page,
			"Trending page assembled."
		);

		self.annotate(page, req.viewer.as_ref()).await
	}

	/// One content type in trending order, optionally filtered by a title or text substring.
	pub async fn list_kind(
		&self,
		kind: ContentKind,
		req: DiscoveryRequest,
	) -> Result<DiscoveryPage> {
		let limit = self.resolve_limit(req.limit.as_deref());
		let after = Cursor::decode_lenient(req.after.as_deref());
		let rows = self
			.store
			.fetch_ranked(RankedQuery {
				kind,
				after: after.as_ref(),
				search: req.search.as_deref(),
				limit: i64::from(limit) + 1,
			})
			.await?;
		let page = merge_page(vec![rows], limit as usize);

		tracing::debug!(
			kind = %kind,
			limit,
			items = page.items.len(),
			has_next_page = page.has_next_page,
			"Discovery listing assembled."
		);

		self.annotate(page, req.viewer.as_ref()).await
	}

	async fn annotate(
		&self,
		page: Page<ContentRow>,
		viewer: Option<&ObjectId>,
	) -> Result<DiscoveryPage> {
		let liked = match viewer {
			Some(user_id) if !page.items.is_empty() => {
				let targets: Vec<ContentRef> = page
					.items
					.iter()
					.map(|row| ContentRef { kind: row.kind, id: row.id.clone() })
					.collect();

				self.store.liked_among(user_id, &targets).await?
			},
			_ => HashSet::new(),
		};
		let pagination = PageInfo {
			next_cursor: page.next_cursor.map(|cursor| cursor.encode()),
			has_next_page: page.has_next_page,
		};
		let data = page
			.items
			.into_iter()
			.map(|row| {
				let is_liked = liked.contains(&ContentRef { kind: row.kind, id: row.id.clone() });

				DiscoveryItem::from_row(row, is_liked)
			})
			.collect();

		Ok(DiscoveryPage { data, pagination })
	}
}
