use serde::{Deserialize, Serialize};

use wayfarer_domain::ObjectId;

use crate::{Result, WayfarerService};

#[derive(Clone, Debug, Default)]
pub struct PeopleRequest {
	pub query: Option<String>,
	pub limit: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonItem {
	pub id: ObjectId,
	pub username: String,
	pub display_name: String,
	pub bio: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeopleResponse {
	pub data: Vec<PersonItem>,
}

impl WayfarerService {
	pub async fn search_people(&self, req: PeopleRequest) -> Result<PeopleResponse> {
		let limit = self.resolve_limit(req.limit.as_deref());
		let term = req.query.as_deref().map(str::trim).unwrap_or_default();
		let rows = self.store.search_users(term, i64::from(limit)).await?;
		let data = rows
			.into_iter()
			.map(|row| PersonItem {
				id: row.id,
				username: row.username,
				display_name: row.display_name,
				bio: row.bio,
			})
			.collect();

		Ok(PeopleResponse { data })
	}
}
