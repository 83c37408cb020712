use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const OBJECT_ID_HEX_LEN: usize = 24;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ContentKind {
	TravelPlan,
	Post,
}
impl ContentKind {
	pub const ALL: [Self; 2] = [Self::TravelPlan, Self::Post];

	/// Wire name used in cursors, JSON payloads and the likes table.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::TravelPlan => "TravelPlan",
			Self::Post => "Post",
		}
	}

	/// Collection segment used in `/api/content/{segment}/...` routes.
	pub fn path_segment(self) -> &'static str {
		match self {
			Self::TravelPlan => "plans",
			Self::Post => "posts",
		}
	}

	pub fn from_path_segment(segment: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.path_segment() == segment)
	}

	pub fn tracks_remixes(self) -> bool {
		matches!(self, Self::TravelPlan)
	}
}
impl fmt::Display for ContentKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ContentKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| Error::UnknownContentKind(s.to_string()))
	}
}
impl TryFrom<String> for ContentKind {
	type Error = Error;

	fn try_from(value: String) -> Result<Self> {
		value.parse()
	}
}

/// A 12-byte object id rendered as 24 lowercase hex characters.
///
/// The first four bytes are big-endian unix seconds, so the hex form sorts in creation order under
/// byte-wise comparison.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);
impl ObjectId {
	pub fn parse(raw: &str) -> Result<Self> {
		if raw.len() != OBJECT_ID_HEX_LEN
			|| !raw.bytes().all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte))
		{
			return Err(Error::InvalidObjectId(raw.to_string()));
		}

		Ok(Self(raw.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl fmt::Display for ObjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
impl FromStr for ObjectId {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}
impl TryFrom<String> for ObjectId {
	type Error = Error;

	fn try_from(value: String) -> Result<Self> {
		Self::parse(&value)
	}
}
impl From<ObjectId> for String {
	fn from(value: ObjectId) -> Self {
		value.0
	}
}

/// Identifies one content item across both collections.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ContentRef {
	pub kind: ContentKind,
	pub id: ObjectId,
}
