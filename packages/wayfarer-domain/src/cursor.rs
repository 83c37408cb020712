use std::fmt;

use crate::{ContentKind, Error, ObjectId, Result};

const SEPARATOR: char = '|';

/// Keyset position in the `(score desc, id desc)` order.
///
/// Wire format: `<score>|<TravelPlan|Post>|<24-hex id>`. The score is written as the shortest
/// decimal that parses back to the same `f64`, so a decoded cursor compares equal to the stored
/// score.
#[derive(Clone, Debug, PartialEq)]
pub struct Cursor {
	pub score: f64,
	pub kind: ContentKind,
	pub id: ObjectId,
}
impl Cursor {
	pub fn new(score: f64, kind: ContentKind, id: ObjectId) -> Self {
		Self { score, kind, id }
	}

	pub fn parse(raw: &str) -> Result<Self> {
		let mut parts = raw.split(SEPARATOR);
		let (Some(score), Some(kind), Some(id), None) =
			(parts.next(), parts.next(), parts.next(), parts.next())
		else {
			return Err(Error::MalformedCursor("expected three fields".to_string()));
		};
		let score: f64 = score
			.parse()
			.map_err(|_| Error::MalformedCursor(format!("score {score:?} is not a number")))?;

		if !score.is_finite() {
			return Err(Error::MalformedCursor(format!("score {score} is not finite")));
		}

		let kind = kind.parse::<ContentKind>()?;
		let id = ObjectId::parse(id)?;

		Ok(Self { score, kind, id })
	}

	/// Decodes an optional client cursor, treating anything unparseable as "start from the top".
	pub fn decode_lenient(raw: Option<&str>) -> Option<Self> {
		let raw = raw?.trim();

		if raw.is_empty() {
			return None;
		}

		match Self::parse(raw) {
			Ok(cursor) => Some(cursor),
			Err(err) => {
				tracing::debug!(error = %err, "Ignoring malformed discovery cursor.");

				None
			},
		}
	}

	pub fn encode(&self) -> String {
		self.to_string()
	}

	/// True when an item at `(score, id)` sorts strictly after this cursor.
	pub fn admits(&self, score: f64, id: &ObjectId) -> bool {
		score < self.score || (score == self.score && id < &self.id)
	}
}
impl fmt::Display for Cursor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Avoid rendering negative zero as "-0".
		let score = if self.score == 0.0 { 0.0 } else { self.score };

		write!(f, "{score}{SEPARATOR}{}{SEPARATOR}{}", self.kind, self.id)
	}
}
