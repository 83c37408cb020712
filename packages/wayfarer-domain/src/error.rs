pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
	#[error("Unknown content kind {0:?}.")]
	UnknownContentKind(String),
	#[error("Invalid object id {0:?}.")]
	InvalidObjectId(String),
	#[error("Malformed cursor: {0}.")]
	MalformedCursor(String),
}
