pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<wayfarer_storage::Error> for Error {
	fn from(err: wayfarer_storage::Error) -> Self {
		match err {
			wayfarer_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			wayfarer_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			wayfarer_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<wayfarer_domain::Error> for Error {
	fn from(err: wayfarer_domain::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
