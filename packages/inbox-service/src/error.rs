pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid config: {message}")]
	InvalidConfig { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Object store error: {message}")]
	ObjectStore { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}

impl From<inbox_storage::Error> for Error {
	fn from(err: inbox_storage::Error) -> Self {
		match err {
			inbox_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			inbox_storage::Error::Conflict(message) => Self::Storage { message },
		}
	}
}

impl From<inbox_providers::Error> for Error {
	fn from(err: inbox_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
