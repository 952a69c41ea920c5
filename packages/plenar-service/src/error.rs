pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Graph error: {message}")]
	Graph { message: String },
}
impl From<plenar_storage::Error> for Error {
	fn from(err: plenar_storage::Error) -> Self {
		match err {
			plenar_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			plenar_storage::Error::Payload(inner) => Self::Storage { message: inner.to_string() },
			plenar_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			plenar_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<plenar_graph::Error> for Error {
	fn from(err: plenar_graph::Error) -> Self {
		Self::Graph { message: err.to_string() }
	}
}
