pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("Graph statement failed: {code}: {message}")]
	Statement { code: String, message: String },
	#[error("{message}")]
	Unavailable { message: String },
	#[error("Graph query failed after {attempts} attempts: {last}")]
	Exhausted { attempts: u32, last: Box<Error> },
}
