#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Record {key} could not be decoded: {source}")]
	Decode { key: String, source: serde_json::Error },
	#[error("Record {key} could not be encoded: {source}")]
	Encode { key: String, source: serde_json::Error },
}
