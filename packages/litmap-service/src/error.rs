pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Missing required fields: {}.", fields.join(", "))]
	MissingFields { fields: Vec<String> },
	#[error("{resource} not found: {id}.")]
	NotFound { resource: &'static str, id: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	/// The build failed and a degraded research map was stored in its place.
	#[error("Research map build failed: {message}")]
	ResearchBuild { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn not_found(resource: &'static str, id: &str) -> Self {
		Self::NotFound { resource, id: id.to_string() }
	}

	/// Collects the names of blank or absent required fields.
	pub(crate) fn require(fields: &[(&str, Option<&str>)]) -> Result<()> {
		let missing: Vec<String> = fields
			.iter()
			.filter(|(_, value)| value.is_none_or(|value| value.trim().is_empty()))
			.map(|(name, _)| name.to_string())
			.collect();

		if missing.is_empty() { Ok(()) } else { Err(Self::MissingFields { fields: missing }) }
	}
}

impl From<litmap_storage::Error> for Error {
	fn from(err: litmap_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<litmap_domain::Error> for Error {
	fn from(err: litmap_domain::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
