use std::sync::Arc;

use litmap_service::LitmapService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LitmapService>,
}
impl AppState {
	pub async fn new(config: litmap_config::Config) -> color_eyre::Result<Self> {
		let store = litmap_storage::open(&config.storage).await?;
		let service = LitmapService::new(config, store)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: LitmapService) -> Self {
		Self { service: Arc::new(service) }
	}
}
