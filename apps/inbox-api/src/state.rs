use std::sync::Arc;

use inbox_service::{Collaborators, InboxService};
use inbox_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<InboxService>,
}
impl AppState {
	pub async fn new(config: inbox_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let collaborators = Collaborators::from_config(&config, db)?;

		Ok(Self::from_parts(config, collaborators)?)
	}

	pub fn from_parts(
		config: inbox_config::Config,
		collaborators: Collaborators,
	) -> inbox_service::Result<Self> {
		let service = InboxService::new(config, collaborators)?;

		Ok(Self { service: Arc::new(service) })
	}
}
