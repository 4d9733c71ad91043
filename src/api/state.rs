use std::sync::Arc;

use crate::{config::Settings, integrations::YouTubeClient, service::ServiceContext};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    pub youtube_client: Option<Arc<YouTubeClient>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        youtube_client: Option<Arc<YouTubeClient>>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service_context,
            youtube_client,
            settings,
        }
    }
}
