use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::queue::rabbitmq::JobPublisher;
use crate::modules::image::repository::ImageRepository;
use crate::modules::image::store::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub images: Arc<dyn ImageRepository>,
    pub storage: Arc<dyn ImageStore>,
    pub publisher: Arc<dyn JobPublisher>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        images: Arc<dyn ImageRepository>,
        storage: Arc<dyn ImageStore>,
        publisher: Arc<dyn JobPublisher>,
    ) -> Self {
        Self {
            config,
            images,
            storage,
            publisher,
        }
    }
}
