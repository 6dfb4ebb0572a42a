use serde::Deserialize;
use std::time::Duration;
use crate::config::env::{self, EnvKey};

pub const DEFAULT_QUEUE_NAME: &str = "image_transform";
pub const DEFAULT_CONSUMER_TAG: &str = "image_transformer";
/// 50ms between permits, i.e. at most 20 jobs per second.
pub const DEFAULT_RATE_LIMIT_INTERVAL_MS: u64 = 50;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub rabbitmq_url: String,
    pub queue_name: String,
    pub consumer_tag: String,
    pub rate_limit_interval_ms: u64,
    pub minio_url: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: env::get(EnvKey::DatabaseUrl)?,
            rabbitmq_url: env::get(EnvKey::RabbitMqUrl)?,
            queue_name: env::get_or(EnvKey::QueueName, DEFAULT_QUEUE_NAME),
            consumer_tag: env::get_or(EnvKey::ConsumerTag, DEFAULT_CONSUMER_TAG),
            rate_limit_interval_ms: env::get_parsed(
                EnvKey::RateLimitIntervalMs,
                DEFAULT_RATE_LIMIT_INTERVAL_MS,
            ),
            minio_url: env::get(EnvKey::MinioUrl)?,
            minio_bucket: env::get(EnvKey::MinioBucket)?,
            minio_access_key: env::get(EnvKey::MinioAccessKey)?,
            minio_secret_key: env::get(EnvKey::MinioSecretKey)?,
        })
    }

    pub fn rate_limit_interval(&self) -> Duration {
        // A zero interval would make tokio's interval panic.
        Duration::from_millis(self.rate_limit_interval_ms.max(1))
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_port: 3000,
            database_url: String::new(),
            rabbitmq_url: String::new(),
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
            consumer_tag: DEFAULT_CONSUMER_TAG.to_string(),
            rate_limit_interval_ms: DEFAULT_RATE_LIMIT_INTERVAL_MS,
            minio_url: String::new(),
            minio_bucket: "images".to_string(),
            minio_access_key: String::new(),
            minio_secret_key: String::new(),
        }
    }
}
