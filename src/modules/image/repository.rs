use super::model::ImageAsset;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn get_image(&self, id: i64) -> Result<ImageAsset>;
    async fn save_image(&self, url: &str) -> Result<i64>;
}

#[derive(Clone)]
pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn get_image(&self, id: i64) -> Result<ImageAsset> {
        let image = sqlx::query_as::<_, ImageAsset>(
            r#"
            SELECT id, url
            FROM images
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch image: {}", e))?
        .ok_or_else(|| anyhow!("Image {} not found", id))?;

        Ok(image)
    }

    async fn save_image(&self, url: &str) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO images (url)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to save image: {}", e))?;

        Ok(id)
    }
}
