use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lapin::{
    options::*, types::FieldTable, BasicProperties, Channel, Connection,
    ConnectionProperties, Consumer,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Publishes serialized jobs onto a named queue.
#[async_trait]
pub trait JobPublisher: Send + Sync {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<()>;
}

#[derive(Clone)]
pub struct RabbitMqService {
    url: String,
    conn: Arc<Mutex<Connection>>,
    channel: Arc<Mutex<Channel>>,
}

impl RabbitMqService {
    async fn connect(url: &str) -> Result<(Connection, Channel)> {
        info!("Connecting to RabbitMQ at {}", url);
        let conn = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| anyhow!("Failed to connect to RabbitMQ: {}", e))?;

        let channel = conn
            .create_channel()
            .await
            .map_err(|e| anyhow!("Failed to create channel: {}", e))?;

        info!("✅ Connected to RabbitMQ");
        Ok((conn, channel))
    }

    pub async fn new(url: &str) -> Result<Self> {
        let (conn, channel) = Self::connect(url).await?;

        Ok(Self {
            url: url.to_string(),
            conn: Arc::new(Mutex::new(conn)),
            channel: Arc::new(Mutex::new(channel)),
        })
    }

    async fn reconnect(&self) -> Result<()> {
        warn!("RabbitMQ connection dropped, reconnecting...");
        let (conn, channel) = Self::connect(&self.url).await?;
        *self.conn.lock().await = conn;
        *self.channel.lock().await = channel;
        Ok(())
    }

    /// Declares a non-durable queue if it does not exist yet.
    async fn declare_queue(channel: &Channel, queue: &str) -> Result<()> {
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to declare queue: {}", e))?;
        Ok(())
    }

    async fn publish_internal(&self, queue: &str, payload: &[u8]) -> Result<()> {
        let channel = self.channel.lock().await;

        Self::declare_queue(&channel, queue).await?;

        // Transient delivery mode, and the publisher confirm is not awaited.
        let _confirm = channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await
            .map_err(|e| anyhow!("Failed to publish message: {}", e))?;

        Ok(())
    }

    pub async fn publish(&self, queue: &str, payload: &[u8]) -> Result<()> {
        if let Err(e) = self.publish_internal(queue, payload).await {
            warn!("RabbitMQ publish failed: {}. Retrying after reconnect.", e);
            self.reconnect().await?;
            self.publish_internal(queue, payload).await?;
        }

        Ok(())
    }

    /// Declares `queue` and opens a manual-ack delivery stream on it.
    pub async fn consume(&self, queue: &str, consumer_tag: &str) -> Result<Consumer> {
        let channel = self.channel.lock().await;

        Self::declare_queue(&channel, queue).await?;

        let consumer = channel
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to create consumer: {}", e))?;

        Ok(consumer)
    }

    /// Closes the channel, then the connection. Call once, after consuming has stopped.
    pub async fn close(&self) -> Result<()> {
        self.channel
            .lock()
            .await
            .close(200, "OK")
            .await
            .map_err(|e| anyhow!("Failed to close channel: {}", e))?;

        self.conn
            .lock()
            .await
            .close(200, "OK")
            .await
            .map_err(|e| anyhow!("Failed to close connection: {}", e))?;

        info!("RabbitMQ connection closed");
        Ok(())
    }
}

#[async_trait]
impl JobPublisher for RabbitMqService {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<()> {
        RabbitMqService::publish(self, queue, payload).await
    }
}
