use crate::config::settings::AppConfig;
use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use crate::modules::image::events::TransformJob;
use crate::modules::image::pipeline::{TransformOutcome, TransformPipeline};
use crate::workers::rate::RateGate;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicNackOptions};
use std::fmt::Display;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// A message handed over by the broker, settled exactly once by the consumer.
#[async_trait]
pub trait JobDelivery: Send + Sync {
    fn body(&self) -> &[u8];
    async fn ack(&self) -> Result<()>;
    /// Rejects without requeue; the broker will not redeliver.
    async fn discard(&self) -> Result<()>;
}

#[async_trait]
impl JobDelivery for Delivery {
    fn body(&self) -> &[u8] {
        &self.data
    }

    async fn ack(&self) -> Result<()> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to ack message: {}", e))?;
        Ok(())
    }

    async fn discard(&self) -> Result<()> {
        self.acker
            .nack(BasicNackOptions {
                requeue: false,
                ..BasicNackOptions::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to nack message: {}", e))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Acked,
    Discarded,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeStats {
    pub acked: usize,
    pub discarded: usize,
}

/// Single-task consumer: waits for a delivery, then for a rate permit, then
/// runs the job. Only fully successful runs are acked; everything else is
/// discarded without requeue.
pub struct TransformConsumer {
    pipeline: TransformPipeline,
    gate: RateGate,
}

impl TransformConsumer {
    pub fn new(pipeline: TransformPipeline, gate: RateGate) -> Self {
        Self { pipeline, gate }
    }

    pub async fn consume<S, D, E>(&mut self, mut deliveries: S, cancel: CancellationToken) -> ConsumeStats
    where
        S: Stream<Item = Result<D, E>> + Unpin,
        D: JobDelivery,
        E: Display,
    {
        let mut stats = ConsumeStats::default();

        loop {
            let delivery = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = deliveries.next() => match next {
                    Some(Ok(delivery)) => delivery,
                    Some(Err(e)) => {
                        error!("❌ Delivery stream error: {}", e);
                        continue;
                    }
                    None => {
                        warn!("Delivery stream closed");
                        break;
                    }
                },
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Cancelled while rate limited, leaving delivery unsettled");
                    break;
                }
                _ = self.gate.wait() => {}
            }

            match self.handle(&delivery).await {
                Disposition::Acked => stats.acked += 1,
                Disposition::Discarded => stats.discarded += 1,
            }
        }

        stats
    }

    async fn handle<D: JobDelivery>(&self, delivery: &D) -> Disposition {
        let job = match TransformJob::from_bytes(delivery.body()) {
            Ok(job) => job,
            Err(e) => {
                error!("❌ Failed to parse job: {}", e);
                return Self::discard(delivery).await;
            }
        };

        info!("📦 Received transform job for image {}", job.image_id);

        match self.pipeline.run(&job).await {
            Ok(outcome) => {
                let asset = outcome.asset();
                match outcome {
                    TransformOutcome::Created(_) => {
                        info!("✅ Job completed, stored image {} at {}", asset.id, asset.url);
                    }
                    TransformOutcome::Unchanged(_) => {
                        info!("✅ Job requested no transform, image {} unchanged", asset.id);
                    }
                }
            }
            Err(e) => {
                error!("❌ Failed to process job {:?}: {}", job, e);
                return Self::discard(delivery).await;
            }
        }

        if let Err(e) = delivery.ack().await {
            error!("{}", e);
        }
        Disposition::Acked
    }

    async fn discard<D: JobDelivery>(delivery: &D) -> Disposition {
        if let Err(e) = delivery.discard().await {
            error!("{}", e);
        }
        Disposition::Discarded
    }
}

pub async fn start_transformer_worker(
    queue: RabbitMqService,
    pipeline: TransformPipeline,
    config: AppConfig,
    cancel: CancellationToken,
) -> Result<ConsumeStats> {
    info!("🖼️ Starting Transformer Worker...");

    let deliveries = queue
        .consume(&config.queue_name, &config.consumer_tag)
        .await?;

    let gate = RateGate::new(config.rate_limit_interval());
    info!(
        "🖼️ Transformer Worker listening on '{}' (max {:.0} jobs/s)",
        config.queue_name,
        gate.ceiling_per_second()
    );

    let mut consumer = TransformConsumer::new(pipeline, gate);
    let stats = consumer.consume(deliveries, cancel).await;

    info!(
        acked = stats.acked,
        discarded = stats.discarded,
        "🖼️ Transformer Worker stopped"
    );
    Ok(stats)
}
