use serde::{Deserialize, Serialize};

use super::dto::TransformRequest;

/// Unit of work on the transform queue. Its JSON form is the contract between
/// the producer and the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformJob {
    pub image_id: i64,
    pub opts: TransformRequest,
}

impl TransformJob {
    pub fn new(image_id: i64, opts: TransformRequest) -> Self {
        Self { image_id, opts }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}
