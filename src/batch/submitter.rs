// src/batch/submitter.rs

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiError, BatchApi};
use crate::batch::draft::BatchDraft;
use crate::errors::{BatchrouteError, Result};
use crate::types::BatchId;

/// Validates a draft and sends it to the service exactly once.
///
/// - Invalid drafts fail with [`BatchrouteError::Validation`] and no request
///   is made.
/// - Valid drafts produce one `POST /delivery-batches/`. Failures come back as
///   [`BatchrouteError::Submission`]; the caller decides whether to resubmit,
///   since a retry after a lost response can create a duplicate batch.
pub struct BatchSubmitter<A: BatchApi> {
    api: Arc<A>,
}

impl<A: BatchApi> BatchSubmitter<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn submit(&self, draft: &BatchDraft) -> Result<BatchId> {
        let request = draft.validate()?;

        let resource = self
            .api
            .create_batch(&request)
            .await
            .map_err(submission_error)?;

        let id = resource
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(BatchId::new)
            .ok_or_else(|| BatchrouteError::Submission {
                status: None,
                detail: "server response is missing the batch id".to_string(),
            })?;

        match resource.status.as_deref() {
            Some("optimizing") => {}
            other => warn!(batch_id = %id, status = ?other, "new batch did not start in `optimizing`"),
        }

        info!(batch_id = %id, name = %request.name, deliveries = request.deliveries.len(), "delivery batch submitted");
        Ok(id)
    }
}

fn submission_error(err: ApiError) -> BatchrouteError {
    BatchrouteError::Submission {
        status: err.status_code(),
        detail: match err {
            ApiError::Status { body, .. } => body,
            other => other.to_string(),
        },
    }
}
