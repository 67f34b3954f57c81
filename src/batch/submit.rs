use crate::api::{ApiError, BatchApi, CreateBatchRequest};
use crate::models::Batch;
use crate::selection::Notifier;
use crate::util::pluralize;

/// Send a frozen batch payload in one call.
///
/// All or nothing: on any failure a single error notification is shown and
/// the caller keeps its drafts.
pub(crate) async fn submit_batch(
    api: &impl BatchApi,
    notifier: &impl Notifier,
    payload: &CreateBatchRequest,
) -> Result<Batch, ApiError> {
    let count = payload.posts.len();
    match api.create_batch(payload).await {
        Ok(batch) => {
            tracing::info!(batch_id = %batch.id, count, "batch created");
            notifier.success(format!(
                "Batch created with {}",
                pluralize(count, "post", "posts")
            ));
            Ok(batch)
        }
        Err(e) => {
            tracing::error!(count, error = %e, "batch submission failed");
            notifier.error(format!("Could not create batch: {e}. Your drafts were kept."));
            Err(e)
        }
    }
}
