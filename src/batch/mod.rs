mod import;
mod submit;

pub(crate) use import::{ImportError, ImportReport, ImportTable};
pub(crate) use submit::submit_batch;

use crate::api::{BatchPostPayload, CreateBatchRequest};
use crate::models::{Batch, MediaItem, PostType};
use chrono::{DateTime, Utc};

/// One not-yet-submitted post.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PostDraft {
    pub scheduled_at: DateTime<Utc>,
    pub caption: String,
    pub subject: Option<String>,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum DraftError {
    #[error("Scheduled time must be in the future")]
    NotInFuture,
    #[error("Caption cannot be empty")]
    EmptyCaption,
    #[error("The batch is being submitted")]
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum BatchError {
    #[error("Add at least one post before submitting")]
    Empty,
    #[error("The batch is already being submitted")]
    AlreadySubmitting,
}

/// Where a batch is in its submission lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum BatchPhase {
    Empty,
    Drafting,
    Submitting,
    Submitted { batch_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
enum Submission {
    #[default]
    Idle,
    InFlight,
    Done(String),
}

/// Ordered list of post drafts destined for one batch-creation call.
///
/// Drafts are kept sorted by `scheduled_at` (stable) after every insertion
/// and import; removal keeps the existing order.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct BatchDraft {
    drafts: Vec<PostDraft>,
    submission: Submission,
}

impl BatchDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drafts(&self) -> &[PostDraft] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn phase(&self) -> BatchPhase {
        match &self.submission {
            Submission::InFlight => BatchPhase::Submitting,
            Submission::Done(id) => BatchPhase::Submitted {
                batch_id: id.clone(),
            },
            Submission::Idle if self.drafts.is_empty() => BatchPhase::Empty,
            Submission::Idle => BatchPhase::Drafting,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submission == Submission::InFlight
    }

    fn ensure_editable(&self) -> Result<(), DraftError> {
        if self.is_submitting() {
            Err(DraftError::Locked)
        } else {
            Ok(())
        }
    }

    fn sort(&mut self) {
        self.drafts.sort_by_key(|d| d.scheduled_at);
    }

    /// Add a manually entered draft. `now` is the time of the add call.
    pub fn add_manual(&mut self, draft: PostDraft, now: DateTime<Utc>) -> Result<(), DraftError> {
        self.ensure_editable()?;
        if draft.scheduled_at <= now {
            return Err(DraftError::NotInFuture);
        }
        if draft.caption.trim().is_empty() {
            return Err(DraftError::EmptyCaption);
        }

        self.drafts.push(draft);
        self.sort();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<PostDraft> {
        if self.is_submitting() || index >= self.drafts.len() {
            return None;
        }
        Some(self.drafts.remove(index))
    }

    /// Wire shape for the batch-creation endpoint.
    pub fn to_submission_payload(&self, platform: &str) -> Result<CreateBatchRequest, BatchError> {
        if self.drafts.is_empty() {
            return Err(BatchError::Empty);
        }

        let posts = self
            .drafts
            .iter()
            .enumerate()
            .map(|(i, d)| BatchPostPayload {
                scheduled_at: d.scheduled_at,
                caption: d.caption.clone(),
                subject: d
                    .subject
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Post {}", i + 1)),
                post_type: PostType::for_media_count(d.media.len()),
                media: d.media.clone(),
            })
            .collect();

        Ok(CreateBatchRequest {
            platform: platform.to_string(),
            posts,
        })
    }

    /// Enter `submitting` and freeze the payload.
    pub fn begin_submit(&mut self, platform: &str) -> Result<CreateBatchRequest, BatchError> {
        if self.is_submitting() {
            return Err(BatchError::AlreadySubmitting);
        }
        let payload = self.to_submission_payload(platform)?;
        self.submission = Submission::InFlight;
        Ok(payload)
    }

    /// Leave `submitting`. On failure every draft is kept for a retry.
    pub fn finish_submit<E>(&mut self, result: &Result<Batch, E>) {
        match result {
            Ok(batch) => {
                self.drafts.clear();
                self.submission = Submission::Done(batch.id.clone());
            }
            Err(_) => {
                self.submission = Submission::Idle;
            }
        }
    }
}
