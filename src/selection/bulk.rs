use crate::api::{ApiError, PostApi};
use crate::models::BulkActionReport;
use crate::router::Confirm;
use crate::util::pluralize;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum BulkAction {
    Approve,
    Skip,
    Delete,
}

impl BulkAction {
    pub fn label(self) -> &'static str {
        match self {
            BulkAction::Approve => "Approve",
            BulkAction::Skip => "Skip",
            BulkAction::Delete => "Delete",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            BulkAction::Approve => "approved",
            BulkAction::Skip => "skipped",
            BulkAction::Delete => "deleted",
        }
    }

    pub fn confirm_message(self, count: usize) -> String {
        let what = pluralize(count, "post", "posts");
        match self {
            BulkAction::Delete => format!("Delete {what}? This cannot be undone."),
            _ => format!("{} {what}?", self.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum BulkError {
    #[error("Select at least one post first")]
    EmptySelection,
}

/// User-visible notifications.
pub(crate) trait Notifier {
    fn success(&self, message: String);
    fn error(&self, message: String);
    fn info(&self, message: String);
}

/// The list view a bulk action was started from.
pub(crate) trait BulkHost {
    fn clear_selection(&self);
    /// Refetch the list and any counts derived from it.
    fn reload(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BulkOutcome {
    Cancelled,
    Completed(BulkActionReport),
    Failed(ApiError),
}

/// Confirm, run `action` on `ids` in one call, then report and reset.
///
/// Partial failure is a normal completion: both counts are reported, the
/// selection is cleared and the list reloads either way. A call that fails
/// outright keeps the selection so the user can retry.
pub(crate) async fn perform_bulk_action(
    api: &impl PostApi,
    confirm: &impl Confirm,
    notifier: &impl Notifier,
    host: &impl BulkHost,
    action: BulkAction,
    ids: &[String],
) -> Result<BulkOutcome, BulkError> {
    if ids.is_empty() {
        return Err(BulkError::EmptySelection);
    }

    if !confirm.confirm(&action.confirm_message(ids.len())).await {
        return Ok(BulkOutcome::Cancelled);
    }

    let report = match api.bulk_post_action(action, ids).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(%action, count = ids.len(), error = %e, "bulk action failed");
            notifier.error(format!("{} failed: {e}", action.label()));
            return Ok(BulkOutcome::Failed(e));
        }
    };

    tracing::info!(
        %action,
        success = report.success_count,
        failed = report.failed_count,
        "bulk action completed"
    );

    if report.success_count > 0 {
        notifier.success(format!(
            "{} {}",
            pluralize(report.success_count as usize, "post", "posts"),
            action.past_tense()
        ));
    }
    if report.failed_count > 0 {
        notifier.error(format!(
            "{} could not be {}",
            pluralize(report.failed_count as usize, "post", "posts"),
            action.past_tense()
        ));
    }
    if report.success_count == 0 && report.failed_count == 0 {
        notifier.info("No posts were changed".to_string());
    }

    host.clear_selection();
    host.reload();

    Ok(BulkOutcome::Completed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResult;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    struct FakeApi {
        result: ApiResult<BulkActionReport>,
        calls: RefCell<Vec<(BulkAction, Vec<String>)>>,
    }

    impl FakeApi {
        fn returning(result: ApiResult<BulkActionReport>) -> Self {
            Self {
                result,
                calls: RefCell::new(vec![]),
            }
        }
    }

    #[async_trait(?Send)]
    impl PostApi for FakeApi {
        async fn bulk_post_action(
            &self,
            action: BulkAction,
            ids: &[String],
        ) -> ApiResult<BulkActionReport> {
            self.calls.borrow_mut().push((action, ids.to_vec()));
            self.result.clone()
        }
    }

    struct Answer(bool);

    #[async_trait(?Send)]
    impl Confirm for Answer {
        async fn confirm(&self, _message: &str) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct Recorder {
        successes: RefCell<Vec<String>>,
        errors: RefCell<Vec<String>>,
        infos: RefCell<Vec<String>>,
        cleared: Cell<u32>,
        reloads: Cell<u32>,
    }

    impl Notifier for Recorder {
        fn success(&self, message: String) {
            self.successes.borrow_mut().push(message);
        }
        fn error(&self, message: String) {
            self.errors.borrow_mut().push(message);
        }
        fn info(&self, message: String) {
            self.infos.borrow_mut().push(message);
        }
    }

    impl BulkHost for Recorder {
        fn clear_selection(&self) {
            self.cleared.set(self.cleared.get() + 1);
        }
        fn reload(&self) {
            self.reloads.set(self.reloads.get() + 1);
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partial_failure_reports_both_and_resets() {
        let api = FakeApi::returning(Ok(BulkActionReport {
            success_count: 2,
            failed_count: 1,
            failed: vec!["x".to_string()],
        }));
        let rec = Recorder::default();

        let outcome = block_on(perform_bulk_action(
            &api,
            &Answer(true),
            &rec,
            &rec,
            BulkAction::Delete,
            &ids(&["a", "b", "x"]),
        ))
        .expect("non-empty ids");

        assert!(matches!(outcome, BulkOutcome::Completed(ref r) if r.failed_count == 1));
        assert_eq!(*rec.successes.borrow(), vec!["2 posts deleted".to_string()]);
        assert_eq!(*rec.errors.borrow(), vec!["1 post could not be deleted".to_string()]);
        assert_eq!(rec.cleared.get(), 1);
        assert_eq!(rec.reloads.get(), 1);
        assert_eq!(api.calls.borrow().len(), 1);
    }

    #[test]
    fn test_empty_ids_rejected_before_confirming() {
        let api = FakeApi::returning(Ok(BulkActionReport::default()));
        let rec = Recorder::default();

        let err = block_on(perform_bulk_action(
            &api,
            &Answer(true),
            &rec,
            &rec,
            BulkAction::Approve,
            &[],
        ))
        .expect_err("empty selection must be rejected");

        assert_eq!(err, BulkError::EmptySelection);
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn test_declined_confirmation_changes_nothing() {
        let api = FakeApi::returning(Ok(BulkActionReport::default()));
        let rec = Recorder::default();

        let outcome = block_on(perform_bulk_action(
            &api,
            &Answer(false),
            &rec,
            &rec,
            BulkAction::Skip,
            &ids(&["a"]),
        ))
        .expect("non-empty ids");

        assert_eq!(outcome, BulkOutcome::Cancelled);
        assert!(api.calls.borrow().is_empty());
        assert_eq!(rec.cleared.get(), 0);
        assert_eq!(rec.reloads.get(), 0);
    }

    #[test]
    fn test_transport_failure_keeps_selection() {
        let api = FakeApi::returning(Err(ApiError::Network("offline".to_string())));
        let rec = Recorder::default();

        let outcome = block_on(perform_bulk_action(
            &api,
            &Answer(true),
            &rec,
            &rec,
            BulkAction::Approve,
            &ids(&["a", "b"]),
        ))
        .expect("non-empty ids");

        assert!(matches!(outcome, BulkOutcome::Failed(ApiError::Network(_))));
        assert_eq!(rec.errors.borrow().len(), 1);
        assert_eq!(rec.cleared.get(), 0);
        assert_eq!(rec.reloads.get(), 0);
    }

    #[test]
    fn test_full_success_only_reports_success() {
        let api = FakeApi::returning(Ok(BulkActionReport {
            success_count: 1,
            failed_count: 0,
            failed: vec![],
        }));
        let rec = Recorder::default();

        block_on(perform_bulk_action(
            &api,
            &Answer(true),
            &rec,
            &rec,
            BulkAction::Approve,
            &ids(&["a"]),
        ))
        .expect("non-empty ids");

        assert_eq!(*rec.successes.borrow(), vec!["1 post approved".to_string()]);
        assert!(rec.errors.borrow().is_empty());
        assert_eq!(api.calls.borrow()[0].0, BulkAction::Approve);
    }

    #[test]
    fn test_confirm_message() {
        assert_eq!(
            BulkAction::Delete.confirm_message(3),
            "Delete 3 posts? This cannot be undone."
        );
        assert_eq!(BulkAction::Approve.confirm_message(1), "Approve 1 post?");
    }
}
