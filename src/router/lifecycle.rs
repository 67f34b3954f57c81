use super::{Commit, PageKey, RouteParams};
use crate::api::ApiError;
use crate::state::NavContext;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub(crate) enum PageError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Missing route parameter `{0}`")]
    MissingParam(&'static str),
    #[error("{0}")]
    Message(String),
}

impl PageError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PageError::Api(ApiError::Unauthorized))
    }
}

/// What the content container shows.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PageState<T> {
    Loading,
    Ready(T),
    Failed(String),
    NotFound,
}

/// The content container a page renders into.
pub(crate) trait PageSink<T> {
    fn show(&self, state: PageState<T>);
}

/// A page: loads whatever it needs for `params` and returns its model.
#[async_trait(?Send)]
pub(crate) trait PageHandler<Cx, T>: Send + Sync {
    async fn render(&self, cx: &Cx, params: &RouteParams) -> Result<T, PageError>;
}

/// Typed handler registry, populated once at startup.
pub(crate) struct PageRegistry<Cx, T> {
    handlers: HashMap<PageKey, Arc<dyn PageHandler<Cx, T>>>,
}

impl<Cx, T> Clone for PageRegistry<Cx, T> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<Cx, T> Default for PageRegistry<Cx, T> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<Cx, T> PageRegistry<Cx, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, key: PageKey, handler: impl PageHandler<Cx, T> + 'static) -> Self {
        self.handlers.insert(key, Arc::new(handler));
        self
    }

    pub fn get(&self, key: PageKey) -> Option<Arc<dyn PageHandler<Cx, T>>> {
        self.handlers.get(&key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RenderOutcome {
    Rendered,
    NotFound,
    Failed(PageError),
    /// A newer navigation started; nothing was committed.
    Stale,
}

/// Run the handler for `commit` into `sink`.
///
/// Shows a loading placeholder first, then either the page or a uniform
/// error panel. Failures stop here; output of a navigation that is no
/// longer the latest one is dropped.
pub(crate) async fn run_page<Cx, T>(
    registry: &PageRegistry<Cx, T>,
    nav: &NavContext,
    commit: &Commit,
    cx: &Cx,
    sink: &impl PageSink<T>,
) -> RenderOutcome {
    if !nav.is_current(commit.seq) {
        return RenderOutcome::Stale;
    }

    let Some(handler) = registry.get(commit.route.page) else {
        tracing::warn!(page = %commit.route.page, "no handler registered");
        sink.show(PageState::NotFound);
        return RenderOutcome::NotFound;
    };

    sink.show(PageState::Loading);
    let result = handler.render(cx, &commit.route.params).await;

    if !nav.is_current(commit.seq) {
        tracing::debug!(seq = commit.seq, latest = nav.current_seq(), "discarding stale render");
        return RenderOutcome::Stale;
    }

    match result {
        Ok(page) => {
            sink.show(PageState::Ready(page));
            RenderOutcome::Rendered
        }
        Err(e) => {
            tracing::error!(page = %commit.route.page, error = %e, "page render failed");
            sink.show(PageState::Failed(e.to_string()));
            RenderOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::app_routes;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        shown: RefCell<Vec<PageState<String>>>,
    }

    impl PageSink<String> for RecordingSink {
        fn show(&self, state: PageState<String>) {
            self.shown.borrow_mut().push(state);
        }
    }

    struct Echo;

    #[async_trait(?Send)]
    impl PageHandler<(), String> for Echo {
        async fn render(&self, _cx: &(), params: &RouteParams) -> Result<String, PageError> {
            params
                .get("id")
                .map(|id| format!("post {id}"))
                .ok_or(PageError::MissingParam("id"))
        }
    }

    struct Broken;

    #[async_trait(?Send)]
    impl PageHandler<(), String> for Broken {
        async fn render(&self, _cx: &(), _params: &RouteParams) -> Result<String, PageError> {
            Err(ApiError::Http {
                status: 500,
                body: "boom".to_string(),
            }
            .into())
        }
    }

    /// Waits for the test to release it, so a newer navigation can start mid-render.
    struct Gated {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait(?Send)]
    impl PageHandler<(), String> for Gated {
        async fn render(&self, _cx: &(), _params: &RouteParams) -> Result<String, PageError> {
            let rx = self.gate.lock().ok().and_then(|mut g| g.take());
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            Ok("slow page".to_string())
        }
    }

    fn commit_for(nav: &NavContext, path: &str) -> Commit {
        let route = app_routes().resolve(path).expect("route should resolve");
        Commit {
            seq: nav.next_seq(),
            path: path.to_string(),
            route,
            guard: None,
        }
    }

    #[test]
    fn test_loading_then_ready() {
        let nav = NavContext::new(None);
        let registry = PageRegistry::new().register(PageKey::PostDetail, Echo);
        let sink = RecordingSink::default();
        let commit = commit_for(&nav, "posts/p1");

        let outcome = block_on(run_page(&registry, &nav, &commit, &(), &sink));

        assert_eq!(outcome, RenderOutcome::Rendered);
        assert_eq!(
            *sink.shown.borrow(),
            vec![PageState::Loading, PageState::Ready("post p1".to_string())]
        );
    }

    #[test]
    fn test_failure_renders_error_panel_and_stops() {
        let nav = NavContext::new(None);
        let registry = PageRegistry::new().register(PageKey::Posts, Broken);
        let sink = RecordingSink::default();
        let commit = commit_for(&nav, "posts");

        let outcome = block_on(run_page(&registry, &nav, &commit, &(), &sink));

        assert!(matches!(outcome, RenderOutcome::Failed(PageError::Api(_))));
        assert_eq!(
            *sink.shown.borrow(),
            vec![
                PageState::Loading,
                PageState::Failed("Request failed (500): boom".to_string())
            ]
        );
    }

    #[test]
    fn test_unregistered_handler_is_not_found() {
        let nav = NavContext::new(None);
        let registry: PageRegistry<(), String> = PageRegistry::new();
        let sink = RecordingSink::default();
        let commit = commit_for(&nav, "schedule");

        let outcome = block_on(run_page(&registry, &nav, &commit, &(), &sink));

        assert_eq!(outcome, RenderOutcome::NotFound);
        assert_eq!(*sink.shown.borrow(), vec![PageState::NotFound]);
    }

    #[test]
    fn test_stale_render_is_discarded() {
        let nav = NavContext::new(None);
        let (tx, rx) = oneshot::channel();
        let registry = PageRegistry::new()
            .register(
                PageKey::Posts,
                Gated {
                    gate: Mutex::new(Some(rx)),
                },
            )
            .register(PageKey::PostDetail, Echo);
        let sink = RecordingSink::default();

        let slow = commit_for(&nav, "posts");
        let fast = commit_for(&nav, "posts/p2");

        block_on(async {
            let slow_render = run_page(&registry, &nav, &slow, &(), &sink);
            let fast_then_release = async {
                let outcome = run_page(&registry, &nav, &fast, &(), &sink).await;
                let _ = tx.send(());
                outcome
            };
            // `slow` was already superseded before it started.
            let (slow_outcome, fast_outcome) = futures::join!(slow_render, fast_then_release);
            assert_eq!(slow_outcome, RenderOutcome::Stale);
            assert_eq!(fast_outcome, RenderOutcome::Rendered);
        });

        assert_eq!(
            sink.shown.borrow().last(),
            Some(&PageState::Ready("post p2".to_string()))
        );
    }

    #[test]
    fn test_newer_navigation_mid_render_wins() {
        let nav = NavContext::new(None);
        let (tx, rx) = oneshot::channel();
        let registry = PageRegistry::new().register(
            PageKey::Posts,
            Gated {
                gate: Mutex::new(Some(rx)),
            },
        );
        let sink = RecordingSink::default();
        let commit = commit_for(&nav, "posts");

        block_on(async {
            let render = run_page(&registry, &nav, &commit, &(), &sink);
            let interrupt = async {
                // A newer navigation is committed while the page is loading.
                nav.next_seq();
                let _ = tx.send(());
            };
            let (outcome, ()) = futures::join!(render, interrupt);
            assert_eq!(outcome, RenderOutcome::Stale);
        });

        assert_eq!(*sink.shown.borrow(), vec![PageState::Loading]);
    }

    #[test]
    fn test_unauthorized_is_detectable() {
        let e: PageError = ApiError::Unauthorized.into();
        assert!(e.is_unauthorized());
        assert!(!PageError::Message("x".to_string()).is_unauthorized());
    }
}
