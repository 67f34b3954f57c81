use crate::api::ApiClient;
use crate::config::EnvConfig;
use crate::models::Identity;
use crate::storage::{clear_session, load_session, save_session, StoredSession};
use leptos::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Cross-page navigation state shared by the controller and the pages.
///
/// Ownership:
/// - `unsaved_changes`: set by the active page, cleared by the controller on
///   every committed navigation.
/// - `identity`: written by sign-in/sign-out only, read by the role guard.
/// - `seq`: bumped by the controller per committed navigation, read by the
///   page lifecycle before it commits output.
#[derive(Clone, Default)]
pub(crate) struct NavContext {
    unsaved_changes: Arc<AtomicBool>,
    identity: Arc<RwLock<Option<Identity>>>,
    seq: Arc<AtomicU64>,
}

impl NavContext {
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            unsaved_changes: Arc::new(AtomicBool::new(false)),
            identity: Arc::new(RwLock::new(identity)),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes.load(Ordering::SeqCst)
    }

    /// Pages call this when they own (or stop owning) an unsaved edit.
    pub fn set_unsaved_changes(&self, dirty: bool) {
        self.unsaved_changes.store(dirty, Ordering::SeqCst);
    }

    pub(crate) fn clear_unsaved_changes(&self) {
        self.unsaved_changes.store(false, Ordering::SeqCst);
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.read().ok().and_then(|g| g.clone())
    }

    pub fn set_identity(&self, identity: Option<Identity>) {
        if let Ok(mut g) = self.identity.write() {
            *g = identity;
        }
    }

    /// Start a new navigation and return its sequence number.
    pub(crate) fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.current_seq() == seq
    }

    /// Bind a handle to the navigation that is rendering right now.
    pub fn page_scope(&self) -> PageScope {
        PageScope {
            nav: self.clone(),
            seq: self.current_seq(),
        }
    }
}

/// A page's view of [`NavContext`], tied to the navigation that rendered it.
///
/// Requests started by a page may finish after the user has moved on; writes
/// through a stale scope are dropped so they cannot touch the next page's
/// unsaved edits.
#[derive(Clone)]
pub(crate) struct PageScope {
    nav: NavContext,
    seq: u64,
}

impl PageScope {
    pub fn is_active(&self) -> bool {
        self.nav.is_current(self.seq)
    }

    /// Returns `false` (and writes nothing) once the page is no longer active.
    pub fn set_unsaved_changes(&self, dirty: bool) -> bool {
        if !self.is_active() {
            tracing::debug!(seq = self.seq, dirty, "stale page write ignored");
            return false;
        }
        self.nav.set_unsaved_changes(dirty);
        true
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub config: EnvConfig,
    pub api_client: RwSignal<ApiClient>,
    pub nav: NavContext,

    /// Bumped to ask the active list views to refetch (posts, dashboard counts).
    pub reload_tick: RwSignal<u64>,
}

impl AppState {
    pub fn new(config: EnvConfig) -> Self {
        let stored = load_session();
        let client = ApiClient::from_config(&config)
            .with_token(stored.as_ref().map(|s| s.token.clone()));

        Self {
            config,
            api_client: RwSignal::new(client),
            nav: NavContext::new(stored.map(|s| s.user)),
            reload_tick: RwSignal::new(0),
        }
    }

    pub fn sign_in(&self, session: StoredSession) {
        save_session(&session);
        self.api_client
            .update(|c| c.set_token(session.token.clone()));
        self.nav.set_identity(Some(session.user));
        tracing::info!("signed in");
    }

    pub fn sign_out(&self) {
        clear_session();
        self.api_client.update(|c| c.clear_token());
        self.nav.set_identity(None);
        self.nav.clear_unsaved_changes();
        tracing::info!("signed out");
    }

    pub fn request_reload(&self) {
        self.reload_tick.update(|t| *t = t.wrapping_add(1));
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
