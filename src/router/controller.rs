use super::{ResolvedRoute, RouteTable};
use crate::state::NavContext;
use async_trait::async_trait;
use std::sync::Arc;
use wasm_bindgen::JsValue;

/// Upper bound on chained legacy rewrites for a single location change.
const MAX_REWRITES: usize = 4;

const UNSAVED_CHANGES_PROMPT: &str = "You have unsaved changes. Leave this page anyway?";

/// Access to the current location fragment.
pub(crate) trait LocationPort {
    /// Raw fragment including its marker (e.g. `#/posts`).
    fn current(&self) -> String;

    /// Move to `path`, adding a history entry. Returns `false` when the
    /// location already pointed there (no change event will follow).
    fn push(&self, path: &str) -> bool;

    /// Point the current history entry at `path` without a change event.
    fn replace(&self, path: &str);
}

impl<T: LocationPort + ?Sized> LocationPort for &T {
    fn current(&self) -> String {
        (**self).current()
    }

    fn push(&self, path: &str) -> bool {
        (**self).push(path)
    }

    fn replace(&self, path: &str) {
        (**self).replace(path)
    }
}

/// Asynchronous yes/no prompt.
#[async_trait(?Send)]
pub(crate) trait Confirm {
    async fn confirm(&self, message: &str) -> bool;
}

#[async_trait(?Send)]
impl<T: Confirm + ?Sized> Confirm for &T {
    async fn confirm(&self, message: &str) -> bool {
        (**self).confirm(message).await
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NavigateOutcome {
    Proceeded { location_changed: bool },
    Cancelled,
}

/// Why a resolved route was replaced by another one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GuardKind {
    NotFound,
    SignInRequired,
    AlreadySignedIn,
    AdminWithoutClient,
}

/// A committed navigation, ready for the page lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Commit {
    pub seq: u64,
    pub path: String,
    pub route: ResolvedRoute,
    pub guard: Option<GuardKind>,
}

impl Commit {
    pub fn active_nav(&self) -> &str {
        self.route.section()
    }
}

/// Strip the `#` / `#/` marker from a raw fragment.
pub(crate) fn strip_marker(raw: &str) -> &str {
    let s = raw.strip_prefix('#').unwrap_or(raw);
    s.strip_prefix('/').unwrap_or(s)
}

#[derive(Clone)]
pub(crate) struct NavigationController<L, C> {
    table: Arc<RouteTable>,
    nav: NavContext,
    location: L,
    confirm: C,
}

impl<L: LocationPort, C: Confirm> NavigationController<L, C> {
    pub fn new(table: RouteTable, nav: NavContext, location: L, confirm: C) -> Self {
        Self {
            table: Arc::new(table),
            nav,
            location,
            confirm,
        }
    }

    pub fn nav(&self) -> &NavContext {
        &self.nav
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Programmatic navigation.
    ///
    /// Without `force`, pending unsaved changes require confirmation; a
    /// decline leaves location and flag untouched.
    pub async fn navigate(&self, path: &str, force: bool) -> NavigateOutcome {
        let path = strip_marker(path);

        if !force && self.nav.has_unsaved_changes() {
            if !self.confirm.confirm(UNSAVED_CHANGES_PROMPT).await {
                tracing::debug!(path, "navigation cancelled, unsaved changes kept");
                return NavigateOutcome::Cancelled;
            }
        }

        self.nav.clear_unsaved_changes();
        let location_changed = self.location.push(path);
        NavigateOutcome::Proceeded { location_changed }
    }

    /// Where to go after signing in: the link the sign-in guard intercepted,
    /// or the default page when there was none.
    pub fn return_path(&self) -> String {
        let raw = self.location.current();
        let path = strip_marker(&raw);
        if path.is_empty() || path == self.table.login_path() {
            self.table.default_path().to_string()
        } else {
            path.to_string()
        }
    }

    /// Handle a change of the current location, however it was triggered.
    pub fn handle_location_change(&self) -> Commit {
        let raw = self.location.current();
        self.commit_path(strip_marker(&raw))
    }

    /// Resolve `path` through rewrites, matcher and guards, then commit it.
    pub fn commit_path(&self, path: &str) -> Commit {
        let mut path = path.to_string();
        for _ in 0..MAX_REWRITES {
            let Some(to) = self.table.rewrite_for(&path) else {
                break;
            };
            tracing::info!(from = %path, to, "legacy path rewritten");
            self.location.replace(to);
            path = to.to_string();
        }

        let (route, guard) = self.guarded_route(&path);
        let seq = self.nav.next_seq();
        self.nav.clear_unsaved_changes();

        tracing::info!(seq, path = %path, page = %route.page, guard = ?guard, "navigation committed");

        Commit {
            seq,
            path,
            route,
            guard,
        }
    }

    fn guarded_route(&self, path: &str) -> (ResolvedRoute, Option<GuardKind>) {
        let table = &self.table;
        let (mut route, mut guard) = match table.resolve(path) {
            Some(r) => (Some(r), None),
            None => (table.default_route(), Some(GuardKind::NotFound)),
        };

        let login = table.login_path();
        let is_route = |r: &Option<ResolvedRoute>, pattern: &str| {
            r.as_ref().map(|r| r.pattern == pattern).unwrap_or(false)
        };

        match self.nav.identity() {
            None if !is_route(&route, login) => {
                route = table.login_route();
                guard = Some(GuardKind::SignInRequired);
            }
            Some(id) => {
                if is_route(&route, login) {
                    route = table.default_route();
                    guard = Some(GuardKind::AlreadySignedIn);
                }
                if id.is_unassigned_admin() && !is_route(&route, table.admin_landing_path()) {
                    route = table.admin_landing_route();
                    guard = Some(GuardKind::AdminWithoutClient);
                }
            }
            None => {}
        }

        // Every well-known route is registered by construction; an empty
        // fallback only shows up with a misconfigured table.
        let route = route.unwrap_or_else(|| ResolvedRoute {
            title: "Not found".to_string(),
            page: super::PageKey::Dashboard,
            params: Default::default(),
            pattern: table.default_path().to_string(),
        });

        if let Some(g) = guard {
            tracing::debug!(path, guard = ?g, page = %route.page, "route replaced by guard");
        }
        (route, guard)
    }
}

/// `window.location.hash` backed location.
#[derive(Clone, Copy, Default)]
pub(crate) struct BrowserLocation;

impl BrowserLocation {
    fn href_for(path: &str) -> String {
        format!("#/{path}")
    }
}

impl LocationPort for BrowserLocation {
    fn current(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default()
    }

    fn push(&self, path: &str) -> bool {
        let target = Self::href_for(path);
        if self.current() == target {
            return false;
        }
        web_sys::window()
            .map(|w| w.location().set_hash(&target).is_ok())
            .unwrap_or(false)
    }

    fn replace(&self, path: &str) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&Self::href_for(path)));
    }
}
