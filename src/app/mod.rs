use crate::api::{ApiError, PostFilters};
use crate::components::ui::CountBadge;
use crate::components::{ConfirmDialog, ConfirmPrompt, ToastHost, Toaster};
use crate::config::EnvConfig;
use crate::models::PostStatus;
use crate::pages::{registry, PageContext, PageData, PageView};
use crate::router::{
    app_routes, run_page, BrowserLocation, NavigateOutcome, NavigationController, PageKey,
    PageRegistry, PageSink, PageState, RenderOutcome,
};
use crate::selection::Notifier;
use crate::state::{AppContext, AppState};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;

const APP_NAME: &str = "PostPilot";

impl<T: Send + Sync + 'static> PageSink<T> for RwSignal<PageState<T>> {
    fn show(&self, state: PageState<T>) {
        self.set(state);
    }
}

/// Glue between the navigation controller, the page lifecycle and the view.
///
/// Provided through context; pages use it to navigate and to report
/// request failures.
#[derive(Clone)]
pub(crate) struct AppRouter {
    controller: NavigationController<BrowserLocation, ConfirmPrompt>,
    registry: PageRegistry<PageContext, PageData>,
    app: AppState,
    toaster: Toaster,
    content: RwSignal<PageState<PageData>>,
    active_nav: RwSignal<String>,
    current_page: RwSignal<Option<PageKey>>,
}

impl AppRouter {
    pub fn new(app: AppState, toaster: Toaster, prompt: ConfirmPrompt) -> Self {
        Self {
            controller: NavigationController::new(
                app_routes(),
                app.nav.clone(),
                BrowserLocation,
                prompt,
            ),
            registry: registry(),
            app,
            toaster,
            content: RwSignal::new(PageState::Loading),
            active_nav: RwSignal::new(String::new()),
            current_page: RwSignal::new(None),
        }
    }

    /// Commit whatever the address bar points at and render it.
    pub fn on_location_change(&self) {
        let commit = self.controller.handle_location_change();

        set_document_title(&commit.route.title);
        self.active_nav.set(commit.active_nav().to_string());
        self.current_page.set(Some(commit.route.page));

        let this = self.clone();
        spawn_local(async move {
            let cx = PageContext {
                api: this.app.api_client.get_untracked(),
                identity: this.app.nav.identity(),
            };
            let outcome = run_page(
                &this.registry,
                this.controller.nav(),
                &commit,
                &cx,
                &this.content,
            )
            .await;

            if let RenderOutcome::Failed(e) = outcome {
                if e.is_unauthorized() {
                    this.expire_session();
                }
            }
        });
    }

    /// Go to `path`. Without `force` unsaved edits must be confirmed first.
    pub fn navigate(&self, path: &str, force: bool) {
        let this = self.clone();
        let path = path.to_string();
        spawn_local(async move {
            // Same location: no hashchange will fire, so render here.
            if this.controller.navigate(&path, force).await
                == (NavigateOutcome::Proceeded {
                    location_changed: false,
                })
            {
                this.on_location_change();
            }
        });
    }

    /// Continue to the link that was intercepted by the sign-in guard.
    pub fn resume_after_sign_in(&self) {
        let path = self.controller.return_path();
        self.navigate(&path, true);
    }

    pub fn sign_out(&self) {
        self.app.sign_out();
        let login = self.controller.table().login_path().to_string();
        self.navigate(&login, true);
    }

    pub fn expire_session(&self) {
        self.toaster
            .error("Your session has expired. Please sign in again.".to_string());
        self.sign_out();
    }

    /// Show a failed request to the user; an expired session signs out.
    pub fn report_error(&self, what: &str, error: ApiError) {
        if error == ApiError::Unauthorized {
            self.expire_session();
        } else {
            self.toaster.error(format!("{what}: {error}"));
        }
    }

    pub fn active_nav(&self) -> RwSignal<String> {
        self.active_nav
    }
}

pub(crate) fn use_router() -> AppRouter {
    expect_context::<AppRouter>()
}

fn set_document_title(title: &str) {
    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        doc.set_title(&format!("{title} · {APP_NAME}"));
    }
}

/// In-app link: goes through [`AppRouter::navigate`] so unsaved edits are
/// confirmed before leaving.
#[component]
pub fn RouteLink(
    #[prop(into)] to: String,
    #[prop(into, optional)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = format!("#/{to}");

    view! {
        <a
            href=href
            class=class
            on:click=move |ev| {
                ev.prevent_default();
                router.navigate(&to, false);
            }
        >
            {children()}
        </a>
    }
}

#[component]
fn NavItem(
    section: &'static str,
    #[prop(into)] to: String,
    label: &'static str,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    let active = use_router().active_nav();
    let class = move || {
        if active.get() == section {
            "rounded-md bg-accent px-3 py-1.5 text-sm font-medium text-foreground"
        } else {
            "rounded-md px-3 py-1.5 text-sm text-muted-foreground hover:text-foreground"
        }
    };

    view! {
        <span class=class>
            <RouteLink to=to class="inline-flex items-center">
                {label}
                {children.map(|c| c())}
            </RouteLink>
        </span>
    }
}

#[component]
fn NavBar(pending: RwSignal<usize>) -> impl IntoView {
    let AppContext(app) = expect_context::<AppContext>();
    let router = use_router();
    let email = move || app.nav.identity().map(|i| i.email).unwrap_or_default();

    view! {
        <header class="border-b bg-background">
            <nav class="mx-auto flex max-w-5xl items-center gap-1 px-4 py-2">
                <span class="mr-4 text-sm font-semibold">{APP_NAME}</span>
                <NavItem section="dashboard" to="dashboard" label="Dashboard" />
                <NavItem section="posts" to="posts" label="Posts">
                    <CountBadge count=pending />
                </NavItem>
                <NavItem section="batches" to="batches/new" label="New batch" />
                <NavItem section="schedule" to="schedule" label="Schedule" />
                <span class="ml-auto text-xs text-muted-foreground">{email}</span>
                <button
                    class="ml-3 text-xs text-muted-foreground hover:text-foreground"
                    on:click=move |_| router.sign_out()
                >
                    "Sign out"
                </button>
            </nav>
        </header>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let app = AppState::new(EnvConfig::new());
    provide_context(AppContext(app.clone()));

    let toaster = Toaster::new();
    provide_context(toaster);
    let prompt = ConfirmPrompt::new();
    provide_context(prompt.clone());

    let router = AppRouter::new(app.clone(), toaster, prompt.clone());
    provide_context(router.clone());

    let _hash_handle = window_event_listener(ev::hashchange, {
        let router = router.clone();
        move |_ev: web_sys::HashChangeEvent| router.on_location_change()
    });
    router.on_location_change();

    // Pending-review badge; refreshed after bulk actions and navigation.
    let pending: RwSignal<usize> = RwSignal::new(0);
    let current_page = router.current_page;
    Effect::new({
        let app = app.clone();
        move |_| {
            app.reload_tick.track();
            let page = current_page.get();
            if app.nav.identity().is_none() || page == Some(PageKey::Login) {
                pending.set(0);
                return;
            }
            let api = app.api_client.get_untracked();
            spawn_local(async move {
                let filters = PostFilters {
                    status: Some(PostStatus::Pending),
                    batch_id: None,
                };
                match api.list_posts(&filters).await {
                    Ok(posts) => pending.set(posts.len()),
                    Err(e) => tracing::warn!(error = %e, "pending count refresh failed"),
                }
            });
        }
    });

    let show_nav = move || {
        !matches!(
            current_page.get(),
            None | Some(PageKey::Login) | Some(PageKey::AdminLanding)
        )
    };

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <Show when=show_nav fallback=|| ()>
                <NavBar pending=pending />
            </Show>
            <main class="mx-auto w-full max-w-5xl px-4 py-6">
                <PageView state=router.content />
            </main>
            <ToastHost toaster=toaster />
            <ConfirmDialog prompt=prompt />
        </div>
    }
}
