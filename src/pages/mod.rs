mod auth;
mod batch;
mod dashboard;
mod post_form;
mod posts;
mod schedule;

pub(crate) use dashboard::DashboardSummary;

use auth::{AdminLandingPage, LoginPage};
use batch::{BatchBuilderPage, BatchDetailPage};
use dashboard::DashboardPage;
use post_form::PostFormPage;
use posts::{PostDetailPage, PostsPage};
use schedule::SchedulePage;

use crate::api::{ApiClient, BatchDetailResponse, PostFilters};
use crate::components::ui::{Alert, AlertDescription, AlertTitle, AlertVariant, LoadingPanel};
use crate::models::{Identity, Post, Schedule};
use crate::router::{PageError, PageHandler, PageKey, PageRegistry, PageState, RouteParams};
use crate::util::now;
use async_trait::async_trait;
use leptos::prelude::*;

/// What every page handler gets to work with.
pub(crate) struct PageContext {
    pub api: ApiClient,
    pub identity: Option<Identity>,
}

/// Loaded model for the page being shown.
#[derive(Clone, Debug)]
pub(crate) enum PageData {
    Login,
    Dashboard(DashboardSummary),
    Posts(Vec<Post>),
    PostDetail(Post),
    /// `None` creates a new post.
    PostForm(Option<Post>),
    BatchNew,
    BatchDetail(BatchDetailResponse),
    Schedule(Schedule),
    AdminLanding(Option<Identity>),
}

fn required<'a>(params: &'a RouteParams, name: &'static str) -> Result<&'a str, PageError> {
    params
        .get(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or(PageError::MissingParam(name))
}

/// Pages with nothing to fetch.
struct StaticPage(PageData);

#[async_trait(?Send)]
impl PageHandler<PageContext, PageData> for StaticPage {
    async fn render(&self, _cx: &PageContext, _params: &RouteParams) -> Result<PageData, PageError> {
        Ok(self.0.clone())
    }
}

struct LoadDashboard;

#[async_trait(?Send)]
impl PageHandler<PageContext, PageData> for LoadDashboard {
    async fn render(&self, cx: &PageContext, _params: &RouteParams) -> Result<PageData, PageError> {
        let posts = cx.api.list_posts(&PostFilters::default()).await?;
        Ok(PageData::Dashboard(DashboardSummary::from_posts(&posts, now())))
    }
}

struct LoadPosts;

#[async_trait(?Send)]
impl PageHandler<PageContext, PageData> for LoadPosts {
    async fn render(&self, cx: &PageContext, _params: &RouteParams) -> Result<PageData, PageError> {
        Ok(PageData::Posts(
            cx.api.list_posts(&PostFilters::default()).await?,
        ))
    }
}

struct LoadPost;

#[async_trait(?Send)]
impl PageHandler<PageContext, PageData> for LoadPost {
    async fn render(&self, cx: &PageContext, params: &RouteParams) -> Result<PageData, PageError> {
        let id = required(params, "id")?;
        Ok(PageData::PostDetail(cx.api.get_post(id).await?))
    }
}

struct LoadPostForEdit;

#[async_trait(?Send)]
impl PageHandler<PageContext, PageData> for LoadPostForEdit {
    async fn render(&self, cx: &PageContext, params: &RouteParams) -> Result<PageData, PageError> {
        let id = required(params, "id")?;
        let post = cx.api.get_post(id).await?;
        if !post.status.is_editable() {
            return Err(PageError::Message(format!(
                "{} posts can no longer be edited",
                post.status.label()
            )));
        }
        Ok(PageData::PostForm(Some(post)))
    }
}

struct LoadBatch;

#[async_trait(?Send)]
impl PageHandler<PageContext, PageData> for LoadBatch {
    async fn render(&self, cx: &PageContext, params: &RouteParams) -> Result<PageData, PageError> {
        let id = required(params, "id")?;
        Ok(PageData::BatchDetail(cx.api.get_batch(id).await?))
    }
}

struct LoadSchedule;

#[async_trait(?Send)]
impl PageHandler<PageContext, PageData> for LoadSchedule {
    async fn render(&self, cx: &PageContext, _params: &RouteParams) -> Result<PageData, PageError> {
        Ok(PageData::Schedule(cx.api.get_schedule().await?))
    }
}

struct AdminLanding;

#[async_trait(?Send)]
impl PageHandler<PageContext, PageData> for AdminLanding {
    async fn render(&self, cx: &PageContext, _params: &RouteParams) -> Result<PageData, PageError> {
        Ok(PageData::AdminLanding(cx.identity.clone()))
    }
}

/// Handler for every [`PageKey`].
pub(crate) fn registry() -> PageRegistry<PageContext, PageData> {
    PageRegistry::new()
        .register(PageKey::Login, StaticPage(PageData::Login))
        .register(PageKey::Dashboard, LoadDashboard)
        .register(PageKey::Posts, LoadPosts)
        .register(PageKey::PostNew, StaticPage(PageData::PostForm(None)))
        .register(PageKey::PostDetail, LoadPost)
        .register(PageKey::PostEdit, LoadPostForEdit)
        .register(PageKey::BatchNew, StaticPage(PageData::BatchNew))
        .register(PageKey::BatchDetail, LoadBatch)
        .register(PageKey::Schedule, LoadSchedule)
        .register(PageKey::AdminLanding, AdminLanding)
}

#[component]
fn FailurePanel(message: String) -> impl IntoView {
    view! {
        <Alert variant=AlertVariant::Destructive>
            <AlertTitle>"Something went wrong"</AlertTitle>
            <AlertDescription>{message}</AlertDescription>
        </Alert>
    }
}

#[component]
fn NotFoundPanel() -> impl IntoView {
    view! {
        <div class="px-4 py-10 text-sm text-muted-foreground">"This page does not exist."</div>
    }
}

/// Content container driven by the page lifecycle.
#[component]
pub fn PageView(state: RwSignal<PageState<PageData>>) -> impl IntoView {
    move || match state.get() {
        PageState::Loading => view! { <LoadingPanel /> }.into_any(),
        PageState::NotFound => view! { <NotFoundPanel /> }.into_any(),
        PageState::Failed(message) => view! { <FailurePanel message=message /> }.into_any(),
        PageState::Ready(data) => match data {
            PageData::Login => view! { <LoginPage /> }.into_any(),
            PageData::Dashboard(summary) => {
                view! { <DashboardPage summary=summary /> }.into_any()
            }
            PageData::Posts(list) => view! { <PostsPage initial=list /> }.into_any(),
            PageData::PostDetail(post) => view! { <PostDetailPage post=post /> }.into_any(),
            PageData::PostForm(existing) => {
                view! { <PostFormPage existing=existing /> }.into_any()
            }
            PageData::BatchNew => view! { <BatchBuilderPage /> }.into_any(),
            PageData::BatchDetail(detail) => {
                view! { <BatchDetailPage detail=detail /> }.into_any()
            }
            PageData::Schedule(schedule) => {
                view! { <SchedulePage schedule=schedule /> }.into_any()
            }
            PageData::AdminLanding(identity) => {
                view! { <AdminLandingPage identity=identity /> }.into_any()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use futures::executor::block_on;
    use strum::IntoEnumIterator;

    fn cx(identity: Option<Identity>) -> PageContext {
        PageContext {
            api: ApiClient::new("http://api.invalid".to_string()),
            identity,
        }
    }

    #[test]
    fn test_every_page_has_a_handler() {
        let reg = registry();
        for key in PageKey::iter() {
            assert!(reg.get(key).is_some(), "no handler for {key}");
        }
    }

    #[test]
    fn test_blank_id_fails_before_any_request() {
        let reg = registry();
        let mut params = RouteParams::new();
        params.insert("id".to_string(), String::new());

        for key in [PageKey::PostDetail, PageKey::PostEdit, PageKey::BatchDetail] {
            let handler = reg.get(key).expect("registered");
            let err = block_on(handler.render(&cx(None), &params)).expect_err("blank id");
            assert_eq!(err, PageError::MissingParam("id"));
        }
    }

    #[test]
    fn test_static_and_identity_pages() {
        let reg = registry();
        let admin = Identity {
            user_id: "a1".to_string(),
            email: "ops@example.com".to_string(),
            role: Role::Admin,
            client_id: None,
        };

        let new_post = block_on(
            reg.get(PageKey::PostNew)
                .expect("registered")
                .render(&cx(None), &RouteParams::new()),
        );
        assert!(matches!(new_post, Ok(PageData::PostForm(None))));

        let landing = block_on(
            reg.get(PageKey::AdminLanding)
                .expect("registered")
                .render(&cx(Some(admin.clone())), &RouteParams::new()),
        );
        assert!(matches!(landing, Ok(PageData::AdminLanding(Some(ref i))) if *i == admin));
    }
}
