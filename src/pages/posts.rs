use crate::api::{ApiError, PostFilters};
use crate::app::{use_router, AppRouter, RouteLink};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle, Checkbox,
    SelectAllCheckbox, Spinner, StatusBadge,
};
use crate::components::{ConfirmPrompt, Toaster};
use crate::models::{Post, PostStatus};
use crate::router::Confirm;
use crate::selection::{
    perform_bulk_action, BulkAction, BulkHost, BulkOutcome, Notifier, SelectionSet,
};
use crate::state::{AppContext, AppState, PageScope};
use crate::util::{format_local, pluralize};
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;

/// The posts list as seen by a running bulk action.
struct PostsListHost {
    selection: RwSignal<SelectionSet>,
    app: AppState,
}

impl BulkHost for PostsListHost {
    fn clear_selection(&self) {
        self.selection.update(SelectionSet::clear);
    }

    fn reload(&self) {
        // The list and the pending badge both watch this tick.
        self.app.request_reload();
    }
}

fn parse_filter(value: &str) -> Option<PostStatus> {
    value.parse().ok()
}

#[component]
pub fn PostsPage(initial: Vec<Post>) -> impl IntoView {
    let AppContext(app) = expect_context::<AppContext>();
    let router = use_router();
    let toaster = expect_context::<Toaster>();
    let prompt = expect_context::<ConfirmPrompt>();

    let posts: RwSignal<Vec<Post>> = RwSignal::new(initial);
    let filter: RwSignal<Option<PostStatus>> = RwSignal::new(None);
    let selection: RwSignal<SelectionSet> = RwSignal::new(SelectionSet::new());
    let running: RwSignal<bool> = RwSignal::new(false);
    let refreshing: RwSignal<bool> = RwSignal::new(false);

    let refetch = {
        let app = app.clone();
        let router = router.clone();
        move || {
            let api = app.api_client.get_untracked();
            let filters = PostFilters {
                status: filter.get_untracked(),
                batch_id: None,
            };
            let router = router.clone();
            refreshing.set(true);
            spawn_local(async move {
                match api.list_posts(&filters).await {
                    Ok(list) => posts.set(list),
                    Err(e) => router.report_error("Could not load posts", e),
                }
                refreshing.set(false);
            });
        }
    };

    Effect::new({
        let app = app.clone();
        let refetch = refetch.clone();
        move |prev: Option<u64>| {
            let tick = app.reload_tick.get();
            if prev.is_some_and(|p| p != tick) {
                refetch();
            }
            tick
        }
    });

    let run_bulk = {
        let app = app.clone();
        let router = router.clone();
        move |action: BulkAction| {
            if running.get_untracked() {
                return;
            }
            let ids = selection.with_untracked(SelectionSet::ids);
            let api = app.api_client.get_untracked();
            let host = PostsListHost {
                selection,
                app: app.clone(),
            };
            let prompt = prompt.clone();
            let router = router.clone();

            running.set(true);
            spawn_local(async move {
                match perform_bulk_action(&api, &prompt, &toaster, &host, action, &ids).await {
                    Ok(BulkOutcome::Failed(ApiError::Unauthorized)) => router.expire_session(),
                    Ok(_) => {}
                    Err(e) => toaster.error(e.to_string()),
                }
                running.set(false);
            });
        }
    };

    let select_all_state =
        Signal::derive(move || posts.with(|ps| selection.with(|s| s.select_all_state(ps))));
    let on_select_all = Callback::new(move |checked: bool| {
        posts.with_untracked(|ps| {
            selection.update(|s| {
                if checked {
                    s.select_all(ps);
                } else {
                    s.deselect_all(ps);
                }
            })
        })
    });
    let no_eligible =
        Signal::derive(move || posts.with(|ps| !ps.iter().any(|p| p.status.is_selectable())));

    let toolbar_disabled = move || running.get() || selection.with(SelectionSet::is_empty);

    let on_filter = {
        let refetch = refetch.clone();
        move |ev: web_sys::Event| {
            filter.set(parse_filter(&event_target_value(&ev)));
            refetch();
        }
    };

    let action_button = move |action: BulkAction, variant: ButtonVariant| {
        let run = run_bulk.clone();
        view! {
            <Button
                variant=variant
                size=ButtonSize::Sm
                attr:disabled=toolbar_disabled
                on:click=move |_| run(action)
            >
                {action.label()}
            </Button>
        }
    };

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex items-center justify-between">
                <h1 class="text-xl font-semibold">"Posts"</h1>
                <div class="flex items-center gap-3">
                    <Show when=move || refreshing.get() fallback=|| ()>
                        <Spinner />
                    </Show>
                    <select
                        class="h-8 rounded-md border bg-transparent px-2 text-sm"
                        aria-label="Filter by status"
                        on:change=on_filter
                    >
                        <option value="">"All statuses"</option>
                        {PostStatus::iter()
                            .map(|s| view! { <option value=s.as_ref().to_string()>{s.label()}</option> })
                            .collect_view()}
                    </select>
                    <RouteLink to="posts/new" class="text-sm text-primary hover:underline">"New post"</RouteLink>
                </div>
            </div>

            <div class="flex items-center gap-3 rounded-md border px-3 py-2">
                <SelectAllCheckbox state=select_all_state disabled=no_eligible on_toggle=on_select_all />
                <span class="text-sm text-muted-foreground">
                    {move || {
                        let n = selection.with(SelectionSet::len);
                        if n == 0 { "Nothing selected".to_string() } else { format!("{n} selected") }
                    }}
                </span>
                <div class="ml-auto flex gap-2">
                    {action_button(BulkAction::Approve, ButtonVariant::Success)}
                    {action_button(BulkAction::Skip, ButtonVariant::Outline)}
                    {action_button(BulkAction::Delete, ButtonVariant::Destructive)}
                </div>
            </div>

            <Show
                when=move || posts.with(|ps| !ps.is_empty())
                fallback=|| view! { <p class="px-1 py-6 text-sm text-muted-foreground">"No posts match this filter."</p> }
            >
                <ul class="flex flex-col divide-y rounded-md border">
                    <For
                        each=move || posts.get()
                        key=|p| (p.id.clone(), p.status)
                        children=move |post: Post| view! { <PostRow post=post selection=selection /> }
                    />
                </ul>
            </Show>
        </div>
    }
}

#[component]
fn PostRow(post: Post, selection: RwSignal<SelectionSet>) -> impl IntoView {
    let id = post.id.clone();
    let selectable = post.status.is_selectable();
    let editable = post.status.is_editable();
    let status = post.status;
    let caption = post.caption.clone();
    let when = format_local(&post.scheduled_at);
    let detail = format!("posts/{id}");
    let edit = format!("posts/{id}/edit");

    let checked = Signal::derive({
        let id = id.clone();
        move || selection.with(|s| s.contains(&id))
    });
    let on_toggle = Callback::new(move |_: bool| {
        selection.update(|s| {
            s.toggle(&post);
        })
    });

    view! {
        <li class="flex items-center gap-3 px-3 py-2">
            <Checkbox
                checked=checked
                disabled=!selectable
                label=format!("Select post {id}")
                on_toggle=on_toggle
            />
            <span class="w-48 shrink-0 text-xs text-muted-foreground">{when}</span>
            <RouteLink to=detail class="flex-1 truncate text-sm hover:underline">{caption}</RouteLink>
            <StatusBadge status=status />
            <Show when=move || editable fallback=|| ()>
                <RouteLink to=edit.clone() class="text-xs text-primary hover:underline">"Edit"</RouteLink>
            </Show>
        </li>
    }
}

async fn delete_post(
    router: AppRouter,
    app: AppState,
    toaster: Toaster,
    prompt: ConfirmPrompt,
    scope: PageScope,
    id: String,
) {
    if !prompt.confirm("Delete this post? This cannot be undone.").await {
        return;
    }
    let api = app.api_client.get_untracked();
    match api.delete_post(&id).await {
        Ok(()) => {
            tracing::info!(id = %id, "post deleted");
            toaster.success("Post deleted".to_string());
            app.request_reload();
            if scope.is_active() {
                router.navigate("posts", true);
            }
        }
        Err(e) => router.report_error("Could not delete post", e),
    }
}

#[component]
pub fn PostDetailPage(post: Post) -> impl IntoView {
    let AppContext(app) = expect_context::<AppContext>();
    let router = use_router();
    let toaster = expect_context::<Toaster>();
    let prompt = expect_context::<ConfirmPrompt>();

    let id = post.id.clone();
    let editable = post.status.is_editable();
    let deletable = post.status.is_selectable();

    let media = post
        .media
        .iter()
        .map(|m| {
            view! {
                <li class="truncate text-xs">
                    <a class="text-primary hover:underline" href=m.url.clone() target="_blank" rel="noopener">
                        {m.url.clone()}
                    </a>
                    <span class="ml-2 text-muted-foreground">{format!("({:?})", m.media_type).to_lowercase()}</span>
                </li>
            }
        })
        .collect_view();

    let on_delete = {
        let id = id.clone();
        let scope = app.nav.page_scope();
        move |_| {
            spawn_local(delete_post(
                router.clone(),
                app.clone(),
                toaster,
                prompt.clone(),
                scope.clone(),
                id.clone(),
            ));
        }
    };

    view! {
        <Card>
            <CardHeader>
                <div class="flex w-full items-center gap-3">
                    <CardTitle>{post.subject.clone().unwrap_or_else(|| "Post".to_string())}</CardTitle>
                    <StatusBadge status=post.status />
                    <span class="ml-auto text-xs text-muted-foreground">{format_local(&post.scheduled_at)}</span>
                </div>
            </CardHeader>
            <CardContent>
                <p class="whitespace-pre-wrap text-sm">{post.caption.clone()}</p>
            </CardContent>
            {(!post.media.is_empty()).then(|| view! {
                <CardContent>
                    <h3 class="mb-1 text-xs font-medium">{pluralize(post.media.len(), "media item", "media items")}</h3>
                    <ul class="flex flex-col gap-1">{media}</ul>
                </CardContent>
            })}
            {post.error_message.clone().map(|msg| view! {
                <CardContent>
                    <p class="text-xs text-destructive">{msg}</p>
                </CardContent>
            })}
            <CardContent>
                <div class="flex gap-2">
                    <RouteLink to="posts" class="text-sm text-muted-foreground hover:underline">"Back to posts"</RouteLink>
                    {editable.then(|| view! {
                        <RouteLink to=format!("posts/{id}/edit") class="text-sm text-primary hover:underline">"Edit"</RouteLink>
                    })}
                    {deletable.then(|| view! {
                        <Button
                            class="ml-auto"
                            variant=ButtonVariant::Destructive
                            size=ButtonSize::Sm
                            on:click=on_delete
                        >
                            "Delete"
                        </Button>
                    })}
                </div>
            </CardContent>
        </Card>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter(""), None);
        assert_eq!(parse_filter("pending"), Some(PostStatus::Pending));
        assert_eq!(parse_filter("bogus"), None);
    }
}
