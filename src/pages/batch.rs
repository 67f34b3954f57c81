use crate::api::{ApiError, BatchDetailResponse};
use crate::app::{use_router, RouteLink};
use crate::batch::{submit_batch, BatchDraft, ImportReport, ImportTable, PostDraft};
use crate::components::ui::{
    Alert, AlertDescription, AlertVariant, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardItem, CardList, CardTitle, Input, Label, Spinner,
    StatusBadge, Textarea,
};
use crate::components::Toaster;
use crate::models::MediaItem;
use crate::selection::Notifier;
use crate::state::AppContext;
use crate::util::{format_local, now, parse_timestamp, pluralize};
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

fn import_summary(report: &ImportReport) -> String {
    let mut msg = format!("Imported {}", pluralize(report.imported, "post", "posts"));
    if report.skipped > 0 {
        msg.push_str(&format!(
            ", skipped {}",
            pluralize(report.skipped, "row", "rows")
        ));
    }
    msg
}

/// Read the first selected file of a file input as text.
async fn read_selected_file(input: &web_sys::HtmlInputElement) -> Result<Option<String>, String> {
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(None);
    };
    let text = JsFuture::from(file.text())
        .await
        .map_err(|e| format!("{e:?}"))?;
    Ok(text.as_string())
}

#[component]
pub fn BatchBuilderPage() -> impl IntoView {
    let AppContext(app) = expect_context::<AppContext>();
    let router = use_router();
    let toaster = expect_context::<Toaster>();

    let draft: RwSignal<BatchDraft> = RwSignal::new(BatchDraft::new());
    let at = RwSignal::new(String::new());
    let caption = RwSignal::new(String::new());
    let subject = RwSignal::new(String::new());
    let media_url = RwSignal::new(String::new());
    let form_error: RwSignal<Option<String>> = RwSignal::new(None);

    let submitting = Signal::derive(move || draft.with(BatchDraft::is_submitting));
    let scope = app.nav.page_scope();
    let platform = app.config.platform.clone();

    // Any non-empty list is an unsaved edit.
    let sync_dirty = {
        let scope = scope.clone();
        Callback::new(move |_: ()| {
            scope.set_unsaved_changes(!draft.with_untracked(BatchDraft::is_empty));
        })
    };

    let on_add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(scheduled_at) = parse_timestamp(&at.get_untracked()) else {
            form_error.set(Some("Enter a valid date and time".to_string()));
            return;
        };
        let media_url_val = media_url.get_untracked();
        let subject_val = subject.get_untracked();
        let entry = PostDraft {
            scheduled_at,
            caption: caption.get_untracked().trim().to_string(),
            subject: Some(subject_val.trim().to_string()).filter(|s| !s.is_empty()),
            media: Some(media_url_val.trim())
                .filter(|s| !s.is_empty())
                .map(MediaItem::from_url)
                .into_iter()
                .collect(),
        };

        match draft.try_update(|b| b.add_manual(entry, now())) {
            Some(Ok(())) => {
                form_error.set(None);
                caption.set(String::new());
                subject.set(String::new());
                media_url.set(String::new());
                sync_dirty.run(());
            }
            Some(Err(e)) => form_error.set(Some(e.to_string())),
            None => {}
        }
    };

    let on_import = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        spawn_local(async move {
            let text = match read_selected_file(&input).await {
                Ok(Some(text)) => text,
                Ok(None) => return,
                Err(e) => {
                    tracing::error!(error = %e, "reading import file failed");
                    toaster.error("Could not read the selected file".to_string());
                    return;
                }
            };
            // Let the same file be picked again.
            input.set_value("");

            let table = ImportTable::parse_csv(&text);
            match draft.try_update(|b| b.import_rows(&table)) {
                Some(Ok(report)) => {
                    if report.imported > 0 {
                        toaster.success(import_summary(&report));
                    } else {
                        toaster.info(import_summary(&report));
                    }
                    sync_dirty.run(());
                }
                Some(Err(e)) => toaster.error(format!("Import failed: {e}")),
                None => {}
            }
        });
    };

    let on_submit = {
        let scope = scope.clone();
        move |_| {
            let payload = match draft.try_update(|b| b.begin_submit(&platform)) {
                Some(Ok(payload)) => payload,
                Some(Err(e)) => {
                    toaster.error(e.to_string());
                    return;
                }
                None => return,
            };

            let api = app.api_client.get_untracked();
            let router = router.clone();
            let scope = scope.clone();
            spawn_local(async move {
                let result = submit_batch(&api, &toaster, &payload).await;
                draft.update(|b| b.finish_submit(&result));
                match result {
                    // Leave only if the user is still on the builder.
                    Ok(batch) => {
                        if scope.set_unsaved_changes(false) {
                            router.navigate(&format!("batches/{}", batch.id), true);
                        }
                    }
                    Err(ApiError::Unauthorized) => router.expire_session(),
                    Err(_) => {}
                }
            });
        }
    };

    let rows = move || {
        draft.with(|b| {
            b.drafts()
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let media = pluralize(d.media.len(), "media item", "media items");
                    let scheduled = format_local(&d.scheduled_at);
                    let caption = d.caption.clone();
                    let subject = d.subject.clone().unwrap_or_else(|| format!("Post {}", i + 1));
                    view! {
                        <CardItem>
                            <span class="w-48 shrink-0 text-xs text-muted-foreground">{scheduled}</span>
                            <div class="flex flex-1 flex-col">
                                <span class="truncate text-sm">{caption}</span>
                                <span class="text-xs text-muted-foreground">
                                    {subject}
                                    " · "
                                    {media}
                                </span>
                            </div>
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                attr:disabled=move || submitting.get()
                                on:click=move |_| {
                                    draft.update(|b| {
                                        b.remove(i);
                                    });
                                    sync_dirty.run(());
                                }
                            >
                                "Remove"
                            </Button>
                        </CardItem>
                    }
                })
                .collect_view()
        })
    };

    view! {
        <div class="flex flex-col gap-6">
            <h1 class="text-xl font-semibold">"New batch"</h1>

            <Card>
                <CardHeader>
                    <CardTitle>"Add a post"</CardTitle>
                    <CardDescription>"Posts are ordered by scheduled time."</CardDescription>
                </CardHeader>
                <CardContent>
                    <form class="grid gap-3 sm:grid-cols-2" on:submit=on_add>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="draft_at">"Scheduled for"</Label>
                            <Input id="draft_at" r#type="datetime-local" bind_value=at disabled=submitting />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="draft_subject">"Subject"</Label>
                            <Input id="draft_subject" placeholder="Optional" bind_value=subject disabled=submitting />
                        </div>
                        <div class="flex flex-col gap-1.5 sm:col-span-2">
                            <Label html_for="draft_caption">"Caption"</Label>
                            <Textarea id="draft_caption" rows=3 bind_value=caption disabled=submitting />
                        </div>
                        <div class="flex flex-col gap-1.5 sm:col-span-2">
                            <Label html_for="draft_media">"Media URL"</Label>
                            <Input id="draft_media" placeholder="https://" bind_value=media_url disabled=submitting />
                        </div>
                        {move || {
                            form_error.get().map(|e| {
                                view! {
                                    <Alert variant=AlertVariant::Destructive class="sm:col-span-2">
                                        <AlertDescription>{e}</AlertDescription>
                                    </Alert>
                                }
                            })
                        }}
                        <div class="flex items-center gap-3 sm:col-span-2">
                            <Button size=ButtonSize::Sm variant=ButtonVariant::Outline attr:disabled=move || submitting.get()>
                                "Add post"
                            </Button>
                            <label class="text-sm text-primary hover:cursor-pointer hover:underline">
                                "Import CSV"
                                <input
                                    type="file"
                                    accept=".csv,text/csv"
                                    class="hidden"
                                    disabled=move || submitting.get()
                                    on:change=on_import
                                />
                            </label>
                            <span class="text-xs text-muted-foreground">"Columns: scheduled_at, caption, media_url, subject"</span>
                        </div>
                    </form>
                </CardContent>
            </Card>

            <Card>
                <CardHeader>
                    <CardTitle>{move || draft.with(|b| pluralize(b.len(), "draft", "drafts"))}</CardTitle>
                </CardHeader>
                <CardContent>
                    <Show
                        when=move || !draft.with(BatchDraft::is_empty)
                        fallback=|| view! { <p class="text-sm text-muted-foreground">"No posts yet."</p> }
                    >
                        <CardList>{rows}</CardList>
                    </Show>
                </CardContent>
                <CardContent>
                    <Button
                        size=ButtonSize::Sm
                        attr:disabled=move || submitting.get() || draft.with(BatchDraft::is_empty)
                        on:click=on_submit
                    >
                        <Show when=move || submitting.get() fallback=|| ()>
                            <Spinner />
                        </Show>
                        {move || if submitting.get() { "Submitting..." } else { "Create batch" }}
                    </Button>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
pub fn BatchDetailPage(detail: BatchDetailResponse) -> impl IntoView {
    let BatchDetailResponse { batch, mut posts } = detail;
    posts.sort_by_key(|p| p.scheduled_at);

    let created = batch
        .created_at
        .as_ref()
        .map(format_local)
        .unwrap_or_else(|| "unknown".to_string());
    let platform = batch.platform.clone().unwrap_or_else(|| "-".to_string());
    let count = batch.post_count.map(|n| n as usize).unwrap_or(posts.len());

    let rows = posts
        .into_iter()
        .map(|p| {
            let to = format!("posts/{}", p.id);
            view! {
                <CardItem>
                    <span class="w-48 shrink-0 text-xs text-muted-foreground">{format_local(&p.scheduled_at)}</span>
                    <RouteLink to=to class="flex-1 truncate text-sm hover:underline">{p.caption}</RouteLink>
                    <StatusBadge status=p.status />
                </CardItem>
            }
        })
        .collect_view();

    view! {
        <Card>
            <CardHeader>
                <CardTitle>{format!("Batch {}", batch.id)}</CardTitle>
                <CardDescription>
                    {format!("{} on {platform}, created {created}", pluralize(count, "post", "posts"))}
                </CardDescription>
            </CardHeader>
            <CardContent>
                <CardList>{rows}</CardList>
            </CardContent>
            <CardContent>
                <RouteLink to="batches/new" class="text-sm text-primary hover:underline">"Start another batch"</RouteLink>
            </CardContent>
        </Card>
    }
}
