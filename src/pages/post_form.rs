use crate::api::{ApiError, PostInput};
use crate::app::{use_router, RouteLink};
use crate::components::ui::{
    Alert, AlertDescription, AlertVariant, Button, ButtonSize, Card, CardContent, CardHeader,
    CardTitle, Input, Label, Spinner, Textarea,
};
use crate::components::Toaster;
use crate::models::{MediaItem, Post, PostType};
use crate::selection::Notifier;
use crate::state::AppContext;
use crate::util::{now, parse_timestamp, to_input_value};
use chrono::{DateTime, Utc};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum PostFormError {
    #[error("Caption cannot be empty")]
    EmptyCaption,
    #[error("Enter a valid date and time")]
    InvalidTime,
    #[error("Scheduled time must be in the future")]
    NotInFuture,
}

/// Raw field values of the post editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PostFormValues {
    pub caption: String,
    pub subject: String,
    /// `datetime-local` input value.
    pub scheduled_at: String,
    /// One URL per line.
    pub media_urls: String,
}

impl PostFormValues {
    pub fn from_post(post: &Post) -> Self {
        Self {
            caption: post.caption.clone(),
            subject: post.subject.clone().unwrap_or_default(),
            scheduled_at: to_input_value(&post.scheduled_at),
            media_urls: post
                .media
                .iter()
                .map(|m| m.url.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Validate and build the request body.
    ///
    /// A time kept unchanged from `original` may stay in the past; any new
    /// time must be after `now`.
    pub fn to_input(
        &self,
        platform: &str,
        now: DateTime<Utc>,
        original: Option<DateTime<Utc>>,
    ) -> Result<PostInput, PostFormError> {
        let caption = self.caption.trim();
        if caption.is_empty() {
            return Err(PostFormError::EmptyCaption);
        }

        let scheduled_at = parse_timestamp(&self.scheduled_at).ok_or(PostFormError::InvalidTime)?;
        let unchanged = original
            .map(|o| to_input_value(&o) == to_input_value(&scheduled_at))
            .unwrap_or(false);
        if !unchanged && scheduled_at <= now {
            return Err(PostFormError::NotInFuture);
        }

        let media: Vec<MediaItem> = self
            .media_urls
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(MediaItem::from_url)
            .collect();

        let subject = self.subject.trim();
        Ok(PostInput {
            caption: caption.to_string(),
            subject: (!subject.is_empty()).then(|| subject.to_string()),
            scheduled_at,
            post_type: PostType::for_media_count(media.len()),
            media,
            platform: platform.to_string(),
        })
    }
}

/// Create (no `existing`) or edit a single post.
#[component]
pub fn PostFormPage(existing: Option<Post>) -> impl IntoView {
    let AppContext(app) = expect_context::<AppContext>();
    let router = use_router();
    let toaster = expect_context::<Toaster>();

    let initial = existing
        .as_ref()
        .map(PostFormValues::from_post)
        .unwrap_or_default();
    let caption = RwSignal::new(initial.caption);
    let subject = RwSignal::new(initial.subject);
    let scheduled_at = RwSignal::new(initial.scheduled_at);
    let media_urls = RwSignal::new(initial.media_urls);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving = RwSignal::new(false);

    let edit_id = existing.as_ref().map(|p| p.id.clone());
    let original_time = existing.as_ref().map(|p| p.scheduled_at);
    let platform = existing
        .as_ref()
        .and_then(|p| p.platform.clone())
        .unwrap_or_else(|| app.config.platform.clone());
    let title = if edit_id.is_some() { "Edit post" } else { "New post" };
    let cancel_to = edit_id
        .as_ref()
        .map(|id| format!("posts/{id}"))
        .unwrap_or_else(|| "posts".to_string());

    let scope = app.nav.page_scope();
    let mark_dirty = {
        let scope = scope.clone();
        Callback::new(move |_: ()| {
            scope.set_unsaved_changes(true);
        })
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let values = PostFormValues {
            caption: caption.get_untracked(),
            subject: subject.get_untracked(),
            scheduled_at: scheduled_at.get_untracked(),
            media_urls: media_urls.get_untracked(),
        };
        let input = match values.to_input(&platform, now(), original_time) {
            Ok(input) => input,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };

        let api = app.api_client.get_untracked();
        let scope = scope.clone();
        let router = router.clone();
        let edit_id = edit_id.clone();
        error.set(None);
        saving.set(true);

        spawn_local(async move {
            let result = match edit_id.as_deref() {
                Some(id) => api.update_post(id, &input).await,
                None => api.create_post(&input).await,
            };
            saving.set(false);
            match result {
                Ok(post) => {
                    tracing::info!(id = %post.id, "post saved");
                    toaster.success("Post saved".to_string());
                    // Leave only if the user is still on this form.
                    if scope.set_unsaved_changes(false) {
                        router.navigate(&format!("posts/{}", post.id), true);
                    }
                }
                Err(ApiError::Unauthorized) => router.expire_session(),
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle>{title}</CardTitle>
            </CardHeader>
            <CardContent>
                <form class="flex flex-col gap-4" on:submit=on_submit>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="caption">"Caption"</Label>
                        <Textarea id="caption" rows=5 bind_value=caption on_edit=mark_dirty />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="subject">"Subject"</Label>
                        <Input id="subject" placeholder="Optional" bind_value=subject on_edit=mark_dirty />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="scheduled_at">"Scheduled for"</Label>
                        <Input
                            id="scheduled_at"
                            r#type="datetime-local"
                            bind_value=scheduled_at
                            on_edit=mark_dirty
                            required=true
                        />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="media">"Media URLs"</Label>
                        <Textarea
                            id="media"
                            rows=3
                            placeholder="One URL per line"
                            bind_value=media_urls
                            on_edit=mark_dirty
                        />
                    </div>

                    {move || {
                        error.get().map(|e| {
                            view! {
                                <Alert variant=AlertVariant::Destructive>
                                    <AlertDescription>{e}</AlertDescription>
                                </Alert>
                            }
                        })
                    }}

                    <div class="flex items-center gap-3">
                        <Button size=ButtonSize::Sm attr:disabled=move || saving.get()>
                            <Show when=move || saving.get() fallback=|| ()>
                                <Spinner />
                            </Show>
                            "Save"
                        </Button>
                        <RouteLink to=cancel_to class="text-sm text-muted-foreground hover:underline">"Cancel"</RouteLink>
                    </div>
                </form>
            </CardContent>
        </Card>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn values(at: &str) -> PostFormValues {
        PostFormValues {
            caption: "  Hello  ".to_string(),
            subject: " ".to_string(),
            scheduled_at: at.to_string(),
            media_urls: "https://cdn/a.jpg\n\n  https://cdn/b.mp4 \n".to_string(),
        }
    }

    #[test]
    fn test_to_input_builds_carousel() {
        let now = parse_timestamp("2026-01-01T00:00").expect("valid");
        let input = values("2026-02-01T09:30")
            .to_input("instagram", now, None)
            .expect("valid form");

        assert_eq!(input.caption, "Hello");
        assert_eq!(input.subject, None);
        assert_eq!(input.media.len(), 2);
        assert_eq!(input.post_type, PostType::Carousel);
        assert_eq!(input.platform, "instagram");
    }

    #[test]
    fn test_to_input_rejects_bad_fields() {
        let now = parse_timestamp("2026-01-01T00:00").expect("valid");
        let mut v = values("2026-02-01T09:30");
        v.caption = "   ".to_string();
        assert_eq!(v.to_input("x", now, None), Err(PostFormError::EmptyCaption));

        assert_eq!(
            values("not a date").to_input("x", now, None),
            Err(PostFormError::InvalidTime)
        );
        assert_eq!(
            values("2025-12-31T09:00").to_input("x", now, None),
            Err(PostFormError::NotInFuture)
        );
    }

    #[test]
    fn test_unchanged_past_time_is_kept_on_edit() {
        let original = parse_timestamp("2025-12-31T09:00").expect("valid");
        let now = original + Duration::days(1);
        let v = values(&to_input_value(&original));

        assert!(v.to_input("x", now, Some(original)).is_ok());
        assert_eq!(
            values("2025-12-31T10:00").to_input("x", now, Some(original)),
            Err(PostFormError::NotInFuture)
        );
    }
}
