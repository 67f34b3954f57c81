use crate::models::PostStatus;
use leptos::prelude::*;
use tw_merge::*;

#[component]
pub fn StatusBadge(status: PostStatus, #[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = BadgeClass {
        tone: BadgeTone::for_status(status),
    }
    .with_class(class);

    view! { <span class=merged_class data-status=status.to_string()>{status.label()}</span> }
}

/// Small count pill, e.g. next to a navigation entry.
#[component]
pub fn CountBadge(#[prop(into)] count: Signal<usize>) -> impl IntoView {
    view! {
        <Show when=move || { count.get() > 0 } fallback=|| ()>
            <span class="ml-1 rounded-full bg-primary px-1.5 text-[10px] font-semibold text-primary-foreground">
                {move || count.get()}
            </span>
        </Show>
    }
}

#[derive(TwClass, Default)]
#[tw(class = "inline-flex items-center rounded-md border px-2 py-0.5 text-xs font-medium")]
pub struct BadgeClass {
    tone: BadgeTone,
}

#[derive(TwVariant)]
pub enum BadgeTone {
    #[tw(default, class = "bg-muted text-muted-foreground")]
    Neutral,
    #[tw(class = "bg-sky-50 text-sky-700 border-sky-200")]
    Info,
    #[tw(class = "bg-amber-50 text-amber-700 border-amber-200")]
    Warning,
    #[tw(class = "bg-emerald-50 text-emerald-700 border-emerald-200")]
    Success,
    #[tw(class = "bg-red-50 text-red-700 border-red-200")]
    Danger,
}

impl BadgeTone {
    pub fn for_status(status: PostStatus) -> Self {
        match status {
            PostStatus::Scheduled | PostStatus::Ready => BadgeTone::Info,
            PostStatus::Pending => BadgeTone::Warning,
            PostStatus::Approved | PostStatus::Posted => BadgeTone::Success,
            PostStatus::Publishing => BadgeTone::Info,
            PostStatus::Failed => BadgeTone::Danger,
            PostStatus::Cancelled => BadgeTone::Neutral,
        }
    }
}
