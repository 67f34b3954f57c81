use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Full-width placeholder shown while a page loads.
#[component]
pub fn LoadingPanel(#[prop(into, optional)] label: String) -> impl IntoView {
    let label = if label.is_empty() {
        "Loading...".to_string()
    } else {
        label
    };

    view! {
        <div class="flex items-center gap-2 px-4 py-10 text-xs text-muted-foreground">
            <Spinner />
            <span>{label}</span>
        </div>
    }
}
