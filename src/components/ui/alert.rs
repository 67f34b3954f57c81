use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::*;

mod components {
    use super::*;
    clx! {AlertTitle, h4, "mb-1 font-medium tracking-tight leading-none"}
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed"}
}

#[allow(unused_imports)]
pub use components::*;

#[component]
pub fn Alert(
    #[prop(optional)] variant: AlertVariant,
    #[prop(into, optional)] class: String,
    children: Children,
) -> impl IntoView {
    let merged_class = AlertClass { variant }.with_class(class);

    view! {
        <div class=merged_class role="alert">
            {children()}
        </div>
    }
}

#[derive(TwClass, Default)]
#[tw(class = "relative w-full rounded-lg border px-4 py-3 text-sm")]
pub struct AlertClass {
    variant: AlertVariant,
}

#[derive(TwVariant)]
pub enum AlertVariant {
    #[tw(default, class = "bg-card text-card-foreground")]
    Default,
    #[tw(class = "border-destructive/30 text-destructive")]
    Destructive,
    #[tw(class = "border-success/30 text-success")]
    Success,
}
