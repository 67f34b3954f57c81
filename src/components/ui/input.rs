use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

const FIELD_CLASS: &str = "placeholder:text-muted-foreground border-input flex w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs transition-[color,box-shadow] outline-none disabled:pointer-events-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50 aria-invalid:border-destructive";

/// Text input bound to a signal.
///
/// `on_edit` fires after every keystroke that changed the bound value; pages
/// use it to mark themselves dirty.
#[component]
pub fn Input(
    #[prop(into, optional)] class: String,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] name: String,
    #[prop(into, optional)] id: String,
    #[prop(into, optional)] disabled: Signal<bool>,
    #[prop(optional)] required: bool,
    #[prop(optional)] autofocus: bool,
    // Manual wiring instead of `bind:value`; it stays stable across Leptos releases.
    #[prop(into)] bind_value: RwSignal<String>,
    #[prop(optional)] on_edit: Option<Callback<()>>,
    #[prop(optional)] node_ref: NodeRef<html::Input>,
) -> impl IntoView {
    let merged_class = tw_merge!(FIELD_CLASS, "h-9", class);

    let on_input = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        bind_value.set(input.value());
        if let Some(cb) = on_edit {
            cb.run(());
        }
    };

    view! {
        <input
            type=r#type
            class=merged_class
            placeholder=placeholder
            name=name
            id=id
            disabled=move || disabled.get()
            required=required
            autofocus=autofocus
            prop:value=move || bind_value.get()
            on:input=on_input
            node_ref=node_ref
        />
    }
}

#[component]
pub fn Textarea(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] id: String,
    #[prop(default = 4)] rows: u32,
    #[prop(into, optional)] disabled: Signal<bool>,
    #[prop(into)] bind_value: RwSignal<String>,
    #[prop(optional)] on_edit: Option<Callback<()>>,
) -> impl IntoView {
    let merged_class = tw_merge!(FIELD_CLASS, "min-h-16 py-2", class);

    let on_input = move |ev: web_sys::Event| {
        let Some(area) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        else {
            return;
        };
        bind_value.set(area.value());
        if let Some(cb) = on_edit {
            cb.run(());
        }
    };

    view! {
        <textarea
            class=merged_class
            placeholder=placeholder
            id=id
            rows=rows.to_string()
            disabled=move || disabled.get()
            prop:value=move || bind_value.get()
            on:input=on_input
        ></textarea>
    }
}
