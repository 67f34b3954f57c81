use crate::selection::SelectAllState;
use leptos::prelude::*;
use tw_merge::tw_merge;

/// Native checkbox with tri-state support.
///
/// `indeterminate` only exists as a DOM property, so it is set with `prop:`.
#[component]
pub fn Checkbox(
    #[prop(into)] checked: Signal<bool>,
    #[prop(into, optional)] indeterminate: Signal<bool>,
    #[prop(into, optional)] disabled: Signal<bool>,
    #[prop(into, optional)] label: String,
    #[prop(into, optional)] class: String,
    on_toggle: Callback<bool>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "size-4 shrink-0 rounded-[4px] border border-input accent-primary disabled:cursor-not-allowed disabled:opacity-50",
        class
    );

    view! {
        <input
            type="checkbox"
            class=merged_class
            aria-label=label
            disabled=move || disabled.get()
            prop:checked=move || checked.get()
            prop:indeterminate=move || indeterminate.get()
            on:change=move |ev| on_toggle.run(event_target_checked(&ev))
        />
    }
}

/// Header checkbox driven by a derived [`SelectAllState`].
#[component]
pub fn SelectAllCheckbox(
    #[prop(into)] state: Signal<SelectAllState>,
    #[prop(into, optional)] disabled: Signal<bool>,
    on_toggle: Callback<bool>,
) -> impl IntoView {
    view! {
        <Checkbox
            checked=Signal::derive(move || state.get() == SelectAllState::Checked)
            indeterminate=Signal::derive(move || state.get() == SelectAllState::Indeterminate)
            disabled=disabled
            label="Select all"
            on_toggle=on_toggle
        />
    }
}
