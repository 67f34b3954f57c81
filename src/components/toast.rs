use crate::selection::Notifier;
use icons::{CircleAlert, CircleCheck, Info, X};
use leptos::prelude::*;
use std::time::Duration;
use tw_merge::*;

/// At most this many toasts are on screen; the oldest is dropped first.
pub(crate) const MAX_TOASTS: usize = 4;
const TOAST_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Push `toast`, keeping only the newest [`MAX_TOASTS`].
pub(crate) fn push_bounded(toasts: &mut Vec<Toast>, toast: Toast) {
    toasts.push(toast);
    if toasts.len() > MAX_TOASTS {
        let excess = toasts.len() - MAX_TOASTS;
        toasts.drain(..excess);
    }
}

/// Transient notifications, shared through context.
#[derive(Clone, Copy)]
pub(crate) struct Toaster {
    toasts: RwSignal<Vec<Toast>>,
    next_id: RwSignal<u64>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(vec![]),
            next_id: RwSignal::new(0),
        }
    }

    pub fn push(&self, kind: ToastKind, message: String) {
        let id = self.next_id.get_untracked() + 1;
        self.next_id.set(id);
        self.toasts
            .update(|list| push_bounded(list, Toast { id, kind, message }));

        let this = *self;
        leptos_dom::helpers::set_timeout(move || this.dismiss(id), TOAST_LIFETIME);
    }

    pub fn dismiss(&self, id: u64) {
        // The owner may already be gone when the timer fires.
        let _ = self.toasts.try_update(|list| list.retain(|t| t.id != id));
    }

    pub fn toasts(&self) -> RwSignal<Vec<Toast>> {
        self.toasts
    }
}

impl Notifier for Toaster {
    fn success(&self, message: String) {
        self.push(ToastKind::Success, message);
    }

    fn error(&self, message: String) {
        self.push(ToastKind::Error, message);
    }

    fn info(&self, message: String) {
        self.push(ToastKind::Info, message);
    }
}

#[derive(TwClass, Default)]
#[tw(class = "pointer-events-auto flex w-80 items-start gap-2 rounded-lg border bg-card px-4 py-3 text-sm shadow-lg")]
struct ToastClass {
    tone: ToastTone,
}

#[derive(TwVariant)]
enum ToastTone {
    #[tw(default, class = "text-card-foreground")]
    Info,
    #[tw(class = "border-emerald-200 text-emerald-800")]
    Success,
    #[tw(class = "border-red-200 text-red-800")]
    Error,
}

#[component]
pub fn ToastHost(toaster: Toaster) -> impl IntoView {
    view! {
        <div class="pointer-events-none fixed right-4 bottom-4 z-50 flex flex-col gap-2" aria-live="polite">
            <For
                each=move || toaster.toasts().get()
                key=|t| t.id
                children=move |t: Toast| {
                    let (tone, icon) = match t.kind {
                        ToastKind::Success => (ToastTone::Success, view! { <CircleCheck class="size-4" /> }.into_any()),
                        ToastKind::Error => (ToastTone::Error, view! { <CircleAlert class="size-4" /> }.into_any()),
                        ToastKind::Info => (ToastTone::Info, view! { <Info class="size-4" /> }.into_any()),
                    };
                    let id = t.id;
                    view! {
                        <div class=ToastClass { tone }.with_class("")>
                            {icon}
                            <span class="flex-1">{t.message}</span>
                            <button
                                class="opacity-60 hover:opacity-100"
                                aria-label="Dismiss"
                                on:click=move |_| toaster.dismiss(id)
                            >
                                <X class="size-3" />
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
