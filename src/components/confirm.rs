use crate::components::ui::{Button, ButtonVariant};
use crate::router::Confirm;
use async_trait::async_trait;
use futures::channel::oneshot;
use leptos::prelude::*;
use leptos_ui::clx;
use std::sync::{Arc, Mutex};

mod components {
    use super::*;
    clx! {DialogPanel, div, "bg-background w-full max-w-md rounded-lg border p-6 shadow-lg flex flex-col gap-4"}
    clx! {DialogTitle, h3, "text-lg leading-none font-semibold"}
    clx! {DialogFooter, footer, "flex flex-col-reverse gap-2 sm:flex-row sm:justify-end"}
}

use components::*;

/// Modal yes/no question answered asynchronously.
///
/// Only one question is open at a time; asking again answers the previous
/// one with "no".
#[derive(Clone)]
pub(crate) struct ConfirmPrompt {
    message: RwSignal<Option<String>>,
    pending: Arc<Mutex<Option<oneshot::Sender<bool>>>>,
}

impl ConfirmPrompt {
    pub fn new() -> Self {
        Self {
            message: RwSignal::new(None),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn message(&self) -> RwSignal<Option<String>> {
        self.message
    }

    pub fn answer(&self, yes: bool) {
        let sender = self.pending.lock().ok().and_then(|mut p| p.take());
        if let Some(tx) = sender {
            let _ = tx.send(yes);
        }
        self.message.set(None);
    }
}

#[async_trait(?Send)]
impl Confirm for ConfirmPrompt {
    async fn confirm(&self, message: &str) -> bool {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut pending) = self.pending.lock() {
            // Dropping the old sender resolves its receiver as a decline.
            *pending = Some(tx);
        }
        self.message.set(Some(message.to_string()));
        rx.await.unwrap_or(false)
    }
}

#[component]
pub fn ConfirmDialog(prompt: ConfirmPrompt) -> impl IntoView {
    let message = prompt.message();
    let answer = Callback::new(move |yes: bool| prompt.answer(yes));

    view! {
        <Show when=move || message.with(Option::is_some)>
            <div
                class="fixed inset-0 z-40 flex items-center justify-center bg-black/50"
                on:click=move |_| answer.run(false)
            >
                <DialogPanel attr:role="alertdialog" on:click=|ev: web_sys::MouseEvent| ev.stop_propagation()>
                    <DialogTitle>"Are you sure?"</DialogTitle>
                    <p class="text-sm text-muted-foreground">{move || message.get().unwrap_or_default()}</p>
                    <DialogFooter>
                        <Button
                            variant=ButtonVariant::Outline
                            on:click=move |_| answer.run(false)
                        >
                            "Cancel"
                        </Button>
                        <Button on:click=move |_| answer.run(true)>"Continue"</Button>
                    </DialogFooter>
                </DialogPanel>
            </div>
        </Show>
    }
}
