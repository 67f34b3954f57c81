pub mod confirm;
pub mod toast;
pub mod ui;

pub(crate) use confirm::{ConfirmDialog, ConfirmPrompt};
pub(crate) use toast::{ToastHost, Toaster};
