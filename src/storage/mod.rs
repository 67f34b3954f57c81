use crate::models::Identity;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "postpilot_token";
pub(crate) const USER_KEY: &str = "postpilot_user";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

/// Token and identity as persisted by the sign-in flow.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StoredSession {
    pub token: String,
    pub user: Identity,
}

pub(crate) fn load_session() -> Option<StoredSession> {
    let token = local_storage()?.get_item(TOKEN_KEY).ok().flatten()?;
    if token.trim().is_empty() {
        return None;
    }
    // A token without a readable identity is useless for the role guard.
    let user = load_json_from_storage::<Identity>(USER_KEY)?;
    Some(StoredSession { token, user })
}

pub(crate) fn save_session(session: &StoredSession) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(TOKEN_KEY, &session.token);
    }
    save_json_to_storage(USER_KEY, &session.user);
}

pub(crate) fn clear_session() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(TOKEN_KEY);
        let _ = storage.remove_item(USER_KEY);
    }
}
