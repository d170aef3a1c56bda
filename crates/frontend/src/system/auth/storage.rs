use contracts::system::auth::SessionInfo;
use web_sys::window;

const SESSION_KEY: &str = "return_console_session";

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// Session written by the host console, `None` if absent or unreadable
pub fn load_session() -> Option<SessionInfo> {
    let raw = get_local_storage()?.get_item(SESSION_KEY).ok()??;
    match serde_json::from_str::<SessionInfo>(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("stored session is unreadable: {}", e);
            None
        }
    }
}

pub fn save_session(session: &SessionInfo) {
    let Some(storage) = get_local_storage() else {
        return;
    };
    match serde_json::to_string(session) {
        Ok(raw) => {
            let _ = storage.set_item(SESSION_KEY, &raw);
        }
        Err(e) => log::warn!("failed to serialize session: {}", e),
    }
}

pub fn clear_session() {
    if let Some(storage) = get_local_storage() {
        let _ = storage.remove_item(SESSION_KEY);
    }
}
