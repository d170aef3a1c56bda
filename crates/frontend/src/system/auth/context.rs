use contracts::system::auth::SessionInfo;
use leptos::prelude::*;

use super::storage;

/// Provides the current session (restored from localStorage) to the component tree
#[component]
pub fn AuthProvider(children: ChildrenFn) -> impl IntoView {
    let session = RwSignal::new(storage::load_session().unwrap_or_default());
    if session.with_untracked(|s| s.is_authenticated) {
        log::info!("session restored");
    }

    provide_context(session);

    children()
}

pub fn use_session() -> RwSignal<SessionInfo> {
    use_context::<RwSignal<SessionInfo>>().expect("AuthProvider not found in component tree")
}

pub fn sign_in(target: RwSignal<SessionInfo>, session: SessionInfo) {
    storage::save_session(&session);
    target.set(session);
}

pub fn sign_out(target: RwSignal<SessionInfo>) {
    storage::clear_session();
    target.set(SessionInfo::default());
}
