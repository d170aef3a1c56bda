use crate::domain::a025_return_order::ui::ReturnWorkflowPage;
use crate::system::auth::context::use_session;
use crate::system::pages::login::LoginPage;
use leptos::prelude::*;

#[component]
pub fn AppRoutes() -> impl IntoView {
    let session = use_session();

    view! {
        <Show
            when=move || session.with(|s| s.is_authenticated && !s.user_id.is_empty())
            fallback=|| view! { <LoginPage /> }
        >
            <ReturnWorkflowPage />
        </Show>
    }
}
