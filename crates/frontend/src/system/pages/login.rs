use contracts::system::auth::{Role, SessionInfo};
use leptos::prelude::*;

use crate::system::auth::context::{sign_in, use_session};

/// Fallback when the host console has not stored a session: pick a user and a role
#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let user_id = RwSignal::new(String::new());
    let role_id = RwSignal::new(Role::Accounting.id());
    let error_message = RwSignal::new(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let user = user_id.get_untracked().trim().to_string();
        if user.is_empty() {
            error_message.set(Some("Укажите пользователя".to_string()));
            return;
        }
        error_message.set(None);
        sign_in(
            session,
            SessionInfo {
                user_id: user,
                role_id: role_id.get_untracked(),
                is_authenticated: true,
            },
        );
    };

    view! {
        <div class="login-container">
            <div class="login-box">
                <h1>"Возвраты"</h1>
                <h2>"Вход в систему"</h2>

                <Show when=move || error_message.get().is_some()>
                    <div class="error-message">
                        {move || error_message.get().unwrap_or_default()}
                    </div>
                </Show>

                <form on:submit=on_submit>
                    <div class="form-group">
                        <label for="user_id">"Пользователь"</label>
                        <input
                            type="text"
                            id="user_id"
                            class="form-input"
                            prop:value=move || user_id.get()
                            on:input=move |ev| user_id.set(event_target_value(&ev))
                        />
                    </div>

                    <div class="form-group">
                        <label for="role_id">"Роль"</label>
                        <select
                            id="role_id"
                            class="form-input"
                            on:change=move |ev| {
                                if let Ok(id) = event_target_value(&ev).parse::<i32>() {
                                    role_id.set(id);
                                }
                            }
                        >
                            {Role::all()
                                .into_iter()
                                .map(|role| {
                                    view! {
                                        <option
                                            value=role.id().to_string()
                                            selected=move || role_id.get() == role.id()
                                        >
                                            {role.display_name()}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </div>

                    <button type="submit" class="button button--primary">
                        "Войти"
                    </button>
                </form>
            </div>
        </div>
    }
}
