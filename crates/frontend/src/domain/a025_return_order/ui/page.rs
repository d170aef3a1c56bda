//! Return workflow page: step indicator, active step panel, navigation

use leptos::prelude::*;
use thaw::*;

use super::panels::{ConfirmPanel, CreatePanel, PreviewPanel, SearchPanel, SrPanel};
use super::view_model::ReturnWorkflowVm;
use crate::domain::a025_return_order::workflow::Step;
use crate::system::auth::context::{sign_out, use_session};

#[component]
pub fn ReturnWorkflowPage() -> impl IntoView {
    let vm = ReturnWorkflowVm::new();
    let session = use_session();

    view! {
        <div class="detail-form return-workflow">
            <div class="detail-form-header">
                <div class="detail-form-header-left">
                    <h2>"Возврат заказа"</h2>
                </div>
                <div class="detail-form-header-right">
                    <Space gap=SpaceGap::Small>
                        <span class="session-user">
                            {move || {
                                let s = session.get();
                                let role = s.role().map(|r| r.display_name()).unwrap_or("—");
                                format!("{} ({})", s.user_id, role)
                            }}
                        </span>
                        <Button
                            appearance=ButtonAppearance::Subtle
                            on_click=move |_| {
                                vm.cancel();
                                sign_out(session);
                            }
                        >
                            "Выйти"
                        </Button>
                    </Space>
                </div>
            </div>

            <StepIndicator vm=vm />

            {move || {
                vm.state
                    .with(|s| s.error.clone())
                    .map(|err| {
                        view! {
                            <div class="workflow-error">
                                <strong>"Ошибка: "</strong>
                                {err}
                                <Button
                                    appearance=ButtonAppearance::Transparent
                                    on_click=move |_| vm.clear_error()
                                >
                                    "✕"
                                </Button>
                            </div>
                        }
                    })
            }}

            <div class="detail-form-content">
                {move || match vm.state.with(|s| s.current_step) {
                    Step::Search => view! { <SearchPanel vm=vm /> }.into_any(),
                    Step::Create => view! { <CreatePanel vm=vm /> }.into_any(),
                    Step::Sr => view! { <SrPanel vm=vm /> }.into_any(),
                    Step::Preview => view! { <PreviewPanel vm=vm /> }.into_any(),
                    Step::Confirm => view! { <ConfirmPanel vm=vm /> }.into_any(),
                }}
            </div>

            <NavigationBar vm=vm />
        </div>
    }
}

#[component]
fn StepIndicator(vm: ReturnWorkflowVm) -> impl IntoView {
    view! {
        <div class="detail-tabs workflow-steps">
            {Step::ALL
                .into_iter()
                .map(|step| {
                    let current = move || vm.state.with(|s| s.current_step);
                    view! {
                        <div
                            class="detail-tab"
                            class:active=move || current() == step
                            class:done=move || { current() > step }
                        >
                            {format!("{}. {}", step.index() + 1, step.title())}
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn NavigationBar(vm: ReturnWorkflowVm) -> impl IntoView {
    view! {
        <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center class="workflow-nav">
            <Button
                appearance=ButtonAppearance::Secondary
                disabled=move || !vm.can_go_back()
                on_click=move |_| vm.go_back()
            >
                "← Назад"
            </Button>
            <Space>
                <Button
                    appearance=ButtonAppearance::Subtle
                    on_click=move |_| vm.cancel()
                >
                    "Отмена"
                </Button>
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=move || !vm.can_go_next()
                    on_click=move |_| vm.go_next()
                >
                    "Далее →"
                </Button>
            </Space>
        </Flex>
    }
}
