//! One panel per workflow step

use leptos::prelude::*;
use thaw::*;

use super::view_model::ReturnWorkflowVm;
use crate::shared::date_utils::{format_date, format_datetime, parse_user_date};
use crate::system::auth::context::use_session;

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

#[component]
fn Field(label: &'static str, children: Children) -> impl IntoView {
    view! {
        <label class="form-group">
            <span class="form-label">{label}</span>
            {children()}
        </label>
    }
}

#[component]
fn Info(label: &'static str, #[prop(into)] value: Signal<String>) -> impl IntoView {
    view! {
        <div class="info-row">
            <span class="info-label">{label}</span>
            <span class="info-value">{move || value.get()}</span>
        </div>
    }
}

#[component]
pub fn SearchPanel(vm: ReturnWorkflowVm) -> impl IntoView {
    view! {
        <div class="workflow-panel">
            <form on:submit=move |ev: leptos::ev::SubmitEvent| {
                ev.prevent_default();
                vm.search();
            }>
                <Flex gap=FlexGap::Large align=FlexAlign::End>
                    <Field label="Номер заказа">
                        <input
                            type="text"
                            class="form-input"
                            prop:value=move || vm.order_no.get()
                            on:input=move |ev| vm.order_no.set(event_target_value(&ev))
                        />
                    </Field>
                    <Field label="Номер SO">
                        <input
                            type="text"
                            class="form-input"
                            prop:value=move || vm.so_no.get()
                            on:input=move |ev| vm.so_no.set(event_target_value(&ev))
                        />
                    </Field>
                    <Button
                        appearance=ButtonAppearance::Primary
                        loading=move || vm.loading()
                        disabled=move || vm.loading()
                        on_click=move |_| vm.search()
                    >
                        "Найти"
                    </Button>
                </Flex>
            </form>
        </div>
    }
}

#[component]
pub fn CreatePanel(vm: ReturnWorkflowVm) -> impl IntoView {
    let head_field = move |f: fn(&contracts::domain::a025_return_order::aggregate::OrderHead) -> String| {
        Signal::derive(move || vm.state.with(|s| s.order_head.as_ref().map(f).unwrap_or_default()))
    };
    let editable = move || vm.state.with(|s| s.lines_editable());
    let return_qty_of = move |sku: &str| {
        vm.state.with(|s| {
            s.order_lines
                .iter()
                .find(|l| l.sku == sku)
                .map(|l| (l.return_qty, l.return_amount()))
                .unwrap_or_default()
        })
    };

    view! {
        <div class="workflow-panel">
            <div class="info-grid">
                <Info label="Заказ" value=head_field(|h| h.order_no.clone()) />
                <Info label="SO" value=head_field(|h| h.so_no.clone()) />
                <Info label="Канал" value=head_field(|h| h.channel.display_name().to_string()) />
                <Info label="Статус продажи" value=head_field(|h| h.sales_status.clone()) />
                <Info label="Статус маркетплейса" value=head_field(|h| h.marketplace_status.clone()) />
                <Info label="Склад назначения" value=head_field(|h| h.location_to.clone()) />
            </div>

            <Table>
                <TableHeader>
                    <TableRow>
                        <TableHeaderCell>"Артикул"</TableHeaderCell>
                        <TableHeaderCell>"Наименование"</TableHeaderCell>
                        <TableHeaderCell>"Кол-во"</TableHeaderCell>
                        <TableHeaderCell>"Цена"</TableHeaderCell>
                        <TableHeaderCell>"К возврату"</TableHeaderCell>
                        <TableHeaderCell>"Сумма возврата"</TableHeaderCell>
                    </TableRow>
                </TableHeader>
                <TableBody>
                    <For
                        each=move || vm.state.with(|s| s.order_lines.clone())
                        key=|line| line.sku.clone()
                        let:line
                    >
                        {
                            let sku = line.sku.clone();
                            let sku_input = line.sku.clone();
                            let sku_amount = line.sku.clone();
                            view! {
                                <TableRow>
                                    <TableCell>{sku}</TableCell>
                                    <TableCell>{line.item_name.clone()}</TableCell>
                                    <TableCell>{line.qty}</TableCell>
                                    <TableCell>{money(line.price)}</TableCell>
                                    <TableCell>
                                        <input
                                            type="number"
                                            class="form-input form-input--qty"
                                            min="0"
                                            max=line.qty.to_string()
                                            prop:disabled=move || !editable()
                                            prop:value={
                                                let sku = sku_input.clone();
                                                move || return_qty_of(&sku).0.to_string()
                                            }
                                            on:input=move |ev| {
                                                vm.set_return_qty(&sku_input, &event_target_value(&ev))
                                            }
                                        />
                                    </TableCell>
                                    <TableCell>{move || money(return_qty_of(&sku_amount).1)}</TableCell>
                                </TableRow>
                            }
                        }
                    </For>
                </TableBody>
            </Table>

            <Flex justify=FlexJustify::End gap=FlexGap::Large class="totals">
                <span>"Итого к возврату: " {move || vm.state.with(|s| s.total_return_qty())}</span>
                <span>"Сумма: " {move || money(vm.state.with(|s| s.total_return_amount()))}</span>
            </Flex>

            <Flex gap=FlexGap::Large align=FlexAlign::End class="shipping-form">
                <Field label="Дата возврата">
                    <input
                        type="text"
                        class="form-input"
                        placeholder="ГГГГ-ММ-ДД или ДД.ММ.ГГГГ"
                        prop:disabled=move || !editable()
                        prop:value=move || vm.form.with(|f| f.return_date.clone())
                        on:input=move |ev| vm.form.update(|f| f.return_date = event_target_value(&ev))
                    />
                </Field>
                <Field label="Склад">
                    <input
                        type="text"
                        class="form-input"
                        prop:disabled=move || !editable()
                        prop:value=move || vm.form.with(|f| f.warehouse_code.clone())
                        on:input=move |ev| vm.form.update(|f| f.warehouse_code = event_target_value(&ev))
                    />
                </Field>
                <Field label="Трек-номер">
                    <input
                        type="text"
                        class="form-input"
                        prop:disabled=move || !editable()
                        prop:value=move || vm.form.with(|f| f.tracking_no.clone())
                        on:input=move |ev| vm.form.update(|f| f.tracking_no = event_target_value(&ev))
                    />
                </Field>
                <Field label="Комментарий">
                    <input
                        type="text"
                        class="form-input"
                        prop:disabled=move || !editable()
                        prop:value=move || vm.form.with(|f| f.note.clone())
                        on:input=move |ev| vm.form.update(|f| f.note = event_target_value(&ev))
                    />
                </Field>
            </Flex>

            {move || {
                if vm.state.with(|s| s.is_created()) {
                    view! {
                        <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Success>
                            "Возврат создан"
                        </Badge>
                    }
                        .into_any()
                } else {
                    view! {
                        <Button
                            appearance=ButtonAppearance::Primary
                            loading=move || vm.loading()
                            disabled=move || vm.loading() || vm.state.with(|s| s.total_return_qty() == 0)
                            on_click=move |_| vm.create()
                        >
                            "Создать возврат"
                        </Button>
                    }
                        .into_any()
                }
            }}
        </div>
    }
}

#[component]
pub fn SrPanel(vm: ReturnWorkflowVm) -> impl IntoView {
    let reference = move || vm.state.with(|s| s.reference_no().map(str::to_string));

    view! {
        <div class="workflow-panel">
            <div class="info-grid">
                <Info
                    label="Заказ"
                    value=Signal::derive(move || vm.state.with(|s| s.order_no().unwrap_or_default().to_string()))
                />
                <Info
                    label="Кредит-нота"
                    value=Signal::derive(move || {
                        if vm.state.with(|s| s.is_cn_created) { "создана" } else { "нет" }.to_string()
                    })
                />
            </div>

            {move || match reference() {
                None => {
                    view! {
                        <Button
                            appearance=ButtonAppearance::Primary
                            loading=move || vm.loading()
                            disabled=move || vm.loading()
                            on_click=move |_| vm.generate_reference()
                        >
                            "Сгенерировать SR"
                        </Button>
                    }
                        .into_any()
                }
                Some(reference_no) => {
                    view! {
                        <Flex gap=FlexGap::Large align=FlexAlign::End>
                            <Info label="Номер SR" value=Signal::derive(move || reference_no.clone()) />
                            {move || {
                                vm.state
                                    .with(|s| s.is_edited)
                                    .then(|| {
                                        view! {
                                            <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Warning>
                                                "изменён"
                                            </Badge>
                                        }
                                    })
                            }}
                            <Field label="Новый номер SR">
                                <input
                                    type="text"
                                    class="form-input"
                                    prop:value=move || vm.reference_input.get()
                                    on:input=move |ev| vm.reference_input.set(event_target_value(&ev))
                                />
                            </Field>
                            <Button
                                appearance=ButtonAppearance::Secondary
                                loading=move || vm.loading()
                                disabled=move || vm.loading()
                                on_click=move |_| vm.update_reference()
                            >
                                "Изменить SR"
                            </Button>
                        </Flex>
                    }
                        .into_any()
                }
            }}
        </div>
    }
}

#[component]
pub fn PreviewPanel(vm: ReturnWorkflowVm) -> impl IntoView {
    let session = use_session();
    let text = move |f: fn(&crate::domain::a025_return_order::workflow::WorkflowState) -> String| {
        Signal::derive(move || vm.state.with(f))
    };
    let return_date = Signal::derive(move || {
        vm.form.with(|f| {
            parse_user_date(&f.return_date)
                .map(format_date)
                .unwrap_or_else(|| f.return_date.clone())
        })
    });
    let expected = Signal::derive(move || {
        vm.expected_status(&session.get())
            .map(|pair| {
                format!(
                    "{} / {}",
                    pair.return_status.display_name(),
                    pair.confirm_status.display_name()
                )
            })
            .unwrap_or_else(|| "роль не может подтверждать возврат".to_string())
    });

    view! {
        <div class="workflow-panel">
            <div class="info-grid">
                <Info label="Заказ" value=text(|s| s.order_no().unwrap_or_default().to_string()) />
                <Info label="Номер SR" value=text(|s| s.reference_no().unwrap_or_default().to_string()) />
                <Info
                    label="SO"
                    value=text(|s| s.order_head.as_ref().map(|h| h.so_no.clone()).unwrap_or_default())
                />
                <Info label="Позиций" value=text(|s| {
                    s.return_order.as_ref().map(|o| o.items.len()).unwrap_or(0).to_string()
                }) />
                <Info label="Количество" value=text(|s| s.total_return_qty().to_string()) />
                <Info label="Сумма" value=text(|s| money(s.total_return_amount())) />
                <Info label="Дата возврата" value=return_date />
                <Info
                    label="Склад"
                    value=Signal::derive(move || vm.form.with(|f| f.warehouse_code.trim().to_uppercase()))
                />
                <Info label="Статус после подтверждения" value=expected />
            </div>

            <Button
                appearance=ButtonAppearance::Primary
                loading=move || vm.loading()
                disabled=move || vm.loading()
                on_click=move |_| vm.confirm(session.get_untracked())
            >
                "Подтвердить"
            </Button>
        </div>
    }
}

#[component]
pub fn ConfirmPanel(vm: ReturnWorkflowVm) -> impl IntoView {
    view! {
        <div class="workflow-panel">
            {move || {
                vm.state
                    .with(|s| s.confirmation.clone().map(|c| (c, s.reference_no().map(str::to_string))))
                    .map(|(confirmation, reference_no)| {
                        view! {
                            <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Success>
                                "Возврат подтверждён"
                            </Badge>
                            <div class="info-grid">
                                <Info label="Номер SR" value=reference_no.unwrap_or_default() />
                                <Info
                                    label="Статус возврата"
                                    value=confirmation.status.return_status.display_name().to_string()
                                />
                                <Info
                                    label="Статус подтверждения"
                                    value=confirmation.status.confirm_status.display_name().to_string()
                                />
                                <Info label="Подтвердил" value=confirmation.confirmed_by.clone() />
                                <Info label="Дата" value=format_datetime(&confirmation.confirmed_at) />
                            </div>
                        }
                    })
            }}
            <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.cancel()>
                "Новый возврат"
            </Button>
        </div>
    }
}
