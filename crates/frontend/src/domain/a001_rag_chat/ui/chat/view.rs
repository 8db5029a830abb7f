//! RAG Chat - View Component

use super::model::{fetch_health, HttpBackend};
use super::session::{sources_caption, RagBackend, THINKING_TEXT};
use super::view_model::{health_caption, RagChatVm};
use leptos::prelude::*;
use thaw::*;

const TITLE: &str = "Sistema RAG - RRHH";
const PLACEHOLDER: &str = "Escribe tu pregunta...";

/// Blocking browser notice
fn show_notice(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.alert_with_message(message) {
            log::warn!("alert failed: {:?}", e);
        }
    }
}

#[component]
#[allow(non_snake_case)]
pub fn RagChat() -> impl IntoView {
    let vm = RagChatVm::new();
    let messages_container_ref = NodeRef::<leptos::html::Div>::new();
    let file_input_ref = NodeRef::<leptos::html::Input>::new();

    // Scroll to bottom helper
    let scroll_to_bottom = move || {
        if let Some(container) = messages_container_ref.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    };

    // Follow new entries and the thinking indicator
    Effect::new(move |_| {
        vm.session.with(|s| (s.transcript().len(), s.is_loading()));
        scroll_to_bottom();
    });

    // Probe backend health once
    Effect::new(move |_| {
        wasm_bindgen_futures::spawn_local(async move {
            let probe = fetch_health().await;
            if let Err(e) = &probe {
                log::warn!("Health probe failed: {}", e);
            }
            vm.health.set(Some(probe));
        });
    });

    let handle_upload = Callback::new(move |_: ()| {
        let Some(files) = vm.session.try_update(|s| s.begin_upload()).flatten() else {
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            let result = HttpBackend.upload(&files).await;
            let Some(notice) = vm.session.try_update(|s| s.finish_upload(result)) else {
                return;
            };
            if vm.session.with(|s| s.pending_upload().is_empty()) {
                if let Some(input) = file_input_ref.get_untracked() {
                    input.set_value("");
                }
            }
            show_notice(&notice.message());
        });
    });

    let handle_send = Callback::new(move |_: ()| {
        let Some(request) = vm.session.try_update(|s| s.begin_send()).flatten() else {
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            let result = HttpBackend.query(&request).await;
            vm.session.update(|s| s.finish_send(result));
        });
    });

    let upload_disabled = Signal::derive(move || !vm.session.with(|s| s.can_upload()));
    let send_disabled = Signal::derive(move || !vm.session.with(|s| s.can_send()));

    view! {
        <div style="max-width: 860px; height: 100vh; margin: 0 auto; display: flex; flex-direction: column; padding: 20px; box-sizing: border-box;">
            // Header
            <Flex
                justify=FlexJustify::SpaceBetween
                align=FlexAlign::Center
                style="margin-bottom: 16px; padding-bottom: 12px; border-bottom: 1px solid var(--colorNeutralStroke2);"
            >
                <h1 style="font-size: 22px; font-weight: bold; margin: 0;">{TITLE}</h1>
                <span style="color: var(--colorNeutralForeground3); font-size: 13px;">
                    {move || vm.health.with(health_caption)}
                </span>
            </Flex>

            // Upload area
            <Flex align=FlexAlign::Center style="gap: 8px; margin-bottom: 16px;">
                <input
                    type="file"
                    multiple=true
                    node_ref=file_input_ref
                    on:change=move |ev| {
                        let input: web_sys::HtmlInputElement = event_target(&ev);
                        let files: Vec<web_sys::File> = input
                            .files()
                            .map(|list| (0..list.length()).filter_map(|i| list.get(i)).collect())
                            .unwrap_or_default();
                        vm.session.update(|s| s.select_files(files));
                    }
                />
                <Button
                    appearance=ButtonAppearance::Secondary
                    disabled=upload_disabled
                    on_click=move |_| handle_upload.run(())
                >
                    "Subir Archivos"
                </Button>
            </Flex>

            // Messages area
            <div
                node_ref=messages_container_ref
                style="flex: 1; overflow-y: auto; display: flex; flex-direction: column; gap: 12px; margin-bottom: 16px; padding: 12px; background: var(--colorNeutralBackground1); border: 1px solid var(--colorNeutralStroke2); border-radius: 8px;"
            >
                <For
                    each=move || vm.session.with(|s| s.transcript().to_vec())
                    key=|msg| msg.id.to_string()
                    let:msg
                >
                    {{
                        let is_user = msg.is_user();
                        let caption = sources_caption(&msg);
                        view! {
                            <div
                                class=format!("message {}", msg.role.as_str())
                                style=if is_user {
                                    "align-self: flex-end; max-width: 70%;"
                                } else {
                                    "align-self: flex-start; max-width: 70%;"
                                }
                            >
                                <div
                                    style=if is_user {
                                        "background: var(--colorBrandBackground2); padding: 10px 14px; border-radius: 12px;"
                                    } else {
                                        "background: var(--colorNeutralBackground2); padding: 10px 14px; border-radius: 12px;"
                                    }
                                >
                                    <div class="message-content" style="white-space: pre-wrap;">
                                        {msg.content.clone()}
                                    </div>
                                    {caption.map(|text| {
                                        view! {
                                            <div class="sources" style="font-size: 11px; opacity: 0.7; margin-top: 6px;">
                                                <small>{text}</small>
                                            </div>
                                        }
                                    })}
                                </div>
                            </div>
                        }
                    }}
                </For>
                {move || {
                    vm.is_loading()
                        .then(|| {
                            view! {
                                <div
                                    class="message assistant"
                                    style="align-self: flex-start; padding: 10px 14px; border-radius: 12px; background: var(--colorNeutralBackground2); font-style: italic; opacity: 0.8;"
                                >
                                    {THINKING_TEXT}
                                </div>
                            }
                        })
                }}
            </div>

            // Input area
            <Flex style="gap: 8px; align-items: center;">
                <input
                    type="text"
                    style="flex: 1; padding: 8px 12px; border: 1px solid var(--colorNeutralStroke1); border-radius: 6px;"
                    placeholder=PLACEHOLDER
                    prop:value=move || vm.session.with(|s| s.draft().to_string())
                    disabled=move || vm.is_loading()
                    on:input=move |ev| {
                        let text = event_target_value(&ev);
                        vm.session.update(|s| s.set_draft(text));
                    }
                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                        if ev.key() == "Enter" {
                            ev.prevent_default();
                            handle_send.run(());
                        }
                    }
                />
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=send_disabled
                    on_click=move |_| handle_send.run(())
                >
                    "Enviar"
                </Button>
            </Flex>
        </div>
    }
}
