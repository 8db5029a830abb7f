use crate::domain::a001_rag_chat::ui::chat::RagChat;
use leptos::prelude::*;
use thaw::ConfigProvider;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <ConfigProvider>
            <RagChat />
        </ConfigProvider>
    }
}
