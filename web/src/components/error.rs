use leptos::prelude::*;
use thaw::{MessageBar, MessageBarBody, MessageBarIntent, MessageBarTitle};

#[component]
pub fn ErrorView(message: Option<String>) -> impl IntoView {
    view! {
        <div class="error-container">
            <MessageBar intent=MessageBarIntent::Error>
                <MessageBarBody>
                    <MessageBarTitle>"Map unavailable"</MessageBarTitle>
                    {message.unwrap_or_else(|| "Something went wrong while loading the map.".to_string())}
                </MessageBarBody>
            </MessageBar>
        </div>
    }
}
