use leptos::prelude::*;

use super::visibility::{LayerName, LayerVisibility};

#[component]
pub fn LayerSidebar(
    visibility: RwSignal<LayerVisibility>,
    displayed_count: RwSignal<usize>,
) -> impl IntoView {
    view! {
        <div class="explore-sidebar">
            <div class="sidebar-header">
                <h2>"Layers"</h2>
            </div>

            <div class="sidebar-content">
                <div class="filter-section">
                    {LayerName::ALL.into_iter().map(|layer| {
                        view! {
                            <label class="layer-checkbox-label">
                                <input
                                    type="checkbox"
                                    class="layer-checkbox"
                                    on:change=move |_| visibility.update(|v| v.toggle(layer))
                                    checked=move || visibility.get().is_visible(layer)
                                />
                                <span class="layer-name">{layer.label()}</span>
                            </label>
                        }
                    }).collect_view()}
                </div>

                <p class="quake-count">
                    <span class="stat-number">{move || displayed_count.get()}</span>
                    " earthquakes in view (M2.5+, 2022)"
                </p>
            </div>
        </div>
    }
}
