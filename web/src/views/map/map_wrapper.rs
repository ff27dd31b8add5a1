use leptos::prelude::*;

use crate::{
    components::{error::ErrorView, loading::LoadingView},
    server::get_map_settings,
    views::map::{map_renderer::MapRenderer, sidebar::LayerSidebar, visibility::LayerVisibility},
};

#[component]
pub fn EarthquakeExplorer() -> impl IntoView {
    let visibility = RwSignal::new(LayerVisibility::default());
    let displayed_count = RwSignal::new(0usize);

    let settings = Resource::new(|| (), |_| async move { get_map_settings().await });

    view! {
        <div class="explore-container">
            <div class="explore-header">
                <div class="header-content">
                    <h1>"Earthquakes"</h1>
                </div>
            </div>

            <div class="explore-content">
                <LayerSidebar visibility=visibility displayed_count=displayed_count />

                <div class="explore-map-wrapper">
                    <Suspense fallback=move || view! {
                        <LoadingView message=Some("Loading map settings...".to_string()) />
                    }>
                        {move ||
                            match settings.get() {
                                Some(Ok(settings)) => view! {
                                    <MapRenderer
                                        settings=settings
                                        visibility=visibility
                                        displayed_count=displayed_count
                                    />
                                }.into_any(),
                                Some(Err(err)) => {
                                    leptos::logging::warn!("Map settings unavailable: {}", err);
                                    view! {
                                        <ErrorView message=Some("The map is not configured.".to_string()) />
                                    }.into_any()
                                },
                                None => view! {
                                    <LoadingView message=Some("Loading map settings...".to_string()) />
                                }.into_any(),
                            }
                        }
                    </Suspense>
                </div>
            </div>
        </div>
    }
}
