use leptos::prelude::*;
use shared_types::MapSettings;

use super::{surface::SurfacePhase, visibility::LayerVisibility};
use crate::components::loading::LoadingView;

#[cfg(feature = "hydrate")]
use {
    super::{
        controller::{FetchOutcome, FetchRequest, RasterSource, SyncController},
        leaflet_surface::LeafletSurface,
        session::MapSession,
        surface::{SurfaceEvent, DEFAULT_CENTER, DEFAULT_ZOOM},
    },
    crate::{server::fetch_earthquakes, usgs::FetchError},
    leptos::task::spawn_local,
    std::rc::{Rc, Weak},
};

pub const MAP_CONTAINER_ID: &str = "quake-map";

#[component]
pub fn MapRenderer(
    settings: MapSettings,
    visibility: RwSignal<LayerVisibility>,
    displayed_count: RwSignal<usize>,
) -> impl IntoView {
    let phase = RwSignal::new(SurfacePhase::Uninitialized);

    #[cfg(feature = "hydrate")]
    {
        let session = StoredValue::new_local(None::<Rc<MapSession<LeafletSurface>>>);

        // Mount once the container div is in the DOM
        Effect::new(move |_| {
            if session.with_value(|s| s.is_some()) {
                return;
            }
            let mounted = mount_session(
                &settings,
                visibility.get_untracked(),
                phase,
                displayed_count,
            );
            session.set_value(Some(mounted));
        });

        Effect::new(move |_| {
            let current = visibility.get();
            session.with_value(|s| {
                if let Some(s) = s {
                    s.with_controller(|controller| controller.set_visibility(current));
                    run_requests(s, s.flush(), phase, displayed_count);
                }
            });
        });

        on_cleanup(move || {
            let _ = session.try_update_value(|s| {
                if let Some(s) = s.take() {
                    if s.dispose() {
                        leptos::logging::log!("Map surface disposed");
                    }
                }
            });
        });
    }

    #[cfg(not(feature = "hydrate"))]
    let _ = (settings, visibility, displayed_count);

    view! {
        <div class="map-renderer-container">
            <div id=MAP_CONTAINER_ID class="map-renderer-map-container"></div>
            <Show when=move || phase.get() != SurfacePhase::Ready>
                <div class="map-renderer-loading-container">
                    <LoadingView message=Some("Initializing map...".to_string()) />
                </div>
            </Show>
        </div>
    }
}

#[cfg(feature = "hydrate")]
fn mount_session(
    settings: &MapSettings,
    visibility: LayerVisibility,
    phase: RwSignal<SurfacePhase>,
    displayed_count: RwSignal<usize>,
) -> Rc<MapSession<LeafletSurface>> {
    let session = Rc::new(MapSession::new());

    let weak = Rc::downgrade(&session);
    let emit: Rc<dyn Fn(SurfaceEvent)> = Rc::new(move |event| {
        let Some(session) = weak.upgrade() else {
            return;
        };
        let requests = session.dispatch(event);
        run_requests(&session, requests, phase, displayed_count);
    });

    phase.set(SurfacePhase::Loading);
    let surface = LeafletSurface::mount(
        MAP_CONTAINER_ID,
        DEFAULT_CENTER,
        DEFAULT_ZOOM,
        &settings.base_tile_url,
        &settings.base_attribution,
        emit,
    );

    let mut controller = SyncController::new(
        surface,
        RasterSource {
            url_template: settings.outdoors_tile_url.clone(),
            attribution: settings.outdoors_attribution.clone(),
        },
    );
    controller.set_visibility(visibility);

    let requests = session.install(controller);
    run_requests(&session, requests, phase, displayed_count);
    session
}

#[cfg(feature = "hydrate")]
fn run_requests(
    session: &Rc<MapSession<LeafletSurface>>,
    requests: Vec<FetchRequest>,
    phase: RwSignal<SurfacePhase>,
    displayed_count: RwSignal<usize>,
) {
    if let Some(current) = session.with_controller(|controller| controller.phase()) {
        if phase.get_untracked() != current {
            phase.set(current);
        }
    }
    for request in requests {
        spawn_fetch(Rc::downgrade(session), request, displayed_count);
    }
}

#[cfg(feature = "hydrate")]
fn spawn_fetch(
    session: Weak<MapSession<LeafletSurface>>,
    request: FetchRequest,
    displayed_count: RwSignal<usize>,
) {
    leptos::logging::log!(
        "Fetching earthquakes #{} for bounds: NE({}, {}), SW({}, {})",
        request.generation,
        request.bounds.north_east.lat,
        request.bounds.north_east.long,
        request.bounds.south_west.lat,
        request.bounds.south_west.long
    );

    spawn_local(async move {
        let result = fetch_earthquakes(request.bounds)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()));

        let Some(session) = session.upgrade() else {
            leptos::logging::log!("Map unmounted, dropping earthquake response");
            return;
        };

        match session.with_controller(|controller| controller.apply_fetch(request.generation, result)) {
            Some(FetchOutcome::Applied(count)) => {
                leptos::logging::log!("Rendering {} earthquakes", count);
                displayed_count.set(count);
            }
            Some(FetchOutcome::Stale) => {
                leptos::logging::log!("Dropping stale earthquake response #{}", request.generation);
            }
            Some(FetchOutcome::Failed(err)) => {
                leptos::logging::warn!("Earthquake fetch failed, keeping current data: {}", err);
            }
            Some(FetchOutcome::Ignored) | None => {
                leptos::logging::log!("Map not ready, ignoring earthquake response");
            }
        }
    });
}
