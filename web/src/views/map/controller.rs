use shared_types::{EarthquakeFeatureCollection, MapBounds};

use super::{
    popup::{PopupContent, PopupState},
    surface::{MapSurface, SurfaceEvent, SurfacePhase},
    visibility::{LayerName, LayerVisibility},
};
use crate::usgs::FetchError;

/// Tile template and attribution for a raster overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSource {
    pub url_template: String,
    pub attribution: String,
}

/// A catalog query the caller should run for `bounds`, tagged with the
/// generation to hand back to [`SyncController::apply_fetch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest {
    pub generation: u64,
    pub bounds: MapBounds,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Displayed data replaced; carries the new feature count.
    Applied(usize),
    /// A newer request was issued after this one.
    Stale,
    Failed(FetchError),
    /// The surface is gone.
    Ignored,
}

/// Keeps a map surface in line with the visibility store and the catalog.
pub struct SyncController<S: MapSurface> {
    surface: S,
    phase: SurfacePhase,
    outdoors: RasterSource,
    visibility: LayerVisibility,
    displayed: EarthquakeFeatureCollection,
    popup: PopupState,
    issued: u64,
}

impl<S: MapSurface> SyncController<S> {
    pub fn new(surface: S, outdoors: RasterSource) -> Self {
        Self {
            surface,
            phase: SurfacePhase::Loading,
            outdoors,
            visibility: LayerVisibility::default(),
            displayed: EarthquakeFeatureCollection::default(),
            popup: PopupState::Closed,
            issued: 0,
        }
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    pub fn popup(&self) -> PopupState {
        self.popup
    }

    pub fn displayed(&self) -> &EarthquakeFeatureCollection {
        &self.displayed
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn handle_event(&mut self, event: SurfaceEvent) -> Option<FetchRequest> {
        match event {
            SurfaceEvent::Load => self.on_load(),
            SurfaceEvent::MoveEnd => self.on_move_end(),
            SurfaceEvent::FeatureClick {
                layer_id,
                feature_id,
            } => {
                self.on_feature_click(&layer_id, &feature_id);
                None
            }
            SurfaceEvent::FeatureHoverEnter { layer_id } => {
                self.on_feature_hover(&layer_id, true);
                None
            }
            SurfaceEvent::FeatureHoverLeave { layer_id } => {
                self.on_feature_hover(&layer_id, false);
                None
            }
        }
    }

    /// Registers both overlays hidden, applies the current toggles and asks for
    /// the first fetch. Only the first call does anything.
    pub fn on_load(&mut self) -> Option<FetchRequest> {
        if self.phase != SurfacePhase::Loading {
            return None;
        }

        let outdoors = LayerName::Outdoors.id();
        let earthquakes = LayerName::Earthquakes.id();
        self.surface.register_raster_layer(
            outdoors,
            &self.outdoors.url_template,
            &self.outdoors.attribution,
        );
        self.surface.register_point_layer(earthquakes, &self.displayed);
        self.surface.set_layer_visible(outdoors, false);
        self.surface.set_layer_visible(earthquakes, false);

        self.phase = SurfacePhase::Ready;
        self.push_visibility();

        Some(self.issue_fetch())
    }

    pub fn on_move_end(&mut self) -> Option<FetchRequest> {
        if self.phase != SurfacePhase::Ready {
            return None;
        }
        Some(self.issue_fetch())
    }

    /// Only the most recently issued request may replace the displayed data.
    /// Failures keep whatever is on screen.
    pub fn apply_fetch(
        &mut self,
        generation: u64,
        result: Result<EarthquakeFeatureCollection, FetchError>,
    ) -> FetchOutcome {
        if self.phase != SurfacePhase::Ready {
            return FetchOutcome::Ignored;
        }
        if generation != self.issued {
            return FetchOutcome::Stale;
        }

        match result {
            Ok(collection) => {
                self.surface
                    .replace_source_data(LayerName::Earthquakes.id(), &collection);
                self.displayed = collection;
                FetchOutcome::Applied(self.displayed.len())
            }
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    /// Records the toggles; they reach the surface once it is ready.
    pub fn set_visibility(&mut self, visibility: LayerVisibility) {
        self.visibility = visibility;
        if self.phase == SurfacePhase::Ready {
            self.push_visibility();
        }
    }

    pub fn on_feature_click(&mut self, layer_id: &str, feature_id: &str) -> bool {
        if self.phase != SurfacePhase::Ready || layer_id != LayerName::Earthquakes.id() {
            return false;
        }
        let Some(feature) = self.displayed.find(feature_id) else {
            return false;
        };
        let position = feature.position();
        let content = PopupContent::for_feature(feature);

        self.close_popup();
        self.surface.fly_to(position);
        self.surface.show_popup(position, &content);
        self.popup = PopupState::OpenAt(position);
        true
    }

    pub fn on_feature_hover(&mut self, layer_id: &str, entered: bool) {
        if self.phase == SurfacePhase::Ready && layer_id == LayerName::Earthquakes.id() {
            self.surface.set_pointer_cursor(entered);
        }
    }

    /// Tears the surface down. Returns `false` if it already was.
    pub fn dispose(&mut self) -> bool {
        if self.phase == SurfacePhase::Disposed {
            return false;
        }
        self.close_popup();
        self.surface.dispose();
        self.phase = SurfacePhase::Disposed;
        true
    }

    fn close_popup(&mut self) {
        if let PopupState::OpenAt(_) = self.popup {
            self.surface.close_popup();
            self.popup = PopupState::Closed;
        }
    }

    fn push_visibility(&mut self) {
        for (layer, visible) in self.visibility.iter() {
            self.surface.set_layer_visible(layer.id(), visible);
        }
    }

    fn issue_fetch(&mut self) -> FetchRequest {
        self.issued += 1;
        FetchRequest {
            generation: self.issued,
            bounds: self.surface.viewport_bounds(),
        }
    }
}

// A controller dropped without an explicit dispose still releases its surface.
impl<S: MapSurface> Drop for SyncController<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
