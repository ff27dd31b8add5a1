use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use leptos::logging::warn;
use leptos_leaflet::leaflet::{
    CircleMarker, CircleOptions, Evented, FeatureGroup, LatLng, Layer, Map, MapOptions, Popup,
    PopupOptions, TileLayer, TileLayerOptions,
};
use shared_types::{EarthquakeFeature, EarthquakeFeatureCollection, LatLong, MapBounds};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::popup::PopupContent;
use super::surface::{marker_color, marker_radius, MapSurface, SurfaceEvent};

type EventSink = Rc<dyn Fn(SurfaceEvent)>;

struct Listener {
    target: Evented,
    kind: &'static str,
    callback: Closure<dyn FnMut(JsValue)>,
}

/// [`MapSurface`] backed by a Leaflet map living in the DOM element `container_id`.
pub struct LeafletSurface {
    map: Map,
    emit: EventSink,
    raster_layers: HashMap<String, TileLayer>,
    point_layers: HashMap<String, FeatureGroup>,
    popup: Option<Popup>,
    listeners: Vec<Listener>,
    disposed: bool,
}

impl LeafletSurface {
    /// Creates the map with a base tile layer and starts listening for
    /// `load`/`moveend`. Setting the view fires `load` right away.
    pub fn mount(
        container_id: &str,
        center: LatLong,
        zoom: f64,
        base_tile_url: &str,
        base_attribution: &str,
        emit: EventSink,
    ) -> Self {
        let map = Map::new(container_id, &MapOptions::default());

        let mut surface = Self {
            map,
            emit,
            raster_layers: HashMap::new(),
            point_layers: HashMap::new(),
            popup: None,
            listeners: Vec::new(),
            disposed: false,
        };

        let base = tile_layer(base_tile_url, base_attribution);
        surface.map.add_layer(base.unchecked_ref::<Layer>());

        let target: Evented = surface.map.clone().unchecked_into();
        surface.listen(&target, "load", |_| SurfaceEvent::Load);
        surface.listen(&target, "moveend", |_| SurfaceEvent::MoveEnd);

        surface
            .map
            .set_view(&LatLng::new(center.lat, center.long), zoom);
        surface
    }

    fn listen(
        &mut self,
        target: &Evented,
        kind: &'static str,
        to_event: impl Fn(&JsValue) -> SurfaceEvent + 'static,
    ) {
        let emit = self.emit.clone();
        let callback = Closure::wrap(Box::new(move |event: JsValue| {
            emit(to_event(&event));
        }) as Box<dyn FnMut(JsValue)>);
        target.on(kind, callback.as_ref().unchecked_ref());
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
    }

    fn layer(&self, id: &str) -> Option<&Layer> {
        self.raster_layers
            .get(id)
            .map(|layer| layer.unchecked_ref::<Layer>())
            .or_else(|| {
                self.point_layers
                    .get(id)
                    .map(|layer| layer.unchecked_ref::<Layer>())
            })
    }

    fn fill_point_layer(group: &FeatureGroup, data: &EarthquakeFeatureCollection) {
        for feature in &data.features {
            group.add_layer(quake_marker(feature).unchecked_ref::<Layer>());
        }
    }
}

impl MapSurface for LeafletSurface {
    fn register_raster_layer(&mut self, id: &str, tile_url_template: &str, attribution: &str) {
        let layer = tile_layer(tile_url_template, attribution);
        self.raster_layers.insert(id.to_string(), layer);
    }

    fn register_point_layer(&mut self, id: &str, initial_data: &EarthquakeFeatureCollection) {
        let group = FeatureGroup::new();
        Self::fill_point_layer(&group, initial_data);

        // Marker events propagate to the group, so three listeners cover every point
        let layer_id = id.to_string();
        let target: Evented = group.clone().unchecked_into();
        {
            let layer_id = layer_id.clone();
            self.listen(&target, "click", move |event| SurfaceEvent::FeatureClick {
                layer_id: layer_id.clone(),
                feature_id: clicked_feature_id(event).unwrap_or_default(),
            });
        }
        {
            let layer_id = layer_id.clone();
            self.listen(&target, "mouseover", move |_| SurfaceEvent::FeatureHoverEnter {
                layer_id: layer_id.clone(),
            });
        }
        self.listen(&target, "mouseout", move |_| SurfaceEvent::FeatureHoverLeave {
            layer_id: layer_id.clone(),
        });

        self.point_layers.insert(id.to_string(), group);
    }

    fn replace_source_data(&mut self, source_id: &str, data: &EarthquakeFeatureCollection) {
        if let Some(group) = self.point_layers.get(source_id) {
            group.clear_layers();
            Self::fill_point_layer(group, data);
        }
    }

    fn set_layer_visible(&mut self, layer_id: &str, visible: bool) {
        let Some(layer) = self.layer(layer_id) else {
            warn!("No layer registered as {}", layer_id);
            return;
        };
        let shown = self.map.has_layer(layer);
        if visible && !shown {
            self.map.add_layer(layer);
        } else if !visible && shown {
            self.map.remove_layer(layer);
        }
    }

    fn viewport_bounds(&self) -> MapBounds {
        let bounds = self.map.get_bounds();
        let ne = bounds.get_north_east();
        let sw = bounds.get_south_west();
        MapBounds::new(
            LatLong {
                lat: sw.lat(),
                long: sw.lng(),
            },
            LatLong {
                lat: ne.lat(),
                long: ne.lng(),
            },
        )
    }

    fn fly_to(&mut self, coordinates: LatLong) {
        let zoom = self.map.get_zoom();
        self.map
            .fly_to(&LatLng::new(coordinates.lat, coordinates.long), zoom);
    }

    fn show_popup(&mut self, coordinates: LatLong, content: &PopupContent) {
        let body = match popup_body(content) {
            Ok(body) => body,
            Err(err) => {
                warn!("Could not build popup content: {:?}", err);
                return;
            }
        };
        let popup = Popup::new(&PopupOptions::default(), None);
        popup.set_lat_lng(&LatLng::new(coordinates.lat, coordinates.long));
        popup.set_content(&body);
        popup.open_on(&self.map);
        self.popup = Some(popup);
    }

    fn close_popup(&mut self) {
        if let Some(popup) = self.popup.take() {
            popup.remove();
        }
    }

    fn set_pointer_cursor(&mut self, pointer: bool) {
        let cursor = if pointer { "pointer" } else { "" };
        if let Err(err) = self
            .map
            .get_container()
            .style()
            .set_property("cursor", cursor)
        {
            warn!("Could not set map cursor: {:?}", err);
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.close_popup();
        for listener in self.listeners.drain(..) {
            listener
                .target
                .off(listener.kind, listener.callback.as_ref().unchecked_ref());
        }
        self.raster_layers.clear();
        self.point_layers.clear();
        self.map.remove();
        self.disposed = true;
    }
}

fn tile_layer(url_template: &str, attribution: &str) -> TileLayer {
    let options = TileLayerOptions::default();
    options.set_attribution(attribution.to_string());
    options.set_max_zoom(18.0);
    TileLayer::new_options(url_template, &options)
}

fn quake_marker(feature: &EarthquakeFeature) -> CircleMarker {
    let options = CircleOptions::default();
    options.set_radius(marker_radius(feature.magnitude));
    options.set_color("#ffffff".to_string());
    options.set_weight(1.0);
    options.set_fill_color(marker_color(feature.magnitude).to_string());
    options.set_fill_opacity(0.8);

    let position = feature.position();
    let marker = CircleMarker::new_with_options(&LatLng::new(position.lat, position.long), &options);

    // Same shape Leaflet's GeoJSON layer gives its markers: `layer.feature.id`
    let tag = Object::new();
    let tagged = Reflect::set(&tag, &"id".into(), &JsValue::from_str(&feature.id))
        .and_then(|_| Reflect::set(&marker, &"feature".into(), &tag));
    if let Err(err) = tagged {
        warn!("Could not tag marker {}: {:?}", feature.id, err);
    }
    marker
}

/// Builds the popup from text nodes so catalogue strings are never parsed as HTML.
fn popup_body(content: &PopupContent) -> Result<JsValue, JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let body = document.create_element("div")?;
    body.set_class_name("quake-popup");
    for (class, label, text) in content.rows() {
        let row = document.create_element("p")?;
        row.set_class_name(class);
        if let Some(label) = label {
            let strong = document.create_element("strong")?;
            strong.set_text_content(Some(label));
            row.append_child(&strong)?;
            row.append_child(&document.create_text_node(&format!(" {}", text)))?;
        } else {
            row.set_text_content(Some(text));
        }
        body.append_child(&row)?;
    }
    Ok(body.into())
}

/// Marker events reach the group with the marker as `propagatedFrom`.
fn clicked_feature_id(event: &JsValue) -> Option<String> {
    ["propagatedFrom", "layer"].iter().find_map(|key| {
        let layer = Reflect::get(event, &JsValue::from_str(key)).ok()?;
        let feature = Reflect::get(&layer, &"feature".into()).ok()?;
        Reflect::get(&feature, &"id".into()).ok()?.as_string()
    })
}
