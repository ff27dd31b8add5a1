pub mod controller;
#[cfg(feature = "hydrate")]
pub mod leaflet_surface;
pub mod map_renderer;
pub mod map_wrapper;
pub mod popup;
pub mod session;
pub mod sidebar;
pub mod surface;
pub mod visibility;
