use std::cell::RefCell;
use std::collections::VecDeque;

use super::{
    controller::{FetchRequest, SyncController},
    surface::{MapSurface, SurfaceEvent},
};

/// Owns the controller of one mounted map and serializes surface events into it.
///
/// Leaflet fires some events synchronously from inside calls the controller is
/// making (`load` during `setView`, for one), so events are queued and drained
/// only while nobody else holds the controller.
pub struct MapSession<S: MapSurface> {
    controller: RefCell<Option<SyncController<S>>>,
    pending: RefCell<VecDeque<SurfaceEvent>>,
}

impl<S: MapSurface> Default for MapSession<S> {
    fn default() -> Self {
        Self {
            controller: RefCell::new(None),
            pending: RefCell::new(VecDeque::new()),
        }
    }
}

impl<S: MapSurface> MapSession<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands over the controller and replays anything that arrived first.
    pub fn install(&self, controller: SyncController<S>) -> Vec<FetchRequest> {
        *self.controller.borrow_mut() = Some(controller);
        self.drain()
    }

    /// Queues `event` and returns the fetches that handling it produced.
    pub fn dispatch(&self, event: SurfaceEvent) -> Vec<FetchRequest> {
        self.pending.borrow_mut().push_back(event);
        self.drain()
    }

    /// Handles events that were queued while the controller was busy elsewhere.
    pub fn flush(&self) -> Vec<FetchRequest> {
        self.drain()
    }

    /// Runs `f` against the controller, unless none is installed or it is busy.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut SyncController<S>) -> R) -> Option<R> {
        let mut guard = self.controller.try_borrow_mut().ok()?;
        let controller = guard.as_mut()?;
        Some(f(controller))
    }

    /// Disposes the surface; repeated calls return `false`.
    pub fn dispose(&self) -> bool {
        self.pending.borrow_mut().clear();
        self.with_controller(|controller| controller.dispose())
            .unwrap_or(false)
    }

    fn drain(&self) -> Vec<FetchRequest> {
        let mut requests = Vec::new();
        loop {
            let Ok(mut guard) = self.controller.try_borrow_mut() else {
                break;
            };
            let Some(controller) = guard.as_mut() else {
                break;
            };
            let Some(event) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            requests.extend(controller.handle_event(event));
        }
        requests
    }
}
