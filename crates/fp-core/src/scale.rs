//! Scale engine: the single source of truth for meters ↔ pixels.
//!
//! The engine holds two inputs, the rendered width of the container (px)
//! and the width of the zone being shown (m), and derives one scale factor
//! (px per meter) from them. Every mutation of either input publishes the
//! recomputed factor to registered listeners before returning, so all
//! consumers see the same value before the next paint.
//!
//! Container width changes arrive through [`ContainerGeometry`], an
//! abstraction over whatever the host uses to watch its layout (a browser
//! `ResizeObserver`, a window resize event, or a manual trigger such as
//! [`ManualContainer`]). The observation is scoped to the engine: it is
//! acquired by [`ScaleEngine::initialize`], released by
//! [`ScaleEngine::teardown`], and re-initializing always releases the
//! previous observation first.
//!
//! `ScaleEngine` is a cheap, cloneable handle over single-threaded shared
//! state. Sharing is an explicit decision: clone the handle to hand the same
//! engine to several consumers, or construct one engine per canvas.

use crate::model::Zone;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Callback invoked with the container's new width in pixels.
pub type ResizeCallback = Box<dyn FnMut(f64)>;

type Listener = Box<dyn FnMut(f64)>;

// ─── Container geometry ───────────────────────────────────────────────────

/// A live container-geometry subscription.
pub trait ResizeObservation {
    /// Stop delivering notifications. Must be idempotent.
    fn disconnect(&mut self);
}

/// Something with a measurable width that can report width changes.
pub trait ContainerGeometry {
    /// Current rendered width in pixels.
    fn width(&self) -> f64;

    /// Start delivering width changes to `on_resize`.
    fn observe(&self, on_resize: ResizeCallback) -> Box<dyn ResizeObservation>;
}

/// Canvas size derived from the container width and the zone's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageDimensions {
    pub width: f64,
    pub height: f64,
}

// ─── Engine ───────────────────────────────────────────────────────────────

struct ScaleState {
    container_width: f64,
    zone_width: f64,
    revision: u64,
}

struct Shared {
    state: RefCell<ScaleState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    /// Listeners removed while a notification pass held them.
    cancelled: RefCell<Vec<u64>>,
    next_listener: Cell<u64>,
    observation: RefCell<Option<Box<dyn ResizeObservation>>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(mut observation) = self.observation.get_mut().take() {
            observation.disconnect();
        }
    }
}

/// Shared meters ↔ pixels converter. See the module docs.
#[derive(Clone)]
pub struct ScaleEngine {
    shared: Rc<Shared>,
}

/// Non-owning reference to a [`ScaleEngine`], for use inside listeners.
#[derive(Clone)]
pub struct WeakScaleEngine {
    shared: Weak<Shared>,
}

impl WeakScaleEngine {
    pub fn upgrade(&self) -> Option<ScaleEngine> {
        self.shared.upgrade().map(|shared| ScaleEngine { shared })
    }
}

impl Default for ScaleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScaleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("ScaleEngine")
            .field("container_width", &state.container_width)
            .field("zone_width", &state.zone_width)
            .field("revision", &state.revision)
            .finish()
    }
}

impl ScaleEngine {
    /// A fresh engine: zero container width, 1 m zone width.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(ScaleState {
                    container_width: 0.0,
                    zone_width: 1.0,
                    revision: 0,
                }),
                listeners: RefCell::new(Vec::new()),
                cancelled: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                observation: RefCell::new(None),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakScaleEngine {
        WeakScaleEngine {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Bind the engine to a container and a zone.
    ///
    /// Records the zone width as the denominator, measures the container's
    /// current width as the numerator, and starts observing the container.
    /// Any previous observation is released first.
    pub fn initialize(&self, container: &dyn ContainerGeometry, zone: &Zone) {
        self.teardown();

        let width = container.width();
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            let changed = state.zone_width != zone.width || state.container_width != width;
            state.zone_width = zone.width;
            state.container_width = width;
            changed
        };

        let weak = Rc::downgrade(&self.shared);
        let observation = container.observe(Box::new(move |new_width| {
            if let Some(shared) = weak.upgrade() {
                ScaleEngine { shared }.handle_resize(new_width);
            }
        }));
        *self.shared.observation.borrow_mut() = Some(observation);

        log::debug!(
            "scale engine bound to zone `{}` ({} m) in a {width} px container",
            zone.id,
            zone.width
        );
        if changed {
            self.publish();
        }
    }

    /// Container-geometry change notification.
    ///
    /// Returns `false` (and publishes nothing) when the width is unchanged.
    pub fn handle_resize(&self, width: f64) -> bool {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.container_width == width {
                return false;
            }
            state.container_width = width;
        }
        self.publish();
        true
    }

    /// Change the zone width without touching the container observation.
    pub fn set_zone_width(&self, meters: f64) -> bool {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.zone_width == meters {
                return false;
            }
            state.zone_width = meters;
        }
        self.publish();
        true
    }

    /// Release the container observation, if any.
    pub fn teardown(&self) {
        let previous = self.shared.observation.borrow_mut().take();
        if let Some(mut observation) = previous {
            observation.disconnect();
            log::debug!("scale engine released its container observation");
        }
    }

    pub fn is_observing(&self) -> bool {
        self.shared.observation.borrow().is_some()
    }

    // ─── Conversions ─────────────────────────────────────────────────────

    /// Pixels per meter. Exactly `1.0` while the zone width is not positive.
    pub fn scale_factor(&self) -> f64 {
        let state = self.shared.state.borrow();
        if state.zone_width > 0.0 {
            state.container_width / state.zone_width
        } else {
            1.0
        }
    }

    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        meters * self.scale_factor()
    }

    /// Inverse of [`meters_to_pixels`](Self::meters_to_pixels); `0.0` when
    /// the scale factor is zero (container not measured yet).
    pub fn pixels_to_meters(&self, pixels: f64) -> f64 {
        let scale = self.scale_factor();
        if scale > 0.0 { pixels / scale } else { 0.0 }
    }

    /// Surface size for a zone of the given height: full container width,
    /// height scaled so the zone keeps its real aspect ratio.
    pub fn stage_dimensions(&self, zone_height_m: f64) -> StageDimensions {
        StageDimensions {
            width: self.container_width(),
            height: zone_height_m * self.scale_factor(),
        }
    }

    pub fn container_width(&self) -> f64 {
        self.shared.state.borrow().container_width
    }

    pub fn zone_width(&self) -> f64 {
        self.shared.state.borrow().zone_width
    }

    /// Incremented on every published recomputation.
    pub fn revision(&self) -> u64 {
        self.shared.state.borrow().revision
    }

    // ─── Listeners ───────────────────────────────────────────────────────

    /// Register a listener for recomputed scale factors.
    ///
    /// The listener stays registered until the returned guard is dropped.
    /// Listeners should capture [`WeakScaleEngine`] rather than a strong
    /// handle, or the engine keeps itself alive.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe(&self, listener: impl FnMut(f64) + 'static) -> Subscription {
        let id = self.shared.next_listener.get();
        self.shared.next_listener.set(id + 1);
        self.shared
            .listeners
            .borrow_mut()
            .push((id, Box::new(listener)));
        Subscription {
            shared: Rc::downgrade(&self.shared),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().len()
    }

    fn publish(&self) {
        let factor = {
            let mut state = self.shared.state.borrow_mut();
            state.revision += 1;
            if state.zone_width > 0.0 {
                state.container_width / state.zone_width
            } else {
                1.0
            }
        };
        log::debug!("scale factor recomputed: {factor:.3} px/m");

        // Listeners may query the engine (or subscribe) while being notified,
        // so none of the engine's cells stay borrowed across the calls.
        let mut notified = std::mem::take(&mut *self.shared.listeners.borrow_mut());
        for (_, listener) in notified.iter_mut() {
            listener(factor);
        }

        let mut slot = self.shared.listeners.borrow_mut();
        notified.append(&mut slot);
        let mut cancelled = self.shared.cancelled.borrow_mut();
        if !cancelled.is_empty() {
            notified.retain(|(id, _)| !cancelled.contains(id));
            cancelled.clear();
        }
        *slot = notified;
    }
}

/// Listener registration guard; unregisters on drop.
pub struct Subscription {
    shared: Weak<Shared>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut listeners = shared.listeners.borrow_mut();
        match listeners.iter().position(|(id, _)| *id == self.id) {
            Some(pos) => {
                listeners.remove(pos);
            }
            None => shared.cancelled.borrow_mut().push(self.id),
        }
    }
}

// ─── Scale-aware components ───────────────────────────────────────────────

/// A component that redraws when the scale factor changes.
pub trait ScaleAware {
    fn on_scale_changed(&mut self, engine: &ScaleEngine);
}

/// Subscribe `target` to `engine`. Neither side is kept alive by the binding.
///
/// If the target is already mutably borrowed when a change is published
/// (it triggered the change itself), the notification is skipped; such
/// components re-check [`ScaleEngine::revision`] before painting.
#[must_use = "dropping the subscription unbinds the component"]
pub fn bind<T: ScaleAware + 'static>(engine: &ScaleEngine, target: &Rc<RefCell<T>>) -> Subscription {
    let target = Rc::downgrade(target);
    let weak_engine = engine.downgrade();
    engine.subscribe(move |_| {
        let (Some(target), Some(engine)) = (target.upgrade(), weak_engine.upgrade()) else {
            return;
        };
        match target.try_borrow_mut() {
            Ok(mut component) => component.on_scale_changed(&engine),
            Err(_) => log::trace!("scale change deferred: component busy"),
        };
    })
}

// ─── Manual container ─────────────────────────────────────────────────────

#[derive(Default)]
struct ManualInner {
    width: Cell<f64>,
    observers: RefCell<Vec<(u64, ResizeCallback)>>,
    next_id: Cell<u64>,
}

/// A container whose width changes only when told to.
///
/// Satisfies the container-geometry contract for native hosts, tests and
/// any environment without a layout engine.
#[derive(Clone, Default)]
pub struct ManualContainer {
    inner: Rc<ManualInner>,
}

impl ManualContainer {
    pub fn new(width: f64) -> Self {
        let container = Self::default();
        container.inner.width.set(width);
        container
    }

    /// Change the width and notify every active observer.
    pub fn resize(&self, width: f64) {
        self.inner.width.set(width);
        let mut observers = std::mem::take(&mut *self.inner.observers.borrow_mut());
        for (_, callback) in observers.iter_mut() {
            callback(width);
        }
        let mut slot = self.inner.observers.borrow_mut();
        observers.append(&mut slot);
        *slot = observers;
    }

    /// Number of observations currently connected.
    pub fn active_observers(&self) -> usize {
        self.inner.observers.borrow().len()
    }
}

impl ContainerGeometry for ManualContainer {
    fn width(&self) -> f64 {
        self.inner.width.get()
    }

    fn observe(&self, on_resize: ResizeCallback) -> Box<dyn ResizeObservation> {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.observers.borrow_mut().push((id, on_resize));
        Box::new(ManualObservation {
            inner: Rc::downgrade(&self.inner),
            id,
        })
    }
}

struct ManualObservation {
    inner: Weak<ManualInner>,
    id: u64,
}

impl ResizeObservation for ManualObservation {
    fn disconnect(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.observers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
        self.inner = Weak::new();
    }
}

impl Drop for ManualObservation {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(width: f64, height: f64) -> Zone {
        Zone::new("zone-1", "Hall", width, height)
    }

    #[test]
    fn factor_is_container_over_zone() {
        let engine = ScaleEngine::new();
        engine.initialize(&ManualContainer::new(1000.0), &zone(10.0, 8.0));
        assert_eq!(engine.scale_factor(), 100.0);
        assert_eq!(engine.meters_to_pixels(1.5), 150.0);
        assert_eq!(engine.pixels_to_meters(250.0), 2.5);
    }

    #[test]
    fn factor_is_one_for_non_positive_zone_width() {
        let engine = ScaleEngine::new();
        engine.initialize(&ManualContainer::new(1234.0), &zone(0.0, 8.0));
        assert_eq!(engine.scale_factor(), 1.0);
        engine.set_zone_width(-3.0);
        assert_eq!(engine.scale_factor(), 1.0);
    }

    #[test]
    fn unmeasured_container_converts_to_zero_meters() {
        let engine = ScaleEngine::new();
        engine.initialize(&ManualContainer::new(0.0), &zone(10.0, 8.0));
        assert_eq!(engine.scale_factor(), 0.0);
        assert_eq!(engine.pixels_to_meters(50.0), 0.0);
    }

    #[test]
    fn roundtrip_within_tolerance() {
        let engine = ScaleEngine::new();
        let container = ManualContainer::new(0.0);
        engine.initialize(&container, &zone(7.3, 4.0));
        for width in [1.0, 333.3, 1024.0, 1919.5] {
            container.resize(width);
            for p in [0.0, 0.5, 17.25, 640.0, 9999.9] {
                let back = engine.meters_to_pixels(engine.pixels_to_meters(p));
                assert!((back - p).abs() < 1e-9, "width {width}: {p} -> {back}");
            }
        }
    }

    #[test]
    fn stage_keeps_zone_aspect_ratio() {
        let engine = ScaleEngine::new();
        let container = ManualContainer::new(1500.0);
        engine.initialize(&container, &zone(15.0, 10.0));
        assert_eq!(
            engine.stage_dimensions(10.0),
            StageDimensions {
                width: 1500.0,
                height: 1000.0
            }
        );
        container.resize(600.0);
        assert_eq!(engine.stage_dimensions(10.0).height, 400.0);
    }

    #[test]
    fn resize_with_same_width_publishes_nothing() {
        let engine = ScaleEngine::new();
        let container = ManualContainer::new(800.0);
        engine.initialize(&container, &zone(10.0, 10.0));

        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let _sub = engine.subscribe(move |_| counter.set(counter.get() + 1));

        assert!(engine.handle_resize(900.0));
        assert!(!engine.handle_resize(900.0));
        container.resize(900.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listeners_see_recomputed_factor() {
        let engine = ScaleEngine::new();
        let container = ManualContainer::new(500.0);
        engine.initialize(&container, &zone(10.0, 10.0));

        let seen = Rc::new(Cell::new(0.0));
        let sink = seen.clone();
        let weak = engine.downgrade();
        let _sub = engine.subscribe(move |factor| {
            // the engine is queryable from inside the notification
            let live = weak.upgrade().map(|e| e.scale_factor()).unwrap_or_default();
            assert_eq!(live, factor);
            sink.set(factor);
        });

        container.resize(2000.0);
        assert_eq!(seen.get(), 200.0);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let engine = ScaleEngine::new();
        let sub = engine.subscribe(|_| {});
        assert_eq!(engine.listener_count(), 1);
        drop(sub);
        assert_eq!(engine.listener_count(), 0);
    }

    #[test]
    fn reinitialize_releases_previous_observation() {
        let engine = ScaleEngine::new();
        let container = ManualContainer::new(800.0);
        engine.initialize(&container, &zone(10.0, 10.0));
        engine.initialize(&container, &zone(20.0, 10.0));
        engine.initialize(&container, &zone(20.0, 10.0));
        assert_eq!(container.active_observers(), 1);
        assert_eq!(engine.scale_factor(), 40.0);

        engine.teardown();
        assert_eq!(container.active_observers(), 0);
        assert!(!engine.is_observing());
        container.resize(100.0);
        assert_eq!(engine.container_width(), 800.0);
    }

    #[test]
    fn dropping_engine_releases_observation() {
        let container = ManualContainer::new(800.0);
        {
            let engine = ScaleEngine::new();
            engine.initialize(&container, &zone(10.0, 10.0));
            assert_eq!(container.active_observers(), 1);
        }
        assert_eq!(container.active_observers(), 0);
    }

    struct Counter {
        redraws: usize,
        last_factor: f64,
    }

    impl ScaleAware for Counter {
        fn on_scale_changed(&mut self, engine: &ScaleEngine) {
            self.redraws += 1;
            self.last_factor = engine.scale_factor();
        }
    }

    #[test]
    fn bound_component_redraws_once_per_change() {
        let engine = ScaleEngine::new();
        let container = ManualContainer::new(400.0);
        engine.initialize(&container, &zone(4.0, 4.0));

        let component = Rc::new(RefCell::new(Counter {
            redraws: 0,
            last_factor: 0.0,
        }));
        let _binding = bind(&engine, &component);

        container.resize(800.0);
        container.resize(800.0);
        assert_eq!(component.borrow().redraws, 1);
        assert_eq!(component.borrow().last_factor, 200.0);
    }
}
