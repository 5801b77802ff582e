//! Binds a pointer surface to the dispatcher.
//!
//! [`PointerSampler`] turns raw surface events into normalized pointer coordinates,
//! casts a pick ray through the camera, hit-tests the dispatcher's registered
//! objects and feeds the result to
//! [`EventDispatcher::process_intersects`].

use crate::config::PointerSamplerDesc;
use crate::context::PointerContext;
use crate::dispatcher::EventDispatcher;
use crate::error::{Result, SceneDomError};
use crate::events::{RawPointerEvent, RawPointerKind};
use crate::math::Vec2;
use crate::scene::{HitTester, Intersection, Projection};
use crate::surface::{PointerSurface, RawPointerHandler, SubscriptionId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Maps a client-space position to normalized device coordinates.
///
/// The client rectangle maps to [-1, 1] on both axes, with +Y pointing up.
/// Returns `None` for an empty client rectangle.
pub fn normalize_client_position(client: Vec2, size: Vec2) -> Option<Vec2> {
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        (client.x / size.x) * 2.0 - 1.0,
        -(client.y / size.y) * 2.0 + 1.0,
    ))
}

struct SamplerState {
    desc: PointerSamplerDesc,
    projection: Rc<dyn Projection>,
    hit_tester: Rc<dyn HitTester>,
    dispatcher: Rc<EventDispatcher>,
    ndc: Cell<Vec2>,
    context: RefCell<PointerContext>,
}

impl SamplerState {
    fn update_pointer(&self, surface: &dyn PointerSurface, event: &RawPointerEvent) -> Result<()> {
        let size = surface.client_size();
        let ndc = normalize_client_position(event.client_position, size).ok_or_else(|| {
            SceneDomError::Surface(format!(
                "Client rectangle {}x{} has no area",
                size.x, size.y
            ))
        })?;
        self.ndc.set(ndc);
        Ok(())
    }

    fn intersections(&self) -> Vec<Intersection> {
        let ray = self.projection.ray_from_ndc(self.ndc.get());
        let candidates = self.dispatcher.objects();
        self.hit_tester
            .intersect_objects(&ray, self.desc.near..self.desc.far, &candidates)
    }

    fn process(&self, kind: RawPointerKind) -> Result<()> {
        let intersections = self.intersections();
        log::trace!(
            "Pointer {} {:?} at {:?}: {} hit(s)",
            self.desc.pointer_id,
            kind,
            self.ndc.get(),
            intersections.len()
        );
        let mut context = self
            .context
            .try_borrow_mut()
            .map_err(|_| SceneDomError::PointerBusy(self.desc.pointer_id))?;
        self.dispatcher
            .process_intersects(&mut context, &intersections, kind.into())
    }
}

/// One tracked pointer bound to one surface.
///
/// Binding subscribes four handlers, in this order: pointer-move updates the
/// normalized coordinates, then pointer-move, pointer-down and pointer-up each
/// run a hit test and dispatch. Down and up reuse the coordinates of the last move.
///
/// [`dispose`](Self::dispose) (or dropping the sampler) removes exactly those
/// subscriptions.
pub struct PointerSampler {
    surface: Rc<dyn PointerSurface>,
    subscriptions: Vec<SubscriptionId>,
    state: Rc<SamplerState>,
}

impl PointerSampler {
    /// Subscribes to `surface` and starts dispatching to `dispatcher`.
    ///
    /// A camera or hit tester that changes over time can be passed as
    /// `Rc<RefCell<_>>`; both traits are implemented through `RefCell`.
    pub fn bind(
        projection: Rc<dyn Projection>,
        hit_tester: Rc<dyn HitTester>,
        surface: Rc<dyn PointerSurface>,
        dispatcher: Rc<EventDispatcher>,
        desc: PointerSamplerDesc,
    ) -> Self {
        let state = Rc::new(SamplerState {
            desc,
            projection,
            hit_tester,
            dispatcher,
            ndc: Cell::new(Vec2::ZERO),
            context: RefCell::new(PointerContext::new()),
        });

        let mut sampler = Self {
            surface,
            subscriptions: Vec::with_capacity(4),
            state,
        };

        // The coordinate update must be subscribed before the move hit test.
        let weak_surface = Rc::downgrade(&sampler.surface);
        let update_state = Rc::clone(&sampler.state);
        sampler.subscribe(
            RawPointerKind::Move,
            Rc::new(move |event: &RawPointerEvent| -> Result<()> {
                match weak_surface.upgrade() {
                    Some(surface) => update_state.update_pointer(surface.as_ref(), event),
                    None => Ok(()),
                }
            }),
        );
        for kind in [RawPointerKind::Move, RawPointerKind::Down, RawPointerKind::Up] {
            let state = Rc::clone(&sampler.state);
            sampler.subscribe(
                kind,
                Rc::new(move |event: &RawPointerEvent| -> Result<()> {
                    state.process(event.kind)
                }),
            );
        }

        log::debug!(
            "Pointer {} bound with {} subscriptions",
            sampler.state.desc.pointer_id,
            sampler.subscriptions.len()
        );
        sampler
    }

    fn subscribe(&mut self, kind: RawPointerKind, handler: Rc<RawPointerHandler>) {
        let id = self.surface.subscribe(kind, handler);
        self.subscriptions.push(id);
    }

    /// Removes every subscription this sampler made. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for id in self.subscriptions.drain(..) {
            if !self.surface.unsubscribe(id) {
                log::warn!("Subscription {} was already removed from the surface", id);
            }
        }
        log::debug!("Pointer {} disposed", self.state.desc.pointer_id);
    }

    pub fn is_bound(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Last pointer position in normalized device coordinates.
    pub fn pointer(&self) -> Vec2 {
        self.state.ndc.get()
    }

    /// Hit-tests the registered objects at the current pointer position.
    pub fn intersections(&self) -> Vec<Intersection> {
        self.state.intersections()
    }

    /// Runs `f` against this pointer's interaction state.
    ///
    /// Fails with [`SceneDomError::PointerBusy`] when called from a listener this
    /// sampler is currently dispatching to.
    pub fn with_context<R>(&self, f: impl FnOnce(&PointerContext) -> R) -> Result<R> {
        let context = self
            .state
            .context
            .try_borrow()
            .map_err(|_| SceneDomError::PointerBusy(self.state.desc.pointer_id))?;
        Ok(f(&context))
    }
}

impl Drop for PointerSampler {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::math::Vec3;
    use crate::scene::{Aabb, BoundsHitTester, PerspectiveCamera, SceneNode};
    use crate::surface::QueuedSurface;

    const SIZE: f32 = 200.0;

    struct Fixture {
        surface: Rc<QueuedSurface>,
        dispatcher: Rc<EventDispatcher>,
        hit_tester: Rc<RefCell<BoundsHitTester>>,
        sampler: PointerSampler,
        log: Rc<RefCell<Vec<String>>>,
    }

    fn fixture() -> Fixture {
        let surface = Rc::new(QueuedSurface::new(SIZE, SIZE));
        let dispatcher = Rc::new(EventDispatcher::new());
        let hit_tester = Rc::new(RefCell::new(BoundsHitTester::new()));
        let camera = Rc::new(PerspectiveCamera::default());
        let sampler = PointerSampler::bind(
            camera,
            hit_tester.clone(),
            surface.clone(),
            Rc::clone(&dispatcher),
            PointerSamplerDesc::default(),
        );
        Fixture {
            surface,
            dispatcher,
            hit_tester,
            sampler,
            log: Rc::default(),
        }
    }

    impl Fixture {
        fn add_cube(&self, name: &str, center: Vec3) -> Rc<SceneNode> {
            let cube = SceneNode::new(name);
            self.hit_tester
                .borrow_mut()
                .set_bounds(&cube, Aabb::from_center_size(center, Vec3::ONE));
            for kind in EventKind::ALL {
                let log = Rc::clone(&self.log);
                self.dispatcher.add_event_listener(
                    &cube,
                    kind,
                    move |event| {
                        log.borrow_mut()
                            .push(format!("{}:{}", event.kind, event.object.name()));
                        Ok(())
                    },
                    false,
                );
            }
            cube
        }

        fn send(&self, event: RawPointerEvent) -> Result<usize> {
            self.surface.push(event)?;
            self.surface.pump()
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.log.borrow_mut())
        }
    }

    #[test]
    fn test_normalize_client_position() {
        let size = Vec2::new(200.0, 100.0);
        assert_eq!(
            normalize_client_position(Vec2::new(0.0, 0.0), size),
            Some(Vec2::new(-1.0, 1.0))
        );
        assert_eq!(
            normalize_client_position(Vec2::new(200.0, 100.0), size),
            Some(Vec2::new(1.0, -1.0))
        );
        assert_eq!(
            normalize_client_position(Vec2::new(100.0, 50.0), size),
            Some(Vec2::new(0.0, 0.0))
        );
        assert_eq!(normalize_client_position(Vec2::ONE, Vec2::ZERO), None);
    }

    #[test]
    fn test_bind_and_dispose_subscriptions() {
        let mut f = fixture();
        assert!(f.sampler.is_bound());
        assert_eq!(f.surface.subscription_count(), 4);

        f.sampler.dispose();
        assert!(!f.sampler.is_bound());
        assert_eq!(f.surface.subscription_count(), 0);

        f.sampler.dispose();
        assert_eq!(f.surface.subscription_count(), 0);
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let surface = Rc::new(QueuedSurface::new(SIZE, SIZE));
        let other = Rc::new(|_: &RawPointerEvent| -> Result<()> { Ok(()) });
        surface.subscribe(RawPointerKind::Move, other);
        {
            let _sampler = PointerSampler::bind(
                Rc::new(PerspectiveCamera::default()),
                Rc::new(BoundsHitTester::new()),
                surface.clone(),
                Rc::new(EventDispatcher::new()),
                PointerSamplerDesc::default(),
            );
            assert_eq!(surface.subscription_count(), 5);
        }
        assert_eq!(surface.subscription_count(), 1);
    }

    #[test]
    fn test_move_updates_pointer_before_hit_test() {
        let f = fixture();
        f.add_cube("cube", Vec3::ZERO);

        f.send(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0)).unwrap();

        assert_eq!(f.sampler.pointer(), Vec2::ZERO);
        assert_eq!(f.take(), vec!["mousemove:cube", "mouseenter:cube"]);
    }

    #[test]
    fn test_cube_scenario_through_surface() {
        let f = fixture();
        let cube = f.add_cube("cube", Vec3::ZERO);

        f.send(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0)).unwrap();
        assert_eq!(f.take(), vec!["mousemove:cube", "mouseenter:cube"]);

        f.send(RawPointerEvent::moved(0.0, 0.0)).unwrap();
        assert_eq!(f.take(), vec!["mouseleave:cube"]);

        f.send(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0)).unwrap();
        f.take();
        f.send(RawPointerEvent::down(SIZE / 2.0, SIZE / 2.0)).unwrap();
        f.send(RawPointerEvent::up(SIZE / 2.0, SIZE / 2.0)).unwrap();
        assert_eq!(f.take(), vec!["mousedown:cube", "mouseup:cube", "click:cube"]);

        f.sampler
            .with_context(|context| {
                assert_eq!(context.last_mouse_down_object().unwrap().id(), cube.id());
                assert_eq!(context.last_mouse_move_object().unwrap().id(), cube.id());
            })
            .unwrap();
    }

    #[test]
    fn test_nearest_object_is_reported_first() {
        let f = fixture();
        let _back = f.add_cube("back", Vec3::new(0.0, 0.0, -3.0));
        let _front = f.add_cube("front", Vec3::ZERO);

        f.send(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0)).unwrap();

        let hits: Vec<String> = f
            .sampler
            .intersections()
            .iter()
            .map(|h| h.object.name().to_string())
            .collect();
        assert_eq!(hits, vec!["front", "back"]);
        assert_eq!(
            f.take(),
            vec!["mousemove:front", "mousemove:back", "mouseenter:front"]
        );
    }

    #[test]
    fn test_unregistered_objects_are_not_hit() {
        let f = fixture();
        let cube = f.add_cube("cube", Vec3::ZERO);
        f.dispatcher.remove_all_event_listeners(&cube);

        f.send(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0)).unwrap();
        assert!(f.sampler.intersections().is_empty());
        assert!(f.take().is_empty());
    }

    #[test]
    fn test_far_limit_drops_hits() {
        let surface = Rc::new(QueuedSurface::new(SIZE, SIZE));
        let dispatcher = Rc::new(EventDispatcher::new());
        let mut tester = BoundsHitTester::new();
        let cube = SceneNode::new("cube");
        tester.set_bounds(&cube, Aabb::from_center_size(Vec3::ZERO, Vec3::ONE));
        dispatcher.add_event_listener(&cube, EventKind::MouseMove, |_| Ok(()), false);

        let sampler = PointerSampler::bind(
            Rc::new(PerspectiveCamera::default()),
            Rc::new(tester),
            surface.clone(),
            dispatcher,
            PointerSamplerDesc::new().far(4.0),
        );

        surface
            .push(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0))
            .unwrap();
        surface.pump().unwrap();
        assert!(sampler.intersections().is_empty());
    }

    #[test]
    fn test_zero_sized_surface_is_an_error() {
        let f = fixture();
        f.surface.resize(0.0, 0.0);
        let err = f.send(RawPointerEvent::moved(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, SceneDomError::Surface(_)));
    }

    #[test]
    fn test_context_read_from_listener_reports_busy() {
        let f = fixture();
        let cube = f.add_cube("cube", Vec3::ZERO);
        let Fixture {
            surface,
            dispatcher,
            sampler,
            ..
        } = f;
        let sampler = Rc::new(sampler);

        let busy: Rc<Cell<Option<bool>>> = Rc::default();
        let seen = Rc::clone(&busy);
        let weak = Rc::downgrade(&sampler);
        dispatcher.add_event_listener(
            &cube,
            EventKind::MouseDown,
            move |_| {
                if let Some(sampler) = weak.upgrade() {
                    let result = sampler.with_context(|_| ());
                    seen.set(Some(matches!(result, Err(SceneDomError::PointerBusy(0)))));
                }
                Ok(())
            },
            false,
        );

        surface.push(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0)).unwrap();
        surface.push(RawPointerEvent::down(SIZE / 2.0, SIZE / 2.0)).unwrap();
        assert_eq!(surface.pump().unwrap(), 2);

        assert_eq!(busy.get(), Some(true));
        let pressed = sampler
            .with_context(|context| context.last_mouse_down_object().map(|o| o.id()))
            .unwrap();
        assert_eq!(pressed, Some(cube.id()));
    }

    #[test]
    fn test_nested_delivery_reports_busy() {
        let f = fixture();
        let cube = f.add_cube("cube", Vec3::ZERO);
        let weak_surface = Rc::downgrade(&f.surface);
        f.dispatcher.add_event_listener(
            &cube,
            EventKind::Click,
            move |_| {
                if let Some(surface) = weak_surface.upgrade() {
                    surface.deliver(&RawPointerEvent::down(SIZE / 2.0, SIZE / 2.0))?;
                }
                Ok(())
            },
            false,
        );

        f.send(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0)).unwrap();
        f.send(RawPointerEvent::down(SIZE / 2.0, SIZE / 2.0)).unwrap();
        let err = f.send(RawPointerEvent::up(SIZE / 2.0, SIZE / 2.0)).unwrap_err();

        match err {
            SceneDomError::Listener { kind, source, .. } => {
                assert_eq!(kind, EventKind::Click);
                assert!(source.to_string().contains("busy"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_listener_error_reaches_pump_caller() {
        let f = fixture();
        let cube = f.add_cube("cube", Vec3::ZERO);
        f.dispatcher.add_event_listener(
            &cube,
            EventKind::MouseDown,
            |_| Err(anyhow::anyhow!("refused")),
            false,
        );

        f.send(RawPointerEvent::moved(SIZE / 2.0, SIZE / 2.0)).unwrap();
        let err = f.send(RawPointerEvent::down(SIZE / 2.0, SIZE / 2.0)).unwrap_err();
        assert!(matches!(err, SceneDomError::Listener { kind: EventKind::MouseDown, .. }));
    }
}
