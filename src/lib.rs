//! # scenedom
//!
//! DOM-style pointer events for objects in a 3D scene.
//!
//! A rendering surface only reports raw pointer coordinates. scenedom turns those
//! into `mousedown`, `mouseup`, `mousemove`, `click`, `mouseenter` and `mouseleave`
//! events on scene objects: it casts a pick ray through the camera, hit-tests the
//! objects that have listeners, bubbles events up each object's parent chain and
//! synthesizes click and hover transitions from successive samples.
//!
//! ## Quick Start
//!
//! ```
//! use scenedom::*;
//! use scenedom::scene::{Aabb, BoundsHitTester, PerspectiveCamera};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let dispatcher = Rc::new(EventDispatcher::new());
//! let surface = Rc::new(QueuedSurface::new(800.0, 600.0));
//! let hit_tester = Rc::new(RefCell::new(BoundsHitTester::new()));
//! let camera = Rc::new(PerspectiveCamera::default());
//!
//! let cube = SceneNode::new("cube");
//! hit_tester
//!     .borrow_mut()
//!     .set_bounds(&cube, Aabb::from_center_size(Vec3::ZERO, Vec3::ONE));
//!
//! let clicks = Rc::new(RefCell::new(0));
//! let counter = Rc::clone(&clicks);
//! dispatcher.add_event_listener(
//!     &cube,
//!     EventKind::Click,
//!     move |_| {
//!         *counter.borrow_mut() += 1;
//!         Ok(())
//!     },
//!     false,
//! );
//!
//! let _pointer = PointerSampler::bind(
//!     camera,
//!     hit_tester,
//!     surface.clone(),
//!     Rc::clone(&dispatcher),
//!     PointerSamplerDesc::default(),
//! );
//!
//! surface.push(RawPointerEvent::moved(400.0, 300.0))?;
//! surface.push(RawPointerEvent::down(400.0, 300.0))?;
//! surface.push(RawPointerEvent::up(400.0, 300.0))?;
//! surface.pump()?;
//!
//! assert_eq!(*clicks.borrow(), 1);
//! # Ok::<(), SceneDomError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`EventDispatcher`]**: listener registry, bubbling and click/enter/leave synthesis
//! - **[`PointerContext`]**: what one pointer last pressed and hovered
//! - **[`PointerSampler`]**: binds a surface, a camera and a hit tester to a dispatcher
//! - **[`HitTester`](scene::HitTester)** and **[`Projection`](scene::Projection)**:
//!   traits the host scene implements (reference implementations included)
//! - **[`QueuedSurface`]**: a surface fed from any thread through a channel
//!
//! ## Threading
//!
//! Dispatch is single-threaded. The dispatcher, samplers and scene nodes are `Rc`
//! based and stay on the thread that pumps input. Only the raw event sender of a
//! [`QueuedSurface`] crosses threads.

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod math;
pub mod sampler;
pub mod scene;
pub mod surface;

pub use config::PointerSamplerDesc;
pub use context::PointerContext;
pub use dispatcher::{EventDispatcher, Listener, ListenerCallback, ListenerTable};
pub use error::SceneDomError;
pub use events::{EventKind, PointerEvent, RawPointerEvent, RawPointerKind};
pub use math::{Pose, Ray, Vec2, Vec3};
pub use sampler::PointerSampler;
pub use scene::{Intersection, ObjectId, SceneNode};
pub use surface::{PointerSurface, QueuedSurface, SubscriptionId};
