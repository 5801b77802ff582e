//! Raw pointer input surfaces.
//!
//! A [`PointerSurface`] is whatever flat element the scene is drawn into: it knows
//! its client size and lets callers subscribe to raw pointer events.
//! [`QueuedSurface`] is a ready-made implementation that accepts events from any
//! thread through a channel and delivers them on the thread that calls
//! [`QueuedSurface::pump`].

use crate::error::{Result, SceneDomError};
use crate::events::{RawPointerEvent, RawPointerKind};
use crate::math::Vec2;
use crossbeam_channel::{Receiver, Sender};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handler for raw pointer events. An error stops delivery of the current event.
pub type RawPointerHandler = dyn Fn(&RawPointerEvent) -> Result<()>;

/// Handle returned by [`PointerSurface::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

/// Raw input binding primitives of a host surface.
///
/// Handlers subscribed to the same kind must run in subscription order.
pub trait PointerSurface {
    /// Width and height of the client rectangle, in the same units as
    /// [`RawPointerEvent::client_position`].
    fn client_size(&self) -> Vec2;

    fn subscribe(&self, kind: RawPointerKind, handler: Rc<RawPointerHandler>) -> SubscriptionId;

    /// Returns `false` if `id` was not subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

struct Subscription {
    id: SubscriptionId,
    kind: RawPointerKind,
    handler: Rc<RawPointerHandler>,
}

/// A [`PointerSurface`] fed through a `crossbeam_channel` queue.
///
/// The windowing side pushes [`RawPointerEvent`]s through [`sender`](Self::sender),
/// possibly from another thread; the dispatch side calls [`pump`](Self::pump)
/// once per frame to deliver them in arrival order.
pub struct QueuedSurface {
    size: Cell<Vec2>,
    sender: Sender<RawPointerEvent>,
    receiver: Receiver<RawPointerEvent>,
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
}

impl QueuedSurface {
    pub fn new(width: f32, height: f32) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            size: Cell::new(Vec2::new(width, height)),
            sender,
            receiver,
            subscriptions: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// A sender for raw events. It is `Send` and can be cloned freely.
    pub fn sender(&self) -> Sender<RawPointerEvent> {
        self.sender.clone()
    }

    pub fn resize(&self, width: f32, height: f32) {
        log::debug!("Surface resized to {}x{}", width, height);
        self.size.set(Vec2::new(width, height));
    }

    /// Queues an event for the next [`pump`](Self::pump).
    pub fn push(&self, event: RawPointerEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|e| SceneDomError::Surface(format!("Failed to queue pointer event: {}", e)))
    }

    /// Number of events waiting to be delivered.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Delivers every queued event and returns how many were delivered.
    ///
    /// Stops at the first handler error; later events stay queued.
    pub fn pump(&self) -> Result<usize> {
        let mut delivered = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.deliver(&event)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Runs the handlers subscribed to `event.kind` right away, bypassing the queue.
    ///
    /// Handlers are snapshotted first, so subscribing or unsubscribing from inside a
    /// handler only affects later events.
    pub fn deliver(&self, event: &RawPointerEvent) -> Result<()> {
        let handlers: Vec<Rc<RawPointerHandler>> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.kind == event.kind)
            .map(|s| Rc::clone(&s.handler))
            .collect();

        for handler in handlers {
            handler(event)?;
        }
        Ok(())
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }
}

impl PointerSurface for QueuedSurface {
    fn client_size(&self) -> Vec2 {
        self.size.get()
    }

    fn subscribe(&self, kind: RawPointerKind, handler: Rc<RawPointerHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscriptions
            .borrow_mut()
            .push(Subscription { id, kind, handler });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }
}
