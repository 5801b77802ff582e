//! Listener registry and the pointer event state machine.
//!
//! [`EventDispatcher`] keeps a side table of listeners per object, fans events
//! out to them, bubbles raw events up the parent chain and synthesizes `click`,
//! `mouseenter` and `mouseleave` from successive hit-test results.
//!
//! All methods take `&self`, so listeners may register or drop listeners on the
//! same dispatcher while it is dispatching. Each notification pass runs over a
//! snapshot of the listener list taken when the pass starts.

use crate::context::PointerContext;
use crate::error::{Result, SceneDomError};
use crate::events::{EventKind, PointerEvent};
use crate::scene::{Intersection, ObjectId, SceneNode, same_node};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Listener callback. Returning an error stops the current notification pass
/// and surfaces as [`SceneDomError::Listener`].
pub type ListenerCallback = dyn Fn(&PointerEvent) -> anyhow::Result<()>;

#[derive(Clone)]
pub struct Listener {
    callback: Rc<ListenerCallback>,
    use_capture: bool,
}

impl Listener {
    /// Stored for API compatibility; events only ever bubble.
    pub fn use_capture(&self) -> bool {
        self.use_capture
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("use_capture", &self.use_capture)
            .finish_non_exhaustive()
    }
}

/// Listeners of one object, one ordered list per [`EventKind`].
///
/// A table always has a list for every kind, possibly empty.
#[derive(Clone, Debug, Default)]
pub struct ListenerTable {
    lists: [Vec<Listener>; 6],
}

impl ListenerTable {
    pub fn listeners(&self, kind: EventKind) -> &[Listener] {
        &self.lists[kind.index()]
    }

    pub fn len(&self, kind: EventKind) -> usize {
        self.lists[kind.index()].len()
    }

    fn push(&mut self, kind: EventKind, listener: Listener) {
        self.lists[kind.index()].push(listener);
    }
}

#[derive(Default)]
struct DispatcherState {
    /// Registration order is kept so hit testing sees a stable candidate order.
    objects: Vec<Rc<SceneNode>>,
    tables: HashMap<ObjectId, ListenerTable>,
}

/// Registry of interactive objects and the dispatch algorithm over them.
///
/// One dispatcher is shared (as `Rc<EventDispatcher>`) by every pointer bound to a
/// scene. It is not `Send`; all dispatch happens on the thread that delivers input.
#[derive(Default)]
pub struct EventDispatcher {
    state: RefCell<DispatcherState>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener for `kind` on `object`, registering the object if needed.
    ///
    /// Adding the same callback twice makes it run twice.
    pub fn add_event_listener<F>(
        &self,
        object: &Rc<SceneNode>,
        kind: EventKind,
        callback: F,
        use_capture: bool,
    ) where
        F: Fn(&PointerEvent) -> anyhow::Result<()> + 'static,
    {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;

        let table = state.tables.entry(object.id()).or_insert_with(|| {
            log::debug!("Registering {} ({})", object.id(), object.name());
            ListenerTable::default()
        });
        table.push(
            kind,
            Listener {
                callback: Rc::new(callback),
                use_capture,
            },
        );

        if !state.objects.iter().any(|o| o.id() == object.id()) {
            state.objects.push(Rc::clone(object));
        }
    }

    /// Same as [`add_event_listener`](Self::add_event_listener) with the kind given
    /// by its DOM name (`"click"`, `"mouseenter"`, ...).
    pub fn add_event_listener_named<F>(
        &self,
        object: &Rc<SceneNode>,
        kind: &str,
        callback: F,
        use_capture: bool,
    ) -> Result<()>
    where
        F: Fn(&PointerEvent) -> anyhow::Result<()> + 'static,
    {
        let kind: EventKind = kind.parse()?;
        self.add_event_listener(object, kind, callback, use_capture);
        Ok(())
    }

    /// Drops every listener of `object` and removes it from the registry.
    pub fn remove_all_event_listeners(&self, object: &SceneNode) {
        let mut state = self.state.borrow_mut();
        if state.tables.remove(&object.id()).is_some() {
            log::debug!("Unregistering {} ({})", object.id(), object.name());
        }
        state.objects.retain(|o| o.id() != object.id());
    }

    /// Removing a single listener is not supported; use
    /// [`remove_all_event_listeners`](Self::remove_all_event_listeners).
    pub fn remove_event_listener(
        &self,
        object: &SceneNode,
        kind: EventKind,
        _callback: &ListenerCallback,
        _use_capture: bool,
    ) -> Result<()> {
        log::warn!(
            "remove_event_listener({}, {}) called but is not implemented",
            object.id(),
            kind
        );
        Err(SceneDomError::NotImplemented("remove_event_listener"))
    }

    /// Snapshot of the registered objects, in registration order.
    pub fn objects(&self) -> Vec<Rc<SceneNode>> {
        self.state.borrow().objects.clone()
    }

    pub fn is_registered(&self, object: &SceneNode) -> bool {
        self.state.borrow().tables.contains_key(&object.id())
    }

    /// Copy of the listener table of `object`, if it is registered.
    pub fn listener_table(&self, object: &SceneNode) -> Option<ListenerTable> {
        self.state.borrow().tables.get(&object.id()).cloned()
    }

    pub fn listener_count(&self, object: &SceneNode, kind: EventKind) -> usize {
        self.state
            .borrow()
            .tables
            .get(&object.id())
            .map_or(0, |table| table.len(kind))
    }

    /// Calls the listeners of `object` for `event.kind`, in insertion order.
    ///
    /// Does not bubble. The first failing listener ends the pass.
    pub fn notify_listeners(&self, object: &SceneNode, event: &PointerEvent) -> Result<()> {
        let snapshot: Vec<Listener> = {
            let state = self.state.borrow();
            match state.tables.get(&object.id()) {
                Some(table) => table.listeners(event.kind).to_vec(),
                None => return Ok(()),
            }
        };

        for listener in snapshot {
            log::trace!(
                "{} -> {} ({}), target {}",
                event.kind,
                object.id(),
                object.name(),
                event.object.name()
            );
            (listener.callback)(event).map_err(|e| SceneDomError::Listener {
                kind: event.kind,
                object: object.id(),
                source: e.into(),
            })?;
        }

        Ok(())
    }

    /// Notifies `object`, then each of its ancestors, with the same event.
    ///
    /// The parent chain must be acyclic.
    pub fn dispatch_with_bubbling(
        &self,
        object: &Rc<SceneNode>,
        event: &PointerEvent,
    ) -> Result<()> {
        for node in object.ancestors() {
            self.notify_listeners(&node, event)?;
        }
        Ok(())
    }

    /// Bubbles a `kind` event from every intersected object, nearest first.
    pub fn dispatch_to_intersections(
        &self,
        intersections: &[Intersection],
        kind: EventKind,
    ) -> Result<()> {
        for intersect in intersections {
            let event = PointerEvent {
                kind,
                object: Rc::clone(&intersect.object),
                intersect: Some(intersect.clone()),
            };
            self.dispatch_with_bubbling(&intersect.object, &event)?;
        }
        Ok(())
    }

    /// Runs one hit-test result through the dispatch state machine.
    ///
    /// Dispatches `kind` to the intersections, then:
    /// - `MouseUp` on the object that received the last `MouseDown` also dispatches `Click`
    /// - `MouseDown` records the nearest hit in `context`
    /// - `MouseMove` emits `MouseLeave`/`MouseEnter` for the vacated and entered
    ///   ancestor chains and records the nearest hit in `context`
    ///
    /// `MouseEnter` and `MouseLeave` are rejected: they only ever come from synthesis.
    pub fn process_intersects(
        &self,
        context: &mut PointerContext,
        intersections: &[Intersection],
        kind: EventKind,
    ) -> Result<()> {
        if !kind.is_dispatchable() {
            return Err(SceneDomError::InvalidDispatchKind(kind));
        }

        self.dispatch_to_intersections(intersections, kind)?;

        let nearest = intersections.first().map(|i| &i.object);

        if kind == EventKind::MouseUp
            && nearest.is_some()
            && same_node(nearest, context.last_mouse_down_object.as_ref())
        {
            self.process_intersects(context, intersections, EventKind::Click)?;
        }

        match kind {
            EventKind::MouseDown => {
                context.last_mouse_down_object = nearest.cloned();
            }
            EventKind::MouseMove => {
                self.process_mouse_move(context, intersections)?;
                context.last_mouse_move_object = nearest.cloned();
            }
            _ => {}
        }

        Ok(())
    }

    /// Enter/leave synthesis for one mousemove sample.
    ///
    /// Ancestors shared by the old and new hover chains receive neither event, so a
    /// node never sees leave followed by enter within the same sample.
    fn process_mouse_move(
        &self,
        context: &PointerContext,
        intersections: &[Intersection],
    ) -> Result<()> {
        let current = intersections.first().map(|i| &i.object);
        let previous = context.last_mouse_move_object.as_ref();

        if same_node(current, previous) {
            return Ok(());
        }

        let mut leave_chain: Vec<Rc<SceneNode>> = previous
            .map(|node| node.ancestors().collect())
            .unwrap_or_default();
        let mut enter_chain: Vec<Rc<SceneNode>> = Vec::new();

        if let Some(current) = current {
            for node in current.ancestors() {
                if let Some(index) = leave_chain.iter().position(|n| n.id() == node.id()) {
                    leave_chain.remove(index);
                    continue;
                }
                enter_chain.push(node);
            }
        }

        log::debug!(
            "Hover {:?} -> {:?}: {} leave, {} enter",
            previous.map(|n| n.name()),
            current.map(|n| n.name()),
            leave_chain.len(),
            enter_chain.len()
        );

        let intersect = intersections.first().cloned();

        if let Some(previous) = previous {
            let event = PointerEvent {
                kind: EventKind::MouseLeave,
                object: Rc::clone(previous),
                intersect: intersect.clone(),
            };
            for node in &leave_chain {
                self.notify_listeners(node, &event)?;
            }
        }

        if let Some(current) = current {
            let event = PointerEvent {
                kind: EventKind::MouseEnter,
                object: Rc::clone(current),
                intersect,
            };
            for node in &enter_chain {
                self.notify_listeners(node, &event)?;
            }
        }

        Ok(())
    }
}
