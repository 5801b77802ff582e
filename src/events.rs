//! Event types for scenedom
//!
//! [`EventKind`] names the six pointer events objects can listen to.
//! [`PointerEvent`] is the payload handed to listeners, and [`RawPointerEvent`]
//! is what a host surface delivers before any hit testing happens.

use crate::error::SceneDomError;
use crate::math::Vec2;
use crate::scene::{Intersection, SceneNode};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseUp,
    MouseMove,
    Click,
    MouseEnter,
    MouseLeave,
}

impl EventKind {
    /// Every kind a listener table carries, in table order.
    pub const ALL: [EventKind; 6] = [
        EventKind::MouseDown,
        EventKind::MouseUp,
        EventKind::MouseMove,
        EventKind::Click,
        EventKind::MouseEnter,
        EventKind::MouseLeave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseMove => "mousemove",
            Self::Click => "click",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
        }
    }

    /// Kinds accepted by `EventDispatcher::process_intersects`.
    pub fn is_dispatchable(&self) -> bool {
        matches!(
            self,
            Self::MouseDown | Self::MouseUp | Self::MouseMove | Self::Click
        )
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::MouseDown => 0,
            Self::MouseUp => 1,
            Self::MouseMove => 2,
            Self::Click => 3,
            Self::MouseEnter => 4,
            Self::MouseLeave => 5,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = SceneDomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SceneDomError::UnknownEventKind(s.to_string()))
    }
}

impl From<RawPointerKind> for EventKind {
    fn from(kind: RawPointerKind) -> Self {
        match kind {
            RawPointerKind::Move => Self::MouseMove,
            RawPointerKind::Down => Self::MouseDown,
            RawPointerKind::Up => Self::MouseUp,
        }
    }
}

/// Payload delivered to listeners.
///
/// `object` is the hit object for down/up/move/click (the same value for every
/// ancestor the event bubbles through), the vacated object for mouseleave and the
/// entered object for mouseenter. `intersect` is `None` only for a mouseleave
/// produced by moving off every object.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    pub kind: EventKind,
    pub object: Rc<SceneNode>,
    pub intersect: Option<Intersection>,
}

/// Raw pointer input kinds a surface can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawPointerKind {
    Move,
    Down,
    Up,
}

/// A raw pointer sample in surface client coordinates (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointerEvent {
    pub kind: RawPointerKind,
    pub client_position: Vec2,
}

impl RawPointerEvent {
    pub fn new(kind: RawPointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            client_position: Vec2::new(x, y),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(RawPointerKind::Move, x, y)
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(RawPointerKind::Down, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(RawPointerKind::Up, x, y)
    }
}
