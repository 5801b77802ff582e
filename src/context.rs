//! Per-pointer interaction state.

use crate::scene::SceneNode;
use std::rc::Rc;

/// What one pointer last pressed and last hovered.
///
/// Click synthesis compares a mouseup target against `last_mouse_down_object`;
/// enter/leave synthesis diffs the current hover target against
/// `last_mouse_move_object`. Only
/// [`EventDispatcher::process_intersects`](crate::EventDispatcher::process_intersects)
/// writes to it.
#[derive(Debug, Default)]
pub struct PointerContext {
    pub(crate) last_mouse_down_object: Option<Rc<SceneNode>>,
    pub(crate) last_mouse_move_object: Option<Rc<SceneNode>>,
}

impl PointerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_mouse_down_object(&self) -> Option<&Rc<SceneNode>> {
        self.last_mouse_down_object.as_ref()
    }

    pub fn last_mouse_move_object(&self) -> Option<&Rc<SceneNode>> {
        self.last_mouse_move_object.as_ref()
    }
}
