//! Scene-side collaborators: interactive nodes, hit results and the traits a
//! host scene graph implements to be picked.
//!
//! The host owns the node tree. Nodes only carry a weak back-reference to their
//! parent, which is all the dispatcher needs to bubble events and build
//! enter/leave chains.

mod bounds;
mod camera;

pub use bounds::{Aabb, BoundsHitTester};
pub use camera::{PerspectiveCamera, Projection};

use crate::math::{Ray, Vec3};
use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Stable identity of an interactive object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// A node of the host scene graph that can be targeted by pointer events.
///
/// Nodes are handled as `Rc<SceneNode>`. The parent link is weak, so a child never
/// keeps its ancestors alive; once the host drops a parent the chain simply ends there.
#[derive(Debug)]
pub struct SceneNode {
    id: ObjectId,
    name: String,
    parent: RefCell<Weak<SceneNode>>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            id: ObjectId::new(),
            name: name.into(),
            parent: RefCell::new(Weak::new()),
        })
    }

    /// Creates a node already attached under `parent`.
    pub fn with_parent(name: impl Into<String>, parent: &Rc<SceneNode>) -> Rc<Self> {
        let node = Self::new(name);
        Self::attach(&node, parent);
        node
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Rc<SceneNode>> {
        self.parent.borrow().upgrade()
    }

    /// Re-parents `child` under `parent`. The caller must keep the graph acyclic.
    pub fn attach(child: &Rc<SceneNode>, parent: &Rc<SceneNode>) {
        *child.parent.borrow_mut() = Rc::downgrade(parent);
    }

    pub fn detach(child: &Rc<SceneNode>) {
        *child.parent.borrow_mut() = Weak::new();
    }

    /// Iterates from this node up to the root, starting with the node itself.
    ///
    /// Does not terminate on a cyclic parent chain.
    pub fn ancestors(self: &Rc<Self>) -> Ancestors {
        Ancestors {
            next: Some(Rc::clone(self)),
        }
    }
}

impl PartialEq for SceneNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SceneNode {}

/// Iterator over a node and its ancestors, nearest first.
pub struct Ancestors {
    next: Option<Rc<SceneNode>>,
}

impl Iterator for Ancestors {
    type Item = Rc<SceneNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Result of a pick ray hitting an object.
#[derive(Debug, Clone)]
pub struct Intersection {
    pub object: Rc<SceneNode>,
    /// Distance from the ray origin to `point`
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

impl Intersection {
    pub fn new(object: Rc<SceneNode>, distance: f32, point: Vec3) -> Self {
        Self {
            object,
            distance,
            point,
        }
    }
}

/// Trait for plugging the host's ray casting into pointer picking.
///
/// Implementations only need to consider `candidates`, which is the set of objects
/// that currently have listeners. Hits outside `range` must be dropped, and the
/// result must be ordered nearest first.
pub trait HitTester {
    fn intersect_objects(
        &self,
        ray: &Ray,
        range: Range<f32>,
        candidates: &[Rc<SceneNode>],
    ) -> Vec<Intersection>;
}

impl<H: HitTester> HitTester for RefCell<H> {
    fn intersect_objects(
        &self,
        ray: &Ray,
        range: Range<f32>,
        candidates: &[Rc<SceneNode>],
    ) -> Vec<Intersection> {
        self.borrow().intersect_objects(ray, range, candidates)
    }
}

/// Compares two optional node handles by identity.
pub(crate) fn same_node(a: Option<&Rc<SceneNode>>, b: Option<&Rc<SceneNode>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.id() == b.id(),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestors_walks_to_root() {
        let root = SceneNode::new("root");
        let mid = SceneNode::with_parent("mid", &root);
        let leaf = SceneNode::with_parent("leaf", &mid);

        let names: Vec<String> = leaf.ancestors().map(|n| n.name().to_string()).collect();
        assert_eq!(names, vec!["leaf", "mid", "root"]);
    }

    #[test]
    fn test_parent_link_is_weak() {
        let leaf = {
            let parent = SceneNode::new("parent");
            SceneNode::with_parent("leaf", &parent)
        };
        assert!(leaf.parent().is_none());
        assert_eq!(leaf.ancestors().count(), 1);
    }

    #[test]
    fn test_detach_clears_parent() {
        let parent = SceneNode::new("parent");
        let child = SceneNode::with_parent("child", &parent);
        assert_eq!(child.parent().unwrap().id(), parent.id());

        SceneNode::detach(&child);
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_same_node() {
        let a = SceneNode::new("a");
        let b = SceneNode::new("b");
        assert!(same_node(Some(&a), Some(&a.clone())));
        assert!(!same_node(Some(&a), Some(&b)));
        assert!(!same_node(Some(&a), None));
        assert!(same_node(None, None));
    }
}
