use super::{HitTester, Intersection, ObjectId, SceneNode};
use crate::math::{Ray, Vec3};
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

/// Axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    /// Slab test. Returns the distance along `ray` to the first surface hit
    /// inside `range`, or `None` on a miss.
    ///
    /// A ray starting inside the box reports the exit distance.
    pub fn intersect(&self, ray: &Ray, range: &Range<f32>) -> Option<f32> {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;
        let t_enter = t0.min(t1).max_element();
        let t_exit = t0.max(t1).min_element();

        if t_exit < t_enter || t_exit < range.start {
            return None;
        }

        let t = if t_enter >= range.start { t_enter } else { t_exit };
        (t <= range.end).then_some(t)
    }
}

/// A [`HitTester`] that picks objects by their world-space bounding boxes.
///
/// Good enough for demos and tests; hosts with real geometry should implement
/// [`HitTester`] over their own ray caster.
#[derive(Debug, Default)]
pub struct BoundsHitTester {
    bounds: HashMap<ObjectId, Aabb>,
}

impl BoundsHitTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bounds(&mut self, object: &SceneNode, aabb: Aabb) {
        self.bounds.insert(object.id(), aabb);
    }
}

impl HitTester for BoundsHitTester {
    fn intersect_objects(
        &self,
        ray: &Ray,
        range: Range<f32>,
        candidates: &[Rc<SceneNode>],
    ) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = candidates
            .iter()
            .filter_map(|object| {
                let aabb = self.bounds.get(&object.id())?;
                let distance = aabb.intersect(ray, &range)?;
                Some(Intersection::new(
                    Rc::clone(object),
                    distance,
                    ray.at(distance),
                ))
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
