//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree never owns geometry: leaves hold indices into the scene's object
//! list, which stays the single owner. It is built once over the full list
//! and is read-only afterwards.

use crate::hittable::{Hit, Hittable};
use lumen_math::{Aabb, Interval, Ray};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Extra reach when culling boxes against the current closest hit, so an
/// object at exactly the same distance is still visited.
const TIE_SLACK: f32 = 1e-4;

/// BVH node - either a branch with two children or a leaf with object indices.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of objects.
    Leaf { objects: Vec<usize>, bbox: Aabb },
    /// No objects at all.
    Empty,
}

impl BvhNode {
    /// Build a BVH over every object in `objects`.
    pub fn new(objects: &[Box<dyn Hittable>]) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }
        let entries = objects
            .iter()
            .enumerate()
            .map(|(index, object)| (index, object.bounding_box()))
            .collect();
        let bvh = Self::build(entries);
        log::debug!(
            "BVH over {} objects: {} nodes, depth {}",
            objects.len(),
            bvh.node_count(),
            bvh.depth()
        );
        bvh
    }

    /// Recursive BVH construction.
    ///
    /// Simple median-split approach: sort objects by centroid on longest axis,
    /// split in half, recurse.
    fn build(mut entries: Vec<(usize, Aabb)>) -> Self {
        let bounds = entries
            .iter()
            .fold(Aabb::EMPTY, |acc, (_, b)| Aabb::surrounding(&acc, b));

        if entries.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects: entries.into_iter().map(|(index, _)| index).collect(),
                bbox: bounds,
            };
        }

        let centroid_bounds = entries.iter().fold(Aabb::EMPTY, |acc, (_, b)| {
            let c = b.centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        let axis = centroid_bounds.longest_axis();

        entries.sort_unstable_by(|(_, a), (_, b)| {
            a.centroid()[axis]
                .partial_cmp(&b.centroid()[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let right_entries = entries.split_off(entries.len() / 2);
        let left = Self::build(entries);
        let right = Self::build(right_entries);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Nearest hit among `objects` (the same list the tree was built from).
    ///
    /// Equal distances resolve to the lowest object index, which is what a
    /// front-to-back linear scan with a strict `<` produces.
    pub fn hit(
        &self,
        objects: &[Box<dyn Hittable>],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<(usize, Hit)> {
        let mut closest = None;
        self.hit_closest(objects, ray, ray_t, &mut closest);
        closest
    }

    fn hit_closest(
        &self,
        objects: &[Box<dyn Hittable>],
        ray: &Ray,
        ray_t: Interval,
        closest: &mut Option<(usize, Hit)>,
    ) {
        let cull = match closest {
            Some((_, best)) => ray_t.with_max(best.t + TIE_SLACK),
            None => ray_t,
        };

        match self {
            BvhNode::Empty => {}

            BvhNode::Leaf { objects: ids, bbox } => {
                if !bbox.hit(ray, cull) {
                    return;
                }
                for &id in ids {
                    // Full range: distances must match the linear scan bit for bit
                    let Some(hit) = objects[id].intersect(ray, ray_t) else {
                        continue;
                    };
                    let closer = match closest {
                        Some((best_id, best)) => {
                            hit.t < best.t || (hit.t == best.t && id < *best_id)
                        }
                        None => true,
                    };
                    if closer {
                        *closest = Some((id, hit));
                    }
                }
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, cull) {
                    return;
                }
                left.hit_closest(objects, ray, ray_t, closest);
                right.hit_closest(objects, ray, ray_t, closest);
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Total number of branch and leaf nodes.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Number of levels, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}
