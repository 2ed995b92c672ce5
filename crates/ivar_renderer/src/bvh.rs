//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Median-object split: each range of surfaces is sorted along the longest
//! axis of its bounds and cut in half by count, so the tree is balanced by
//! object count. Nodes live in a flat arena and refer to each other (and to
//! the surfaces) by index.

use crate::{BuildError, HitRecord, Hittable, Ray};
use ivar_math::{Aabb, Interval};

/// One node of the arena.
#[derive(Debug, Clone, Copy)]
enum BvhNode {
    /// A single surface, by index into `Bvh::objects`.
    Leaf { object: usize, bbox: Aabb },
    /// Two child nodes, by index into `Bvh::nodes`.
    Branch {
        left: usize,
        right: usize,
        bbox: Aabb,
    },
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

/// Binary BVH over an owned collection of surfaces.
///
/// Immutable once built, so it can be shared across render threads.
pub struct Bvh<H> {
    objects: Vec<H>,
    nodes: Vec<BvhNode>,
    root: usize,
}

impl<H: Hittable> Bvh<H> {
    /// Build a BVH over `objects`.
    ///
    /// Surfaces keep their position in the collection; only an index
    /// permutation is sorted during construction.
    pub fn new(objects: Vec<H>) -> Result<Self, BuildError> {
        if objects.is_empty() {
            return Err(BuildError::Empty);
        }

        let boxes: Vec<Aabb> = objects.iter().map(|o| o.bounding_box()).collect();
        let mut order: Vec<usize> = (0..objects.len()).collect();
        let mut nodes = Vec::with_capacity(2 * objects.len());

        let root = build_range(&boxes, &mut order, &mut nodes);

        log::debug!(
            "Built BVH: {} surfaces, {} nodes, depth {}",
            objects.len(),
            nodes.len(),
            depth(&nodes, root)
        );

        Ok(Self {
            objects,
            nodes,
            root,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn objects(&self) -> &[H] {
        &self.objects
    }

    /// Give the surfaces back, dropping the tree.
    pub fn into_objects(self) -> Vec<H> {
        self.objects
    }

    fn hit_node<'a>(
        &'a self,
        node: usize,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        match self.nodes[node] {
            BvhNode::Leaf { object, bbox } => {
                bbox.hit(ray, ray_t) && self.objects[object].hit(ray, ray_t, rec)
            }
            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = self.hit_node(left, ray, ray_t, rec);

                // Only check right up to closest hit
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right = self.hit_node(right, ray, ray_t.with_max(right_max), rec);

                hit_left || hit_right
            }
        }
    }
}

impl<H: Hittable> Hittable for Bvh<H> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        self.hit_node(self.root, ray, ray_t, rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.nodes[self.root].bbox()
    }
}

/// Recursive construction over `order`, returning the index of the new node.
fn build_range(boxes: &[Aabb], order: &mut [usize], nodes: &mut Vec<BvhNode>) -> usize {
    let bounds = order
        .iter()
        .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &boxes[i]));
    let axis = bounds.longest_axis();
    let key = |i: usize| boxes[i].axis_interval(axis).min;

    let node = match order.len() {
        1 => BvhNode::Leaf {
            object: order[0],
            bbox: boxes[order[0]],
        },
        2 => {
            let (a, b) = (order[0], order[1]);
            let (first, second) = if key(a) <= key(b) { (a, b) } else { (b, a) };
            let left = push(nodes, BvhNode::Leaf {
                object: first,
                bbox: boxes[first],
            });
            let right = push(nodes, BvhNode::Leaf {
                object: second,
                bbox: boxes[second],
            });
            BvhNode::Branch {
                left,
                right,
                bbox: bounds,
            }
        }
        _ => {
            order.sort_unstable_by(|&a, &b| key(a).total_cmp(&key(b)));

            let mid = order.len() / 2;
            let (left_order, right_order) = order.split_at_mut(mid);
            let left = build_range(boxes, left_order, nodes);
            let right = build_range(boxes, right_order, nodes);

            let bbox = Aabb::surrounding(&nodes[left].bbox(), &nodes[right].bbox());
            BvhNode::Branch { left, right, bbox }
        }
    };

    push(nodes, node)
}

fn push(nodes: &mut Vec<BvhNode>, node: BvhNode) -> usize {
    nodes.push(node);
    nodes.len() - 1
}

fn depth(nodes: &[BvhNode], node: usize) -> usize {
    match nodes[node] {
        BvhNode::Leaf { .. } => 1,
        BvhNode::Branch { left, right, .. } => 1 + depth(nodes, left).max(depth(nodes, right)),
    }
}
