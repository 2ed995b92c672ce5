use crate::{Interval, Ray, Vec3};

/// Minimum thickness of every axis of a bounding box.
///
/// Flat geometry (an axis-aligned triangle, a quad) would otherwise produce a
/// zero-width slab that the ray test can never enter.
pub const MIN_AXIS_THICKNESS: f32 = 0.0001;

/// Axis-aligned bounding box used by the BVH.
///
/// Defined by three intervals, one per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// A box that contains nothing. Neutral element for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create a new AABB from three intervals, padding thin axes.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two opposite corners (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self::new(
            Interval::new(lo.x, hi.x),
            Interval::new(lo.y, hi.y),
            Interval::new(lo.z, hi.z),
        )
    }

    /// Smallest box enclosing every point in `points`. Empty input gives [`Aabb::EMPTY`].
    pub fn from_point_cloud<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::EMPTY;
        };
        let (lo, hi) = iter.fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Self::from_points(lo, hi)
    }

    /// Union of two boxes.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Interval for an axis (0=X, 1=Y, 2=Z).
    #[inline]
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Slab test: does the ray pass through the box for some `t` in `ray_t`?
    ///
    /// The reciprocal direction turns an axis-parallel ray into `±inf` plane
    /// parameters; ordering each pair with min/max copes with that and with
    /// negative directions without branching on the sign.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        // Inverted slabs give ±inf plane parameters that never narrow `ray_t`
        if self.is_empty() {
            return false;
        }

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let inv_d = 1.0 / r.direction[axis];
            let origin = r.origin[axis];

            let t0 = (slab.min - origin) * inv_d;
            let t1 = (slab.max - origin) * inv_d;

            ray_t.min = t0.min(t1).max(ray_t.min);
            ray_t.max = t0.max(t1).min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    /// Total surface area; zero for an empty box.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let (dx, dy, dz) = (self.x.size(), self.y.size(), self.z.size());
        2.0 * (dx * dy + dy * dz + dz * dx)
    }

    /// Index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (x, y, z) = (self.x, self.y, self.z);
        [
            Vec3::new(x.min, y.min, z.min),
            Vec3::new(x.max, y.min, z.min),
            Vec3::new(x.min, y.max, z.min),
            Vec3::new(x.max, y.max, z.min),
            Vec3::new(x.min, y.min, z.max),
            Vec3::new(x.max, y.min, z.max),
            Vec3::new(x.min, y.max, z.max),
            Vec3::new(x.max, y.max, z.max),
        ]
    }

    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_AXIS_THICKNESS {
            self.x = self.x.expand(MIN_AXIS_THICKNESS);
        }
        if self.y.size() < MIN_AXIS_THICKNESS {
            self.y = self.y.expand(MIN_AXIS_THICKNESS);
        }
        if self.z.size() < MIN_AXIS_THICKNESS {
            self.z = self.z.expand(MIN_AXIS_THICKNESS);
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
