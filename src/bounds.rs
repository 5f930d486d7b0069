use glam::Vec3;

/// Axis-aligned bounding box grown incrementally from sample points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: Vec3,
    max: Vec3,
    empty: bool,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
            empty: true,
        }
    }
}

impl Bounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the box to include `point`. The first point added becomes both
    /// corners.
    pub fn add(&mut self, point: Vec3) {
        if self.empty {
            self.min = point;
            self.max = point;
            self.empty = false;
        } else {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        !self.empty && point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}
