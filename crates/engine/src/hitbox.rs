use crate::math::Vec2;

/// Axis-aligned box defined by two corners local to its owner plus a world
/// offset. The owner refreshes the offset every tick before any query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AabbHitbox {
    top_left_local: Vec2,
    bottom_right_local: Vec2,
    offset: Vec2,
}

impl AabbHitbox {
    pub fn new(corner_a: Vec2, corner_b: Vec2) -> Self {
        Self {
            top_left_local: Vec2::new(corner_a.x.min(corner_b.x), corner_a.y.min(corner_b.y)),
            bottom_right_local: Vec2::new(corner_a.x.max(corner_b.x), corner_a.y.max(corner_b.y)),
            offset: Vec2::ZERO,
        }
    }

    pub fn from_offset_and_size(top_left_local: Vec2, size: Vec2) -> Self {
        Self::new(top_left_local, top_left_local + size)
    }

    pub fn top_left_local(&self) -> Vec2 {
        self.top_left_local
    }

    pub fn bottom_right_local(&self) -> Vec2 {
        self.bottom_right_local
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn top_left(&self) -> Vec2 {
        self.top_left_local + self.offset
    }

    pub fn bottom_right(&self) -> Vec2 {
        self.bottom_right_local + self.offset
    }

    pub fn width(&self) -> f32 {
        self.bottom_right_local.x - self.top_left_local.x
    }

    pub fn height(&self) -> f32 {
        self.bottom_right_local.y - self.top_left_local.y
    }

    pub fn center(&self) -> Vec2 {
        let top_left = self.top_left();
        Vec2::new(
            top_left.x + self.width() * 0.5,
            top_left.y + self.height() * 0.5,
        )
    }

    /// Separating-axis test. Boxes that merely touch count as overlapping.
    pub fn collides(&self, other: &AabbHitbox) -> bool {
        let (a_min, a_max) = (self.top_left(), self.bottom_right());
        let (b_min, b_max) = (other.top_left(), other.bottom_right());
        if a_min.x > b_max.x || a_max.x < b_min.x {
            return false;
        }
        if a_min.y > b_max.y || a_max.y < b_min.y {
            return false;
        }
        true
    }
}
