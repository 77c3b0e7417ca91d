use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn sum_of(a: Vec2, b: Vec2) -> Vec2 {
        a + b
    }

    /// In-place translation. Every other operation returns a new value.
    pub fn add(&mut self, x: f32, y: f32) {
        self.x += x;
        self.y += y;
    }

    pub fn scaled(self, factor: f32) -> Vec2 {
        Vec2 {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        (self - other).length_squared()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Unit-length copy of this vector. The zero vector normalizes to itself.
    pub fn normalize(self) -> Vec2 {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Vec2::ZERO;
        }
        self.scaled(length.recip())
    }

    /// Screen-space angle (y grows downward, so it is negated).
    pub fn angle(self) -> f32 {
        (-self.y).atan2(self.x)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        self.scaled(rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() <= 1e-5,
            "{actual} vs {expected}"
        );
    }

    #[test]
    fn arithmetic_does_not_mutate_operands() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);
        let sum = Vec2::sum_of(a, b);
        let scaled = a.scaled(3.0);

        assert_eq!(sum, Vec2::new(4.0, 1.0));
        assert_eq!(scaled, Vec2::new(3.0, 6.0));
        assert_eq!(a, Vec2::new(1.0, 2.0));
        assert_eq!(b, Vec2::new(3.0, -1.0));
    }

    #[test]
    fn in_place_add_moves_the_receiver() {
        let mut position = Vec2::new(10.0, 10.0);
        Vec2::add(&mut position, 2.5, -1.0);
        assert_eq!(position, Vec2::new(12.5, 9.0));
    }

    #[test]
    fn normalize_produces_unit_length() {
        let direction = Vec2::new(3.0, 4.0).normalize();
        assert_close(direction.length(), 1.0);
        assert_close(direction.x, 0.6);
        assert_close(direction.y, 0.8);
    }

    #[test]
    fn normalize_of_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn dot_and_distance() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert_close(a.dot(b), 0.0);
        assert_close(a.distance(b), 2f32.sqrt());
        assert_close(Vec2::new(2.0, 3.0).distance_squared(Vec2::new(5.0, 7.0)), 25.0);
    }

    #[test]
    fn angle_treats_y_as_screen_down() {
        assert_close(Vec2::new(0.0, -1.0).angle(), std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_close(lerp(0.0, 16.0, 0.5), 8.0);
        assert_close(lerp(4.0, 12.0, 0.0), 4.0);
        assert_close(lerp(4.0, 12.0, 1.0), 12.0);
    }
}
