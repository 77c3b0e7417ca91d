use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneArea {
    Rect(Rect),
    /// Closed outline in world coordinates.
    Polygon(Vec<Vec2>),
}

impl ZoneArea {
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            ZoneArea::Rect(rect) => rect.contains(point),
            ZoneArea::Polygon(points) => polygon_contains(points, point),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            ZoneArea::Rect(rect) => *rect,
            ZoneArea::Polygon(points) => {
                let Some(first) = points.first() else {
                    return Rect::new(0.0, 0.0, 0.0, 0.0);
                };
                let (mut min, mut max) = (*first, *first);
                for point in &points[1..] {
                    min.x = min.x.min(point.x);
                    min.y = min.y.min(point.y);
                    max.x = max.x.max(point.x);
                    max.y = max.y.max(point.y);
                }
                Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
            }
        }
    }
}

// Even-odd ray cast toward +x.
fn polygon_contains(points: &[Vec2], point: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut previous = points[points.len() - 1];
    for &current in points {
        let crosses = (current.y > point.y) != (previous.y > point.y);
        if crosses {
            let intersect_x = current.x
                + (point.y - current.y) * (previous.x - current.x) / (previous.y - current.y);
            if point.x < intersect_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    id: ZoneId,
    areas: Vec<ZoneArea>,
    bounds: Rect,
}

impl Zone {
    pub fn new(id: ZoneId, first_area: ZoneArea) -> Self {
        let bounds = first_area.bounds();
        Self {
            id,
            areas: vec![first_area],
            bounds,
        }
    }

    pub fn push_area(&mut self, area: ZoneArea) {
        self.bounds = self.bounds.union(&area.bounds());
        self.areas.push(area);
    }

    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn areas(&self) -> &[ZoneArea] {
        &self.areas
    }

    /// Union of every area's bounding box.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.areas.iter().any(|area| area.contains(point))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    pub position: Vec2,
    pub spawn_type: String,
    pub zone: Option<ZoneId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> ZoneArea {
        ZoneArea::Polygon(vec![
            Vec2::new(50.0, 0.0),
            Vec2::new(100.0, 50.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(0.0, 50.0),
        ])
    }

    #[test]
    fn rect_containment_is_half_open() {
        let area = ZoneArea::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(area.contains(Vec2::new(0.0, 0.0)));
        assert!(area.contains(Vec2::new(9.99, 9.99)));
        assert!(!area.contains(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn polygon_containment_excludes_corners_of_bounding_box() {
        let area = diamond();
        assert!(area.contains(Vec2::new(50.0, 50.0)));
        assert!(!area.contains(Vec2::new(5.0, 5.0)));
        assert!(!area.contains(Vec2::new(95.0, 95.0)));
        assert_eq!(area.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn zone_bounds_are_union_of_area_bounds() {
        let mut zone = Zone::new(ZoneId(3), ZoneArea::Rect(Rect::new(0.0, 0.0, 100.0, 50.0)));
        zone.push_area(ZoneArea::Rect(Rect::new(80.0, 40.0, 60.0, 60.0)));

        assert_eq!(zone.bounds(), Rect::new(0.0, 0.0, 140.0, 100.0));
        assert!(zone.contains(Vec2::new(130.0, 90.0)));
        assert!(!zone.contains(Vec2::new(10.0, 90.0)));
    }
}
