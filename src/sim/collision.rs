//! Axis-aligned collision detection and push-out
//!
//! Every movable (player or entity) is tested against every static box in its
//! room once per tick. The resolver picks ONE axis per pair so that a box
//! sliding along a wall never gets shoved sideways by the same block.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Overlap below this is treated as touching, not penetrating
pub const CONTACT_EPSILON: f32 = 1e-4;

/// A center-anchored axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Box of `size` centered on `pos`
    pub fn around(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x - self.w / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y - self.h / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Inclusive point test (used for interaction picking)
    pub fn contains(&self, point: Vec2) -> bool {
        self.left() <= point.x
            && point.x <= self.right()
            && self.top() <= point.y
            && point.y <= self.bottom()
    }

    /// Penetration depth along each axis (non-positive = separated)
    pub fn overlap(&self, other: &Bounds) -> (f32, f32) {
        let x = self.right().min(other.right()) - self.left().max(other.left());
        let y = self.bottom().min(other.bottom()) - self.top().max(other.top());
        (x, y)
    }

    /// True when the boxes penetrate on both axes
    pub fn overlaps(&self, other: &Bounds) -> bool {
        let (x, y) = self.overlap(other);
        x > CONTACT_EPSILON && y > CONTACT_EPSILON
    }
}

/// Which way a movable must be pushed to leave a block.
///
/// North is -y, west is -x (screen coordinates). At most one flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Push {
    pub south: bool,
    pub east: bool,
    pub north: bool,
    pub west: bool,
}

impl Push {
    pub const NONE: Push = Push {
        south: false,
        east: false,
        north: false,
        west: false,
    };

    pub fn any(&self) -> bool {
        self.south || self.east || self.north || self.west
    }
}

/// Determine the push direction for `object` penetrating `block`.
///
/// The axis with the smaller overlap resolves the pair (vertical wins ties),
/// and the other axis is suppressed. On the resolving axis, the block edge
/// lying strictly inside the object's span picks the side; if both or neither
/// do, the object goes north/west when its center is at or before the block's.
pub fn collides(block: &Bounds, object: &Bounds) -> Push {
    let (overlap_x, overlap_y) = object.overlap(block);
    if overlap_x <= CONTACT_EPSILON || overlap_y <= CONTACT_EPSILON {
        return Push::NONE;
    }

    if overlap_y <= overlap_x {
        let top_inside = object.top() < block.top() && block.top() < object.bottom();
        let bottom_inside = object.top() < block.bottom() && block.bottom() < object.bottom();
        let north = match (top_inside, bottom_inside) {
            (true, false) => true,
            (false, true) => false,
            _ => object.y <= block.y,
        };
        Push {
            north,
            south: !north,
            ..Push::NONE
        }
    } else {
        let left_inside = object.left() < block.left() && block.left() < object.right();
        let right_inside = object.left() < block.right() && block.right() < object.right();
        let west = match (left_inside, right_inside) {
            (true, false) => true,
            (false, true) => false,
            _ => object.x <= block.x,
        };
        Push {
            west,
            east: !west,
            ..Push::NONE
        }
    }
}

/// Snap a movable flush against `block` if it penetrates it.
///
/// Returns the push that was applied.
pub fn resolve(block: &Bounds, pos: &mut Vec2, size: Vec2) -> Push {
    let push = collides(block, &Bounds::around(*pos, size));
    if push.south {
        pos.y = block.bottom() + size.y / 2.0;
    }
    if push.east {
        pos.x = block.right() + size.x / 2.0;
    }
    if push.north {
        pos.y = block.top() - size.y / 2.0;
    }
    if push.west {
        pos.x = block.left() - size.x / 2.0;
    }
    push
}

/// Resolve against each box in order
pub fn resolve_all<'a>(
    boxes: impl IntoIterator<Item = &'a Bounds>,
    pos: &mut Vec2,
    size: Vec2,
) -> bool {
    let mut hit = false;
    for block in boxes {
        hit |= resolve(block, pos, size).any();
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Bounds {
        Bounds::new(0.0, 0.0, 4.0, 1.0)
    }

    #[test]
    fn test_separated_boxes_do_not_push() {
        let obj = Bounds::new(0.0, 2.0, 0.75, 0.75);
        assert_eq!(collides(&wall(), &obj), Push::NONE);
    }

    #[test]
    fn test_touching_boxes_do_not_push() {
        // Bottom edge exactly on the wall's top edge
        let obj = Bounds::new(0.0, -0.5 - 0.375, 0.75, 0.75);
        assert!(!collides(&wall(), &obj).any());
    }

    #[test]
    fn test_push_north_from_above() {
        let obj = Bounds::new(0.5, -0.7, 0.75, 0.75);
        let push = collides(&wall(), &obj);
        assert_eq!(
            push,
            Push {
                north: true,
                ..Push::NONE
            }
        );
    }

    #[test]
    fn test_push_south_from_below() {
        let obj = Bounds::new(-1.0, 0.7, 0.75, 0.75);
        assert!(collides(&wall(), &obj).south);
    }

    #[test]
    fn test_push_east_and_west_at_the_ends() {
        let east = Bounds::new(2.2, 0.0, 0.75, 0.75);
        let push = collides(&wall(), &east);
        assert!(push.east && !push.north && !push.south);

        let west = Bounds::new(-2.2, 0.1, 0.75, 0.75);
        assert!(collides(&wall(), &west).west);
    }

    #[test]
    fn test_only_one_axis_at_corners() {
        // Clipping the top-left corner, deeper horizontally than vertically
        let obj = Bounds::new(-2.0, -0.6, 0.75, 0.75);
        let push = collides(&wall(), &obj);
        assert!(push.north);
        assert!(!push.west && !push.east && !push.south);
    }

    #[test]
    fn test_fully_inside_tie_break_is_north() {
        // Square object dead-center in a square block: equal overlaps, so the
        // vertical axis resolves, and a centered object goes north.
        let block = Bounds::new(0.0, 0.0, 2.0, 2.0);
        let obj = Bounds::new(0.0, 0.0, 0.5, 0.5);
        assert_eq!(
            collides(&block, &obj),
            Push {
                north: true,
                ..Push::NONE
            }
        );

        // Just below center goes south
        let obj = Bounds::new(0.0, 0.01, 0.5, 0.5);
        assert!(collides(&block, &obj).south);
    }

    #[test]
    fn test_fully_inside_wide_block_resolves_horizontally() {
        // Tall narrow block, object inside it: x overlap smaller than y overlap
        let block = Bounds::new(0.0, 0.0, 1.0, 6.0);
        let obj = Bounds::new(0.2, 0.0, 0.75, 0.75);
        let push = collides(&block, &obj);
        assert!(push.east);
        assert!(!push.north && !push.south);
    }

    #[test]
    fn test_resolve_snaps_flush() {
        let mut pos = Vec2::new(0.5, -0.7);
        let size = Vec2::splat(0.75);
        let push = resolve(&wall(), &mut pos, size);
        assert!(push.north);
        assert!((pos.y - (-0.5 - 0.375)).abs() < 1e-6);
        assert!((pos.x - 0.5).abs() < 1e-6);
        assert!(!Bounds::around(pos, size).overlaps(&wall()));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let b = Bounds::new(1.0, 1.0, 2.0, 2.0);
        assert!(b.contains(Vec2::new(0.0, 0.0)));
        assert!(b.contains(Vec2::new(2.0, 2.0)));
        assert!(!b.contains(Vec2::new(2.01, 1.0)));
    }
}
