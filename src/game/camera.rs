//! # Camera
//!
//! Viewport that follows the player across an environment's map.

use super::Position;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A viewport into a map, measured in tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    /// Left-most visible column
    pub x: i32,
    /// Top-most visible row
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Centers the viewport on `target`, clamped so it never shows space past
    /// the map edges. A map smaller than the viewport pins it to the origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Camera, Position};
    ///
    /// let mut camera = Camera::new(10, 10);
    /// camera.follow(Position::new(50, 50), 100, 100);
    /// assert_eq!((camera.x, camera.y), (45, 45));
    ///
    /// camera.follow(Position::new(1, 1), 100, 100);
    /// assert_eq!((camera.x, camera.y), (0, 0));
    /// ```
    pub fn follow(&mut self, target: Position, map_width: u32, map_height: u32) {
        self.x = Self::clamp_axis(target.x - self.width as i32 / 2, self.width, map_width);
        self.y = Self::clamp_axis(target.y - self.height as i32 / 2, self.height, map_height);
    }

    fn clamp_axis(start: i32, view: u32, map: u32) -> i32 {
        let max_start = map as i32 - view as i32;
        if max_start <= 0 {
            0
        } else {
            start.clamp(0, max_start)
        }
    }

    /// Visible columns.
    pub fn columns(&self) -> Range<i32> {
        self.x..self.x + self.width as i32
    }

    /// Visible rows.
    pub fn rows(&self) -> Range<i32> {
        self.y..self.y + self.height as i32
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.columns().contains(&pos.x) && self.rows().contains(&pos.y)
    }

    /// Converts a map position to viewport-relative coordinates.
    pub fn to_screen(&self, pos: Position) -> Option<(u32, u32)> {
        if self.contains(pos) {
            Some(((pos.x - self.x) as u32, (pos.y - self.y) as u32))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_centers_target() {
        let mut camera = Camera::new(20, 15);
        camera.follow(Position::new(50, 40), 100, 75);
        assert_eq!(camera.x, 40);
        assert_eq!(camera.y, 33);
        assert!(camera.contains(Position::new(50, 40)));
    }

    #[test]
    fn test_follow_clamps_to_far_edge() {
        let mut camera = Camera::new(20, 15);
        camera.follow(Position::new(99, 74), 100, 75);
        assert_eq!(camera.x, 80);
        assert_eq!(camera.y, 60);
        assert_eq!(camera.columns().end, 100);
    }

    #[test]
    fn test_small_map_pins_origin() {
        let mut camera = Camera::new(20, 15);
        camera.follow(Position::new(5, 5), 12, 10);
        assert_eq!((camera.x, camera.y), (0, 0));
    }

    #[test]
    fn test_to_screen() {
        let mut camera = Camera::new(10, 10);
        camera.follow(Position::new(30, 30), 100, 100);
        assert_eq!(camera.to_screen(Position::new(30, 30)), Some((5, 5)));
        assert_eq!(camera.to_screen(Position::new(0, 0)), None);
    }
}
