use std::sync::Arc;

use crate::graphics::{Bitmap, Paint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle; `top < bottom` in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rectangle {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Closed-interval overlap; rectangles sharing only an edge intersect.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }

    pub fn inflate(&self, amount: f64) -> Rectangle {
        Rectangle::new(
            self.left - amount,
            self.top - amount,
            self.right + amount,
            self.bottom + amount,
        )
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rectangle {
        Rectangle::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }
}

/// A point symbol. `point` is the top-left corner of the bitmap; way symbols
/// additionally carry a rotation and are drawn centered on `point`.
#[derive(Debug, Clone)]
pub struct SymbolContainer {
    pub symbol: Arc<Bitmap>,
    pub point: Point,
    pub align_center: bool,
    pub rotation: f32,
}

impl SymbolContainer {
    pub fn new(symbol: Arc<Bitmap>, point: Point) -> Self {
        Self {
            symbol,
            point,
            align_center: false,
            rotation: 0.0,
        }
    }

    pub fn rotated(symbol: Arc<Bitmap>, point: Point, align_center: bool, rotation: f32) -> Self {
        Self {
            symbol,
            point,
            align_center,
            rotation,
        }
    }

    pub fn width(&self) -> f64 {
        self.symbol.width() as f64
    }

    pub fn height(&self) -> f64 {
        self.symbol.height() as f64
    }

    pub fn boundary(&self) -> Rectangle {
        Rectangle::new(
            self.point.x,
            self.point.y,
            self.point.x + self.width(),
            self.point.y + self.height(),
        )
    }
}

/// A caption anchored at a point. `y` is the text baseline; the boundary
/// spans `[x, x + width] x [y - height, y]`.
#[derive(Debug, Clone)]
pub struct PointTextContainer {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub paint_front: Paint,
    pub paint_back: Option<Paint>,
    pub symbol: Option<Arc<SymbolContainer>>,
}

impl PointTextContainer {
    pub fn new(text: impl Into<String>, x: f64, y: f64, paint_front: Paint, paint_back: Option<Paint>) -> Self {
        let text = text.into();
        let measuring = paint_back.as_ref().unwrap_or(&paint_front);
        let width = measuring.get_text_width(&text);
        let height = measuring.get_text_height();
        Self {
            text,
            x,
            y,
            width,
            height,
            paint_front,
            paint_back,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: Arc<SymbolContainer>) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn boundary(&self) -> Rectangle {
        Rectangle::new(self.x, self.y - self.height, self.x + self.width, self.y)
    }

    /// Seam-duplicate identity: same text drawn with the same paints.
    pub fn is_duplicate_of(&self, other: &PointTextContainer) -> bool {
        self.text == other.text
            && self.paint_front == other.paint_front
            && self.paint_back == other.paint_back
    }
}

/// A way name drawn along one straight segment. The segment is oriented so
/// that `x1 <= x2`, which keeps the glyph run upright.
#[derive(Debug, Clone)]
pub struct WayTextContainer {
    pub text: String,
    pub paint: Paint,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl WayTextContainer {
    pub fn new(text: impl Into<String>, paint: Paint, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let (x1, y1, x2, y2) = if x1 <= x2 {
            (x1, y1, x2, y2)
        } else {
            (x2, y2, x1, y1)
        };
        Self {
            text: text.into(),
            paint,
            x1,
            y1,
            x2,
            y2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rectangles_intersect() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&b.translated(1.0, 0.0)));
        assert!(a.intersects(&b.translated(-1.0, 0.0)));
    }

    #[test]
    fn inflate_grows_every_edge() {
        let r = Rectangle::new(5.0, 5.0, 10.0, 10.0).inflate(2.0);
        assert_eq!(r, Rectangle::new(3.0, 3.0, 12.0, 12.0));
    }

    #[test]
    fn way_text_is_oriented_left_to_right() {
        let paint = Paint::fill(0xff000000);
        let way_text = WayTextContainer::new("Main Street", paint, 50.0, 10.0, 20.0, 40.0);
        assert!(way_text.x1 <= way_text.x2);
        assert_eq!(way_text.y1, 40.0);
    }
}
