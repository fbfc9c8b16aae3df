//! Geometry primitives - Point, Rect, Matrix

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn transform(&self, m: &Matrix) -> Self {
        Self {
            x: self.x * m.a + self.y * m.c + m.e,
            y: self.x * m.b + self.y * m.d + m.f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        x0: f32::INFINITY,
        y0: f32::INFINITY,
        x1: f32::NEG_INFINITY,
        y1: f32::NEG_INFINITY,
    };
    pub const INFINITE: Rect = Rect {
        x0: f32::NEG_INFINITY,
        y0: f32::NEG_INFINITY,
        x1: f32::INFINITY,
        y1: f32::INFINITY,
    };

    #[inline]
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle spanning two corners given in any order
    #[inline]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.x0 == f32::NEG_INFINITY
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    #[inline]
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    #[inline]
    pub fn include_point(&mut self, p: Point) {
        self.x0 = self.x0.min(p.x);
        self.y0 = self.y0.min(p.y);
        self.x1 = self.x1.max(p.x);
        self.y1 = self.y1.max(p.y);
    }

    /// Transform rectangle by a matrix.
    ///
    /// The result is the bounding box of the four transformed corners, so it
    /// is normalized even when the matrix mirrors or swaps the axes.
    /// Zero-area rectangles are transformed too; only infinite ones pass
    /// through unchanged.
    pub fn transform(&self, m: &Matrix) -> Rect {
        if self.is_infinite() {
            return *self;
        }

        let p0 = Point::new(self.x0, self.y0).transform(m);
        let p1 = Point::new(self.x1, self.y0).transform(m);
        let p2 = Point::new(self.x0, self.y1).transform(m);
        let p3 = Point::new(self.x1, self.y1).transform(m);

        let mut result = Rect::EMPTY;
        result.include_point(p0);
        result.include_point(p1);
        result.include_point(p2);
        result.include_point(p3);
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    #[inline]
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[inline]
    pub fn translate(tx: f32, ty: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    #[inline]
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Rotation by `degrees`; quarter turns are exact.
    pub fn rotate(degrees: f32) -> Self {
        let mut degrees = degrees % 360.0;
        if degrees < 0.0 {
            degrees += 360.0;
        }
        let (s, c) = if degrees == 0.0 {
            (0.0, 1.0)
        } else if degrees == 90.0 {
            (1.0, 0.0)
        } else if degrees == 180.0 {
            (0.0, -1.0)
        } else if degrees == 270.0 {
            (-1.0, 0.0)
        } else {
            let rad = degrees.to_radians();
            (rad.sin(), rad.cos())
        };
        Self {
            a: c,
            b: s,
            c: -s,
            d: c,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Apply `self` first, then `m`.
    #[inline]
    pub fn concat(&self, m: &Matrix) -> Self {
        Self {
            a: self.a * m.a + self.b * m.c,
            b: self.a * m.b + self.b * m.d,
            c: self.c * m.a + self.d * m.c,
            d: self.c * m.b + self.d * m.d,
            e: self.e * m.a + self.f * m.c + m.e,
            f: self.e * m.b + self.f * m.d + m.f,
        }
    }

    /// Transform a point by this matrix
    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        p.transform(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_transform_translate() {
        let p = Point::new(1.0, 2.0).transform(&Matrix::translate(10.0, 20.0));
        assert_eq!(p, Point::new(11.0, 22.0));
    }

    #[test]
    fn test_point_transform_flip() {
        let m = Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, 792.0);
        let p = m.transform_point(Point::new(100.0, 700.0));
        assert_eq!(p, Point::new(100.0, 92.0));
    }

    #[test]
    fn test_rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(r, Rect::new(10.0, 20.0, 50.0, 80.0));
    }

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
        assert!(!r.is_empty());
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(5.0, 5.0));
        assert!(r.contains(0.0, 0.0));
        assert!(!r.contains(10.0, 10.0));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.intersect(&b), Rect::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_rect_transform_swaps_axes() {
        let swap = Matrix::new(0.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let r = Rect::new(10.0, 20.0, 50.0, 80.0).transform(&swap);
        assert_eq!(r, Rect::new(20.0, 10.0, 80.0, 50.0));
    }

    #[test]
    fn test_rect_transform_mirror_stays_normalized() {
        let r = Rect::new(10.0, 20.0, 50.0, 80.0).transform(&Matrix::scale(-1.0, -1.0));
        assert_eq!(r, Rect::new(-50.0, -80.0, -10.0, -20.0));
        assert!(r.width() > 0.0 && r.height() > 0.0);
    }

    #[test]
    fn test_rect_transform_zero_area() {
        let r = Rect::new(5.0, 5.0, 5.0, 9.0).transform(&Matrix::translate(1.0, 1.0));
        assert_eq!(r, Rect::new(6.0, 6.0, 6.0, 10.0));
    }

    #[test]
    fn test_rect_transform_infinite() {
        let r = Rect::INFINITE.transform(&Matrix::scale(2.0, 2.0));
        assert!(r.is_infinite());
    }

    #[test]
    fn test_matrix_rotate_quadrants_exact() {
        assert_eq!(Matrix::rotate(0.0), Matrix::IDENTITY);
        assert_eq!(Matrix::rotate(90.0), Matrix::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0));
        assert_eq!(Matrix::rotate(-90.0), Matrix::rotate(270.0));
        assert_eq!(Matrix::rotate(180.0), Matrix::new(-1.0, 0.0, -0.0, -1.0, 0.0, 0.0));
    }

    #[test]
    fn test_matrix_rotate_arbitrary() {
        let m = Matrix::rotate(45.0);
        let p = m.transform_point(Point::new(1.0, 0.0));
        assert!((p.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((p.y - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_matrix_concat_order() {
        let m = Matrix::scale(2.0, 2.0).concat(&Matrix::translate(10.0, 0.0));
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn test_matrix_default_identity() {
        assert_eq!(Matrix::default(), Matrix::IDENTITY);
    }
}
