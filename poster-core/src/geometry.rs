/// Axis-aligned bounding box. (left, bottom) is the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        BBox {
            left,
            bottom,
            width,
            height,
        }
    }

    /// Box spanning two corner points in any order.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        BBox {
            left: x0.min(x1),
            bottom: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::from_corners(
            self.left.min(other.left),
            self.bottom.min(other.bottom),
            self.right().max(other.right()),
            self.top().max(other.top()),
        )
    }

    /// Bounding box of this box after applying `t`.
    pub fn transformed(&self, t: &Transform) -> BBox {
        let corners = [
            t.apply(self.left, self.bottom),
            t.apply(self.right(), self.bottom),
            t.apply(self.left, self.top()),
            t.apply(self.right(), self.top()),
        ];
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        BBox::from_corners(min_x, min_y, max_x, max_y)
    }

    /// Closed rectangular path tracing this box.
    pub fn to_path(&self) -> Path {
        Path::rect(self.left, self.bottom, self.width, self.height)
    }
}

/// Affine transform `[a b c d e f]`, mapping (x, y) to
/// (a·x + c·y + e, b·x + d·y + f) as in PDF and PostScript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Transform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Transform {
            e: tx,
            f: ty,
            ..Transform::identity()
        }
    }

    pub fn scale(s: f64) -> Self {
        Transform {
            a: s,
            d: s,
            ..Transform::identity()
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Transform::identity()
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Transform that applies `inner` first, then `self`.
    pub fn then(&self, inner: &Transform) -> Transform {
        Transform {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    /// Components in `[a b c d e f]` order.
    pub fn components(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

/// One element of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    Close,
}

/// A vector path built from straight and cubic Bézier segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

/// Control-point distance for a quarter circle approximated by one
/// cubic Bézier.
const KAPPA: f64 = 0.552_284_749_8;

impl Path {
    pub fn new() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Segment::MoveTo(x, y));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Segment::LineTo(x, y));
        self
    }

    pub fn curve_to(
        mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) -> Self {
        self.segments
            .push(Segment::CurveTo(x1, y1, x2, y2, x3, y3));
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(Segment::Close);
        self
    }

    /// Straight line from (x0, y0) to (x1, y1).
    pub fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Path::new().move_to(x0, y0).line_to(x1, y1)
    }

    /// Closed rectangle with lower-left corner (x, y).
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Path::new()
            .move_to(x, y)
            .line_to(x + width, y)
            .line_to(x + width, y + height)
            .line_to(x, y + height)
            .close()
    }

    /// Rectangle whose corners are replaced by quarter circles. The
    /// radius is clamped to half the shorter side.
    pub fn rounded_rect(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
    ) -> Self {
        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        if r == 0.0 {
            return Path::rect(x, y, width, height);
        }
        let k = r * KAPPA;
        let (x1, y1) = (x + width, y + height);
        Path::new()
            .move_to(x + r, y)
            .line_to(x1 - r, y)
            .curve_to(x1 - r + k, y, x1, y + r - k, x1, y + r)
            .line_to(x1, y1 - r)
            .curve_to(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1)
            .line_to(x + r, y1)
            .curve_to(x + r - k, y1, x, y1 - r + k, x, y1 - r)
            .line_to(x, y + r)
            .curve_to(x, y + r - k, x + r - k, y, x + r, y)
            .close()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Bounding box of all points, including Bézier control points.
    /// Returns None for an empty path.
    pub fn bbox(&self) -> Option<BBox> {
        let mut points = Vec::new();
        for seg in &self.segments {
            match *seg {
                Segment::MoveTo(x, y) | Segment::LineTo(x, y) => {
                    points.push((x, y))
                }
                Segment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                    points.extend([(x1, y1), (x2, y2), (x3, y3)])
                }
                Segment::Close => {}
            }
        }
        let (&(fx, fy), rest) = points.split_first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (fx, fy, fx, fy);
        for &(x, y) in rest {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Some(BBox::from_corners(x0, y0, x1, y1))
    }
}
