#![allow(dead_code)]

use strokematch::{Point, Stroke, Writing};

/// Builder for writings on the default 1000x1000 canvas.
pub struct WritingBuilder {
    writing: Writing,
}

impl WritingBuilder {
    pub fn new() -> Self {
        Self {
            writing: Writing::new(),
        }
    }

    pub fn canvas(mut self, width: u32, height: u32) -> Self {
        self.writing.set_size(width, height);
        self
    }

    pub fn stroke(mut self, coords: &[(i32, i32)]) -> Self {
        self.writing
            .append_stroke(Stroke::from_coordinates(coords))
            .expect("fixture strokes need points");
        self
    }

    /// Straight stroke from `a` to `b` with `n` evenly spaced points.
    pub fn line(mut self, a: (i32, i32), b: (i32, i32), n: usize) -> Self {
        let n = n.max(2);
        let points = (0..n).map(|k| {
            let t = k as f64 / (n - 1) as f64;
            Point::new(
                a.0 + ((b.0 - a.0) as f64 * t).round() as i32,
                a.1 + ((b.1 - a.1) as f64 * t).round() as i32,
            )
        });
        let mut stroke = Stroke::new();
        stroke.append_points(points);
        self.writing.append_stroke(stroke).expect("line has points");
        self
    }

    pub fn build(self) -> Writing {
        self.writing
    }
}

/// "一": one horizontal stroke.
pub fn ichi() -> Writing {
    WritingBuilder::new().line((150, 500), (850, 500), 20).build()
}

/// "二": two horizontal strokes, the upper one shorter.
pub fn ni() -> Writing {
    WritingBuilder::new()
        .line((250, 350), (750, 350), 15)
        .line((150, 650), (850, 650), 20)
        .build()
}

/// "丨": one vertical stroke.
pub fn gun() -> Writing {
    WritingBuilder::new().line((500, 150), (500, 850), 20).build()
}

/// A diagonal stroke, for a third distinct label.
pub fn diagonal() -> Writing {
    WritingBuilder::new().line((150, 150), (850, 850), 20).build()
}
