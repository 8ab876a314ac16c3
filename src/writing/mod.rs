pub mod point;
pub mod stroke;

pub use self::point::Point;
pub use self::stroke::Stroke;

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, NORMALIZE_MIN_SIZE, NORMALIZE_PROPORTION};
use crate::error::{SmResult, StrokeMatchError};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Axis-aligned extent of every point in a writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A full multi-stroke glyph on a logical canvas.
///
/// Every stroke holds at least one point. The stroke setters and JSON
/// loading reject empty ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Writing {
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    #[serde(default, deserialize_with = "non_empty_strokes")]
    strokes: Vec<Stroke>,
}

fn non_empty_strokes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Stroke>, D::Error> {
    let strokes = Vec::<Stroke>::deserialize(deserializer)?;
    if let Some(i) = strokes.iter().position(Stroke::is_empty) {
        return Err(de::Error::custom(format!("stroke {} has no points", i)));
    }
    Ok(strokes)
}

fn check_stroke(stroke: &Stroke) -> SmResult<()> {
    if stroke.is_empty() {
        return Err(StrokeMatchError::MalformedInput(
            "a stroke needs at least one point".to_string(),
        ));
    }
    Ok(())
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl Default for Writing {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            strokes: Vec::new(),
        }
    }
}

impl Writing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a writing from raw `(x, y)` stroke lists on the default canvas.
    /// Empty lists are skipped.
    pub fn from_strokes(strokes: &[&[(i32, i32)]]) -> Self {
        Self {
            strokes: strokes
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| Stroke::from_coordinates(s))
                .collect(),
            ..Default::default()
        }
    }

    // --- Canvas ---

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    // --- Strokes ---

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn stroke(&self, i: usize) -> Option<&Stroke> {
        self.strokes.get(i)
    }

    pub fn n_strokes(&self) -> usize {
        self.strokes.len()
    }

    pub fn n_points(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// All points, strokes concatenated in drawing order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.strokes.iter().flat_map(|s| s.points().iter())
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.move_to_point(Point::new(x, y));
    }

    pub fn move_to_point(&mut self, point: Point) {
        let mut stroke = Stroke::new();
        stroke.append_point(point);
        self.strokes.push(stroke);
    }

    pub fn line_to(&mut self, x: i32, y: i32) -> SmResult<()> {
        self.line_to_point(Point::new(x, y))
    }

    pub fn line_to_point(&mut self, point: Point) -> SmResult<()> {
        let current = self.strokes.last_mut().ok_or_else(|| {
            StrokeMatchError::MalformedInput("line_to called before move_to".to_string())
        })?;
        current.append_point(point);
        Ok(())
    }

    pub fn append_stroke(&mut self, stroke: Stroke) -> SmResult<()> {
        check_stroke(&stroke)?;
        self.strokes.push(stroke);
        Ok(())
    }

    /// Inserts before the `i`-th stroke, or at the end when `i` is past it.
    pub fn insert_stroke(&mut self, i: usize, stroke: Stroke) -> SmResult<()> {
        check_stroke(&stroke)?;
        let at = i.min(self.strokes.len());
        self.strokes.insert(at, stroke);
        Ok(())
    }

    /// Removes the `i`-th stroke; out-of-range indices are ignored.
    pub fn remove_stroke(&mut self, i: usize) -> Option<Stroke> {
        (i < self.strokes.len()).then(|| self.strokes.remove(i))
    }

    pub fn remove_last_stroke(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub fn replace_stroke(&mut self, i: usize, stroke: Stroke) -> SmResult<Option<Stroke>> {
        check_stroke(&stroke)?;
        Ok(self
            .strokes
            .get_mut(i)
            .map(|slot| std::mem::replace(slot, stroke)))
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Time between the first and the last sample, if both are stamped.
    pub fn duration(&self) -> Option<i64> {
        let first = self.strokes.first()?.first()?.timestamp?;
        let last = self.strokes.last()?.last()?.timestamp?;
        Some(last - first)
    }

    // --- Geometry ---

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut points = self.points();
        let first = points.next()?;
        let (mut xmin, mut ymin, mut xmax, mut ymax) = (first.x, first.y, first.x, first.y);
        for p in points {
            xmin = xmin.min(p.x);
            ymin = ymin.min(p.y);
            xmax = xmax.max(p.x);
            ymax = ymax.max(p.y);
        }
        Some(BoundingBox {
            x: xmin,
            y: ymin,
            width: xmax - xmin,
            height: ymax - ymin,
        })
    }

    /// `(x, y, width, height)` of the glyph itself, not of the canvas.
    pub fn size(&self) -> Option<(i32, i32, i32, i32)> {
        self.bounding_box().map(|b| (b.x, b.y, b.width, b.height))
    }

    pub fn resize(&mut self, xrate: f64, yrate: f64) {
        for s in &mut self.strokes {
            s.resize(xrate, yrate);
        }
    }

    pub fn move_rel(&mut self, dx: i32, dy: i32) {
        for s in &mut self.strokes {
            s.move_rel(dx, dy);
        }
    }

    /// Whether the glyph was drawn inside one corner of the canvas.
    /// Only meaningful before `normalize`.
    pub fn is_small(&self) -> bool {
        let Some(b) = self.bounding_box() else {
            return false;
        };
        let lo_x = self.width as f64 * 0.44;
        let hi_x = self.width as f64 * 0.56;
        let lo_y = self.height as f64 * 0.44;
        let hi_y = self.height as f64 * 0.56;

        let left = ((b.x + b.width) as f64) <= hi_x;
        let right = (b.x as f64) >= lo_x;
        let top = ((b.y + b.height) as f64) <= hi_y;
        let bottom = (b.y as f64) >= lo_y;

        (left && top) || (right && top) || (left && bottom) || (right && bottom)
    }

    /// Scales the glyph to `NORMALIZE_PROPORTION` of the canvas, then
    /// centers it. A writing without points is left untouched.
    pub fn normalize(&mut self) {
        let Some(bbox) = self.bounding_box() else {
            return;
        };

        let xrate = axis_rate(bbox.width, self.width);
        let yrate = axis_rate(bbox.height, self.height);

        // Flooring is monotonic, so the scaled box follows from the old one.
        let scale = |v: i32, rate: f64| (v as f64 * rate).floor() as i32;
        let x0 = scale(bbox.x, xrate);
        let y0 = scale(bbox.y, yrate);
        let w = scale(bbox.x + bbox.width, xrate) - x0;
        let h = scale(bbox.y + bbox.height, yrate) - y0;

        self.resize(xrate, yrate);
        self.move_rel(
            centering_offset(self.width, w, x0),
            centering_offset(self.height, h, y0),
        );
    }

    pub fn normalize_size(&mut self) {
        if let Some(bbox) = self.bounding_box() {
            let xrate = axis_rate(bbox.width, self.width);
            let yrate = axis_rate(bbox.height, self.height);
            self.resize(xrate, yrate);
        }
    }

    pub fn normalize_position(&mut self) {
        if let Some(b) = self.bounding_box() {
            self.move_rel(
                centering_offset(self.width, b.width, b.x),
                centering_offset(self.height, b.height, b.y),
            );
        }
    }

    // --- Resampling ---

    pub fn smooth(&mut self) {
        for s in &mut self.strokes {
            s.smooth();
        }
    }

    pub fn downsample(&mut self, n: usize) -> SmResult<()> {
        for s in &mut self.strokes {
            s.downsample(n)?;
        }
        Ok(())
    }

    pub fn downsample_threshold(&mut self, threshold: f64) {
        for s in &mut self.strokes {
            s.downsample_threshold(threshold);
        }
    }

    pub fn upsample(&mut self, n: usize) {
        for s in &mut self.strokes {
            s.upsample(n);
        }
    }

    pub fn upsample_threshold(&mut self, threshold: f64) -> SmResult<()> {
        for s in &mut self.strokes {
            s.upsample_threshold(threshold)?;
        }
        Ok(())
    }

    // --- Serialization ---

    pub fn to_json(&self) -> SmResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Thin glyphs are not stretched on that axis.
fn axis_rate(extent: i32, canvas: u32) -> f64 {
    let canvas = canvas as f64;
    if extent as f64 / canvas > NORMALIZE_MIN_SIZE {
        canvas * NORMALIZE_PROPORTION / extent as f64
    } else {
        1.0
    }
}

#[inline]
fn centering_offset(canvas: u32, extent: i32, origin: i32) -> i32 {
    (canvas as i32 - extent).div_euclid(2) - origin
}
