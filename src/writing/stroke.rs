use super::point::Point;
use crate::consts::{SMOOTH_PASSES, SMOOTH_WEIGHTS};
use crate::error::{SmResult, StrokeMatchError};
use serde::{Deserialize, Serialize};

/// One continuous pen-down to pen-up motion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
    #[serde(skip)]
    smoothed: bool,
}

impl PartialEq for Stroke {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl From<Vec<Point>> for Stroke {
    fn from(points: Vec<Point>) -> Self {
        Self {
            points,
            smoothed: false,
        }
    }
}

impl Stroke {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_coordinates(coords: &[(i32, i32)]) -> Self {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect::<Vec<_>>().into()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    pub fn coordinates(&self) -> Vec<(i32, i32)> {
        self.points.iter().map(Point::coordinates).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn append_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn append_points<I: IntoIterator<Item = Point>>(&mut self, points: I) {
        self.points.extend(points);
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.smoothed = false;
    }

    pub fn is_smoothed(&self) -> bool {
        self.smoothed
    }

    /// Time spent drawing the stroke, if both end points carry a timestamp.
    pub fn duration(&self) -> Option<i64> {
        match (self.first()?.timestamp, self.last()?.timestamp) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    pub fn resize(&mut self, xrate: f64, yrate: f64) {
        for p in &mut self.points {
            p.resize(xrate, yrate);
        }
    }

    pub fn move_rel(&mut self, dx: i32, dy: i32) {
        for p in &mut self.points {
            p.move_rel(dx, dy);
        }
    }

    /// Weighted moving average over interior points, applied `SMOOTH_PASSES`
    /// times. End points are left untouched. Calling it again is a no-op.
    pub fn smooth(&mut self) {
        if self.smoothed || self.points.len() < SMOOTH_WEIGHTS.len() {
            return;
        }

        let offset = SMOOTH_WEIGHTS.len() / 2;
        let wsum: i64 = SMOOTH_WEIGHTS.iter().sum();

        for _ in 0..SMOOTH_PASSES {
            let src = self.points.clone();
            for i in offset..src.len() - offset {
                let (mut sx, mut sy) = (0i64, 0i64);
                for (j, w) in SMOOTH_WEIGHTS.iter().enumerate() {
                    let p = &src[i + j - offset];
                    sx += w * p.x as i64;
                    sy += w * p.y as i64;
                }
                self.points[i].x = sx.div_euclid(wsum) as i32;
                self.points[i].y = sy.div_euclid(wsum) as i32;
            }
        }

        self.smoothed = true;
    }

    /// Keeps one sample every `n` samples, starting with the first.
    pub fn downsample(&mut self, n: usize) -> SmResult<()> {
        if n == 0 {
            return Err(StrokeMatchError::MalformedInput(
                "downsample stride must be positive".to_string(),
            ));
        }
        self.points = self.points.iter().step_by(n).copied().collect();
        Ok(())
    }

    /// Drops samples closer than `threshold` to the previously kept one.
    /// The first and last points always survive.
    pub fn downsample_threshold(&mut self, threshold: f64) {
        if self.points.len() < 2 {
            return;
        }

        let last_idx = self.points.len() - 1;
        let mut kept = Vec::with_capacity(self.points.len());
        kept.push(self.points[0]);
        let mut anchor = self.points[0];

        for p in &self.points[1..last_idx] {
            if anchor.distance_to(p) > threshold {
                kept.push(*p);
                anchor = *p;
            }
        }

        kept.push(self.points[last_idx]);
        self.points = kept;
    }

    /// Inserts `n` linearly spaced points between consecutive samples.
    pub fn upsample(&mut self, n: usize) {
        self.upsample_with(|_| n as i64);
    }

    /// Inserts enough points between consecutive samples that they end up
    /// roughly `threshold` apart.
    pub fn upsample_threshold(&mut self, threshold: f64) -> SmResult<()> {
        if !(threshold > 0.0) {
            return Err(StrokeMatchError::MalformedInput(format!(
                "upsample threshold must be positive, got {}",
                threshold
            )));
        }
        self.upsample_with(|d| (d / threshold - 1.0).floor() as i64);
        Ok(())
    }

    fn upsample_with<F: Fn(f64) -> i64>(&mut self, count_for: F) {
        if self.points.len() < 2 {
            return;
        }

        let mut out = Vec::with_capacity(self.points.len());
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            out.push(a);

            let n = count_for(a.distance_to(&b));
            if n <= 0 {
                continue;
            }

            let step_x = (b.x - a.x) as f64 / (n + 1) as f64;
            let step_y = (b.y - a.y) as f64 / (n + 1) as f64;
            for j in 1..=n {
                let x = a.x as f64 + j as f64 * step_x;
                let y = a.y as f64 + j as f64 * step_y;
                out.push(Point::new(x as i32, y as i32));
            }
        }

        if let Some(last) = self.points.last() {
            out.push(*last);
        }
        self.points = out;
    }
}
