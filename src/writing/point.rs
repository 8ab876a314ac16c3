use serde::{Deserialize, Serialize};

/// A sampled pen position.
///
/// Coordinates are integers relative to the owning `Writing`'s canvas.
/// The optional fields stay `None` when the capture device does not report
/// them; they are never defaulted to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xtilt: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ytilt: Option<f32>,
    /// Milliseconds since the first point of the writing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_tilt(mut self, xtilt: f32, ytilt: f32) -> Self {
        self.xtilt = Some(xtilt);
        self.ytilt = Some(ytilt);
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[inline(always)]
    pub fn coordinates(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Scales the coordinates independently, flooring to the integer grid.
    #[inline]
    pub fn resize(&mut self, xrate: f64, yrate: f64) {
        self.x = (self.x as f64 * xrate).floor() as i32;
        self.y = (self.y as f64 * yrate).floor() as i32;
    }

    #[inline]
    pub fn move_rel(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    #[inline(always)]
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}
