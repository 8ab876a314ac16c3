use crate::error::{SmResult, StrokeMatchError};
use crate::writing::Writing;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Flat feature sequence: consecutive groups of `dimension()` floats.
pub type FeatureVec = Vec<f32>;

/// The transform turning a normalized writing into a feature sequence.
///
/// The chosen kind must be the same at training and recognition time; the
/// model file records the dimension so a mismatch is caught on load.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// `(|dx|, |dy|)` between consecutive points, strokes concatenated.
    #[default]
    #[strum(to_string = "delta", serialize = "get_delta_features")]
    Delta,
    /// Raw `(x, y)` of every point.
    #[strum(to_string = "xy", serialize = "get_xy_features")]
    Xy,
}

impl FeatureKind {
    #[inline(always)]
    pub fn dimension(&self) -> usize {
        match self {
            Self::Delta | Self::Xy => 2,
        }
    }

    /// Number of vectors `extract` will emit for `writing`.
    pub fn vector_count(&self, writing: &Writing) -> usize {
        let n = writing.n_points();
        match self {
            Self::Delta => n.saturating_sub(1),
            Self::Xy => n,
        }
    }

    /// Normalizes a copy of `writing`, drops points closer than
    /// `downsample_threshold` (0 keeps them all) and extracts features.
    /// Templates and queries both go through here.
    pub fn preprocess(&self, writing: &Writing, downsample_threshold: u32) -> SmResult<FeatureVec> {
        if writing.is_empty() {
            return Err(StrokeMatchError::EmptyInput);
        }

        let mut w = writing.clone();
        w.normalize();
        if downsample_threshold > 0 {
            w.downsample_threshold(downsample_threshold as f64);
        }

        let features = self.extract(&w);
        if features.is_empty() {
            return Err(StrokeMatchError::MalformedInput(format!(
                "writing with {} point(s) yields no feature vectors",
                w.n_points()
            )));
        }
        Ok(features)
    }

    pub fn extract(&self, writing: &Writing) -> FeatureVec {
        let mut out = Vec::with_capacity(self.vector_count(writing) * self.dimension());

        match self {
            Self::Delta => {
                let mut prev: Option<(i32, i32)> = None;
                for p in writing.points() {
                    if let Some((px, py)) = prev {
                        out.push((p.x - px).abs() as f32);
                        out.push((p.y - py).abs() as f32);
                    }
                    prev = Some((p.x, p.y));
                }
            }
            Self::Xy => {
                for p in writing.points() {
                    out.push(p.x as f32);
                    out.push(p.y as f32);
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_delta_crosses_stroke_boundaries() {
        let w = Writing::from_strokes(&[&[(0, 0), (10, 5)], &[(4, 25), (4, 30)]]);
        let f = FeatureKind::Delta.extract(&w);
        assert_eq!(f, vec![10.0, 5.0, 6.0, 20.0, 0.0, 5.0]);
        assert_eq!(f.len(), FeatureKind::Delta.vector_count(&w) * 2);
    }

    #[test]
    fn test_xy() {
        let w = Writing::from_strokes(&[&[(1, 2), (3, 4)]]);
        assert_eq!(FeatureKind::Xy.extract(&w), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_preprocess_normalizes_first() {
        // 700 wide once normalized, whatever size it was drawn at
        let small = Writing::from_strokes(&[&[(10, 10), (210, 10)]]);
        let f = FeatureKind::Delta.preprocess(&small, 0).unwrap();
        assert_eq!(f, vec![700.0, 0.0]);
    }

    #[test]
    fn test_preprocess_rejects_degenerate_input() {
        assert!(matches!(
            FeatureKind::Delta.preprocess(&Writing::new(), 50),
            Err(StrokeMatchError::EmptyInput)
        ));
        let dot = Writing::from_strokes(&[&[(5, 5)]]);
        assert!(matches!(
            FeatureKind::Delta.preprocess(&dot, 50),
            Err(StrokeMatchError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_names() {
        assert_eq!(FeatureKind::Delta.to_string(), "delta");
        assert_eq!(FeatureKind::from_str("get_xy_features").unwrap(), FeatureKind::Xy);
        assert!(FeatureKind::from_str("polar").is_err());
    }
}
