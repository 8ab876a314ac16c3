use crate::error::{SmResult, StrokeMatchError};

/// Local cost between two `d`-dimensional vectors.
pub type CostFn = fn(&[f32], &[f32]) -> f64;

#[inline(always)]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Sum of absolute differences. Cheaper than `euclidean_distance`.
#[inline(always)]
pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x as f64 - y as f64).abs())
        .sum()
}

/// Flattened n*m accumulated-cost matrix.
///
/// Kept around between calls so a worker scoring many templates does not
/// reallocate for each one.
#[derive(Debug, Default, Clone)]
pub struct DtwMatrix {
    cells: Vec<f64>,
    n: usize,
    m: usize,
}

impl DtwMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.m + j
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[self.idx(i, j)]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.m)
    }

    fn reset(&mut self, n: usize, m: usize) {
        self.n = n;
        self.m = m;
        self.cells.clear();
        self.cells.resize(n * m, f64::INFINITY);
        self.cells[0] = 0.0;
    }

    /// Fills the matrix for `s` against `t` and returns the bottom-right cell.
    ///
    /// Row 0 and column 0 (except the origin) stay at infinity, so the first
    /// vectors of both sequences only act as the alignment anchor.
    pub fn compute<F>(&mut self, s: &[f32], t: &[f32], d: usize, cost: F) -> SmResult<f64>
    where
        F: Fn(&[f32], &[f32]) -> f64,
    {
        check_sequence(s, d, "first")?;
        check_sequence(t, d, "second")?;

        let n = s.len() / d;
        let m = t.len() / d;
        self.reset(n, m);

        for i in 1..n {
            let v1 = &s[i * d..(i + 1) * d];
            for j in 1..m {
                let v2 = &t[j * d..(j + 1) * d];
                let best = self
                    .get(i - 1, j)
                    .min(self.get(i - 1, j - 1))
                    .min(self.get(i, j - 1));
                let at = self.idx(i, j);
                self.cells[at] = cost(v1, v2) + best;
            }
        }

        Ok(self.get(n - 1, m - 1))
    }
}

fn check_sequence(seq: &[f32], d: usize, which: &str) -> SmResult<()> {
    if d == 0 {
        return Err(StrokeMatchError::MalformedInput(
            "vector dimension must be positive".to_string(),
        ));
    }
    if seq.is_empty() {
        return Err(StrokeMatchError::MalformedInput(format!(
            "{} sequence is empty",
            which
        )));
    }
    if seq.len() % d != 0 {
        return Err(StrokeMatchError::MalformedInput(format!(
            "{} sequence has {} values, not a multiple of dimension {}",
            which,
            seq.len(),
            d
        )));
    }
    Ok(())
}

/// DTW distance between two flat feature sequences with Euclidean local cost.
pub fn dtw(s: &[f32], t: &[f32], d: usize) -> SmResult<f64> {
    dtw_with(s, t, d, euclidean_distance)
}

/// DTW distance with a caller-supplied local cost.
pub fn dtw_with<F>(s: &[f32], t: &[f32], d: usize, cost: F) -> SmResult<f64>
where
    F: Fn(&[f32], &[f32]) -> f64,
{
    DtwMatrix::new().compute(s, t, d, cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_costs() {
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(manhattan_distance(&[0.0, 0.0], &[3.0, -4.0]), 7.0);
    }

    #[test]
    fn test_matrix_reuse_matches_fresh() {
        let a = [0.0, 0.0, 1.0, 2.0, 3.0, 1.0];
        let b = [0.0, 0.0, 2.0, 2.0];
        let c = [1.0, 1.0, 5.0, 5.0, 0.0, 1.0, 2.0, 2.0];

        let mut m = DtwMatrix::new();
        let first = m.compute(&a, &c, 2, euclidean_distance).unwrap();
        let second = m.compute(&a, &b, 2, euclidean_distance).unwrap();
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(first, dtw(&a, &c, 2).unwrap());
        assert_eq!(second, dtw(&a, &b, 2).unwrap());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(dtw(&[1.0, 2.0, 3.0], &[1.0, 2.0], 2), Err(StrokeMatchError::MalformedInput(_))));
        assert!(matches!(dtw(&[], &[1.0, 2.0], 2), Err(StrokeMatchError::MalformedInput(_))));
        assert!(matches!(dtw(&[1.0], &[1.0], 0), Err(StrokeMatchError::MalformedInput(_))));
    }
}
