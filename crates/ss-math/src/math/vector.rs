//! Dense vector kernels used by the clustering loops.

/// Squared Euclidean distance. Slices must have equal length.
#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index and squared distance of the nearest centroid.
///
/// Ties resolve to the lowest index. Returns `None` when `centroids` is empty.
pub fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = squared_euclidean(point, centroid);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((idx, dist)),
        }
    }
    best
}

/// Column-wise mean of a set of equal-width rows.
///
/// Returns `None` for an empty set.
pub fn mean_vector<R: AsRef<[f64]>>(rows: &[R]) -> Option<Vec<f64>> {
    let first = rows.first()?;
    let mut acc = vec![0.0; first.as_ref().len()];
    for row in rows {
        for (a, v) in acc.iter_mut().zip(row.as_ref()) {
            *a += v;
        }
    }
    let n = rows.len() as f64;
    for a in &mut acc {
        *a /= n;
    }
    Some(acc)
}

/// Column-wise mean of the rows selected by `members`.
pub fn mean_of_members(rows: &[Vec<f64>], members: &[usize]) -> Option<Vec<f64>> {
    let first = members.first()?;
    let mut acc = vec![0.0; rows[*first].len()];
    for &m in members {
        for (a, v) in acc.iter_mut().zip(&rows[m]) {
            *a += v;
        }
    }
    let n = members.len() as f64;
    for a in &mut acc {
        *a /= n;
    }
    Some(acc)
}

/// Per-column (min, max) bounds of a set of rows.
pub fn column_bounds(rows: &[Vec<f64>]) -> Option<Vec<(f64, f64)>> {
    let first = rows.first()?;
    let mut bounds: Vec<(f64, f64)> = first.iter().map(|&v| (v, v)).collect();
    for row in &rows[1..] {
        for (b, &v) in bounds.iter_mut().zip(row) {
            b.0 = b.0.min(v);
            b.1 = b.1.max(v);
        }
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_euclidean() {
        assert_eq!(squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_euclidean(&[1.5], &[1.5]), 0.0);
    }

    #[test]
    fn test_nearest_prefers_lowest_index_on_tie() {
        let centroids = vec![vec![-1.0], vec![1.0], vec![1.0]];
        assert_eq!(nearest(&[0.0], &centroids), Some((0, 1.0)));
        assert_eq!(nearest(&[2.0], &centroids), Some((1, 1.0)));
        assert_eq!(nearest(&[2.0], &[]), None);
    }

    #[test]
    fn test_means() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 6.0], vec![5.0, 10.0]];
        assert_eq!(mean_vector(&rows), Some(vec![3.0, 6.0]));
        assert_eq!(mean_of_members(&rows, &[0, 2]), Some(vec![3.0, 6.0]));
        assert_eq!(mean_of_members(&rows, &[]), None);
        assert_eq!(mean_vector::<Vec<f64>>(&[]), None);
    }

    #[test]
    fn test_column_bounds() {
        let rows = vec![vec![1.0, -2.0], vec![-3.0, 6.0]];
        assert_eq!(column_bounds(&rows), Some(vec![(-3.0, 1.0), (-2.0, 6.0)]));
    }
}
