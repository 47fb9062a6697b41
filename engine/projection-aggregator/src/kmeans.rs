//! Seeded K-Means (k-means++ initialization, Lloyd iterations).
//!
//! Output is a pure function of the points, `k` and the seed. Restarts share
//! one RNG stream and the lowest-inertia run wins, earliest run on ties.
//!
//! A cluster that loses all its points is reseeded with the point farthest
//! from its own centroid, so with at least `k` distinct points every label in
//! `0..k` is used.

use crate::error::{AggregateError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// K-Means parameters
#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
}

/// Result of a K-Means fit
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster id (0..k) per input point
    pub labels: Vec<usize>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
    pub iterations: usize,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Index of the nearest centroid; ties go to the lowest index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best.1 {
            best = (idx, d);
        }
    }
    best
}

/// Move points into empty clusters until none is empty or no donor is left.
///
/// Each empty cluster takes the point farthest from its assigned centroid
/// (lowest index on ties), together with every identical point. A donor must
/// keep a point with different features, so donors never empty out and
/// identical points always share a label. Returns whether anything moved.
fn fill_empty_clusters(points: &[Vec<f64>], labels: &mut [usize], centroids: &mut [Vec<f64>]) -> bool {
    let mut moved = false;

    loop {
        let mut counts = vec![0usize; centroids.len()];
        for label in labels.iter() {
            counts[*label] += 1;
        }
        let Some(empty) = counts.iter().position(|count| *count == 0) else {
            break;
        };

        let mut farthest: Option<(usize, f64)> = None;
        for (idx, point) in points.iter().enumerate() {
            let cluster = labels[idx];
            let donor_keeps_points = points
                .iter()
                .zip(labels.iter())
                .any(|(other, label)| *label == cluster && other != point);
            if !donor_keeps_points {
                continue;
            }
            let d = squared_distance(point, &centroids[cluster]);
            if farthest.map_or(true, |(_, best)| d > best) {
                farthest = Some((idx, d));
            }
        }

        // Fewer distinct points than clusters.
        let Some((idx, _)) = farthest else {
            break;
        };

        let target = points[idx].clone();
        for (label, point) in labels.iter_mut().zip(points) {
            if *point == target {
                *label = empty;
            }
        }
        centroids[empty] = target;
        moved = true;
    }

    moved
}

/// Mean of each non-empty cluster; empty clusters keep their centroid.
fn update_centroids(points: &[Vec<f64>], labels: &[usize], centroids: &mut [Vec<f64>]) -> f64 {
    let dims = points[0].len();
    let mut sums = vec![vec![0.0; dims]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];
    for (label, point) in labels.iter().zip(points) {
        counts[*label] += 1;
        for (s, v) in sums[*label].iter_mut().zip(point) {
            *s += v;
        }
    }

    let mut shift = 0.0;
    for (cluster, centroid) in centroids.iter_mut().enumerate() {
        if counts[cluster] == 0 {
            continue;
        }
        let updated: Vec<f64> = sums[cluster].iter().map(|s| s / counts[cluster] as f64).collect();
        shift += squared_distance(centroid, &updated);
        *centroid = updated;
    }
    shift
}

/// Mean per-feature variance, used to scale the convergence tolerance
fn mean_variance(points: &[Vec<f64>]) -> f64 {
    let n = points.len() as f64;
    let dims = points[0].len();
    let mut total = 0.0;
    for d in 0..dims {
        let mean = points.iter().map(|p| p[d]).sum::<f64>() / n;
        total += points.iter().map(|p| (p[d] - mean).powi(2)).sum::<f64>() / n;
    }
    total / dims.max(1) as f64
}

impl KMeans {
    pub fn new(k: usize, seed: u64) -> Self {
        Self { k, seed, n_init: 10, max_iter: 300, tolerance: 1e-4 }
    }

    /// Cluster `points`. Every point must have the same dimension.
    pub fn fit(&self, points: &[Vec<f64>]) -> Result<KMeansFit> {
        if self.k == 0 {
            return Err(AggregateError::clustering("k must be positive"));
        }
        if points.len() < self.k {
            return Err(AggregateError::clustering(format!(
                "{} points cannot form {} clusters",
                points.len(),
                self.k
            )));
        }
        let dims = points[0].len();
        if dims == 0 || points.iter().any(|p| p.len() != dims) {
            return Err(AggregateError::clustering("points must share a non-zero dimension"));
        }
        if points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(AggregateError::clustering("points must be finite"));
        }

        let tolerance = self.tolerance * mean_variance(points);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for _ in 0..self.n_init.max(1) {
            let centroids = self.init_centroids(points, &mut rng);
            let fit = self.lloyd(points, centroids, tolerance);
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| AggregateError::clustering("no K-Means run completed"))
    }

    /// k-means++ seeding
    fn init_centroids(&self, points: &[Vec<f64>], rng: &mut StdRng) -> Vec<Vec<f64>> {
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(points[rng.gen_range(0..points.len())].clone());

        let mut closest: Vec<f64> = points.iter().map(|p| squared_distance(p, &centroids[0])).collect();

        while centroids.len() < self.k {
            let total: f64 = closest.iter().sum();
            let next = if total > 0.0 {
                let target = rng.gen::<f64>() * total;
                let mut cumulative = 0.0;
                let mut chosen = points.len() - 1;
                for (idx, d) in closest.iter().enumerate() {
                    cumulative += d;
                    if cumulative > target {
                        chosen = idx;
                        break;
                    }
                }
                chosen
            } else {
                // Every point already sits on a centroid.
                rng.gen_range(0..points.len())
            };

            let centroid = points[next].clone();
            for (d, point) in closest.iter_mut().zip(points) {
                *d = d.min(squared_distance(point, &centroid));
            }
            centroids.push(centroid);
        }

        centroids
    }

    fn lloyd(&self, points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, tolerance: f64) -> KMeansFit {
        let mut labels = vec![usize::MAX; points.len()];
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;

            let mut changed = false;
            for (label, point) in labels.iter_mut().zip(points) {
                let (idx, _) = nearest(point, &centroids);
                if *label != idx {
                    *label = idx;
                    changed = true;
                }
            }
            if fill_empty_clusters(points, &mut labels, &mut centroids) {
                changed = true;
            }

            let shift = update_centroids(points, &labels, &mut centroids);
            if !changed || shift <= tolerance {
                break;
            }
        }

        for (label, point) in labels.iter_mut().zip(points) {
            *label = nearest(point, &centroids).0;
        }
        if fill_empty_clusters(points, &mut labels, &mut centroids) {
            update_centroids(points, &labels, &mut centroids);
        }

        let inertia = labels
            .iter()
            .zip(points)
            .map(|(label, point)| squared_distance(point, &centroids[*label]))
            .sum();

        KMeansFit { labels, inertia, iterations }
    }
}
