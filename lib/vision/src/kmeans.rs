//! Seeded k-means over RGB points
//!
//! k-means++ initialization followed by Lloyd iterations. Restarts run in
//! parallel with rayon; restart `i` is seeded with `seed + i`, so the result
//! depends only on the input and the seed, never on thread scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

pub type Point = [f32; 3];

#[derive(Debug, Clone, Copy)]
pub struct KMeansParams {
    pub k: usize,
    pub restarts: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct Clustering {
    pub centroids: Vec<Point>,
    /// Cluster index per input point
    pub labels: Vec<usize>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
}

impl Clustering {
    /// Points per cluster, indexed like `centroids`
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.centroids.len()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

/// Best-of-`restarts` clustering; lowest inertia wins, earliest restart on ties
///
/// `points` must be non-empty and `k` positive.
pub fn kmeans(points: &[Point], params: KMeansParams) -> Clustering {
    debug_assert!(!points.is_empty());
    let k = params.k.clamp(1, points.len());
    let restarts = params.restarts.max(1);

    let runs: Vec<Clustering> = (0..restarts)
        .into_par_iter()
        .map(|run| {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(run as u64));
            let seeds = plus_plus_init(points, k, &mut rng);
            lloyd(points, seeds, params.max_iterations.max(1))
        })
        .collect();

    let mut best: Option<Clustering> = None;
    for run in runs {
        match &best {
            Some(current) if current.inertia <= run.inertia => {}
            _ => best = Some(run),
        }
    }
    // restarts >= 1, so there is always a run
    best.unwrap_or_else(|| lloyd(points, vec![points[0]; k], 1))
}

#[inline]
fn squared_distance(a: &Point, b: &Point) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

fn nearest(point: &Point, centroids: &[Point]) -> (usize, f32) {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    (best, best_distance)
}

/// k-means++ seeding: each next centre is drawn with probability proportional
/// to its squared distance from the closest centre chosen so far
fn plus_plus_init(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())]);

    let mut distances: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]) as f64)
        .collect();

    while centroids.len() < k {
        let total: f64 = distances.iter().sum();

        let chosen = if total <= 0.0 {
            // Fewer distinct colours than clusters; the duplicate centre ends up empty
            rng.random_range(0..points.len())
        } else {
            let target = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut index = points.len() - 1;
            for (i, d) in distances.iter().enumerate() {
                cumulative += d;
                if cumulative > target {
                    index = i;
                    break;
                }
            }
            index
        };

        let centre = points[chosen];
        centroids.push(centre);
        for (d, p) in distances.iter_mut().zip(points) {
            let candidate = squared_distance(p, &centre) as f64;
            if candidate < *d {
                *d = candidate;
            }
        }
    }

    centroids
}

fn lloyd(points: &[Point], mut centroids: Vec<Point>, max_iterations: usize) -> Clustering {
    let k = centroids.len();
    let mut labels = vec![usize::MAX; points.len()];

    for _ in 0..max_iterations {
        let mut changed = false;
        for (label, point) in labels.iter_mut().zip(points) {
            let (cluster, _) = nearest(point, &centroids);
            if *label != cluster {
                *label = cluster;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (&label, point) in labels.iter().zip(points) {
            counts[label] += 1;
            for c in 0..3 {
                sums[label][c] += point[c] as f64;
            }
        }
        for i in 0..k {
            // Empty clusters keep their previous centre
            if counts[i] > 0 {
                let n = counts[i] as f64;
                centroids[i] = [
                    (sums[i][0] / n) as f32,
                    (sums[i][1] / n) as f32,
                    (sums[i][2] / n) as f32,
                ];
            }
        }
    }

    let mut inertia = 0.0f64;
    for (label, point) in labels.iter_mut().zip(points) {
        let (cluster, distance) = nearest(point, &centroids);
        *label = cluster;
        inertia += distance as f64;
    }

    Clustering {
        centroids,
        labels,
        inertia,
    }
}
