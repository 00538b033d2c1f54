//! K-means clustering of embedded vectors.
//!
//! Lloyd iterations from k-means++ seeds, repeated over several restarts. The
//! random source is passed in by the caller so every run is reproducible.

use crate::error::{EntropyError, Result};
use rand::Rng;

/// K-means configuration.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,
    /// Maximum iterations per restart
    pub max_iter: usize,
    /// Number of k-means++ restarts
    pub n_init: usize,
    /// Convergence tolerance on total squared centroid shift
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iter: 300,
            n_init: 10,
            tolerance: 1e-4,
        }
    }
}

impl KMeansConfig {
    /// Set number of clusters.
    pub fn k(mut self, k: usize) -> Self {
        self.k = k.max(1);
        self
    }

    /// Set maximum iterations.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Set number of restarts.
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Set convergence tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// K-means clustering result.
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Cluster assignments for each point (0-indexed)
    pub labels: Vec<usize>,
    /// Cluster centroids
    pub centroids: Vec<Vec<f64>>,
    /// Within-cluster sum of squared distances
    pub inertia: f64,
    /// Iterations of the winning restart
    pub n_iter: usize,
}

/// Cluster `points` into `config.k` groups.
///
/// Keeps the restart with the lowest inertia; on equal inertia the earliest
/// restart wins. Fails when there are fewer points than clusters, when points
/// disagree in dimension or hold non-finite values, or when every restart
/// produces a non-finite inertia.
pub fn kmeans<R: Rng>(
    points: &[Vec<f64>],
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<KMeansResult> {
    let n = points.len();
    let k = config.k;

    if n == 0 {
        return Err(EntropyError::EmptyData);
    }
    if n < k {
        return Err(EntropyError::InsufficientData { needed: k, got: n });
    }
    let dim = points[0].len();
    if let Some(bad) = points.iter().find(|p| p.len() != dim) {
        return Err(EntropyError::DimensionMismatch {
            expected: dim,
            got: bad.len(),
        });
    }
    if points.iter().flatten().any(|x| !x.is_finite()) {
        return Err(EntropyError::ComputationError(
            "non-finite coordinate in clustering input".to_string(),
        ));
    }

    let mut best: Option<KMeansResult> = None;
    for _ in 0..config.n_init.max(1) {
        let run = lloyd(points, k, config, rng);
        if !run.inertia.is_finite() {
            continue;
        }
        let better = best.as_ref().is_none_or(|b| run.inertia < b.inertia);
        if better {
            best = Some(run);
        }
    }

    best.ok_or_else(|| {
        EntropyError::ComputationError(format!("k-means with k = {k} did not produce a finite inertia"))
    })
}

/// One restart: k-means++ seeding followed by Lloyd iterations.
fn lloyd<R: Rng>(
    points: &[Vec<f64>],
    k: usize,
    config: &KMeansConfig,
    rng: &mut R,
) -> KMeansResult {
    let mut centroids = initialize_centroids(points, k, rng);
    let mut labels = vec![0; points.len()];
    let mut n_iter = 0;

    for iter in 0..config.max_iter {
        n_iter = iter + 1;

        // Assignment step
        for (i, p) in points.iter().enumerate() {
            labels[i] = find_nearest_centroid(p, &centroids).0;
        }

        // Update step
        let updated = update_centroids(points, &labels, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(updated.iter())
            .map(|(a, b)| squared_distance(a, b))
            .sum();
        centroids = updated;

        if shift <= config.tolerance * config.tolerance {
            break;
        }
    }

    // Final assignment against the converged centroids
    let mut inertia = 0.0;
    for (i, p) in points.iter().enumerate() {
        let (nearest, dist) = find_nearest_centroid(p, &centroids);
        labels[i] = nearest;
        inertia += dist;
    }

    KMeansResult {
        labels,
        centroids,
        inertia,
        n_iter,
    }
}

/// Initialize centroids using the k-means++ algorithm.
fn initialize_centroids<R: Rng>(points: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)].clone());

    let mut distances: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = distances.iter().sum();

        // Select next centroid proportional to squared distance; when every
        // point coincides with a centroid, fall back to a uniform draw.
        let selected = if total > 0.0 {
            let threshold = rng.gen::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;
            for (i, &d) in distances.iter().enumerate() {
                cumsum += d;
                if d > 0.0 && cumsum >= threshold {
                    selected = i;
                    break;
                }
            }
            selected
        } else {
            rng.gen_range(0..n)
        };

        let centroid = points[selected].clone();
        for (d, p) in distances.iter_mut().zip(points.iter()) {
            *d = d.min(squared_distance(p, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

/// Find the nearest centroid for a point and its squared distance.
fn find_nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut min_dist = f64::INFINITY;
    let mut nearest = 0;

    for (i, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < min_dist {
            min_dist = dist;
            nearest = i;
        }
    }

    (nearest, min_dist)
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Recompute centroids as member means. An empty cluster is moved to the
/// point farthest from its current centroid, never to a point another empty
/// cluster already took.
fn update_centroids(points: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = previous.len();
    let dim = points[0].len();
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];

    for (p, &l) in points.iter().zip(labels.iter()) {
        counts[l] += 1;
        for (s, x) in sums[l].iter_mut().zip(p.iter()) {
            *s += x;
        }
    }

    let mut centroids: Vec<Vec<f64>> = sums
        .into_iter()
        .zip(counts.iter())
        .zip(previous.iter())
        .map(|((sum, &count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect();

    let mut reseeded: Vec<usize> = Vec::new();
    for cluster in (0..k).filter(|&c| counts[c] == 0) {
        let farthest = points
            .iter()
            .zip(labels.iter())
            .map(|(p, &l)| squared_distance(p, &centroids[l]))
            .enumerate()
            .filter(|(i, _)| !reseeded.contains(i))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if d <= bd => best,
                _ => Some((i, d)),
            });
        if let Some((index, _)) = farthest {
            reseeded.push(index);
            centroids[cluster] = points[index].clone();
        }
    }

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generate_cluster_data() -> Vec<Vec<f64>> {
        vec![
            // Cluster 1: low values
            vec![1.0, 2.0],
            vec![1.5, 2.5],
            vec![1.2, 2.2],
            // Cluster 2: high values
            vec![10.0, 11.0],
            vec![10.5, 11.5],
            vec![10.2, 11.2],
        ]
    }

    #[test]
    fn kmeans_finds_clusters() {
        let data = generate_cluster_data();
        let config = KMeansConfig::default().k(2);
        let mut rng = StdRng::seed_from_u64(42);
        let result = kmeans(&data, &config, &mut rng).unwrap();

        assert_eq!(result.labels.len(), 6);
        assert_eq!(result.centroids.len(), 2);

        // First 3 should be in same cluster, last 3 in another
        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[1], result.labels[2]);
        assert_eq!(result.labels[3], result.labels[4]);
        assert_eq!(result.labels[4], result.labels[5]);
        assert_ne!(result.labels[0], result.labels[3]);
        assert_eq!(result.labels.iter().filter(|&&l| l == result.labels[0]).count(), 3);
    }

    #[test]
    fn kmeans_single_cluster() {
        let data = vec![vec![1.0, 2.0, 3.0], vec![1.1, 2.1, 3.1], vec![0.9, 1.9, 2.9]];
        let config = KMeansConfig::default().k(1);
        let mut rng = StdRng::seed_from_u64(0);
        let result = kmeans(&data, &config, &mut rng).unwrap();

        assert!(result.labels.iter().all(|&l| l == 0));
        assert_relative_eq!(result.centroids[0][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.inertia, 0.06, epsilon = 1e-12);
    }

    #[test]
    fn kmeans_k_equals_n() {
        let data = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let config = KMeansConfig::default().k(3);
        let mut rng = StdRng::seed_from_u64(1);
        let result = kmeans(&data, &config, &mut rng).unwrap();

        assert_eq!(result.centroids.len(), 3);
        assert_relative_eq!(result.inertia, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn kmeans_is_reproducible_for_a_seed() {
        let data: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![(i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()])
            .collect();
        let config = KMeansConfig::default().k(4);
        let a = kmeans(&data, &config, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = kmeans(&data, &config, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn earliest_restart_wins_on_equal_inertia() {
        // k = n: every restart ends with zero inertia, only the labelling differs.
        let data = vec![vec![0.0, 0.0], vec![4.0, 0.0], vec![0.0, 3.0], vec![7.0, 7.0]];
        let single = KMeansConfig::default().k(4).n_init(1);
        let first = kmeans(&data, &single, &mut StdRng::seed_from_u64(17)).unwrap();
        let best = kmeans(&data, &single.clone().n_init(5), &mut StdRng::seed_from_u64(17)).unwrap();

        assert_relative_eq!(best.inertia, 0.0);
        assert_eq!(best.labels, first.labels);
        assert_eq!(best.centroids, first.centroids);
    }

    #[test]
    fn empty_clusters_get_distinct_reseeds() {
        let points = vec![vec![0.0], vec![1.0], vec![10.0], vec![9.0]];
        let labels = vec![0, 0, 0, 0];
        let previous = vec![vec![5.0], vec![100.0], vec![100.0]];
        let centroids = update_centroids(&points, &labels, &previous);

        assert_eq!(centroids[0], vec![5.0]);
        assert_eq!(centroids[1], vec![0.0]);
        assert_eq!(centroids[2], vec![10.0]);
    }

    #[test]
    fn kmeans_duplicate_points() {
        let data = vec![vec![1.0], vec![1.0], vec![1.0], vec![1.0]];
        let config = KMeansConfig::default().k(2);
        let mut rng = StdRng::seed_from_u64(3);
        let result = kmeans(&data, &config, &mut rng).unwrap();
        assert_relative_eq!(result.inertia, 0.0);
    }

    #[test]
    fn kmeans_empty() {
        let data: Vec<Vec<f64>> = vec![];
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            kmeans(&data, &KMeansConfig::default(), &mut rng).unwrap_err(),
            EntropyError::EmptyData
        );
    }

    #[test]
    fn kmeans_too_few_points() {
        let data = vec![vec![1.0], vec![2.0]];
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            kmeans(&data, &KMeansConfig::default().k(3), &mut rng).unwrap_err(),
            EntropyError::InsufficientData { needed: 3, got: 2 }
        );
    }

    #[test]
    fn kmeans_rejects_non_finite() {
        let data = vec![vec![1.0], vec![f64::NAN], vec![2.0]];
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            kmeans(&data, &KMeansConfig::default().k(2), &mut rng),
            Err(EntropyError::ComputationError(_))
        ));
    }

    #[test]
    fn more_clusters_never_increase_inertia_much() {
        let data = generate_cluster_data();
        let mut rng = StdRng::seed_from_u64(5);
        let mut prev = f64::INFINITY;
        for k in 1..=4 {
            let r = kmeans(&data, &KMeansConfig::default().k(k), &mut rng).unwrap();
            assert!(r.inertia <= prev + 1e-6);
            prev = r.inertia;
        }
    }

    #[test]
    fn config_builder() {
        let config = KMeansConfig::default()
            .k(5)
            .max_iter(50)
            .n_init(3)
            .tolerance(1e-6);

        assert_eq!(config.k, 5);
        assert_eq!(config.max_iter, 50);
        assert_eq!(config.n_init, 3);
        assert_eq!(config.tolerance, 1e-6);
    }
}
