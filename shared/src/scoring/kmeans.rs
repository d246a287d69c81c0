//! Fixed-iteration k-means clustering
//!
//! Lloyd's algorithm without a convergence check: centroids start at the
//! first `k` input points and exactly [`ITERATIONS`] assign/update rounds run.
//! Input order is therefore part of the contract. A cluster that ends an
//! assignment round empty is reseeded with a point drawn from the supplied
//! random source, which callers can seed for reproducible results.

use rand::Rng;

/// Lloyd rounds performed on every fit
pub const ITERATIONS: usize = 50;

/// k-means configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    k: usize,
}

/// Result of a clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering<const D: usize> {
    /// Cluster index for each input point, in input order
    pub assignments: Vec<usize>,
    pub centroids: Vec<[f64; D]>,
}

impl<const D: usize> Clustering<D> {
    /// Indices of the points assigned to `cluster`
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = usize> + '_ {
        self.assignments
            .iter()
            .enumerate()
            .filter(move |&(_, &assigned)| assigned == cluster)
            .map(|(index, _)| index)
    }
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Cluster `points` into `k` groups.
    ///
    /// Returns `None` when `k` is zero or there are fewer points than clusters.
    pub fn fit<const D: usize, R: Rng + ?Sized>(
        &self,
        points: &[[f64; D]],
        rng: &mut R,
    ) -> Option<Clustering<D>> {
        if self.k == 0 || points.len() < self.k {
            return None;
        }

        let mut centroids: Vec<[f64; D]> = points[..self.k].to_vec();
        let mut assignments = vec![0usize; points.len()];

        for _ in 0..ITERATIONS {
            for (point, assigned) in points.iter().zip(assignments.iter_mut()) {
                *assigned = nearest_centroid(point, &centroids);
            }

            let mut sums = vec![[0.0f64; D]; self.k];
            let mut counts = vec![0usize; self.k];
            for (point, &cluster) in points.iter().zip(&assignments) {
                counts[cluster] += 1;
                for (sum, value) in sums[cluster].iter_mut().zip(point) {
                    *sum += value;
                }
            }

            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                if counts[cluster] == 0 {
                    *centroid = points[rng.gen_range(0..points.len())];
                    continue;
                }
                let count = counts[cluster] as f64;
                for (value, sum) in centroid.iter_mut().zip(&sums[cluster]) {
                    *value = sum / count;
                }
            }
        }

        Some(Clustering {
            assignments,
            centroids,
        })
    }
}

/// Index of the closest centroid by squared Euclidean distance; ties go to the lowest index
fn nearest_centroid<const D: usize>(point: &[f64; D], centroids: &[[f64; D]]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

pub fn squared_distance<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_too_few_points() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        assert!(KMeans::new(4).fit(&points, &mut rng).is_none());
        assert!(KMeans::new(0).fit(&points, &mut rng).is_none());
    }

    #[test]
    fn test_separates_obvious_groups() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = [
            [0.0, 0.0],
            [10.0, 10.0],
            [0.5, 0.0],
            [10.0, 10.5],
            [0.0, 0.5],
            [9.5, 10.0],
        ];
        let clustering = KMeans::new(2).fit(&points, &mut rng).unwrap();
        assert_eq!(clustering.assignments, vec![0, 1, 0, 1, 0, 1]);
        assert!(squared_distance(&clustering.centroids[0], &[1.0 / 6.0, 1.0 / 6.0]) < 1e-12);
        assert_eq!(clustering.members(1).collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_settles_after_several_rounds() {
        // Adjacent seeds put everything but the first point in cluster 1 after round one
        let mut rng = StdRng::seed_from_u64(3);
        let points = [[0.0], [1.0], [2.0], [3.0], [10.0], [11.0], [12.0], [13.0]];
        let clustering = KMeans::new(2).fit(&points, &mut rng).unwrap();
        assert_eq!(clustering.assignments, vec![0, 0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(clustering.centroids, vec![[1.5], [11.5]]);
    }

    #[test]
    fn test_ties_go_to_lowest_cluster() {
        let centroids = [[0.0], [2.0]];
        assert_eq!(nearest_centroid(&[1.0], &centroids), 0);
    }

    #[test]
    fn test_duplicate_points_reseed_empty_clusters() {
        // Identical seeds leave cluster 1 empty after the first assignment
        let points = [[5.0], [5.0], [5.0], [1.0]];
        let mut rng = StdRng::seed_from_u64(42);
        let clustering = KMeans::new(2).fit(&points, &mut rng).unwrap();
        assert_eq!(clustering.assignments.len(), 4);
        assert!(clustering.assignments.iter().all(|&c| c < 2));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let points: Vec<[f64; 3]> = (0..20)
            .map(|i| [(i % 5) as f64, (i % 3) as f64, (i % 7) as f64])
            .collect();
        let first = KMeans::new(4)
            .fit(&points, &mut StdRng::seed_from_u64(99))
            .unwrap();
        let second = KMeans::new(4)
            .fit(&points, &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(first, second);
    }
}
