//! Tier assignment by fixed thresholds or by clustering

use rand::Rng;

use crate::models::{MetricBreakdown, Tier};
use crate::scoring::kmeans::{Clustering, KMeans};

/// Number of tiers, and therefore of clusters
pub const TIER_COUNT: usize = Tier::ALL.len();

/// Minimum population for clustering; one farmer per target cluster
pub const MIN_FARMERS_FOR_CLUSTERING: usize = TIER_COUNT;

/// Threshold tiering: 85+ Tier 1, 70+ Tier 2, 55+ Tier 3, otherwise Tier 4
pub fn heuristic_tier(score: u8) -> Tier {
    match score {
        85.. => Tier::Tier1,
        70..=84 => Tier::Tier2,
        55..=69 => Tier::Tier3,
        _ => Tier::Tier4,
    }
}

/// Cluster farmers by their metric breakdowns and label clusters by mean score.
///
/// `breakdowns` and `scores` are parallel slices in the order clustering
/// should see them (the first four seed the centroids). Returns `None` when
/// there are fewer than four farmers; callers keep threshold tiers then.
pub fn cluster_tiers<R: Rng + ?Sized>(
    breakdowns: &[MetricBreakdown],
    scores: &[u8],
    rng: &mut R,
) -> Option<Vec<Tier>> {
    if breakdowns.len() < MIN_FARMERS_FOR_CLUSTERING || breakdowns.len() != scores.len() {
        return None;
    }

    let points: Vec<[f64; MetricBreakdown::DIMENSIONS]> =
        breakdowns.iter().map(MetricBreakdown::as_array).collect();
    let clustering = KMeans::new(TIER_COUNT).fit(&points, rng)?;
    let cluster_to_tier = rank_clusters(&clustering, scores);

    Some(
        clustering
            .assignments
            .iter()
            .map(|&cluster| cluster_to_tier[cluster])
            .collect(),
    )
}

/// Map each cluster index to a tier, best mean score first.
///
/// Clusters with equal means keep index order; a cluster with no members
/// sorts after every populated cluster.
fn rank_clusters<const D: usize>(clustering: &Clustering<D>, scores: &[u8]) -> Vec<Tier> {
    let k = clustering.centroids.len();
    let mut means: Vec<(usize, Option<f64>)> = (0..k)
        .map(|cluster| {
            let members: Vec<f64> = clustering
                .members(cluster)
                .map(|index| f64::from(scores[index]))
                .collect();
            let mean = if members.is_empty() {
                None
            } else {
                Some(members.iter().sum::<f64>() / members.len() as f64)
            };
            (cluster, mean)
        })
        .collect();

    means.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut tiers = vec![Tier::Tier4; k];
    for (position, (cluster, _)) in means.into_iter().enumerate() {
        tiers[cluster] = Tier::from_index(position).unwrap_or(Tier::Tier4);
    }
    tiers
}
