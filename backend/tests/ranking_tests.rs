//! Tests for the ranking service
//! Verifies dense ranking, stable tie order, filtering, segmentation, and failures

use chrono::{TimeZone, Utc};
use farmer_performance_backend::services::RankingService;
use farmer_performance_backend::{AppError, InMemoryHistoryStore, PerformanceSettings};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    heuristic_tier, FarmerPerformanceRecord, PerformanceRequest, PerformanceResponse, QcResult,
    Segmentation, Tier, WeightVector,
};
use std::sync::Arc;
use uuid::Uuid;

/// Add a farmer with three delivered deliveries at the given acceptance
/// percentage and `certifications` open-ended certifications.
///
/// With no purchases the default weights give `34 + 0.45 * acceptance`,
/// plus 9 when the farmer holds four certifications.
fn add_farmer(store: &InMemoryHistoryStore, acceptance: i64, certifications: usize) -> Uuid {
    let farmer = Uuid::new_v4();
    store.add_farmer(farmer).unwrap();
    for d in 1..=3 {
        let at = Utc.with_ymd_and_hms(2024, 4, d, 10, 0, 0).unwrap();
        store
            .add_qc_result(
                farmer,
                QcResult::new(Uuid::new_v4(), Decimal::from(100), Decimal::from(acceptance), at),
            )
            .unwrap();
        store.add_delivery(farmer, "delivered").unwrap();
    }
    for _ in 0..certifications {
        store.add_certification(farmer, None).unwrap();
    }
    farmer
}

fn service(store: InMemoryHistoryStore) -> RankingService<InMemoryHistoryStore> {
    RankingService::new(store, Arc::new(PerformanceSettings::default()))
}

fn seeded_service(store: InMemoryHistoryStore, seed: u64) -> RankingService<InMemoryHistoryStore> {
    let settings = PerformanceSettings {
        kmeans_seed: Some(seed),
        ..PerformanceSettings::default()
    };
    RankingService::new(store, Arc::new(settings))
}

/// Five farmers enumerated as: 34, 88, 61, 79, 79
fn population() -> (InMemoryHistoryStore, Vec<Uuid>) {
    let store = InMemoryHistoryStore::new();
    let ids = vec![
        add_farmer(&store, 0, 0),
        add_farmer(&store, 100, 4),
        add_farmer(&store, 60, 0),
        add_farmer(&store, 100, 0),
        add_farmer(&store, 100, 0),
    ];
    (store, ids)
}

fn ids(records: &[FarmerPerformanceRecord]) -> Vec<Uuid> {
    records.iter().map(|r| r.farmer_id).collect()
}

// =============================================================================
// Dense Ranking
// =============================================================================

mod dense_ranking {
    use super::*;

    #[tokio::test]
    async fn list_is_sorted_with_ranks_one_to_n() {
        let (store, farmers) = population();
        let records = service(store)
            .list_performance(Segmentation::Heuristic, None, None)
            .await
            .unwrap();

        let scores: Vec<u8> = records.iter().map(|r| r.performance_score).collect();
        assert_eq!(scores, vec![88, 79, 79, 61, 34]);
        let ranks: Vec<Option<u32>> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
        assert_eq!(
            ids(&records),
            vec![farmers[1], farmers[3], farmers[4], farmers[2], farmers[0]]
        );
    }

    #[tokio::test]
    async fn ties_keep_enumeration_order() {
        let store = InMemoryHistoryStore::new();
        let first = add_farmer(&store, 80, 0);
        let second = add_farmer(&store, 80, 0);
        let third = add_farmer(&store, 80, 0);

        let records = service(store)
            .list_performance(Segmentation::Heuristic, None, None)
            .await
            .unwrap();
        assert_eq!(ids(&records), vec![first, second, third]);
    }

    #[tokio::test]
    async fn threshold_tiers_follow_scores() {
        let (store, _) = population();
        let records = service(store)
            .list_performance(Segmentation::Heuristic, None, None)
            .await
            .unwrap();
        for record in &records {
            assert_eq!(record.tier, heuristic_tier(record.performance_score));
        }
    }

    #[tokio::test]
    async fn repeated_requests_are_identical() {
        let (store, _) = population();
        let service = service(store);
        let first = service
            .list_performance(Segmentation::Heuristic, None, None)
            .await
            .unwrap();
        let second = service
            .list_performance(Segmentation::Heuristic, None, None)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_population_gives_empty_list() {
        let records = service(InMemoryHistoryStore::new())
            .list_performance(Segmentation::Kmeans, None, Some(3))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn single_aggregation_permit_still_completes() {
        let (store, _) = population();
        let settings = PerformanceSettings {
            max_concurrent_aggregations: 1,
            ..PerformanceSettings::default()
        };
        let service = RankingService::new(store, Arc::new(settings));
        let records = tokio_test::block_on(service.list_performance(
            Segmentation::Heuristic,
            None,
            None,
        ))
        .unwrap();
        assert_eq!(records.len(), 5);
    }
}

// =============================================================================
// Filtering and Truncation
// Ranks are computed over the whole population before filtering
// =============================================================================

mod filtering {
    use super::*;

    #[tokio::test]
    async fn tier_filter_keeps_rank_order() {
        let (store, farmers) = population();
        let records = service(store)
            .list_performance(Segmentation::Heuristic, Some(Tier::Tier2), None)
            .await
            .unwrap();

        assert_eq!(ids(&records), vec![farmers[3], farmers[4]]);
        assert_eq!(records[0].rank, Some(2));
        assert_eq!(records[1].rank, Some(3));
    }

    #[tokio::test]
    async fn top_n_truncates_after_ranking() {
        let (store, farmers) = population();
        let records = service(store)
            .list_performance(Segmentation::Heuristic, None, Some(2))
            .await
            .unwrap();

        assert_eq!(ids(&records), vec![farmers[1], farmers[3]]);
        assert_eq!(records[1].rank, Some(2));
    }

    #[tokio::test]
    async fn filter_then_truncate() {
        let (store, farmers) = population();
        let records = service(store)
            .list_performance(Segmentation::Heuristic, Some(Tier::Tier2), Some(1))
            .await
            .unwrap();
        assert_eq!(ids(&records), vec![farmers[3]]);
    }

    #[tokio::test]
    async fn top_n_beyond_population_returns_all() {
        let (store, _) = population();
        let records = service(store)
            .list_performance(Segmentation::Heuristic, None, Some(50))
            .await
            .unwrap();
        assert_eq!(records.len(), 5);
    }

    #[tokio::test]
    async fn unmatched_tier_gives_empty_list() {
        let store = InMemoryHistoryStore::new();
        add_farmer(&store, 100, 4);
        let records = service(store)
            .list_performance(Segmentation::Heuristic, Some(Tier::Tier3), None)
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}

// =============================================================================
// Single-farmer Mode
// =============================================================================

mod single_farmer {
    use super::*;

    #[tokio::test]
    async fn record_is_ranked_against_everyone() {
        let (store, farmers) = population();
        let record = service(store)
            .farmer_performance(farmers[2], Segmentation::Heuristic)
            .await
            .unwrap();

        assert_eq!(record.performance_score, 61);
        assert_eq!(record.tier, Tier::Tier3);
        assert_eq!(record.rank, Some(4));
    }

    #[tokio::test]
    async fn single_mode_matches_list_mode() {
        let (store, farmers) = population();
        let service = seeded_service(store, 11);
        let list = service
            .list_performance(Segmentation::Kmeans, None, None)
            .await
            .unwrap();
        let single = service
            .farmer_performance(farmers[0], Segmentation::Kmeans)
            .await
            .unwrap();

        let from_list = list.iter().find(|r| r.farmer_id == farmers[0]).unwrap();
        assert_eq!(&single, from_list);
    }

    #[tokio::test]
    async fn request_dispatches_by_mode() {
        let (store, farmers) = population();
        let service = service(store);

        let single = PerformanceRequest {
            farmer_id: Some(farmers[1]),
            ..PerformanceRequest::default()
        };
        match service.performance(&single).await.unwrap() {
            PerformanceResponse::Single(record) => assert_eq!(record.rank, Some(1)),
            PerformanceResponse::List(_) => panic!("expected a single record"),
        }

        let list = PerformanceRequest {
            top_n: Some(3),
            ..PerformanceRequest::default()
        };
        match service.performance(&list).await.unwrap() {
            PerformanceResponse::List(list) => assert_eq!(list.results.len(), 3),
            PerformanceResponse::Single(_) => panic!("expected a list"),
        }
    }

    #[tokio::test]
    async fn unknown_farmer_is_not_found() {
        let (store, _) = population();
        let service = service(store);
        let missing = Uuid::new_v4();

        assert!(matches!(
            service
                .farmer_performance(missing, Segmentation::Heuristic)
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.farmer_metrics(missing).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn custom_weights_apply() {
        let store = InMemoryHistoryStore::new();
        let farmer = add_farmer(&store, 60, 0);
        let settings = PerformanceSettings {
            weights: WeightVector::new(1.0, 0.0, 0.0, 0.0, 0.0).unwrap(),
            ..PerformanceSettings::default()
        };
        let service = RankingService::new(store, Arc::new(settings));

        let record = service
            .farmer_performance(farmer, Segmentation::Heuristic)
            .await
            .unwrap();
        assert_eq!(record.performance_score, 60);
    }
}

// =============================================================================
// K-means Segmentation
// =============================================================================

mod segmentation {
    use super::*;

    #[tokio::test]
    async fn too_few_farmers_keep_threshold_tiers() {
        let store = InMemoryHistoryStore::new();
        add_farmer(&store, 100, 0);
        add_farmer(&store, 60, 0);
        add_farmer(&store, 0, 0);
        let service = seeded_service(store, 3);

        let heuristic = service
            .list_performance(Segmentation::Heuristic, None, None)
            .await
            .unwrap();
        let kmeans = service
            .list_performance(Segmentation::Kmeans, None, None)
            .await
            .unwrap();
        assert_eq!(heuristic, kmeans);
    }

    #[tokio::test]
    async fn four_distinct_farmers_spread_over_all_tiers() {
        let store = InMemoryHistoryStore::new();
        // Scores 79, 61, 43, 34: threshold tiers would be 2, 3, 4, 4
        let farmers = vec![
            add_farmer(&store, 100, 0),
            add_farmer(&store, 60, 0),
            add_farmer(&store, 20, 0),
            add_farmer(&store, 0, 0),
        ];
        let records = seeded_service(store, 3)
            .list_performance(Segmentation::Kmeans, None, None)
            .await
            .unwrap();

        assert_eq!(ids(&records), farmers);
        let tiers: Vec<Tier> = records.iter().map(|r| r.tier).collect();
        assert_eq!(tiers, vec![Tier::Tier1, Tier::Tier2, Tier::Tier3, Tier::Tier4]);
    }

    #[tokio::test]
    async fn clustering_leaves_scores_and_ranks_alone() {
        let (store, _) = population();
        let service = seeded_service(store, 5);
        let heuristic = service
            .list_performance(Segmentation::Heuristic, None, None)
            .await
            .unwrap();
        let kmeans = service
            .list_performance(Segmentation::Kmeans, None, None)
            .await
            .unwrap();

        assert_eq!(ids(&heuristic), ids(&kmeans));
        for (h, k) in heuristic.iter().zip(&kmeans) {
            assert_eq!(h.performance_score, k.performance_score);
            assert_eq!(h.rank, k.rank);
            assert_eq!(h.metric_breakdown, k.metric_breakdown);
        }
    }

    #[tokio::test]
    async fn seeded_kmeans_is_reproducible() {
        let (store, _) = population();
        let service = seeded_service(store, 99);
        let first = service
            .list_performance(Segmentation::Kmeans, None, None)
            .await
            .unwrap();
        let second = service
            .list_performance(Segmentation::Kmeans, None, None)
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}

// =============================================================================
// Store Failures
// =============================================================================

mod store_failures {
    use super::*;

    #[tokio::test]
    async fn unavailable_store_fails_whole_request() {
        let (store, farmers) = population();
        store.set_unavailable(true).unwrap();
        let service = service(store);

        assert!(matches!(
            service
                .list_performance(Segmentation::Heuristic, None, None)
                .await,
            Err(AppError::StoreUnavailable(_))
        ));
        assert!(matches!(
            service
                .farmer_performance(farmers[0], Segmentation::Heuristic)
                .await,
            Err(AppError::StoreUnavailable(_))
        ));
    }
}

// =============================================================================
// Property: Rank Completeness
// Every enumerated farmer appears exactly once with ranks 1..N
// =============================================================================

mod rank_completeness {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn ranks_cover_one_to_n(acceptances in prop::collection::vec(0i64..=100, 0..12)) {
            let store = InMemoryHistoryStore::new();
            for &acceptance in &acceptances {
                add_farmer(&store, acceptance, 0);
            }
            let service = service(store);

            let records = tokio_test::block_on(
                service.list_performance(Segmentation::Heuristic, None, None),
            )
            .unwrap();

            prop_assert_eq!(records.len(), acceptances.len());
            for (index, record) in records.iter().enumerate() {
                prop_assert_eq!(record.rank, Some(index as u32 + 1));
            }
            for pair in records.windows(2) {
                prop_assert!(pair[0].performance_score >= pair[1].performance_score);
            }
        }
    }
}
