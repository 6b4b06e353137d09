//! E2E tests for window loading and the synthetic fallback

use rand::rngs::StdRng;
use rand::SeedableRng;
use water_level::loader::synthesize;
use water_level::store::MemoryStore;
use water_level::{Granularity, LiveReading, Sample, WindowLoader, WindowSource};

const NOW: i64 = 1_718_000_000_000;
const HOUR_MS: i64 = 3_600_000;

#[test]
fn test_synthetic_layout_per_granularity() {
    let mut rng = StdRng::seed_from_u64(42);
    for (granularity, count, interval) in [
        (Granularity::Daily, 24, HOUR_MS),
        (Granularity::Weekly, 28, 6 * HOUR_MS),
        (Granularity::Monthly, 30, 24 * HOUR_MS),
    ] {
        let samples = synthesize(granularity, LiveReading::default(), NOW, &mut rng);
        assert_eq!(samples.len(), count, "{granularity}");
        assert_eq!(samples.last().unwrap().timestamp, NOW);
        assert_eq!(samples[1].timestamp - samples[0].timestamp, interval);
    }
}

#[test]
fn test_synthetic_heights_clamped() {
    let mut rng = StdRng::seed_from_u64(1);
    let near_top = synthesize(Granularity::Weekly, LiveReading::new(2.95, 0.0), NOW, &mut rng);
    assert!(near_top.iter().all(|s| (0.0..=3.0).contains(&s.height)));
    let near_bottom = synthesize(Granularity::Weekly, LiveReading::new(0.02, 0.0), NOW, &mut rng);
    assert!(near_bottom.iter().all(|s| (0.0..=3.0).contains(&s.height)));
}

#[test]
fn test_synthetic_deterministic_with_seed() {
    let a = synthesize(Granularity::Daily, LiveReading::default(), NOW, &mut StdRng::seed_from_u64(9));
    let b = synthesize(Granularity::Daily, LiveReading::default(), NOW, &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_store_history_sorted_and_bounded() {
    let records: Vec<Sample> = (0..30)
        .map(|i| Sample::new(NOW - i * HOUR_MS, 1.0 + i as f64 * 0.01, 0.0))
        .collect();
    let store = MemoryStore::with_history(records);

    let outcome = WindowLoader::new(&store).load(Granularity::Daily, None).await;
    assert_eq!(outcome.source, WindowSource::Store);
    assert!(outcome.diagnostic.is_none());
    assert_eq!(outcome.window.len(), 24);
    let samples = outcome.window.samples();
    assert!(samples.windows(2).all(|p| p[0].timestamp <= p[1].timestamp));
    assert_eq!(samples.last().unwrap().timestamp, NOW);
}

#[tokio::test]
async fn test_empty_store_uses_synthetic_without_diagnostic() {
    let store = MemoryStore::new();
    let mut rng = StdRng::seed_from_u64(3);
    let outcome = WindowLoader::new(&store)
        .load_at(Granularity::Monthly, Some(LiveReading::new(2.0, 0.0)), NOW, &mut rng)
        .await;
    assert_eq!(outcome.source, WindowSource::Synthetic);
    assert!(outcome.diagnostic.is_none());
    assert_eq!(outcome.window.len(), 30);
    assert!(outcome.window.heights().all(|h| (1.9..=2.1).contains(&h)));
}

#[tokio::test]
async fn test_fetch_failure_attaches_diagnostic() {
    let store = MemoryStore::with_history(vec![Sample::new(NOW, 1.0, 0.0)]);
    store.fail_history(Some("network unreachable"));

    let outcome = WindowLoader::new(&store).load(Granularity::Daily, None).await;
    assert_eq!(outcome.source, WindowSource::Synthetic);
    let diagnostic = outcome.diagnostic.unwrap();
    assert!(diagnostic.starts_with("Failed to load analytics data"));
    assert!(diagnostic.contains("network unreachable"));
}

#[tokio::test]
async fn test_missing_index_names_the_rule() {
    let store = MemoryStore::new();
    store.reject_ordered_queries();

    let outcome = WindowLoader::new(&store).load(Granularity::Weekly, None).await;
    let diagnostic = outcome.diagnostic.unwrap();
    assert!(diagnostic.contains("\".indexOn\": \"timestamp\""));
    assert!(diagnostic.contains("/water_level_history"));
    assert_eq!(outcome.window.len(), 28);
}
