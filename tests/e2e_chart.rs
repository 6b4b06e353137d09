//! E2E tests for chart formatting

use chrono::{FixedOffset, TimeZone};
use water_level::chart::{format_distribution, format_history, time_label, Series};
use water_level::stats::distribution::bin_heights;
use water_level::stats::engine::compute;
use water_level::{Granularity, LiveReading, Sample, Window};

const HOUR_MS: i64 = 3_600_000;

fn wib() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap()
}

fn monday_2pm() -> i64 {
    wib()
        .with_ymd_and_hms(2024, 8, 5, 14, 0, 0)
        .unwrap()
        .timestamp_millis()
}

fn window(granularity: Granularity, heights: &[f64]) -> Window {
    let start = monday_2pm();
    let samples = heights
        .iter()
        .enumerate()
        .map(|(i, &h)| Sample::new(start + i as i64 * HOUR_MS, h, 0.0005))
        .collect();
    Window::from_records(granularity, samples)
}

#[test]
fn test_indonesian_labels() {
    let ts = monday_2pm();
    assert_eq!(time_label(Granularity::Daily, ts, wib()), "14:00");
    assert_eq!(time_label(Granularity::Weekly, ts, wib()), "Sen, 14:00");
    assert_eq!(time_label(Granularity::Monthly, ts, wib()), "05 Agt");
}

#[test]
fn test_daily_height_has_aligned_predictions() {
    let w = window(Granularity::Daily, &[1.0, 1.1, 1.2, 1.3]);
    let stats = compute(w.samples(), LiveReading::default());
    let chart = format_history(&w, &stats.predictions, Series::Height, wib());

    assert_eq!(chart.labels.len(), 7);
    assert!(chart.is_aligned());
    assert_eq!(chart.labels[4], "18:00");
    assert_eq!(chart.labels[6], "23:00");

    let history = &chart.datasets[0];
    assert_eq!(history.label, "Ketinggian Air (m)");
    assert!(history.fill);
    assert_eq!(history.data[3], Some(1.3));
    assert_eq!(history.data[4], None);

    let prediction = &chart.datasets[1];
    assert_eq!(prediction.label, "Prediksi");
    assert!(prediction.dashed);
    assert!(prediction.data[..4].iter().all(Option::is_none));
    assert_eq!(prediction.data[4], Some(1.4));
}

#[test]
fn test_daily_rate_has_aligned_predictions() {
    let w = window(Granularity::Daily, &[1.0, 1.1]);
    let stats = compute(w.samples(), LiveReading::default());
    let chart = format_history(&w, &stats.predictions, Series::Rate, wib());

    assert_eq!(chart.datasets.len(), 2);
    assert!(chart.is_aligned());
    assert_eq!(chart.labels.len(), 5);

    let history = &chart.datasets[0];
    assert_eq!(history.label, "Perubahan Ketinggian (m/s)");
    assert!(!history.fill);
    assert_eq!(history.data, vec![Some(0.0005), Some(0.0005), None, None, None]);

    let prediction = &chart.datasets[1];
    assert_eq!(prediction.label, "Prediksi");
    assert_eq!(prediction.data[..2], [None, None]);
    assert_eq!(prediction.data[2], Some(stats.rounded().predictions.one_hour));
}

#[test]
fn test_weekly_height_has_no_predictions() {
    let w = window(Granularity::Weekly, &[1.0, 1.1, 1.2]);
    let stats = compute(w.samples(), LiveReading::default());
    let chart = format_history(&w, &stats.predictions, Series::Height, wib());
    assert_eq!(chart.datasets.len(), 1);
    assert_eq!(chart.labels[0], "Sen, 14:00");
}

#[test]
fn test_empty_window_gives_empty_chart() {
    let w = Window::empty(Granularity::Daily);
    let stats = compute(w.samples(), LiveReading::default());
    let chart = format_history(&w, &stats.predictions, Series::Height, wib());
    assert!(chart.labels.is_empty());
    assert!(chart.datasets.is_empty());
}

#[test]
fn test_distribution_chart() {
    let chart = format_distribution(&bin_heights([0.2, 1.2, 1.3]));
    assert_eq!(chart.labels.len(), 6);
    assert_eq!(chart.datasets[0].label, "Distribusi Ketinggian Air");
    assert_eq!(chart.datasets[0].data[2], Some(2.0));
    assert!(chart.is_aligned());
}
