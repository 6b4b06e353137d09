//! Chart series formatting
//!
//! Maps a window into labeled datasets for the browser-side plotting
//! library. Every dataset has exactly one value per label; gaps are `None`.

use crate::model::{Granularity, Window};
use crate::stats::distribution::DistributionBins;
use crate::stats::engine::{round_to, Predictions};
use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HOUR_MS: i64 = 3600 * 1000;

/// Abbreviated weekday names (Indonesian), Sunday first
const WEEKDAYS_ID: [&str; 7] = ["Min", "Sen", "Sel", "Rab", "Kam", "Jum", "Sab"];

/// Abbreviated month names (Indonesian)
const MONTHS_ID: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agt", "Sep", "Okt", "Nov", "Des",
];

/// Which sample field the history chart plots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    #[default]
    Height,
    Rate,
}

/// Error for an unrecognized series name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown series '{0}' (expected height or rate)")]
pub struct ParseSeriesError(pub String);

impl Series {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Rate => "rate",
        }
    }

    /// Dataset label for the history chart
    pub fn dataset_label(self) -> &'static str {
        match self {
            Self::Height => "Ketinggian Air (m)",
            Self::Rate => "Perubahan Ketinggian (m/s)",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Series {
    type Err = ParseSeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "height" => Ok(Self::Height),
            "rate" => Ok(Self::Rate),
            other => Err(ParseSeriesError(other.to_string())),
        }
    }
}

/// One plotted series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    /// Drawn with a dashed stroke (predictions)
    pub dashed: bool,
    /// Area under the line is filled
    pub fill: bool,
}

/// Labels plus index-aligned datasets
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// True when every dataset has one value per label
    pub fn is_aligned(&self) -> bool {
        self.datasets.iter().all(|d| d.data.len() == self.labels.len())
    }
}

/// Axis label of a timestamp for the given granularity
pub fn time_label(granularity: Granularity, timestamp_ms: i64, offset: FixedOffset) -> String {
    let Some(utc) = DateTime::from_timestamp_millis(timestamp_ms) else {
        return String::from("-");
    };
    let local = utc.with_timezone(&offset);
    match granularity {
        Granularity::Daily => local.format("%H:%M").to_string(),
        Granularity::Weekly => format!(
            "{}, {}",
            WEEKDAYS_ID[local.weekday().num_days_from_sunday() as usize],
            local.format("%H:%M")
        ),
        Granularity::Monthly => format!("{} {}", local.format("%d"), MONTHS_ID[local.month0() as usize]),
    }
}

/// History chart for a window
///
/// The daily view appends a dashed prediction dataset: nulls for every
/// historical point followed by the 1 h, 3 h and 6 h projections, with the
/// label axis extended to match.
pub fn format_history(
    window: &Window,
    predictions: &Predictions,
    series: Series,
    offset: FixedOffset,
) -> ChartData {
    let Some(last) = window.last() else {
        return ChartData::default();
    };
    let granularity = window.granularity();

    let mut labels: Vec<String> = window
        .samples()
        .iter()
        .map(|s| time_label(granularity, s.timestamp, offset))
        .collect();
    let mut values: Vec<Option<f64>> = window
        .samples()
        .iter()
        .map(|s| {
            Some(match series {
                Series::Height => s.height,
                Series::Rate => s.rate,
            })
        })
        .collect();

    let mut datasets = Vec::with_capacity(2);
    let with_predictions = granularity == Granularity::Daily;

    let prediction_dataset = with_predictions.then(|| {
        let history_len = labels.len();
        let mut data = vec![None; history_len];
        for (hours, value) in predictions.by_horizon() {
            labels.push(time_label(
                granularity,
                last.timestamp + hours as i64 * HOUR_MS,
                offset,
            ));
            data.push(Some(round_to(value, 2)));
        }
        values.resize(labels.len(), None);
        Dataset {
            label: "Prediksi".to_string(),
            data,
            dashed: true,
            fill: false,
        }
    });

    datasets.push(Dataset {
        label: series.dataset_label().to_string(),
        data: values,
        dashed: false,
        fill: series == Series::Height,
    });
    datasets.extend(prediction_dataset);

    ChartData { labels, datasets }
}

/// Histogram chart for binned heights
pub fn format_distribution(bins: &DistributionBins) -> ChartData {
    ChartData {
        labels: DistributionBins::labels(),
        datasets: vec![Dataset {
            label: "Distribusi Ketinggian Air".to_string(),
            data: bins.counts.iter().map(|&c| Some(c as f64)).collect(),
            dashed: false,
            fill: true,
        }],
    }
}
