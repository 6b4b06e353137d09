//! Height distribution for the histogram view
//!
//! Six half-open ranges of 0.5 m from 0 to 3 m. Each height is counted in the
//! first range containing it. Heights outside `[0, 3)` are not counted, so a
//! reading of exactly 3.0 m never appears in the histogram.

use crate::model::Sample;
use serde::Serialize;

/// Number of histogram ranges
pub const BIN_COUNT: usize = 6;

/// Width of each range in meters
pub const BIN_WIDTH_M: f64 = 0.5;

/// Sample counts per height range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DistributionBins {
    pub counts: [usize; BIN_COUNT],
}

impl DistributionBins {
    /// `[min, max)` bounds of range `index`
    pub fn range(index: usize) -> (f64, f64) {
        let min = index as f64 * BIN_WIDTH_M;
        (min, min + BIN_WIDTH_M)
    }

    /// Range labels: `0-0.5m`, `0.5-1m`, ... `2.5-3m`
    pub fn labels() -> Vec<String> {
        (0..BIN_COUNT)
            .map(|i| {
                let (min, max) = Self::range(i);
                format!("{min}-{max}m")
            })
            .collect()
    }

    /// Total number of samples counted
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Count window heights into the fixed ranges
pub fn bin(samples: &[Sample]) -> DistributionBins {
    bin_heights(samples.iter().map(|s| s.height))
}

/// Count raw heights into the fixed ranges
pub fn bin_heights(heights: impl IntoIterator<Item = f64>) -> DistributionBins {
    let mut bins = DistributionBins::default();
    for height in heights {
        let slot = (0..BIN_COUNT).find(|&i| {
            let (min, max) = DistributionBins::range(i);
            height >= min && height < max
        });
        match slot {
            Some(i) => bins.counts[i] += 1,
            None => tracing::trace!(height, "Height outside histogram range"),
        }
    }
    bins
}
