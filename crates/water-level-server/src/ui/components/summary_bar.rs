//! Summary bar component showing the live reading

use leptos::prelude::*;
use water_level_core::gauge::GaugeReading;

/// Summary bar showing live height, rate of change and gauge status
#[component]
pub fn SummaryBar(height: f64, rate: f64, gauge: GaugeReading) -> impl IntoView {
    view! {
        <div class="summary-bar" id="summary-bar">
            <div class="metric">
                <span class="metric-label">"Ketinggian"</span>
                <span class="metric-value" data-testid="height-value">{format!("{height:.2}")}</span>
                <span class="metric-unit">"m"</span>
            </div>
            <div class="metric">
                <span class="metric-label">"Laju Perubahan"</span>
                <span class="metric-value" data-testid="rate-value">{format!("{rate:.4}")}</span>
                <span class="metric-unit">"m/s"</span>
            </div>
            <div class="metric">
                <span class="metric-label">"Level"</span>
                <span class="metric-value" data-testid="percent-value">{format!("{:.0}", gauge.percent)}</span>
                <span class="metric-unit">"%"</span>
            </div>
        </div>
    }
}
