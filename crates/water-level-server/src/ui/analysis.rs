//! Analysis page - Leptos SSR
//!
//! Range and series selection, summary statistics, predictions, alerts,
//! history and distribution charts, CSV export and recording controls.
//! Numbers and charts are filled in by the script from /api/v1/analysis.

use super::components::nav::Header;
use super::{
    embed_json, ANALYSIS_SCRIPT, ANALYSIS_STYLES, BASE_STYLES, CHART_JS_URL,
    CONTENT_SECURITY_POLICY,
};
use crate::api::StateResponse;
use crate::AppState;
use axum::extract::State;
use axum::response::Html;
use leptos::prelude::*;
use reactive_graph::owner::Owner;
use water_level_core::chart::Series;
use water_level_core::state::{Action, Tab};
use water_level_core::Granularity;

/// One summary statistic card
#[component]
fn StatCard(label: &'static str, id: &'static str, unit: &'static str) -> impl IntoView {
    view! {
        <div class="stat-card">
            <span class="stat-label">{label}</span>
            <span class="stat-value" id=id>"--"</span>
            <span class="stat-unit">{unit}</span>
        </div>
    }
}

/// Analysis page component
#[component]
fn AnalysisPage(initial: StateResponse) -> impl IntoView {
    let range_options = Granularity::ALL
        .into_iter()
        .map(|g| {
            view! { <option value={g.as_str()} selected={g == initial.range}>{g.label()}</option> }
        })
        .collect_view();

    let series_buttons = [Series::Height, Series::Rate]
        .into_iter()
        .map(|s| {
            let class = if s == initial.series {
                "series-btn active"
            } else {
                "series-btn"
            };
            view! {
                <button class=class data-series={s.as_str()}>{s.dataset_label()}</button>
            }
        })
        .collect_view();

    let banner = initial.diagnostic.clone().map(|message| {
        view! {
            <div class="diagnostic-banner" id="diagnostic-banner" role="alert">
                <span id="diagnostic-text">{message}</span>
                <button class="banner-close" id="dismiss-diagnostic" aria-label="Tutup">"×"</button>
            </div>
        }
    });

    let bootstrap = format!("window.__DASHBOARD_STATE__ = {};", embed_json(&initial));

    view! {
        <html lang="id">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
                <meta http-equiv="Content-Security-Policy" content=CONTENT_SECURITY_POLICY/>
                <link rel="manifest" href="/manifest.json"/>
                <title>"Water Level - Analisis"</title>
                <style>{BASE_STYLES}</style>
                <style>{ANALYSIS_STYLES}</style>
                <script src=CHART_JS_URL></script>
            </head>
            <body>
                <Header active=Tab::Analysis/>
                <main>
                    {banner}
                    <section class="toolbar">
                        <label for="range-select">"Rentang"</label>
                        <select id="range-select" aria-label="Rentang">{range_options}</select>
                        <div class="series-toggle" id="series-toggle">{series_buttons}</div>
                        <button id="refresh-btn" class="btn">"Muat Ulang"</button>
                        <button id="export-btn" class="btn btn-primary">"Ekspor CSV"</button>
                        <button id="record-btn" class="btn">"Mulai Rekam"</button>
                        <span id="record-status" class="record-status"></span>
                    </section>
                    <div id="loading-indicator" class="loading" hidden={!initial.loading}>"Memuat data..."</div>
                    <section class="stat-grid">
                        <StatCard label="Rata-rata" id="stat-average" unit="m"/>
                        <StatCard label="Maksimum" id="stat-max" unit="m"/>
                        <StatCard label="Minimum" id="stat-min" unit="m"/>
                        <StatCard label="Standar Deviasi" id="stat-std" unit="m"/>
                        <StatCard label="Laju Perubahan" id="stat-rate" unit="m/s"/>
                    </section>
                    <section class="charts">
                        <div class="chart-container">
                            <h2>"Riwayat Ketinggian Air"</h2>
                            <canvas id="history-chart" class="chart"></canvas>
                        </div>
                        <div class="chart-container">
                            <h2>"Distribusi Ketinggian Air"</h2>
                            <canvas id="distribution-chart" class="chart"></canvas>
                        </div>
                    </section>
                    <section class="predictions">
                        <h2>"Prediksi"</h2>
                        <table class="prediction-table">
                            <thead>
                                <tr>
                                    <th>"Waktu"</th>
                                    <th>"Ketinggian"</th>
                                    <th>"Perubahan"</th>
                                </tr>
                            </thead>
                            <tbody id="prediction-rows"></tbody>
                        </table>
                        <div id="alerts" class="alerts"></div>
                    </section>
                    <p class="data-source" id="data-source"></p>
                </main>
                <script>{bootstrap}</script>
                <script>{ANALYSIS_SCRIPT}</script>
            </body>
        </html>
    }
}

/// Axum handler for the analysis page
pub async fn analysis_page(State(state): State<AppState>) -> Html<String> {
    let initial = {
        let mut dashboard = state.dashboard();
        dashboard.dispatch(Action::SelectTab(Tab::Analysis));
        StateResponse::from(&*dashboard)
    };

    let owner = Owner::new_root(None);
    let html = owner.with(|| {
        view! { <AnalysisPage initial=initial/> }
            .into_view()
            .to_html()
    });
    Html(format!("<!DOCTYPE html>{html}"))
}
