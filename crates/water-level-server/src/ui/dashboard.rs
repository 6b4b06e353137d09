//! Dashboard page - Leptos SSR
//!
//! Live gauge of the water height with its status line.

use super::components::nav::Header;
use super::components::summary_bar::SummaryBar;
use super::{BASE_STYLES, CONTENT_SECURITY_POLICY, DASHBOARD_SCRIPT, DASHBOARD_STYLES};
use crate::AppState;
use axum::extract::State;
use axum::response::Html;
use leptos::prelude::*;
use reactive_graph::owner::Owner;
use water_level_core::gauge::GaugeReading;
use water_level_core::state::{Action, Tab};
use water_level_core::LiveReading;

/// Dashboard page component
#[component]
fn DashboardPage(live: LiveReading, available: bool) -> impl IntoView {
    let gauge = GaugeReading::from_height(live.height);
    let status_class = format!("gauge-status status-{}", gauge.status.as_str());

    view! {
        <html lang="id">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
                <meta http-equiv="Content-Security-Policy" content=CONTENT_SECURITY_POLICY/>
                <link rel="manifest" href="/manifest.json"/>
                <title>"Water Level - Dashboard"</title>
                <style>{BASE_STYLES}</style>
                <style>{DASHBOARD_STYLES}</style>
            </head>
            <body>
                <Header active=Tab::Dashboard/>
                <main>
                    <SummaryBar height={live.height} rate={live.rate} gauge=gauge/>
                    <section class="gauge-section">
                        <div class="gauge" id="gauge">
                            <div class="gauge-scale">
                                <span>"3m"</span>
                                <span>"2m"</span>
                                <span>"1m"</span>
                                <span>"0m"</span>
                            </div>
                            <div class="gauge-tube">
                                <div
                                    class={format!("gauge-fill fill-{}", gauge.status.as_str())}
                                    id="gauge-fill"
                                    style={format!("height: {:.1}%", gauge.percent)}
                                ></div>
                            </div>
                        </div>
                        <div class=status_class id="gauge-status" data-testid="gauge-status">
                            {gauge.status.message()}
                        </div>
                        <p class="gauge-note" id="gauge-note" hidden=available>
                            "Belum ada data langsung; menampilkan nilai bawaan."
                        </p>
                    </section>
                </main>
                <script>{DASHBOARD_SCRIPT}</script>
            </body>
        </html>
    }
}

/// Axum handler for the dashboard page
pub async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let (live, available) = {
        let mut dashboard = state.dashboard();
        dashboard.dispatch(Action::SelectTab(Tab::Dashboard));
        (dashboard.live_or_default(), dashboard.live.is_some())
    };

    let owner = Owner::new_root(None);
    let html = owner.with(|| {
        view! { <DashboardPage live=live available=available/> }
            .into_view()
            .to_html()
    });
    Html(format!("<!DOCTYPE html>{html}"))
}
