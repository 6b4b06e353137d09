//! Settings page - Leptos SSR
//!
//! Refresh interval, theme, monitoring location, gauge thresholds,
//! notification toggles and profile. Values live in the dashboard state only.

use super::components::nav::Header;
use super::{BASE_STYLES, CONTENT_SECURITY_POLICY, SETTINGS_SCRIPT, SETTINGS_STYLES};
use crate::AppState;
use axum::extract::State;
use axum::response::Html;
use leptos::prelude::*;
use reactive_graph::owner::Owner;
use water_level_core::state::{Action, Preferences, Tab, Theme, REFRESH_INTERVALS_SECS};

/// Labeled number input for one gauge threshold
#[component]
fn ThresholdInput(id: &'static str, label: &'static str, value: u8) -> impl IntoView {
    view! {
        <div class="form-group">
            <label for=id>{label}</label>
            <input type="number" id=id min="0" max="100" value={value.to_string()}/>
        </div>
    }
}

/// Labeled notification checkbox
#[component]
fn Toggle(id: &'static str, label: &'static str, checked: bool) -> impl IntoView {
    view! {
        <label class="toggle" for=id>
            <input type="checkbox" id=id checked=checked/>
            <span>{label}</span>
        </label>
    }
}

/// Settings page component
#[component]
fn SettingsPage(prefs: Preferences) -> impl IntoView {
    let interval_options = REFRESH_INTERVALS_SECS
        .into_iter()
        .map(|secs| {
            view! {
                <option value={secs.to_string()} selected={secs == prefs.refresh_interval_secs}>
                    {format!("{secs} detik")}
                </option>
            }
        })
        .collect_view();
    let dark = prefs.theme == Theme::Dark;

    view! {
        <html lang="id">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
                <meta http-equiv="Content-Security-Policy" content=CONTENT_SECURITY_POLICY/>
                <link rel="manifest" href="/manifest.json"/>
                <title>"Water Level - Pengaturan"</title>
                <style>{BASE_STYLES}</style>
                <style>{SETTINGS_STYLES}</style>
            </head>
            <body>
                <Header active=Tab::Settings/>
                <main>
                    <section class="settings-section">
                        <h2>"Tampilan"</h2>
                        <div class="form-group">
                            <label for="refresh-interval">"Interval Pembaruan"</label>
                            <select id="refresh-interval" aria-label="Interval Pembaruan">
                                {interval_options}
                            </select>
                        </div>
                        <div class="form-group">
                            <label for="theme-select">"Tema"</label>
                            <select id="theme-select" aria-label="Tema">
                                <option value="light" selected={!dark}>"Terang"</option>
                                <option value="dark" selected=dark>"Gelap"</option>
                            </select>
                        </div>
                    </section>
                    <section class="settings-section">
                        <h2>"Lokasi Pemantauan"</h2>
                        <div class="form-group">
                            <label for="location">"Lokasi"</label>
                            <input type="text" id="location" value={prefs.location.clone()}/>
                        </div>
                    </section>
                    <section class="settings-section">
                        <h2>"Ambang Batas Gauge (%)"</h2>
                        <div class="threshold-row">
                            <ThresholdInput id="threshold-normal" label="Normal" value={prefs.thresholds.normal}/>
                            <ThresholdInput id="threshold-warning" label="Waspada" value={prefs.thresholds.warning}/>
                            <ThresholdInput id="threshold-danger" label="Bahaya" value={prefs.thresholds.danger}/>
                        </div>
                    </section>
                    <section class="settings-section">
                        <h2>"Notifikasi"</h2>
                        <Toggle id="notify-email" label="Email" checked={prefs.notifications.email}/>
                        <Toggle id="notify-push" label="Push" checked={prefs.notifications.push}/>
                        <Toggle id="notify-sms" label="SMS" checked={prefs.notifications.sms}/>
                    </section>
                    <section class="settings-section">
                        <h2>"Profil"</h2>
                        <div class="form-group">
                            <label for="profile-name">"Nama"</label>
                            <input type="text" id="profile-name" value={prefs.profile.name.clone()}/>
                        </div>
                        <div class="form-group">
                            <label for="profile-email">"Email"</label>
                            <input type="email" id="profile-email" value={prefs.profile.email.clone()}/>
                        </div>
                        <div class="form-group">
                            <label for="profile-phone">"Telepon"</label>
                            <input type="tel" id="profile-phone" value={prefs.profile.phone.clone()}/>
                        </div>
                    </section>
                    <section class="settings-section">
                        <button id="save-btn" class="btn btn-primary">"Simpan"</button>
                        <span id="save-status" class="save-status"></span>
                    </section>
                </main>
                <script>{SETTINGS_SCRIPT}</script>
            </body>
        </html>
    }
}

/// Axum handler for the settings page
pub async fn settings_page(State(state): State<AppState>) -> Html<String> {
    let prefs = {
        let mut dashboard = state.dashboard();
        dashboard.dispatch(Action::SelectTab(Tab::Settings));
        dashboard.preferences.clone()
    };

    let owner = Owner::new_root(None);
    let html = owner.with(|| view! { <SettingsPage prefs=prefs/> }.into_view().to_html());
    Html(format!("<!DOCTYPE html>{html}"))
}
